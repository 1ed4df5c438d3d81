//! Authentication service.
//!
//! Password registration, login and password change on top of the user
//! repository. Passwords are stored as Argon2id PHC strings with a random
//! per-user salt; the cost parameters come from configuration.

mod error;

pub use error::AuthError;

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;

use corner_shop_core::Login;

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::session::CurrentUser;
use crate::models::user::{Profile, User};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length, bounding hashing work per request.
const MAX_PASSWORD_LENGTH: usize = 256;

/// Maximum length of a name field.
const MAX_NAME_LENGTH: usize = 100;

/// Authentication service.
///
/// Handles user registration, login, and password changes.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    argon2: Argon2<'static>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub fn new(pool: &'a SqlitePool, params: &Params) -> Self {
        Self {
            users: UserRepository::new(pool),
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params.clone()),
        }
    }

    /// Register a new user with login and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidLogin` if the login format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::InvalidProfile` if a profile field is malformed.
    /// Returns `AuthError::DuplicateLogin` if the login is already registered.
    pub async fn register(
        &self,
        login: &str,
        password: &str,
        profile: Profile,
    ) -> Result<User, AuthError> {
        let login = Login::parse(login.trim())?;
        validate_password(password)?;
        let profile = normalize_profile(profile)?;

        let password_hash = self.hash_password(password)?;

        let user = self
            .users
            .create(&login, &password_hash, &profile)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::DuplicateLogin,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, login = %user.login, "user registered");
        Ok(user)
    }

    /// Login with login name and password.
    ///
    /// Unknown logins, malformed logins and wrong passwords all yield the
    /// same error.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the login/password is wrong.
    pub async fn login(&self, login: &str, password: &str) -> Result<User, AuthError> {
        let login = Login::parse(login.trim()).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_password_hash(&login)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        self.verify_password(password, &password_hash)?;

        Ok(user)
    }

    /// Replace the password of the identified user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` if the new password doesn't meet requirements.
    /// Returns `AuthError::NotAuthenticated` if the identity no longer maps to a user.
    pub async fn change_password(
        &self,
        identity: &CurrentUser,
        new_password: &str,
    ) -> Result<(), AuthError> {
        validate_password(new_password)?;
        let password_hash = self.hash_password(new_password)?;

        self.users
            .update_password_hash(identity.id, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AuthError::NotAuthenticated,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %identity.id, "password changed");
        Ok(())
    }

    /// Look up the account behind a session identity.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotAuthenticated` if the user no longer exists.
    pub async fn current_user(&self, identity: &CurrentUser) -> Result<User, AuthError> {
        self.users
            .get_by_id(identity.id)
            .await?
            .ok_or(AuthError::NotAuthenticated)
    }

    /// List all registered users.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the database operation fails.
    pub async fn list_users(&self) -> Result<Vec<User>, AuthError> {
        Ok(self.users.list().await?)
    }

    /// Hash a password using Argon2id with a fresh salt.
    fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|_| AuthError::PasswordHash)
    }

    /// Verify a password against a stored PHC string.
    fn verify_password(&self, password: &str, hash: &str) -> Result<(), AuthError> {
        let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;

        self.argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| AuthError::InvalidCredentials)
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    let length = password.chars().count();

    if length < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    if length > MAX_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at most {MAX_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Trim profile fields and check their shape.
fn normalize_profile(profile: Profile) -> Result<Profile, AuthError> {
    let first_name = profile.first_name.trim().to_string();
    let last_name = profile.last_name.trim().to_string();
    let birth_date = profile.birth_date.trim().to_string();

    for (field, value) in [("first name", &first_name), ("last name", &last_name)] {
        if value.chars().count() > MAX_NAME_LENGTH {
            return Err(AuthError::InvalidProfile(format!(
                "{field} must be at most {MAX_NAME_LENGTH} characters"
            )));
        }
    }

    if !birth_date.is_empty() {
        let date = NaiveDate::parse_from_str(&birth_date, "%Y-%m-%d").map_err(|_| {
            AuthError::InvalidProfile("birth date must be formatted YYYY-MM-DD".to_string())
        })?;
        if date > Utc::now().date_naive() {
            return Err(AuthError::InvalidProfile(
                "birth date cannot be in the future".to_string(),
            ));
        }
    }

    Ok(Profile {
        first_name,
        last_name,
        birth_date,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::test_support::memory_pool;

    /// Cheap parameters so the suite stays fast.
    fn test_params() -> Params {
        Params::new(1024, 1, 1, None).unwrap()
    }

    fn profile() -> Profile {
        Profile {
            first_name: " Alice ".to_string(),
            last_name: "Liddell".to_string(),
            birth_date: "1852-05-04".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_stores_salted_hash_not_plaintext() {
        let pool = memory_pool().await;
        let params = test_params();
        let auth = AuthService::new(&pool, &params);

        let user = auth.register("alice", "secret-pw", profile()).await.unwrap();
        assert_eq!(user.profile.first_name, "Alice");

        let (_, stored) = UserRepository::new(&pool)
            .get_password_hash(&user.login)
            .await
            .unwrap()
            .unwrap();
        assert_ne!(stored, "secret-pw");
        assert!(stored.starts_with("$argon2id$"));
        assert!(auth.verify_password("secret-pw", &stored).is_ok());
    }

    #[tokio::test]
    async fn test_same_password_hashes_differently_per_user() {
        let pool = memory_pool().await;
        let params = test_params();
        let auth = AuthService::new(&pool, &params);
        let repo = UserRepository::new(&pool);

        let a = auth.register("amy", "same-password", Profile::default()).await.unwrap();
        let b = auth.register("ben", "same-password", Profile::default()).await.unwrap();

        let (_, hash_a) = repo.get_password_hash(&a.login).await.unwrap().unwrap();
        let (_, hash_b) = repo.get_password_hash(&b.login).await.unwrap().unwrap();
        assert_ne!(hash_a, hash_b);
    }

    #[tokio::test]
    async fn test_duplicate_registration_fails() {
        let pool = memory_pool().await;
        let params = test_params();
        let auth = AuthService::new(&pool, &params);

        auth.register("alice", "secret-pw", profile()).await.unwrap();
        let err = auth
            .register("alice", "other-password", Profile::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::DuplicateLogin));

        assert!(auth.login("alice", "secret-pw").await.is_ok());
        assert!(auth.login("alice", "other-password").await.is_err());
    }

    #[tokio::test]
    async fn test_login_succeeds_only_with_correct_password() {
        let pool = memory_pool().await;
        let params = test_params();
        let auth = AuthService::new(&pool, &params);
        let registered = auth.register("alice", "secret-pw", profile()).await.unwrap();

        let user = auth.login("alice", "secret-pw").await.unwrap();
        assert_eq!(user.id, registered.id);

        assert!(matches!(
            auth.login("alice", "wrong-password").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("mallory", "secret-pw").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("not a login", "secret-pw").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_register_validation() {
        let pool = memory_pool().await;
        let params = test_params();
        let auth = AuthService::new(&pool, &params);

        assert!(matches!(
            auth.register("", "secret-pw", Profile::default()).await,
            Err(AuthError::InvalidLogin(_))
        ));
        assert!(matches!(
            auth.register("alice", "short", Profile::default()).await,
            Err(AuthError::WeakPassword(_))
        ));

        let bad_date = Profile {
            birth_date: "04/05/1852".to_string(),
            ..Profile::default()
        };
        assert!(matches!(
            auth.register("alice", "secret-pw", bad_date).await,
            Err(AuthError::InvalidProfile(_))
        ));

        assert!(auth.list_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_change_password() {
        let pool = memory_pool().await;
        let params = test_params();
        let auth = AuthService::new(&pool, &params);
        let user = auth.register("alice", "secret-pw", profile()).await.unwrap();
        let identity = CurrentUser::from(&user);

        assert!(matches!(
            auth.change_password(&identity, "tiny").await,
            Err(AuthError::WeakPassword(_))
        ));

        auth.change_password(&identity, "brand-new-pw").await.unwrap();
        assert!(auth.login("alice", "secret-pw").await.is_err());
        assert!(auth.login("alice", "brand-new-pw").await.is_ok());
    }

    #[tokio::test]
    async fn test_change_password_for_vanished_user() {
        let pool = memory_pool().await;
        let params = test_params();
        let auth = AuthService::new(&pool, &params);
        let ghost = CurrentUser {
            id: corner_shop_core::UserId::new(404),
            login: Login::parse("ghost").unwrap(),
        };

        assert!(matches!(
            auth.change_password(&ghost, "brand-new-pw").await,
            Err(AuthError::NotAuthenticated)
        ));
        assert!(matches!(
            auth.current_user(&ghost).await,
            Err(AuthError::NotAuthenticated)
        ));
    }
}
