//! User repository for database operations.
//!
//! This is the credential store: accounts keyed by unique login together
//! with their password hash and profile fields.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use corner_shop_core::{Login, UserId};

use super::{RepositoryError, conflict_on_unique};
use crate::models::user::{Profile, User};

const USER_COLUMNS: &str = "id, login, first_name, last_name, birth_date, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    login: String,
    first_name: String,
    last_name: String,
    birth_date: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct UserWithHashRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let login = Login::parse(&row.login).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid login in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            login,
            profile: Profile {
                first_name: row.first_name,
                last_name: row.last_name,
                birth_date: row.birth_date,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the login already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        login: &Login,
        password_hash: &str,
        profile: &Profile,
    ) -> Result<User, RepositoryError> {
        let now = Utc::now();

        let row: UserRow = sqlx::query_as(&format!(
            r"
            INSERT INTO users (login, password_hash, first_name, last_name, birth_date, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(login)
        .bind(password_hash)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.birth_date)
        .bind(now)
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "login"))?;

        row.try_into()
    }

    /// Get a user by their login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored login is invalid.
    pub async fn get_by_login(&self, login: &Login) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE login = $1"))
                .bind(login)
                .fetch_optional(self.pool)
                .await?;

        row.map(User::try_from).transpose()
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored login is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        row.map(User::try_from).transpose()
    }

    /// List all users in registration order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let rows: Vec<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id ASC"))
                .fetch_all(self.pool)
                .await?;

        rows.into_iter().map(User::try_from).collect()
    }

    /// Get a user together with their password hash.
    ///
    /// Returns `None` if no user has this login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        login: &Login,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row: Option<UserWithHashRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users WHERE login = $1"
        ))
        .bind(login)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let user = User::try_from(row.user)?;
        Ok(Some((user, row.password_hash)))
    }

    /// Overwrite a user's password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_password_hash(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET password_hash = $1, updated_at = $2
            WHERE id = $3
            ",
        )
        .bind(password_hash)
        .bind(Utc::now())
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::test_support::memory_pool;

    fn profile(first: &str, last: &str) -> Profile {
        Profile {
            first_name: first.to_string(),
            last_name: last.to_string(),
            birth_date: "1990-04-01".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_by_login() {
        let pool = memory_pool().await;
        let users = UserRepository::new(&pool);
        let login = Login::parse("alice").unwrap();

        let created = users
            .create(&login, "hash-a", &profile("Alice", "Liddell"))
            .await
            .unwrap();
        assert_eq!(created.login, login);
        assert_eq!(created.profile.first_name, "Alice");

        let found = users.get_by_login(&login).await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.profile, created.profile);

        let by_id = users.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(by_id.login, login);
    }

    #[tokio::test]
    async fn test_missing_user_is_none() {
        let pool = memory_pool().await;
        let users = UserRepository::new(&pool);

        let login = Login::parse("nobody").unwrap();
        assert!(users.get_by_login(&login).await.unwrap().is_none());
        assert!(users.get_password_hash(&login).await.unwrap().is_none());
        assert!(users.get_by_id(UserId::new(999)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_login_is_conflict_and_keeps_first() {
        let pool = memory_pool().await;
        let users = UserRepository::new(&pool);
        let login = Login::parse("bob").unwrap();

        users
            .create(&login, "first-hash", &profile("Bob", "One"))
            .await
            .unwrap();
        let err = users
            .create(&login, "second-hash", &profile("Bob", "Two"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));

        let (user, hash) = users.get_password_hash(&login).await.unwrap().unwrap();
        assert_eq!(hash, "first-hash");
        assert_eq!(user.profile.last_name, "One");
        assert_eq!(users.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_in_registration_order() {
        let pool = memory_pool().await;
        let users = UserRepository::new(&pool);

        for name in ["zed", "amy", "max"] {
            users
                .create(&Login::parse(name).unwrap(), "h", &Profile::default())
                .await
                .unwrap();
        }

        let logins: Vec<String> = users
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.login.into_inner())
            .collect();
        assert_eq!(logins, ["zed", "amy", "max"]);
    }

    #[tokio::test]
    async fn test_update_password_hash() {
        let pool = memory_pool().await;
        let users = UserRepository::new(&pool);
        let login = Login::parse("carol").unwrap();
        let user = users
            .create(&login, "old", &Profile::default())
            .await
            .unwrap();

        users.update_password_hash(user.id, "new").await.unwrap();
        let (_, hash) = users.get_password_hash(&login).await.unwrap().unwrap();
        assert_eq!(hash, "new");

        let err = users
            .update_password_hash(UserId::new(user.id.as_i64() + 1), "x")
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }
}
