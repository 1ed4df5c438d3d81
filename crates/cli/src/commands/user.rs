//! User management commands.

use std::io::BufRead;

use corner_shop_storefront::models::Profile;
use corner_shop_storefront::services::AuthService;

use super::{CommandError, connect};

/// Create a user, reading the password from the first line of stdin.
pub async fn create(
    login: &str,
    first_name: String,
    last_name: String,
    birth_date: String,
) -> Result<(), CommandError> {
    let password = read_password()?;
    let (config, pool) = connect().await?;
    let params = config
        .password_hash
        .params()
        .map_err(CommandError::PasswordParams)?;

    let profile = Profile {
        first_name,
        last_name,
        birth_date,
    };
    let user = AuthService::new(&pool, &params)
        .register(login, &password, profile)
        .await?;

    tracing::info!("User created successfully! ID: {}, Login: {}", user.id, user.login);
    Ok(())
}

/// Print all users, one per line.
pub async fn list() -> Result<(), CommandError> {
    let (config, pool) = connect().await?;
    let params = config
        .password_hash
        .params()
        .map_err(CommandError::PasswordParams)?;

    let users = AuthService::new(&pool, &params).list_users().await?;

    #[allow(clippy::print_stdout)]
    for user in users {
        println!(
            "{}\t{}\t{}",
            user.id,
            user.login,
            user.profile.display_name().unwrap_or_default()
        );
    }
    Ok(())
}

fn read_password() -> Result<String, std::io::Error> {
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
