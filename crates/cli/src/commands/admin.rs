//! Admin account management commands.

use tracing::info;

use mercado_api::db::{self, Stores};
use mercado_api::models::User;
use mercado_api::services::auth::hash_password;
use mercado_core::{Email, Role};

/// Create an admin account, or promote the account if the email is already
/// registered.
///
/// # Errors
///
/// Returns an error if the email or password is invalid, or a database
/// operation fails.
pub async fn create(
    username: &str,
    email: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let database_url = super::database_url()?;

    let email = Email::parse(email)?;
    if password.len() < 8 {
        return Err("password must be at least 8 characters".into());
    }

    let pool = db::create_pool(&database_url).await?;
    let stores = Stores::postgres(pool);

    if let Some(mut existing) = stores.users.find_by_email(&email).await? {
        existing.role = Role::Admin;
        stores.users.save(&existing).await?;
        info!(user = %existing.id, "Existing account promoted to admin");
        return Ok(());
    }

    let password_hash = hash_password(password).map_err(|e| e.to_string())?;
    let mut user = User::new(username.to_owned(), email, password_hash);
    user.role = Role::Admin;
    stores.users.create(&user).await?;

    info!(user = %user.id, "Admin account created");
    Ok(())
}
