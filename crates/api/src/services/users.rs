//! Admin-only account management.

use chrono::Utc;
use thiserror::Error;

use mercado_core::{Email, Role, UserId};

use crate::db::{RepositoryError, Stores, UserStore};
use crate::models::User;

/// Errors from admin account management.
#[derive(Debug, Error)]
pub enum UserAdminError {
    /// User not found.
    #[error("user not found")]
    NotFound,

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] mercado_core::EmailError),

    /// New username or email collides with another account.
    #[error("user already exists")]
    AlreadyExists,

    /// Demoting this account would leave the system without any admin.
    #[error("cannot demote the only admin account")]
    LastAdmin,

    /// Admins must not delete their own account.
    #[error("cannot delete your own account")]
    OwnAccount,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Account fields an admin may change; absent fields are left untouched.
#[derive(Debug, Default)]
pub struct AccountUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
}

/// Admin account-management service.
pub struct UserAdminService<'a> {
    users: &'a dyn UserStore,
}

impl<'a> UserAdminService<'a> {
    /// Create a new account-management service.
    #[must_use]
    pub fn new(stores: &'a Stores) -> Self {
        Self {
            users: stores.users.as_ref(),
        }
    }

    /// All accounts.
    ///
    /// # Errors
    ///
    /// Returns `UserAdminError::Repository` if the query fails.
    pub async fn list(&self) -> Result<Vec<User>, UserAdminError> {
        Ok(self.users.find_all().await?)
    }

    /// One account by ID.
    ///
    /// # Errors
    ///
    /// Returns `UserAdminError::NotFound` if absent.
    pub async fn get(&self, id: UserId) -> Result<User, UserAdminError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or(UserAdminError::NotFound)
    }

    /// Apply account changes to any user.
    ///
    /// Demotion of the sole remaining admin is refused so the system can
    /// never end up without one.
    ///
    /// # Errors
    ///
    /// Returns `UserAdminError::LastAdmin` on a sole-admin demotion and
    /// `UserAdminError::AlreadyExists` on a username or email collision.
    pub async fn update(&self, id: UserId, update: AccountUpdate) -> Result<User, UserAdminError> {
        let mut user = self.get(id).await?;

        if let Some(role) = update.role {
            if user.role.is_admin() && !role.is_admin() && self.users.count_admins().await? <= 1 {
                return Err(UserAdminError::LastAdmin);
            }
            user.role = role;
        }
        if let Some(username) = update.username
            && !username.trim().is_empty()
        {
            user.username = username.trim().to_owned();
        }
        if let Some(email) = update.email
            && !email.trim().is_empty()
        {
            user.email = Email::parse(&email)?;
        }
        user.updated_at = Utc::now();

        self.users.save(&user).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => UserAdminError::AlreadyExists,
            other => UserAdminError::Repository(other),
        })?;
        Ok(user)
    }

    /// Delete an account. The acting admin cannot delete their own.
    ///
    /// # Errors
    ///
    /// Returns `UserAdminError::OwnAccount` if `id` is the acting admin and
    /// `UserAdminError::NotFound` if the account doesn't exist.
    pub async fn delete(&self, acting_admin: UserId, id: UserId) -> Result<(), UserAdminError> {
        if id == acting_admin {
            return Err(UserAdminError::OwnAccount);
        }
        if self.users.delete(id).await? {
            Ok(())
        } else {
            Err(UserAdminError::NotFound)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn seed_user(stores: &Stores, username: &str, email: &str, role: Role) -> User {
        let mut user = User::new(
            username.to_owned(),
            Email::parse(email).unwrap(),
            "hash".to_owned(),
        );
        user.role = role;
        stores.users.create(&user).await.unwrap();
        user
    }

    #[tokio::test]
    async fn test_list_and_get() {
        let stores = Stores::memory();
        let admin = seed_user(&stores, "admin", "admin@example.com", Role::Admin).await;
        seed_user(&stores, "ana", "ana@example.com", Role::User).await;

        let service = UserAdminService::new(&stores);
        assert_eq!(service.list().await.unwrap().len(), 2);
        assert_eq!(service.get(admin.id).await.unwrap().username, "admin");
        assert!(matches!(
            service.get(UserId::generate()).await,
            Err(UserAdminError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_promote_then_demote() {
        let stores = Stores::memory();
        seed_user(&stores, "admin", "admin@example.com", Role::Admin).await;
        let ana = seed_user(&stores, "ana", "ana@example.com", Role::User).await;

        let service = UserAdminService::new(&stores);
        let promoted = service
            .update(
                ana.id,
                AccountUpdate {
                    role: Some(Role::Admin),
                    ..AccountUpdate::default()
                },
            )
            .await
            .unwrap();
        assert!(promoted.role.is_admin());

        // Two admins now, so demotion is fine
        let demoted = service
            .update(
                ana.id,
                AccountUpdate {
                    role: Some(Role::User),
                    ..AccountUpdate::default()
                },
            )
            .await
            .unwrap();
        assert!(!demoted.role.is_admin());
    }

    #[tokio::test]
    async fn test_sole_admin_cannot_be_demoted() {
        let stores = Stores::memory();
        let admin = seed_user(&stores, "admin", "admin@example.com", Role::Admin).await;

        let service = UserAdminService::new(&stores);
        let result = service
            .update(
                admin.id,
                AccountUpdate {
                    role: Some(Role::User),
                    ..AccountUpdate::default()
                },
            )
            .await;
        assert!(matches!(result, Err(UserAdminError::LastAdmin)));

        // Role unchanged in storage
        assert!(service.get(admin.id).await.unwrap().role.is_admin());
    }

    #[tokio::test]
    async fn test_update_fields() {
        let stores = Stores::memory();
        let ana = seed_user(&stores, "ana", "ana@example.com", Role::User).await;

        let service = UserAdminService::new(&stores);
        let updated = service
            .update(
                ana.id,
                AccountUpdate {
                    username: Some("ana-maria".to_owned()),
                    email: Some("ana.maria@example.com".to_owned()),
                    role: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.username, "ana-maria");
        assert_eq!(updated.email.as_str(), "ana.maria@example.com");
    }

    #[tokio::test]
    async fn test_delete_guards_own_account() {
        let stores = Stores::memory();
        let admin = seed_user(&stores, "admin", "admin@example.com", Role::Admin).await;
        let ana = seed_user(&stores, "ana", "ana@example.com", Role::User).await;

        let service = UserAdminService::new(&stores);
        assert!(matches!(
            service.delete(admin.id, admin.id).await,
            Err(UserAdminError::OwnAccount)
        ));

        service.delete(admin.id, ana.id).await.unwrap();
        assert!(matches!(
            service.delete(admin.id, ana.id).await,
            Err(UserAdminError::NotFound)
        ));
    }
}
