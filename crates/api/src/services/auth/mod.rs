//! Authentication service.
//!
//! Handles registration, login, bearer-token identity, and the profile
//! surface (account fields and the saved address book). Passwords are
//! hashed with Argon2id; session identity is a signed JWT.

mod error;
pub mod token;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use secrecy::SecretString;

use mercado_core::{AddressId, Email, UserId};

use crate::db::{RepositoryError, Stores, UserStore};
use crate::models::{Address, User};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Profile fields a user may change on their own account.
#[derive(Debug, Default)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// A new or replacement saved address. All fields are required.
#[derive(Debug)]
pub struct AddressFields {
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

/// Authentication service.
pub struct AuthService<'a> {
    users: &'a dyn UserStore,
    jwt_secret: &'a SecretString,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub fn new(stores: &'a Stores, jwt_secret: &'a SecretString) -> Self {
        Self {
            users: stores.users.as_ref(),
            jwt_secret,
        }
    }

    /// Register a new account. Returns the user and a fresh token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` for a malformed email,
    /// `AuthError::WeakPassword` for a short password, and
    /// `AuthError::UserAlreadyExists` for a duplicate username or email.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(User, String), AuthError> {
        let email = Email::parse(email)?;
        if username.trim().is_empty() {
            return Err(AuthError::MissingField("username is required".to_owned()));
        }
        validate_password(password)?;

        let password_hash = hash_password(password)?;
        let user = User::new(username.trim().to_owned(), email, password_hash);

        self.users.create(&user).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
            other => AuthError::Repository(other),
        })?;

        let token = token::issue(user.id, self.jwt_secret)?;
        Ok((user, token))
    }

    /// Login with email and password. Returns the user and a fresh token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email is unknown or
    /// the password does not match. The two cases are indistinguishable to
    /// the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), AuthError> {
        let email = Email::parse(email)?;

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &user.password_hash)?;

        let token = token::issue(user.id, self.jwt_secret)?;
        Ok((user, token))
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub async fn get_user(&self, user_id: UserId) -> Result<User, AuthError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Apply profile changes and re-issue a token (credentials may have
    /// changed).
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserAlreadyExists` if the new username or email
    /// collides with another account.
    pub async fn update_profile(
        &self,
        user_id: UserId,
        update: ProfileUpdate,
    ) -> Result<(User, String), AuthError> {
        let mut user = self.get_user(user_id).await?;

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
        if let Some(password) = update.password
            && !password.is_empty()
        {
            validate_password(&password)?;
            user.password_hash = hash_password(&password)?;
        }
        user.updated_at = Utc::now();

        self.users.save(&user).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
            other => AuthError::Repository(other),
        })?;

        let token = token::issue(user.id, self.jwt_secret)?;
        Ok((user, token))
    }

    /// Append a new saved address to the profile.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingField` if any address field is blank.
    pub async fn add_address(
        &self,
        user_id: UserId,
        fields: AddressFields,
    ) -> Result<User, AuthError> {
        validate_address(&fields)?;

        let mut user = self.get_user(user_id).await?;
        user.addresses.push(Address {
            id: AddressId::generate(),
            address: fields.address,
            city: fields.city,
            state: fields.state,
            postal_code: fields.postal_code,
            country: fields.country,
        });
        user.updated_at = Utc::now();

        self.users.save(&user).await?;
        Ok(user)
    }

    /// Replace an existing saved address, identified by its local ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AddressNotFound` if the ID is not on this profile.
    pub async fn update_address(
        &self,
        user_id: UserId,
        address_id: AddressId,
        fields: AddressFields,
    ) -> Result<User, AuthError> {
        validate_address(&fields)?;

        let mut user = self.get_user(user_id).await?;
        let entry = user
            .address_mut(address_id)
            .ok_or(AuthError::AddressNotFound)?;
        entry.address = fields.address;
        entry.city = fields.city;
        entry.state = fields.state;
        entry.postal_code = fields.postal_code;
        entry.country = fields.country;
        user.updated_at = Utc::now();

        self.users.save(&user).await?;
        Ok(user)
    }

    /// Delete a saved address.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AddressNotFound` if the ID is not on this profile.
    pub async fn delete_address(
        &self,
        user_id: UserId,
        address_id: AddressId,
    ) -> Result<User, AuthError> {
        let mut user = self.get_user(user_id).await?;
        if !user.remove_address(address_id) {
            return Err(AuthError::AddressNotFound);
        }
        user.updated_at = Utc::now();

        self.users.save(&user).await?;
        Ok(user)
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

fn validate_address(fields: &AddressFields) -> Result<(), AuthError> {
    let required = [
        ("address", &fields.address),
        ("city", &fields.city),
        ("state", &fields.state),
        ("postalCode", &fields.postal_code),
        ("country", &fields.country),
    ];
    for (name, value) in required {
        if value.trim().is_empty() {
            return Err(AuthError::MissingField(format!("{name} is required")));
        }
    }
    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn secret() -> SecretString {
        SecretString::from("unit-test-signing-secret-0123456789")
    }

    #[tokio::test]
    async fn test_register_login_roundtrip() {
        let stores = Stores::memory();
        let secret = secret();
        let auth = AuthService::new(&stores, &secret);

        let (user, _) = auth
            .register("ana", "ana@example.com", "correcthorse")
            .await
            .unwrap();
        assert_eq!(user.username, "ana");

        let (logged_in, token) = auth.login("ana@example.com", "correcthorse").await.unwrap();
        assert_eq!(logged_in.id, user.id);
        assert_eq!(token::verify(&token, &secret).unwrap(), user.id);
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let stores = Stores::memory();
        let secret = secret();
        let auth = AuthService::new(&stores, &secret);

        auth.register("ana", "ana@example.com", "correcthorse")
            .await
            .unwrap();
        let result = auth
            .register("other", "ana@example.com", "correcthorse")
            .await;
        assert!(matches!(result, Err(AuthError::UserAlreadyExists)));
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let stores = Stores::memory();
        let secret = secret();
        let auth = AuthService::new(&stores, &secret);

        auth.register("ana", "ana@example.com", "correcthorse")
            .await
            .unwrap();
        let result = auth.login("ana@example.com", "wronghorse!").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_register_weak_password() {
        let stores = Stores::memory();
        let secret = secret();
        let auth = AuthService::new(&stores, &secret);

        let result = auth.register("ana", "ana@example.com", "short").await;
        assert!(matches!(result, Err(AuthError::WeakPassword(_))));
    }

    #[tokio::test]
    async fn test_address_lifecycle() {
        let stores = Stores::memory();
        let secret = secret();
        let auth = AuthService::new(&stores, &secret);

        let (user, _) = auth
            .register("ana", "ana@example.com", "correcthorse")
            .await
            .unwrap();

        let fields = AddressFields {
            address: "Calle 1".to_owned(),
            city: "Lima".to_owned(),
            state: "Lima".to_owned(),
            postal_code: "15001".to_owned(),
            country: "PE".to_owned(),
        };
        let user = auth.add_address(user.id, fields).await.unwrap();
        let address_id = user.addresses.first().unwrap().id;

        let updated = auth
            .update_address(
                user.id,
                address_id,
                AddressFields {
                    address: "Calle 2".to_owned(),
                    city: "Lima".to_owned(),
                    state: "Lima".to_owned(),
                    postal_code: "15002".to_owned(),
                    country: "PE".to_owned(),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.addresses.first().unwrap().address, "Calle 2");

        let cleared = auth.delete_address(user.id, address_id).await.unwrap();
        assert!(cleared.addresses.is_empty());

        let result = auth.delete_address(user.id, address_id).await;
        assert!(matches!(result, Err(AuthError::AddressNotFound)));
    }

    #[tokio::test]
    async fn test_blank_address_field_rejected() {
        let stores = Stores::memory();
        let secret = secret();
        let auth = AuthService::new(&stores, &secret);

        let (user, _) = auth
            .register("ana", "ana@example.com", "correcthorse")
            .await
            .unwrap();

        let result = auth
            .add_address(
                user.id,
                AddressFields {
                    address: "Calle 1".to_owned(),
                    city: String::new(),
                    state: "Lima".to_owned(),
                    postal_code: "15001".to_owned(),
                    country: "PE".to_owned(),
                },
            )
            .await;
        assert!(matches!(result, Err(AuthError::MissingField(_))));
    }
}
