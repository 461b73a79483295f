//! Bearer token issuance and verification.
//!
//! Tokens are HS256 JWTs whose subject is the user ID, valid for 30 days.
//! The signing secret comes from configuration and never leaves it.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use mercado_core::UserId;

use super::AuthError;

/// Token lifetime.
const TOKEN_TTL_DAYS: i64 = 30;

/// JWT claims carried by a session token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID.
    pub sub: String,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

/// Issue a signed token for a user.
///
/// # Errors
///
/// Returns `AuthError::InvalidToken` if signing fails (malformed key).
pub fn issue(user_id: UserId, secret: &SecretString) -> Result<String, AuthError> {
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (Utc::now() + Duration::days(TOKEN_TTL_DAYS)).timestamp(),
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.expose_secret().as_bytes()),
    )
    .map_err(|_| AuthError::InvalidToken)
}

/// Verify a token and extract the user ID it was issued for.
///
/// # Errors
///
/// Returns `AuthError::InvalidToken` if the signature is wrong, the token
/// is expired, or the subject is not a valid ID.
pub fn verify(token: &str, secret: &SecretString) -> Result<UserId, AuthError> {
    let data = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.expose_secret().as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AuthError::InvalidToken)?;

    UserId::parse(&data.claims.sub).map_err(|_| AuthError::InvalidToken)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn secret() -> SecretString {
        SecretString::from("test-signing-secret-with-enough-length")
    }

    #[test]
    fn test_issue_verify_roundtrip() {
        let user_id = UserId::generate();
        let token = issue(user_id, &secret()).unwrap();
        assert_eq!(verify(&token, &secret()).unwrap(), user_id);
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let token = issue(UserId::generate(), &secret()).unwrap();
        let other = SecretString::from("a-completely-different-signing-secret");
        assert!(matches!(
            verify(&token, &other),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_verify_rejects_garbage() {
        assert!(matches!(
            verify("not.a.jwt", &secret()),
            Err(AuthError::InvalidToken)
        ));
    }
}
