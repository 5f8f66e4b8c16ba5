use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Verified caller, as supplied by the identity provider.
/// Passed explicitly into every warehouse operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub username: String,
}

impl Identity {
    pub fn new(user_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
        }
    }
}

/// Claims read from the identity provider's bearer token
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default, alias = "preferred_username")]
    pub username: Option<String>,
    pub exp: i64,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        // Fall back to the subject when the provider sends no display name
        let username = claims.username.unwrap_or_else(|| claims.sub.clone());
        Self {
            user_id: claims.sub,
            username,
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("JWT secret not configured")]
    MissingSecret,

    #[error("Invalid JWT token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("JWT subject is empty")]
    EmptySubject,
}

/// Verify an HS256 token signed by the identity provider and extract the caller
pub fn verify_token(token: &str, secret: &str) -> Result<Identity, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::MissingSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())?;

    if token_data.claims.sub.trim().is_empty() {
        return Err(AuthError::EmptySubject);
    }
    Ok(token_data.claims.into())
}
