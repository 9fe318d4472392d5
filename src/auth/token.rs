use crate::config::AuthConfig;
use crate::error::AppError;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Represents the claims encoded within an access token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject of the token: the user's id.
    pub sub: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: u64,
}

/// Generates an HS256 access token for `user_id`.
///
/// The token expires `config.token_ttl_minutes` after issue and is signed with
/// `config.jwt_secret`.
pub fn generate_token(user_id: i64, config: &AuthConfig) -> Result<String, AppError> {
    let expiry_out_of_range = || AppError::InternalServerError("Token expiry out of range".into());

    let ttl = chrono::Duration::try_minutes(config.token_ttl_minutes).ok_or_else(expiry_out_of_range)?;
    let expiration = chrono::Utc::now()
        .checked_add_signed(ttl)
        .ok_or_else(expiry_out_of_range)?
        .timestamp();
    let expiration = u64::try_from(expiration).map_err(|_| expiry_out_of_range())?;

    let claims = Claims {
        sub: user_id,
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
}

/// Verifies the signature and expiry of `token` and returns its claims.
///
/// Any failure (malformed token, wrong signature, expired) is `AppError::Unauthorized`.
pub fn verify_token(token: &str, config: &AuthConfig) -> Result<Claims, AppError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}
