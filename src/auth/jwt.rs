use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use super::model::{Claims, User};

const TOKEN_EXPIRY_SECONDS: i64 = 3 * 24 * 60 * 60; // 3 days

/// Sign a token for the given user.
pub fn generate_token(user: &User, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp() as usize;
    let claims = Claims {
        user_id: user.id,
        role: user.role,
        email: user.email.clone(),
        name: user.name.clone(),
        iat: now,
        exp: now + TOKEN_EXPIRY_SECONDS as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Validate and decode a token
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

pub fn token_expiry_seconds() -> i64 {
    TOKEN_EXPIRY_SECONDS
}
