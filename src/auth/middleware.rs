use actix_web::{web, HttpRequest};

use super::jwt::validate_token;
use super::model::Claims;
use crate::error::ApiError;
use crate::AppState;

/// Extract token from Authorization header
fn extract_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Validate the bearer token on a request and return its claims.
pub fn authenticate(req: &HttpRequest) -> Result<Claims, ApiError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| ApiError::internal("Application state not configured"))?;

    let token = extract_token(req)
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization token".to_string()))?;

    validate_token(token, &state.config.jwt_secret).map_err(|e| {
        log::warn!("Token validation failed: {:?}", e);
        ApiError::Unauthorized("Invalid or expired token".to_string())
    })
}

/// Like [`authenticate`], but only lets administrators through.
pub fn require_admin(req: &HttpRequest) -> Result<Claims, ApiError> {
    let claims = authenticate(req)?;
    if !claims.is_admin() {
        log::warn!("User {} denied admin-only route {}", claims.user_id, req.path());
        return Err(ApiError::Forbidden("Access denied".to_string()));
    }
    Ok(claims)
}
