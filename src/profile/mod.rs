//! The caller's own account: view, edit, and password reset by passcode.

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::auth::handlers::hash_password;
use crate::auth::middleware::authenticate;
use crate::auth::model::{normalize_email, MessageResponse, SendOtpRequest, UserInfo};
use crate::error::ApiError;
use crate::mail::templates;
use crate::otp::{self, OtpError};
use crate::validation::{
    validate_email, validate_mobile, validate_password, validate_required, ValidationErrors,
};
use crate::AppState;

/// Omitted fields keep their current value. Role cannot be changed here.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub mobile_number: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetRequest {
    pub email: String,
    pub otp: String,
    pub new_password: String,
}

#[utoipa::path(
    get,
    path = "/api/profile",
    tag = "Profile",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user's profile", body = UserInfo),
        (status = 404, description = "Profile not found", body = crate::ErrorResponse)
    )
)]
pub async fn get_profile(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let claims = authenticate(&req)?;
    let user = state
        .users
        .find_user_by_id(claims.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Profile not found"))?;
    Ok(HttpResponse::Ok().json(UserInfo::from(user)))
}

#[utoipa::path(
    put,
    path = "/api/profile",
    tag = "Profile",
    security(("bearer_auth" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserInfo),
        (status = 400, description = "Validation failed", body = crate::ErrorResponse),
        (status = 409, description = "Email or mobile number already in use", body = crate::ErrorResponse)
    )
)]
pub async fn update_profile(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse, ApiError> {
    let claims = authenticate(&req)?;
    let body = body.into_inner();

    let current = state
        .users
        .find_user_by_id(claims.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Profile not found"))?;

    let mut errors = ValidationErrors::new();
    if let Some(name) = &body.name {
        validate_required(name, "name", "Name", &mut errors);
    }
    if let Some(email) = &body.email {
        validate_email(email, "email", &mut errors);
    }
    if let Some(mobile) = &body.mobile_number {
        validate_mobile(mobile, "mobileNumber", &mut errors);
    }
    errors.into_result()?;

    let name = body.name.map(|n| n.trim().to_string()).unwrap_or(current.name);
    let email = body
        .email
        .map(|e| normalize_email(&e))
        .unwrap_or(current.email);
    let mobile_number = body
        .mobile_number
        .map(|m| m.trim().to_string())
        .unwrap_or(current.mobile_number);

    let email_taken = state
        .users
        .find_user_by_email(&email)
        .await?
        .is_some_and(|other| other.id != current.id);
    let mobile_taken = state
        .users
        .find_user_by_mobile(&mobile_number)
        .await?
        .is_some_and(|other| other.id != current.id);
    if email_taken || mobile_taken {
        return Err(ApiError::Conflict(
            "Email or Mobile already in use".to_string(),
        ));
    }

    let updated = state
        .users
        .update_profile(current.id, &name, &email, &mobile_number)
        .await?
        .ok_or_else(|| ApiError::not_found("Profile not found"))?;

    log::info!("Profile {} updated", updated.id);
    Ok(HttpResponse::Ok().json(UserInfo::from(updated)))
}

#[utoipa::path(
    post,
    path = "/api/profile/password/send-otp",
    tag = "Profile",
    request_body = SendOtpRequest,
    responses(
        (status = 200, description = "Reset OTP sent", body = MessageResponse),
        (status = 404, description = "Email not found", body = crate::ErrorResponse),
        (status = 500, description = "OTP email could not be sent", body = crate::ErrorResponse)
    )
)]
pub async fn send_reset_otp(
    state: web::Data<AppState>,
    body: web::Json<SendOtpRequest>,
) -> Result<HttpResponse, ApiError> {
    let mut errors = ValidationErrors::new();
    validate_email(&body.email, "email", &mut errors);
    errors.into_result()?;

    let user = state
        .users
        .find_user_by_email(&normalize_email(&body.email))
        .await?
        .ok_or_else(|| ApiError::not_found("Email not found"))?;

    otp::issue(
        state.otps.as_ref(),
        state.mailer.as_ref(),
        &user,
        templates::password_reset_otp,
    )
    .await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("OTP sent to email")))
}

#[utoipa::path(
    post,
    path = "/api/profile/password/reset",
    tag = "Profile",
    request_body = PasswordResetRequest,
    responses(
        (status = 200, description = "Password updated", body = MessageResponse),
        (status = 400, description = "Invalid or expired OTP", body = crate::ErrorResponse),
        (status = 404, description = "Email not found", body = crate::ErrorResponse)
    )
)]
pub async fn reset_password(
    state: web::Data<AppState>,
    body: web::Json<PasswordResetRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();

    let mut errors = ValidationErrors::new();
    validate_email(&body.email, "email", &mut errors);
    validate_required(&body.otp, "otp", "OTP", &mut errors);
    validate_password(&body.new_password, "newPassword", &mut errors);
    errors.into_result()?;

    let email = normalize_email(&body.email);
    if state.users.find_user_by_email(&email).await?.is_none() {
        return Err(ApiError::not_found("Email not found"));
    }

    otp::verify(state.otps.as_ref(), &email, &body.otp, Utc::now())
        .await
        .map_err(|e| match e {
            OtpError::Store(store) => ApiError::from(store),
            rejected => ApiError::BadRequest(rejected.to_string()),
        })?;

    let password_hash = hash_password(body.new_password).await?;
    state.users.update_password(&email, &password_hash).await?;

    log::info!("Password reset for {}", email);
    Ok(HttpResponse::Ok().json(MessageResponse::new("Password updated successfully")))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/profile")
            .route("", web::get().to(get_profile))
            .route("", web::put().to(update_profile))
            .route("/password/send-otp", web::post().to(send_reset_otp))
            .route("/password/reset", web::post().to(reset_password)),
    );
}
