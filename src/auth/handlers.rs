use actix_web::{web, HttpResponse};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::Utc;

use super::jwt::{generate_token, token_expiry_seconds};
use super::model::{
    normalize_email, AuthResponse, EmailOtpLogin, EmailPasswordLogin, MessageResponse,
    MobilePasswordLogin, NewUser, Role, SendOtpRequest, SignupRequest, User,
};
use crate::error::ApiError;
use crate::mail::templates;
use crate::otp::{self, OtpError};
use crate::validation::{
    validate_email, validate_mobile, validate_password, validate_required, ValidationErrors,
};
use crate::AppState;

/// Hash a password off the async executor.
pub(crate) async fn hash_password(password: String) -> Result<String, ApiError> {
    web::block(move || hash(password, DEFAULT_COST))
        .await
        .map_err(|e| {
            log::error!("Password hashing task failed: {:?}", e);
            ApiError::internal("Failed to process password")
        })?
        .map_err(|e| {
            log::error!("Password hashing failed: {:?}", e);
            ApiError::internal("Failed to process password")
        })
}

async fn password_matches(password: String, password_hash: String) -> bool {
    web::block(move || verify(password, &password_hash).unwrap_or(false))
        .await
        .unwrap_or(false)
}

fn auth_response(state: &AppState, user: User, message: &str) -> Result<AuthResponse, ApiError> {
    let token = generate_token(&user, &state.config.jwt_secret).map_err(|e| {
        log::error!("Failed to generate token: {:?}", e);
        ApiError::internal("Failed to generate token")
    })?;

    Ok(AuthResponse {
        message: message.to_string(),
        token,
        token_type: "Bearer".to_string(),
        expires_in: token_expiry_seconds(),
        user: user.into(),
    })
}

/// Register a new account and sign it in.
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    tag = "Authentication",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Signup successful", body = AuthResponse),
        (status = 400, description = "Validation failed", body = crate::ErrorResponse),
        (status = 409, description = "Email or mobile number already in use", body = crate::ErrorResponse)
    )
)]
pub async fn signup(
    state: web::Data<AppState>,
    body: web::Json<SignupRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();

    let mut errors = ValidationErrors::new();
    validate_required(&body.name, "name", "Name", &mut errors);
    validate_email(&body.email, "email", &mut errors);
    validate_mobile(&body.mobile_number, "mobileNumber", &mut errors);
    validate_password(&body.password, "password", &mut errors);
    errors.into_result()?;

    let email = normalize_email(&body.email);
    let mobile_number = body.mobile_number.trim().to_string();

    if state.users.find_user_by_email(&email).await?.is_some()
        || state.users.find_user_by_mobile(&mobile_number).await?.is_some()
    {
        return Err(ApiError::Conflict(
            "Email or Mobile Number already in use".to_string(),
        ));
    }

    let password_hash = hash_password(body.password).await?;
    let user = state
        .users
        .create_user(NewUser {
            role: body.role.unwrap_or(Role::Admin),
            name: body.name.trim().to_string(),
            email,
            mobile_number,
            password_hash,
        })
        .await?;

    log::info!("New {} account created: {}", user.role, user.email);
    Ok(HttpResponse::Created().json(auth_response(&state, user, "Signup successful")?))
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/api/auth/login/email-password",
    tag = "Authentication",
    request_body = EmailPasswordLogin,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid password", body = crate::ErrorResponse),
        (status = 404, description = "Email not found", body = crate::ErrorResponse)
    )
)]
pub async fn login_email_password(
    state: web::Data<AppState>,
    body: web::Json<EmailPasswordLogin>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    if body.email.trim().is_empty() || body.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Email and Password required".to_string(),
        ));
    }

    let user = state
        .users
        .find_user_by_email(&normalize_email(&body.email))
        .await?
        .ok_or_else(|| ApiError::not_found("Email not found"))?;

    if !password_matches(body.password, user.password_hash.clone()).await {
        log::warn!("Failed password login for {}", user.email);
        return Err(ApiError::Unauthorized("Invalid password".to_string()));
    }

    log::info!("User {} logged in with email", user.id);
    Ok(HttpResponse::Ok().json(auth_response(&state, user, "Login successful")?))
}

/// Login with mobile number and password
#[utoipa::path(
    post,
    path = "/api/auth/login/number-password",
    tag = "Authentication",
    request_body = MobilePasswordLogin,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid password", body = crate::ErrorResponse),
        (status = 404, description = "Mobile number not found", body = crate::ErrorResponse)
    )
)]
pub async fn login_number_password(
    state: web::Data<AppState>,
    body: web::Json<MobilePasswordLogin>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    if body.mobile_number.trim().is_empty() || body.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Mobile number and Password required".to_string(),
        ));
    }

    let user = state
        .users
        .find_user_by_mobile(body.mobile_number.trim())
        .await?
        .ok_or_else(|| ApiError::not_found("Mobile number not found"))?;

    if !password_matches(body.password, user.password_hash.clone()).await {
        log::warn!("Failed password login for {}", user.email);
        return Err(ApiError::Unauthorized("Invalid password".to_string()));
    }

    log::info!("User {} logged in with mobile number", user.id);
    Ok(HttpResponse::Ok().json(auth_response(&state, user, "Login successful")?))
}

/// Send a login passcode to a registered email
#[utoipa::path(
    post,
    path = "/api/auth/login/send-otp",
    tag = "Authentication",
    request_body = SendOtpRequest,
    responses(
        (status = 200, description = "OTP sent", body = MessageResponse),
        (status = 404, description = "Email not found", body = crate::ErrorResponse),
        (status = 500, description = "OTP email could not be sent", body = crate::ErrorResponse)
    )
)]
pub async fn send_login_otp(
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
        .ok_or_else(|| ApiError::not_found("Email not found."))?;

    otp::issue(
        state.otps.as_ref(),
        state.mailer.as_ref(),
        &user,
        templates::login_otp,
    )
    .await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("OTP sent successfully.")))
}

/// Login with email and a previously sent passcode
#[utoipa::path(
    post,
    path = "/api/auth/login/email-otp",
    tag = "Authentication",
    request_body = EmailOtpLogin,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "OTP missing, expired or wrong", body = crate::ErrorResponse),
        (status = 404, description = "Email not found", body = crate::ErrorResponse)
    )
)]
pub async fn login_email_otp(
    state: web::Data<AppState>,
    body: web::Json<EmailOtpLogin>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    if body.email.trim().is_empty() || body.otp.trim().is_empty() {
        return Err(ApiError::BadRequest("Email and OTP required".to_string()));
    }

    let user = state
        .users
        .find_user_by_email(&normalize_email(&body.email))
        .await?
        .ok_or_else(|| ApiError::not_found("Email not found"))?;

    otp::verify(state.otps.as_ref(), &user.email, &body.otp, Utc::now())
        .await
        .map_err(|e| match e {
            OtpError::Store(store) => ApiError::from(store),
            rejected => {
                log::warn!("OTP login rejected for {}: {}", user.email, rejected);
                ApiError::Unauthorized(rejected.to_string())
            }
        })?;

    log::info!("User {} logged in with OTP", user.id);
    Ok(HttpResponse::Ok().json(auth_response(&state, user, "Login successful")?))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/signup", web::post().to(signup))
            .route("/login/email-password", web::post().to(login_email_password))
            .route("/login/number-password", web::post().to(login_number_password))
            .route("/login/send-otp", web::post().to(send_login_otp))
            .route("/login/email-otp", web::post().to(login_email_otp)),
    );
}
