use actix_cors::Cors;
use actix_web::middleware::Compress;
use actix_web::error::InternalError;
use actix_web::{http::header, web, App, HttpResponse, HttpServer};
use actix_web_prometheus::PrometheusMetricsBuilder;
use serde::{Deserialize, Serialize};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod auth;
pub mod bill;
pub mod config;
pub mod db;
pub mod dispatch;
pub mod document;
pub mod error;
pub mod mail;
pub mod otp;
pub mod profile;
pub mod teachers;
pub mod validation;

pub use crate::db::AppState;
use crate::validation::FieldError;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            details: None,
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self::new("NotFound", message)
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BadRequest", message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("InternalServerError", message)
    }

    pub fn with_details(mut self, details: Vec<FieldError>) -> Self {
        self.details = Some(details);
        self
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
    })
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::health,
        crate::auth::handlers::signup,
        crate::auth::handlers::login_email_password,
        crate::auth::handlers::login_number_password,
        crate::auth::handlers::send_login_otp,
        crate::auth::handlers::login_email_otp,
        crate::bill::handlers::list_bills,
        crate::bill::handlers::create_bill,
        crate::bill::handlers::get_bill,
        crate::bill::handlers::update_bill,
        crate::bill::handlers::delete_bill,
        crate::dispatch::handlers::download_bank_form,
        crate::dispatch::handlers::download_main_bill,
        crate::dispatch::handlers::download_personal_bills,
        crate::dispatch::handlers::mail_main_bill,
        crate::dispatch::handlers::mail_main_bill_to,
        crate::dispatch::handlers::mail_personal_bills,
        crate::dispatch::handlers::mail_personal_bills_to,
        crate::teachers::list_teachers,
        crate::teachers::get_teacher,
        crate::teachers::get_teacher_bills,
        crate::profile::get_profile,
        crate::profile::update_profile,
        crate::profile::send_reset_otp,
        crate::profile::reset_password
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            FieldError,
            auth::model::Role,
            auth::model::UserInfo,
            auth::model::SignupRequest,
            auth::model::EmailPasswordLogin,
            auth::model::MobilePasswordLogin,
            auth::model::SendOtpRequest,
            auth::model::EmailOtpLogin,
            auth::model::AuthResponse,
            auth::model::MessageResponse,
            bill::model::Bill,
            bill::model::BillContent,
            bill::model::BillRequest,
            bill::model::Batch,
            bill::model::Person,
            bill::model::PersonRequest,
            bill::model::PresentTime,
            bill::model::StaffPayment,
            bill::model::StaffPaymentRequest,
            bill::model::ProgramLevel,
            bill::model::ExamType,
            bill::model::TeacherBillsResponse,
            bill::model::TeacherInfo,
            dispatch::handlers::RecipientRequest,
            profile::UpdateProfileRequest,
            profile::PasswordResetRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness probe."),
        (name = "Authentication", description = "Signup and login endpoints."),
        (name = "Bills", description = "Exam remuneration bill CRUD endpoints."),
        (name = "Documents", description = "PDF download and mail endpoints."),
        (name = "Teachers", description = "Admin views of teacher accounts."),
        (name = "Profile", description = "Own profile and password reset.")
    )
)]
pub struct ApiDoc;

/// Malformed JSON bodies and path segments answer with a 400 `ErrorResponse`.
fn extractor_configs() -> (web::JsonConfig, web::PathConfig) {
    let json = web::JsonConfig::default().error_handler(|err, _req| {
        let body = ErrorResponse::bad_request(&err.to_string());
        InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
    });
    let path = web::PathConfig::default().error_handler(|err, _req| {
        let body = ErrorResponse::bad_request(&err.to_string());
        InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
    });
    (json, path)
}

/// Every route of the service. Shared by the server and the integration tests.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    let (json_config, path_config) = extractor_configs();
    cfg.app_data(json_config)
        .app_data(path_config)
        .route("/health", web::get().to(health))
        .service(
            web::scope("/api")
                .configure(auth::config)
                .configure(bill::config)
                .configure(dispatch::handlers::config)
                .configure(teachers::config)
                .configure(profile::config),
        );
}

pub async fn run() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = config::AppConfig::from_env()?;
    let bind = (config.bind_address.clone(), config.port);
    let allowed_origins = config.allowed_origins.clone();

    let app_state = match AppState::new_with_config(config).await {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            log::error!("Failed to initialise application state. Please check DATABASE_URL and SMTP settings in .env. Error: {}", e);
            return Err(e);
        }
    };

    let prometheus = PrometheusMetricsBuilder::new("exam_remuneration_server")
        .endpoint("/metrics")
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to create Prometheus metrics middleware: {}", e))?;

    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        let cors = allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                header::AUTHORIZATION,
                header::ACCEPT,
                header::CONTENT_TYPE,
            ])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(Compress::default())
            .wrap(prometheus.clone())
            .wrap(cors)
            .app_data(app_state.clone())
            .configure(configure_routes)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
    })
    .keep_alive(actix_web::http::KeepAlive::Os)
    .bind(bind)?
    .run()
    .await?;

    Ok(())
}
