use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Delivery, DeliveryMode};
use crate::auth::middleware::authenticate;
use crate::auth::model::MessageResponse;
use crate::bill::load_accessible_bill;
use crate::document::{render, DocumentKind, DocumentRequest};
use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RecipientRequest {
    pub email: String,
}

fn pdf_response(filename: String, pdf: Vec<u8>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Inline,
            parameters: vec![DispositionParam::Filename(filename)],
        })
        .body(pdf)
}

fn delivered(delivery: Delivery, what: &str) -> HttpResponse {
    match delivery {
        Delivery::Inline { filename, pdf } => pdf_response(filename, pdf),
        Delivery::Mailed { recipient } => {
            log::info!("{} mailed to {}", what, recipient);
            HttpResponse::Ok().json(MessageResponse::new(format!(
                "{} sent to {} successfully",
                what, recipient
            )))
        }
    }
}

/// Render a bill-backed document and deliver it.
async fn deliver_bill(
    req: &HttpRequest,
    state: &AppState,
    id: Uuid,
    kind: DocumentKind,
    mode: impl FnOnce(&crate::auth::Claims) -> DeliveryMode,
) -> Result<HttpResponse, ApiError> {
    let claims = authenticate(req)?;
    let mode = mode(&claims);

    // Reject a bad recipient before touching the store
    if let DeliveryMode::EmailOther(address) = &mode {
        if !crate::validation::is_valid_email(address) {
            return Err(ApiError::BadRequest("Invalid email format".to_string()));
        }
    }

    let bill = load_accessible_bill(state, &claims, id).await?;
    let request = match kind {
        DocumentKind::PersonalStatement => DocumentRequest::PersonalStatement(&bill),
        _ => DocumentRequest::MainSummary(&bill),
    };
    let document = render(request, &state.documents);

    log::info!("Generating {:?} PDF for bill {}", kind, id);
    let delivery = state.dispatcher.dispatch(&document, mode).await?;

    let what = match kind {
        DocumentKind::PersonalStatement => "Personal bills",
        _ => "Main bill",
    };
    Ok(delivered(delivery, what))
}

#[utoipa::path(
    get,
    path = "/api/download/bank-detail-form",
    tag = "Documents",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Blank bank detail form", body = Vec<u8>, content_type = "application/pdf"),
        (status = 500, description = "PDF generation failed", body = crate::ErrorResponse)
    )
)]
pub async fn download_bank_form(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    authenticate(&req)?;
    let document = render(DocumentRequest::BankDetailForm, &state.documents);
    let delivery = state
        .dispatcher
        .dispatch(&document, DeliveryMode::InlineResponse)
        .await?;
    Ok(delivered(delivery, "Bank detail form"))
}

#[utoipa::path(
    get,
    path = "/api/download/{id}",
    tag = "Documents",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Bill ID")),
    responses(
        (status = 200, description = "Main bill PDF", body = Vec<u8>, content_type = "application/pdf"),
        (status = 404, description = "Bill not found", body = crate::ErrorResponse),
        (status = 500, description = "PDF generation failed", body = crate::ErrorResponse)
    )
)]
pub async fn download_main_bill(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    deliver_bill(&req, &state, path.into_inner(), DocumentKind::MainSummary, |_| {
        DeliveryMode::InlineResponse
    })
    .await
}

#[utoipa::path(
    get,
    path = "/api/download/personal/{id}",
    tag = "Documents",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Bill ID")),
    responses(
        (status = 200, description = "Personal statements PDF", body = Vec<u8>, content_type = "application/pdf"),
        (status = 404, description = "Bill not found", body = crate::ErrorResponse),
        (status = 500, description = "PDF generation failed", body = crate::ErrorResponse)
    )
)]
pub async fn download_personal_bills(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    deliver_bill(&req, &state, path.into_inner(), DocumentKind::PersonalStatement, |_| {
        DeliveryMode::InlineResponse
    })
    .await
}

#[utoipa::path(
    get,
    path = "/api/mail/main/{id}",
    tag = "Documents",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Bill ID")),
    responses(
        (status = 200, description = "Main bill mailed to the caller", body = MessageResponse),
        (status = 404, description = "Bill not found", body = crate::ErrorResponse),
        (status = 500, description = "PDF generation or mail failed", body = crate::ErrorResponse)
    )
)]
pub async fn mail_main_bill(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    deliver_bill(&req, &state, path.into_inner(), DocumentKind::MainSummary, |claims| {
        DeliveryMode::EmailSelf(claims.email.clone())
    })
    .await
}

#[utoipa::path(
    post,
    path = "/api/mail/main/{id}/other",
    tag = "Documents",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Bill ID")),
    request_body = RecipientRequest,
    responses(
        (status = 200, description = "Main bill mailed", body = MessageResponse),
        (status = 400, description = "Invalid email format", body = crate::ErrorResponse),
        (status = 404, description = "Bill not found", body = crate::ErrorResponse),
        (status = 500, description = "PDF generation or mail failed", body = crate::ErrorResponse)
    )
)]
pub async fn mail_main_bill_to(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<RecipientRequest>,
) -> Result<HttpResponse, ApiError> {
    let email = body.into_inner().email;
    deliver_bill(&req, &state, path.into_inner(), DocumentKind::MainSummary, move |_| {
        DeliveryMode::EmailOther(email)
    })
    .await
}

#[utoipa::path(
    get,
    path = "/api/mail/personal/{id}",
    tag = "Documents",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Bill ID")),
    responses(
        (status = 200, description = "Personal bills mailed to the caller", body = MessageResponse),
        (status = 404, description = "Bill not found", body = crate::ErrorResponse),
        (status = 500, description = "PDF generation or mail failed", body = crate::ErrorResponse)
    )
)]
pub async fn mail_personal_bills(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    deliver_bill(&req, &state, path.into_inner(), DocumentKind::PersonalStatement, |claims| {
        DeliveryMode::EmailSelf(claims.email.clone())
    })
    .await
}

#[utoipa::path(
    post,
    path = "/api/mail/personal/{id}/other",
    tag = "Documents",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Bill ID")),
    request_body = RecipientRequest,
    responses(
        (status = 200, description = "Personal bills mailed", body = MessageResponse),
        (status = 400, description = "Invalid email format", body = crate::ErrorResponse),
        (status = 404, description = "Bill not found", body = crate::ErrorResponse),
        (status = 500, description = "PDF generation or mail failed", body = crate::ErrorResponse)
    )
)]
pub async fn mail_personal_bills_to(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<RecipientRequest>,
) -> Result<HttpResponse, ApiError> {
    let email = body.into_inner().email;
    deliver_bill(&req, &state, path.into_inner(), DocumentKind::PersonalStatement, move |_| {
        DeliveryMode::EmailOther(email)
    })
    .await
}

pub fn config(cfg: &mut web::ServiceConfig) {
    // The static form route must be registered before `/download/{id}`
    cfg.service(
        web::scope("/download")
            .route("/bank-detail-form", web::get().to(download_bank_form))
            .route("/personal/{id}", web::get().to(download_personal_bills))
            .route("/{id}", web::get().to(download_main_bill)),
    )
    .service(
        web::scope("/mail")
            .route("/main/{id}", web::get().to(mail_main_bill))
            .route("/main/{id}/other", web::post().to(mail_main_bill_to))
            .route("/personal/{id}", web::get().to(mail_personal_bills))
            .route("/personal/{id}/other", web::post().to(mail_personal_bills_to)),
    );
}
