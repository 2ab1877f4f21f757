use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use uuid::Uuid;

use super::derive::derive;
use super::model::{Bill, BillRequest, EDITED_BY_ADMIN};
use super::validation::validate_bill_request;
use crate::auth::middleware::authenticate;
use crate::auth::model::{Claims, MessageResponse};
use crate::error::ApiError;
use crate::AppState;

/// Fetch a bill the caller may act on. Teachers only reach their own bills.
pub(crate) async fn load_accessible_bill(
    state: &AppState,
    claims: &Claims,
    id: Uuid,
) -> Result<Bill, ApiError> {
    let bill = state
        .bills
        .get_bill(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Bill not found"))?;

    if !claims.is_admin() && bill.user_id != claims.user_id {
        log::warn!("User {} denied access to bill {}", claims.user_id, id);
        return Err(ApiError::Forbidden(
            "You do not have access to this bill".to_string(),
        ));
    }
    Ok(bill)
}

#[utoipa::path(
    get,
    path = "/api/bills",
    tag = "Bills",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Bills, newest first", body = Vec<Bill>),
        (status = 401, description = "Missing or invalid token", body = crate::ErrorResponse)
    )
)]
pub async fn list_bills(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let claims = authenticate(&req)?;
    log::info!("Listing bills for {} ({})", claims.user_id, claims.role);

    let owner = if claims.is_admin() {
        None
    } else {
        Some(claims.user_id)
    };
    let bills = state.bills.list_bills(owner).await?;
    Ok(HttpResponse::Ok().json(bills))
}

#[utoipa::path(
    post,
    path = "/api/bills",
    tag = "Bills",
    security(("bearer_auth" = [])),
    request_body = BillRequest,
    responses(
        (status = 201, description = "Bill created with derived totals", body = Bill),
        (status = 400, description = "Validation failed", body = crate::ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = crate::ErrorResponse)
    )
)]
pub async fn create_bill(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<BillRequest>,
) -> Result<HttpResponse, ApiError> {
    let claims = authenticate(&req)?;
    let request = body.into_inner();
    validate_bill_request(&request)?;

    let bill = Bill::new(claims.user_id, derive(request));
    state.bills.insert_bill(&bill).await?;

    log::info!(
        "Bill {} created by {} (total {})",
        bill.id,
        claims.user_id,
        bill.content.total_amount
    );
    Ok(HttpResponse::Created().json(bill))
}

#[utoipa::path(
    get,
    path = "/api/bills/{id}",
    tag = "Bills",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Bill ID")),
    responses(
        (status = 200, description = "Bill found", body = Bill),
        (status = 403, description = "Bill belongs to another user", body = crate::ErrorResponse),
        (status = 404, description = "Bill not found", body = crate::ErrorResponse)
    )
)]
pub async fn get_bill(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let claims = authenticate(&req)?;
    let bill = load_accessible_bill(&state, &claims, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(bill))
}

/// Full replace. Identity, owner and creation time are kept and totals are
/// derived again from the new content.
#[utoipa::path(
    put,
    path = "/api/bills/{id}",
    tag = "Bills",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Bill ID")),
    request_body = BillRequest,
    responses(
        (status = 200, description = "Bill updated", body = Bill),
        (status = 400, description = "Validation failed", body = crate::ErrorResponse),
        (status = 403, description = "Bill belongs to another user", body = crate::ErrorResponse),
        (status = 404, description = "Bill not found", body = crate::ErrorResponse)
    )
)]
pub async fn update_bill(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<BillRequest>,
) -> Result<HttpResponse, ApiError> {
    let claims = authenticate(&req)?;
    let request = body.into_inner();
    validate_bill_request(&request)?;

    let existing = load_accessible_bill(&state, &claims, path.into_inner()).await?;

    let status = if claims.is_admin() && existing.user_id != claims.user_id {
        Some(EDITED_BY_ADMIN.to_string())
    } else {
        existing.status.clone()
    };

    let bill = Bill {
        id: existing.id,
        user_id: existing.user_id,
        status,
        content: derive(request),
        created_at: existing.created_at,
        updated_at: Utc::now(),
    };

    if !state.bills.replace_bill(&bill).await? {
        return Err(ApiError::not_found("Bill not found"));
    }

    log::info!("Bill {} updated by {}", bill.id, claims.user_id);
    Ok(HttpResponse::Ok().json(bill))
}

#[utoipa::path(
    delete,
    path = "/api/bills/{id}",
    tag = "Bills",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Bill ID")),
    responses(
        (status = 200, description = "Bill deleted", body = MessageResponse),
        (status = 403, description = "Bill belongs to another user", body = crate::ErrorResponse),
        (status = 404, description = "Bill not found", body = crate::ErrorResponse)
    )
)]
pub async fn delete_bill(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let claims = authenticate(&req)?;
    let bill = load_accessible_bill(&state, &claims, path.into_inner()).await?;

    if !state.bills.delete_bill(bill.id).await? {
        return Err(ApiError::not_found("Bill not found"));
    }

    log::info!("Bill {} deleted by {}", bill.id, claims.user_id);
    Ok(HttpResponse::Ok().json(MessageResponse::new("Bill deleted successfully")))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/bills")
            .route(web::get().to(list_bills))
            .route(web::post().to(create_bill)),
    )
    .service(
        web::resource("/bills/{id}")
            .route(web::get().to(get_bill))
            .route(web::put().to(update_bill))
            .route(web::delete().to(delete_bill)),
    );
}
