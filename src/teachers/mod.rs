//! Admin-only views of teacher accounts and their bills.

use actix_web::{web, HttpRequest, HttpResponse};
use uuid::Uuid;

use crate::auth::middleware::require_admin;
use crate::auth::model::{Role, User, UserInfo};
use crate::bill::{TeacherBillsResponse, TeacherInfo};
use crate::error::ApiError;
use crate::AppState;

async fn find_teacher(state: &AppState, id: Uuid) -> Result<User, ApiError> {
    state
        .users
        .find_user_by_id(id)
        .await?
        .filter(|user| user.role == Role::Teacher)
        .ok_or_else(|| ApiError::not_found("Teacher not found"))
}

#[utoipa::path(
    get,
    path = "/api/teachers",
    tag = "Teachers",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All teachers, newest first", body = Vec<UserInfo>),
        (status = 403, description = "Admin only", body = crate::ErrorResponse)
    )
)]
pub async fn list_teachers(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    require_admin(&req)?;
    let teachers: Vec<UserInfo> = state
        .users
        .list_users_by_role(Role::Teacher)
        .await?
        .into_iter()
        .map(UserInfo::from)
        .collect();
    log::info!("Listing {} teachers", teachers.len());
    Ok(HttpResponse::Ok().json(teachers))
}

#[utoipa::path(
    get,
    path = "/api/teachers/{id}",
    tag = "Teachers",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Teacher ID")),
    responses(
        (status = 200, description = "Teacher found", body = UserInfo),
        (status = 403, description = "Admin only", body = crate::ErrorResponse),
        (status = 404, description = "Teacher not found", body = crate::ErrorResponse)
    )
)]
pub async fn get_teacher(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    require_admin(&req)?;
    let teacher = find_teacher(&state, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(UserInfo::from(teacher)))
}

#[utoipa::path(
    get,
    path = "/api/teachers/{id}/bills",
    tag = "Teachers",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Teacher ID")),
    responses(
        (status = 200, description = "Teacher's bills, newest first", body = TeacherBillsResponse),
        (status = 403, description = "Admin only", body = crate::ErrorResponse),
        (status = 404, description = "Teacher not found", body = crate::ErrorResponse)
    )
)]
pub async fn get_teacher_bills(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    require_admin(&req)?;
    let teacher = find_teacher(&state, path.into_inner()).await?;
    let bills = state.bills.list_bills(Some(teacher.id)).await?;

    Ok(HttpResponse::Ok().json(TeacherBillsResponse {
        data: bills,
        teacher_info: TeacherInfo {
            name: teacher.name,
            email: teacher.email,
        },
    }))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/teachers")
            .route("", web::get().to(list_teachers))
            .route("/{id}", web::get().to(get_teacher))
            .route("/{id}/bills", web::get().to(get_teacher_bills)),
    );
}
