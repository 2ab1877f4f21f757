mod common;

use actix_web::{http::StatusCode, test, App};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use std::sync::atomic::Ordering;

use common::{TestContext, PASSWORD};
use exam_remuneration_server::auth::jwt::validate_token;
use exam_remuneration_server::configure_routes;
use exam_remuneration_server::db::OtpRepository;
use exam_remuneration_server::otp::OtpRecord;

fn signup_body() -> Value {
    json!({
        "name": "Meera Joshi",
        "email": "  Meera.Joshi@College.in ",
        "mobileNumber": "9123456780",
        "password": "secret123"
    })
}

#[actix_web::test]
async fn test_signup_defaults_to_admin() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure_routes)).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(signup_body())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["tokenType"], "Bearer");
    assert_eq!(body["expiresIn"], 259200);
    assert_eq!(body["user"]["email"], "meera.joshi@college.in");
    assert_eq!(body["user"]["role"], "admin");
    assert!(body["user"].get("passwordHash").is_none());

    let claims = validate_token(
        body["token"].as_str().expect("token"),
        &ctx.state.config.jwt_secret,
    )
    .expect("valid token");
    assert_eq!(claims.email, "meera.joshi@college.in");
    assert!(claims.is_admin());
}

#[actix_web::test]
async fn test_signup_as_teacher() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure_routes)).await;

    let mut body = signup_body();
    body["role"] = json!("teacher");
    let req = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(&body)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["user"]["role"], "teacher");
}

#[actix_web::test]
async fn test_signup_duplicate_is_conflict() {
    let ctx = TestContext::new();
    ctx.seed_user(
        exam_remuneration_server::auth::Role::Teacher,
        "Someone",
        "other@college.in",
        "9123456780",
    )
    .await;
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure_routes)).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(signup_body())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Email or Mobile Number already in use");
}

#[actix_web::test]
async fn test_signup_validation() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure_routes)).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(json!({
            "name": "",
            "email": "nope",
            "mobileNumber": "12",
            "password": "abc"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["details"].as_array().expect("details").len(), 4);
}

#[actix_web::test]
async fn test_login_with_email_and_password() {
    let ctx = TestContext::new();
    let teacher = ctx.teacher().await;
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure_routes)).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/login/email-password")
        .set_json(json!({ "email": "ASHA@college.in", "password": PASSWORD }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["user"]["id"], json!(teacher.id));

    let req = test::TestRequest::post()
        .uri("/api/auth/login/email-password")
        .set_json(json!({ "email": "asha@college.in", "password": "wrong-password" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/auth/login/email-password")
        .set_json(json!({ "email": "nobody@college.in", "password": PASSWORD }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri("/api/auth/login/email-password")
        .set_json(json!({ "email": "", "password": "" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_login_with_mobile_number() {
    let ctx = TestContext::new();
    ctx.teacher().await;
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure_routes)).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/login/number-password")
        .set_json(json!({ "mobileNumber": "9000000002", "password": PASSWORD }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/api/auth/login/number-password")
        .set_json(json!({ "mobileNumber": "9999999999", "password": PASSWORD }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_otp_login_flow() {
    let ctx = TestContext::new();
    ctx.teacher().await;
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure_routes)).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/login/send-otp")
        .set_json(json!({ "email": "asha@college.in" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let sent = ctx.mailer.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "asha@college.in");
    assert_eq!(sent[0].subject, "Your OTP Code");
    let code = ctx.mailer.last_code().await.expect("code in mail");

    let req = test::TestRequest::post()
        .uri("/api/auth/login/email-otp")
        .set_json(json!({ "email": "asha@college.in", "otp": "000000" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/auth/login/email-otp")
        .set_json(json!({ "email": "asha@college.in", "otp": code }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // Consumed on success
    let req = test::TestRequest::post()
        .uri("/api/auth/login/email-otp")
        .set_json(json!({ "email": "asha@college.in", "otp": code }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_expired_otp_is_rejected_and_removed() {
    let ctx = TestContext::new();
    ctx.teacher().await;
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure_routes)).await;

    let record = OtpRecord::new("asha@college.in", Utc::now() - Duration::minutes(10));
    ctx.store.upsert_otp(&record).await.expect("seed otp");

    let req = test::TestRequest::post()
        .uri("/api/auth/login/email-otp")
        .set_json(json!({ "email": "asha@college.in", "otp": record.code }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "OTP expired. Request new OTP.");

    assert!(ctx
        .store
        .find_otp("asha@college.in")
        .await
        .expect("lookup")
        .is_none());
}

#[actix_web::test]
async fn test_undeliverable_otp_is_discarded() {
    let ctx = TestContext::new();
    ctx.teacher().await;
    ctx.mailer.fail.store(true, Ordering::SeqCst);
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure_routes)).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/login/send-otp")
        .set_json(json!({ "email": "asha@college.in" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    assert!(ctx
        .store
        .find_otp("asha@college.in")
        .await
        .expect("lookup")
        .is_none());
}

#[actix_web::test]
async fn test_send_otp_to_unknown_email() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure_routes)).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/login/send-otp")
        .set_json(json!({ "email": "ghost@college.in" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    assert!(ctx.mailer.sent().await.is_empty());
}
