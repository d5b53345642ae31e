use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::Engine as _;
use base64::prelude::*;
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::{Engine, MemberRole, RegisterMemberCmd};
use migration::MigratorTrait;

const ADMIN_EMAIL: &str = "admin@example.com";
const ADMIN_PASSWORD: &str = "secret";

async fn test_router() -> (Router, tokio::sync::mpsc::UnboundedReceiver<notifier::Event>) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Arc::new(Engine::builder().database(db.clone()).build().await.unwrap());

    engine
        .register_member(
            RegisterMemberCmd::new("Admin", ADMIN_EMAIL, "9999999999", ADMIN_PASSWORD)
                .role(MemberRole::Admin),
        )
        .await
        .unwrap();

    let (events_tx, events_rx) = notifier::channel();
    (server::build_router(engine, db, events_tx), events_rx)
}

fn basic_auth(email: &str, password: &str) -> String {
    format!(
        "Basic {}",
        BASE64_STANDARD.encode(format!("{email}:{password}"))
    )
}

async fn send_json(
    router: &Router,
    method: &str,
    uri: &str,
    auth: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn register_body(name: &str, email: &str, mobile: &str) -> Value {
    json!({
        "name": name,
        "email": email,
        "mobile": mobile,
        "password": "password",
        "address": null,
        "plan_amount_minor": null,
        "plan_duration_years": null,
    })
}

#[tokio::test]
async fn missing_credentials_are_rejected() {
    let (router, _events) = test_router().await;

    // No Authorization header at all fails typed-header extraction.
    let (status, _) = send_json(&router, "GET", "/stats", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let auth = basic_auth(ADMIN_EMAIL, "wrong-password");
    let (status, _) = send_json(&router, "GET", "/stats", Some(&auth), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_is_public_and_validates() {
    let (router, _events) = test_router().await;

    let (status, body) = send_json(
        &router,
        "POST",
        "/auth/register",
        None,
        Some(register_body("Asha", "asha@example.com", "9876543210")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["role"], "member");
    assert_eq!(body["collection"]["status"], "due");
    assert!(
        body["registration_number"]
            .as_str()
            .unwrap()
            .starts_with("SOC-")
    );

    // Duplicate email conflicts with a field-specific message.
    let (status, body) = send_json(
        &router,
        "POST",
        "/auth/register",
        None,
        Some(register_body("Other", "asha@example.com", "9876543211")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("email"));

    let (status, body) = send_json(
        &router,
        "POST",
        "/auth/register",
        None,
        Some(register_body("Other", "other@example.com", "12345")),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("mobile"));
}

#[tokio::test]
async fn member_role_cannot_reach_admin_routes() {
    let (router, _events) = test_router().await;

    let (status, _) = send_json(
        &router,
        "POST",
        "/auth/register",
        None,
        Some(register_body("Asha", "asha@example.com", "9876543210")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let member_auth = basic_auth("asha@example.com", "password");
    for (method, uri) in [
        ("GET", "/stats"),
        ("GET", "/members"),
        ("GET", "/transactions"),
    ] {
        let (status, _) = send_json(&router, method, uri, Some(&member_auth), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{method} {uri}");
    }
}

#[tokio::test]
async fn contribution_defaults_and_updates_member() {
    let (router, mut events) = test_router().await;
    let admin_auth = basic_auth(ADMIN_EMAIL, ADMIN_PASSWORD);

    let (_, member) = send_json(
        &router,
        "POST",
        "/auth/register",
        None,
        Some(register_body("Asha", "asha@example.com", "9876543210")),
    )
    .await;
    let member_id = member["id"].as_str().unwrap().to_string();

    let (status, tx) = send_json(
        &router,
        "POST",
        "/transactions",
        Some(&admin_auth),
        Some(json!({
            "member_id": member_id,
            "kind": "contribution",
            "amount_minor": null,
            "description": "June collection",
            "interest_rate_percent": null,
            "duration_months": null,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(tx["kind"], "contribution");
    assert_eq!(tx["amount_minor"], 100_000);

    let (status, fetched) = send_json(
        &router,
        "GET",
        &format!("/members/{member_id}"),
        Some(&admin_auth),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["collection"]["status"], "paid");
    assert_eq!(fetched["collection"]["amount_paid_minor"], 100_000);

    // Registration and the accepted write each produced an event.
    let first = events.recv().await.unwrap();
    assert!(matches!(first, notifier::Event::Welcome { .. }));
    let second = events.recv().await.unwrap();
    assert!(matches!(
        second,
        notifier::Event::TransactionRecorded { .. }
    ));
}

#[tokio::test]
async fn loan_issue_conflicts_over_http() {
    let (router, _events) = test_router().await;
    let admin_auth = basic_auth(ADMIN_EMAIL, ADMIN_PASSWORD);

    let (_, member) = send_json(
        &router,
        "POST",
        "/auth/register",
        None,
        Some(register_body("Asha", "asha@example.com", "9876543210")),
    )
    .await;
    let member_id = member["id"].as_str().unwrap().to_string();

    let loan = json!({
        "member_id": member_id,
        "kind": "loan_issued",
        "amount_minor": 500_000,
        "description": null,
        "interest_rate_percent": 2.0,
        "duration_months": 12,
    });

    let (status, tx) = send_json(
        &router,
        "POST",
        "/transactions",
        Some(&admin_auth),
        Some(loan.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(tx["interest_rate_percent"], 2.0);

    let (status, body) = send_json(
        &router,
        "POST",
        "/transactions",
        Some(&admin_auth),
        Some(loan),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("active loan"));

    // Non-contribution kinds require an explicit amount.
    let (status, body) = send_json(
        &router,
        "POST",
        "/transactions",
        Some(&admin_auth),
        Some(json!({
            "member_id": member_id,
            "kind": "loan_payment",
            "amount_minor": null,
            "description": null,
            "interest_rate_percent": null,
            "duration_months": null,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("amount_minor"));
}

#[tokio::test]
async fn bonus_and_stats_roundtrip() {
    let (router, _events) = test_router().await;
    let admin_auth = basic_auth(ADMIN_EMAIL, ADMIN_PASSWORD);

    for (name, email, mobile) in [
        ("Asha", "asha@example.com", "9876543210"),
        ("Binod", "binod@example.com", "9876543211"),
    ] {
        let (status, _) = send_json(
            &router,
            "POST",
            "/auth/register",
            None,
            Some(register_body(name, email, mobile)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, result) = send_json(
        &router,
        "POST",
        "/bonus",
        Some(&admin_auth),
        Some(json!({ "amount_minor": 500_00, "description": "Diwali Bonus" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(result["distributed_count"], 2);
    assert_eq!(result["total_amount_minor"], 1_000_00);

    let (status, stats) = send_json(&router, "GET", "/stats", Some(&admin_auth), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_members"], 2);
    // Bonuses are log entries only: nothing collected, nothing pending paid.
    assert_eq!(stats["total_collection_minor"], 0);
    assert_eq!(stats["active_loans"], 0);
}

#[tokio::test]
async fn members_can_only_see_their_own_records() {
    let (router, _events) = test_router().await;

    let (_, asha) = send_json(
        &router,
        "POST",
        "/auth/register",
        None,
        Some(register_body("Asha", "asha@example.com", "9876543210")),
    )
    .await;
    let (_, binod) = send_json(
        &router,
        "POST",
        "/auth/register",
        None,
        Some(register_body("Binod", "binod@example.com", "9876543211")),
    )
    .await;

    let asha_id = asha["id"].as_str().unwrap();
    let binod_id = binod["id"].as_str().unwrap();
    let asha_auth = basic_auth("asha@example.com", "password");

    let (status, _) = send_json(
        &router,
        "GET",
        &format!("/members/{asha_id}/transactions"),
        Some(&asha_auth),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send_json(
        &router,
        "GET",
        &format!("/members/{binod_id}/transactions"),
        Some(&asha_auth),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn delete_member_cascades_over_http() {
    let (router, _events) = test_router().await;
    let admin_auth = basic_auth(ADMIN_EMAIL, ADMIN_PASSWORD);

    let (_, member) = send_json(
        &router,
        "POST",
        "/auth/register",
        None,
        Some(register_body("Asha", "asha@example.com", "9876543210")),
    )
    .await;
    let member_id = member["id"].as_str().unwrap().to_string();

    let (status, _) = send_json(
        &router,
        "POST",
        "/transactions",
        Some(&admin_auth),
        Some(json!({
            "member_id": member_id,
            "kind": "contribution",
            "amount_minor": 1_000,
            "description": null,
            "interest_rate_percent": null,
            "duration_months": null,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send_json(
        &router,
        "DELETE",
        &format!("/members/{member_id}"),
        Some(&admin_auth),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send_json(
        &router,
        "GET",
        &format!("/members/{member_id}"),
        Some(&admin_auth),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send_json(&router, "GET", "/transactions", Some(&admin_auth), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["transactions"].as_array().unwrap().len(), 0);
}
