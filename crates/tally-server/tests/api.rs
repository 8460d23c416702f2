//! End-to-end tests driving the API router against an in-memory database.

use std::sync::Arc;

use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use tally_router::{Request, Response, Router};
use tally_server::{build_router, AppState};

async fn app() -> Router {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await
        .unwrap();
    tally_store::create_tables(&pool).await.unwrap();
    let state: Arc<AppState> = AppState::new(pool, 14);
    build_router(&state).unwrap()
}

fn session_from(res: &Response) -> String {
    let cookie = res.get_header("Set-Cookie").expect("session cookie");
    let pair = cookie.split(';').next().unwrap();
    pair.trim_start_matches("tally_session=").to_string()
}

async fn register(app: &Router, email: &str) -> String {
    let res = app
        .handle(Request::post("/api/auth/register").json_body(&json!({
            "name": "Owner",
            "email": email,
            "password": "correct horse",
        })))
        .await;
    assert_eq!(res.status, 201, "{:?}", res.body_string());
    session_from(&res)
}

async fn call(app: &Router, key: &str, req: Request) -> (u16, Value) {
    let res = app
        .handle(req.header("Authorization", format!("Bearer {key}")))
        .await;
    let body = res.body_json().unwrap_or(Value::Null);
    (res.status, body)
}

/// Registers a user with a business and one client; returns the session
/// key and the client id.
async fn onboarded(app: &Router, email: &str) -> (String, i64) {
    let key = register(app, email).await;
    let (status, _) = call(
        app,
        &key,
        Request::put("/api/business").json_body(&json!({
            "name": "Studio North",
            "email": email,
            "address": "1 Main St",
            "default_currency": "USD",
        })),
    )
    .await;
    assert_eq!(status, 200);

    let (status, body) = call(
        app,
        &key,
        Request::post("/api/clients").json_body(&json!({
            "business_name": "Acme Corp",
            "contact_name": "Jo Bloggs",
            "email": "ap@acme.test",
        })),
    )
    .await;
    assert_eq!(status, 201);
    (key, body["data"]["id"].as_i64().unwrap())
}

fn invoice_body(client_id: i64, number: &str) -> Value {
    json!({
        "client_id": client_id,
        "invoice_number": number,
        "issue_date": "2024-03-01",
        "due_date": "2024-03-15",
        "currency": "USD",
        "line_items": [
            { "description": "Design", "quantity": "10", "unit_price": "50" }
        ],
        "discount": { "kind": "percentage", "value": "10" },
        "tax": { "kind": "percentage", "value": "5" },
        "tax_base": "after_discount",
        "template": "modern",
    })
}

#[tokio::test]
async fn test_auth_flow() {
    let app = app().await;
    let key = register(&app, "Owner@Example.com").await;

    let res = app
        .handle(Request::get("/api/auth/me").header("Cookie", format!("tally_session={key}")))
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body_json().unwrap()["data"]["email"], "owner@example.com");

    let (status, body) = call(&app, &key, Request::post("/api/auth/logout")).await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);

    let (status, _) = call(&app, &key, Request::get("/api/auth/me")).await;
    assert_eq!(status, 401);

    let res = app
        .handle(Request::post("/api/auth/login").json_body(&json!({
            "email": "owner@example.com",
            "password": "wrong password",
        })))
        .await;
    assert_eq!(res.status, 401);

    let res = app
        .handle(Request::post("/api/auth/login").json_body(&json!({
            "email": "owner@example.com",
            "password": "correct horse",
        })))
        .await;
    assert_eq!(res.status, 200);
    assert!(!session_from(&res).is_empty());
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = app().await;
    register(&app, "owner@example.com").await;
    let res = app
        .handle(Request::post("/api/auth/register").json_body(&json!({
            "name": "Someone",
            "email": "owner@example.com",
            "password": "another secret",
        })))
        .await;
    assert_eq!(res.status, 409);
}

#[tokio::test]
async fn test_private_routes_need_a_session() {
    let app = app().await;
    let res = app.handle(Request::get("/api/clients")).await;
    assert_eq!(res.status, 401);
    assert_eq!(res.body_json().unwrap()["success"], false);

    let (status, _) = call(&app, "not-a-session", Request::get("/api/dashboard")).await;
    assert_eq!(status, 401);
}

#[tokio::test]
async fn test_validation_errors_are_reported() {
    let app = app().await;
    let key = register(&app, "owner@example.com").await;
    let (status, body) = call(
        &app,
        &key,
        Request::post("/api/clients").json_body(&json!({
            "business_name": "",
            "email": "not-an-email",
        })),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("; "));
}

#[tokio::test]
async fn test_invoice_lifecycle() {
    let app = app().await;
    let (key, client_id) = onboarded(&app, "owner@example.com").await;

    let (_, body) = call(&app, &key, Request::get("/api/invoices/next-number")).await;
    assert_eq!(body["data"]["invoice_number"], "INV-0001");

    let (status, body) = call(
        &app,
        &key,
        Request::post("/api/invoices").json_body(&invoice_body(client_id, "INV-0001")),
    )
    .await;
    assert_eq!(status, 201, "{body}");
    let id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["status"], "draft");

    let (status, _) = call(
        &app,
        &key,
        Request::post("/api/invoices").json_body(&invoice_body(client_id, "INV-0001")),
    )
    .await;
    assert_eq!(status, 409);

    let (_, body) = call(&app, &key, Request::get(&format!("/api/invoices/{id}/document"))).await;
    assert_eq!(body["data"]["amount_due"], "$472.50");
    assert_eq!(body["data"]["bill_to"]["name"], "Acme Corp");

    let (status, body) = call(
        &app,
        &key,
        Request::post(&format!("/api/invoices/{id}/status")).json_body(&json!({"status": "sent"})),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["status"], "sent");

    let (_, body) = call(&app, &key, Request::post("/api/invoices/mark-overdue")).await;
    assert_eq!(body["data"]["updated"], 1);

    let (_, body) = call(&app, &key, Request::get("/api/invoices?status=overdue")).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    let (_, body) = call(&app, &key, Request::get("/api/invoices?status=draft")).await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let (status, _) = call(
        &app,
        &key,
        Request::post(&format!("/api/invoices/{id}/status")).json_body(&json!({"status": "paid"})),
    )
    .await;
    assert_eq!(status, 200);

    let (status, _) = call(
        &app,
        &key,
        Request::put(&format!("/api/invoices/{id}")).json_body(&invoice_body(client_id, "INV-0001")),
    )
    .await;
    assert_eq!(status, 409);
    let (status, _) = call(&app, &key, Request::delete(&format!("/api/invoices/{id}"))).await;
    assert_eq!(status, 409);

    let (status, body) = call(&app, &key, Request::post(&format!("/api/invoices/{id}/duplicate"))).await;
    assert_eq!(status, 201);
    assert_eq!(body["data"]["invoice_number"], "INV-0002");
    assert_eq!(body["data"]["status"], "draft");

    let (status, body) = call(&app, &key, Request::get("/api/dashboard")).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["draft_count"], 1);
    assert_eq!(body["data"]["client_count"], 1);
}

#[tokio::test]
async fn test_oversized_amounts_are_rejected() {
    let app = app().await;
    let (key, client_id) = onboarded(&app, "owner@example.com").await;
    let mut body = invoice_body(client_id, "INV-0001");
    body["line_items"][0]["quantity"] = json!("79228162514264337593543950335");
    body["line_items"][0]["unit_price"] = json!("2");

    let (status, response) = call(&app, &key, Request::post("/api/invoices").json_body(&body)).await;
    assert_eq!(status, 400);
    assert_eq!(response["success"], false);
    assert!(response["message"].as_str().unwrap().contains("Line 1 quantity"));

    let (_, list) = call(&app, &key, Request::get("/api/invoices")).await;
    assert!(list["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_client_with_invoices_cannot_be_deleted() {
    let app = app().await;
    let (key, client_id) = onboarded(&app, "owner@example.com").await;
    call(
        &app,
        &key,
        Request::post("/api/invoices").json_body(&invoice_body(client_id, "INV-0001")),
    )
    .await;

    let (status, body) = call(&app, &key, Request::delete(&format!("/api/clients/{client_id}"))).await;
    assert_eq!(status, 409);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_records_of_other_users_are_not_found() {
    let app = app().await;
    let (owner, client_id) = onboarded(&app, "owner@example.com").await;
    let (status, body) = call(
        &app,
        &owner,
        Request::post("/api/invoices").json_body(&invoice_body(client_id, "INV-0001")),
    )
    .await;
    assert_eq!(status, 201);
    let invoice_id = body["data"]["id"].as_i64().unwrap();

    let (other, _) = onboarded(&app, "other@example.com").await;
    for path in [
        format!("/api/clients/{client_id}"),
        format!("/api/invoices/{invoice_id}"),
        format!("/api/invoices/{invoice_id}/pdf"),
    ] {
        let (status, _) = call(&app, &other, Request::get(&path)).await;
        assert_eq!(status, 404, "{path}");
    }
    let (status, _) = call(&app, &other, Request::get("/api/invoices/not-a-number")).await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_payment_account_defaults() {
    let app = app().await;
    let key = register(&app, "owner@example.com").await;

    let mut ids = Vec::new();
    for label in ["Main", "Savings"] {
        let (status, body) = call(
            &app,
            &key,
            Request::post("/api/accounts").json_body(&json!({
                "gateway": "sepa",
                "label": label,
                "data": { "account_holder": "Studio North", "iban": "DE89 3704 0044 0532 0130 00" },
                "is_default": true,
            })),
        )
        .await;
        assert_eq!(status, 201, "{body}");
        ids.push(body["data"]["id"].as_i64().unwrap());
    }

    let (_, body) = call(&app, &key, Request::get("/api/accounts")).await;
    let defaults: Vec<_> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|a| a["is_default"] == true)
        .map(|a| a["id"].as_i64().unwrap())
        .collect();
    assert_eq!(defaults, vec![ids[1]]);

    let (status, body) = call(&app, &key, Request::post(&format!("/api/accounts/{}/default", ids[0]))).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["is_default"], true);

    let (status, _) = call(
        &app,
        &key,
        Request::post("/api/accounts").json_body(&json!({
            "gateway": "sepa",
            "label": "Broken",
            "data": { "account_holder": "Studio North", "iban": "DE00 1234" },
        })),
    )
    .await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn test_pdf_and_preview() {
    let app = app().await;
    let (key, client_id) = onboarded(&app, "owner@example.com").await;
    let (_, body) = call(
        &app,
        &key,
        Request::post("/api/invoices").json_body(&invoice_body(client_id, "INV-0001")),
    )
    .await;
    let id = body["data"]["id"].as_i64().unwrap();
    let auth = format!("Bearer {key}");

    let res = app
        .handle(Request::get(&format!("/api/invoices/{id}/pdf")).header("Authorization", auth.clone()))
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.get_header("Content-Type"), Some("application/pdf"));
    assert!(res.body.starts_with(b"%PDF"));

    let res = app
        .handle(Request::get(&format!("/api/invoices/{id}/preview")).header("Authorization", auth))
        .await;
    assert_eq!(res.status, 200);
    let html = res.body_string().unwrap();
    assert!(html.contains("INV-0001"));
    assert!(html.contains("Acme Corp"));
}

#[tokio::test]
async fn test_unknown_routes() {
    let app = app().await;
    let key = register(&app, "owner@example.com").await;
    let (status, _) = call(&app, &key, Request::get("/api/nothing")).await;
    assert_eq!(status, 404);
    let (status, _) = call(&app, &key, Request::delete("/api/dashboard")).await;
    assert_eq!(status, 405);
}
