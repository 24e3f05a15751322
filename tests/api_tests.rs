//! Integration tests driving the full router over an in-memory database

use std::str::FromStr;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tower::ServiceExt;

use factory_api::config::AppConfig;
use factory_api::middleware::rate_limit::RateLimitConfig;
use factory_api::models::Role;
use factory_api::services::AuthService;
use factory_api::{AppState, DbPool};

const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";

async fn test_pool() -> DbPool {
    // Single connection keeps the one in-memory database alive
    let options = SqliteConnectOptions::from_str("sqlite::memory:").unwrap();
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    pool
}

fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = TEST_SECRET.to_string();
    config.rate_limit.trust_loopback = false;
    // Generous quotas so only the dedicated throttling tests hit limits
    config.rate_limit.read = RateLimitConfig {
        limit: 1000,
        window_secs: 60,
    };
    config.rate_limit.write = RateLimitConfig {
        limit: 1000,
        window_secs: 60,
    };
    config.rate_limit.auth = RateLimitConfig {
        limit: 1000,
        window_secs: 60,
    };
    config
}

async fn test_app_with(config: AppConfig) -> (Router, AppState) {
    let pool = test_pool().await;
    let state = AppState::new(config, pool);
    (factory_api::router(state.clone()), state)
}

async fn test_app() -> (Router, AppState) {
    test_app_with(test_config()).await
}

async fn seed_user(state: &AppState, username: &str, role: Role) -> (i64, String) {
    let hash = AuthService::hash_password("password123").unwrap();
    let id = sqlx::query("INSERT INTO users (username, password_hash, role) VALUES (?, ?, ?)")
        .bind(username)
        .bind(hash)
        .bind(role)
        .execute(&state.db)
        .await
        .unwrap()
        .last_insert_rowid();
    let token = state.tokens.issue(id, role).unwrap();
    (id, token)
}

fn get_request(path: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn json_request(method: &str, path: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let (app, _) = test_app().await;
    let response = app.oneshot(get_request("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "status": "healthy" }));
}

#[tokio::test]
async fn protected_route_requires_token() {
    let (app, _) = test_app().await;
    let response = app
        .oneshot(get_request("/employees", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("missing"));
}

#[tokio::test]
async fn malformed_token_rejected() {
    let (app, _) = test_app().await;
    let response = app
        .oneshot(get_request("/employees", Some("not.a.token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid token. Please log in again.");
}

#[tokio::test]
async fn expired_token_rejected() {
    let (app, state) = test_app().await;
    let (id, _) = seed_user(&state, "admin1", Role::Admin).await;
    let token = state.tokens.issue_with_expiry(id, Role::Admin, 0).unwrap();

    let response = app
        .oneshot(get_request("/employees", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Token expired. Please log in again.");
}

#[tokio::test]
async fn insufficient_role_gets_403() {
    let (app, state) = test_app().await;
    let (_, token) = seed_user(&state, "plain", Role::User).await;

    let response = app
        .oneshot(get_request("/employees", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Insufficient permissions.");
}

#[tokio::test]
async fn super_admin_passes_admin_routes() {
    let (app, state) = test_app().await;
    let (_, token) = seed_user(&state, "root", Role::SuperAdmin).await;

    let response = app
        .oneshot(get_request("/employees", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn admin_does_not_satisfy_user_requirement() {
    // Role checks are equality-or-super_admin, not ordered
    let (app, state) = test_app().await;
    let (_, admin) = seed_user(&state, "admin2", Role::Admin).await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/orders",
            Some(&admin),
            json!({ "customer_id": 1, "product_id": 1, "quantity": 1 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn login_issues_usable_token() {
    let (app, state) = test_app().await;
    seed_user(&state, "operator", Role::Admin).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/login",
            None,
            json!({ "username": "operator", "password": "password123" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let token = body["token"].as_str().unwrap().to_string();

    let response = app
        .oneshot(get_request("/employees", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_with_wrong_password_is_401() {
    let (app, state) = test_app().await;
    seed_user(&state, "operator", Role::Admin).await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/auth/login",
            None,
            json!({ "username": "operator", "password": "wrong" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid credentials.");
}

#[tokio::test]
async fn register_requires_super_admin_and_rejects_duplicates() {
    let (app, state) = test_app().await;
    let (_, admin) = seed_user(&state, "admin3", Role::Admin).await;
    let (_, root) = seed_user(&state, "root2", Role::SuperAdmin).await;

    let payload = json!({ "username": "newuser", "password": "password123" });

    let response = app
        .clone()
        .oneshot(json_request("POST", "/auth/register", Some(&admin), payload.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(json_request("POST", "/auth/register", Some(&root), payload.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(json_request("POST", "/auth/register", Some(&root), payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn employee_crud_round_trip() {
    let (app, state) = test_app().await;
    let (_, token) = seed_user(&state, "hr", Role::Admin).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/employees",
            Some(&token),
            json!({
                "name": "Ada Lovelace",
                "position": "Engineer",
                "email": "ada@example.com",
                "phone": "555-0100"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let id = created["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(get_request(&format!("/employees/{id}"), Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/employees/{id}"),
            Some(&token),
            json!({
                "name": "Ada Lovelace",
                "position": "Lead Engineer",
                "email": "ada@example.com",
                "phone": "555-0100"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["position"], "Lead Engineer");

    let response = app
        .clone()
        .oneshot(json_request(
            "DELETE",
            &format!("/employees/{id}"),
            Some(&token),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get_request(&format!("/employees/{id}"), Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_employee_payload_is_400() {
    let (app, state) = test_app().await;
    let (_, token) = seed_user(&state, "hr", Role::Admin).await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/employees",
            Some(&token),
            json!({
                "name": "No Email",
                "position": "Engineer",
                "email": "not-an-email",
                "phone": "555-0100"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

async fn seed_products(state: &AppState, count: usize) {
    for i in 0..count {
        sqlx::query("INSERT INTO products (name, price) VALUES (?, ?)")
            .bind(format!("widget-{i:03}"))
            .bind(1.0 + i as f64)
            .execute(&state.db)
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn pagination_totals_and_boundaries() {
    let (app, state) = test_app().await;
    let (_, token) = seed_user(&state, "stock", Role::Admin).await;
    seed_products(&state, 23).await;

    let response = app
        .clone()
        .oneshot(get_request("/products?page=3&per_page=10", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total"], 23);
    assert_eq!(body["pages"], 3);
    assert_eq!(body["page"], 3);
    assert_eq!(body["products"].as_array().unwrap().len(), 3);

    // Out of range pages keep the true totals with empty items
    let response = app
        .clone()
        .oneshot(get_request("/products?page=4&per_page=10", Some(&token)))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["total"], 23);
    assert_eq!(body["products"].as_array().unwrap().len(), 0);

    // include_meta=false strips the envelope down to the items
    let response = app
        .oneshot(get_request(
            "/products?page=1&per_page=5&include_meta=false",
            Some(&token),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert!(body.get("total").is_none());
    assert_eq!(body["products"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn pagination_ordering_is_stable() {
    let (app, state) = test_app().await;
    let (_, token) = seed_user(&state, "stock", Role::Admin).await;
    // Identical names force the id tiebreaker to decide the order
    for _ in 0..15 {
        sqlx::query("INSERT INTO products (name, price) VALUES ('same', 1.0)")
            .execute(&state.db)
            .await
            .unwrap();
    }

    let mut seen = Vec::new();
    for page in 1..=3 {
        let response = app
            .clone()
            .oneshot(get_request(
                &format!("/products?page={page}&per_page=5&sort_by=name"),
                Some(&token),
            ))
            .await
            .unwrap();
        let body = body_json(response).await;
        for item in body["products"].as_array().unwrap() {
            seen.push(item["id"].as_i64().unwrap());
        }
    }
    let mut sorted = seen.clone();
    sorted.sort_unstable();
    assert_eq!(seen, sorted);
    assert_eq!(seen.len(), 15);
}

#[tokio::test]
async fn invalid_pagination_parameters_rejected() {
    let (app, state) = test_app().await;
    let (_, token) = seed_user(&state, "stock", Role::Admin).await;

    for path in [
        "/products?page=0",
        "/products?per_page=0",
        "/products?per_page=101",
        "/products?sort_by=price;DROP",
    ] {
        let response = app
            .clone()
            .oneshot(get_request(path, Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{path}");
    }
}

#[tokio::test]
async fn cached_list_serves_stale_data_until_ttl() {
    let (app, state) = test_app().await;
    let (_, token) = seed_user(&state, "stock", Role::Admin).await;
    seed_products(&state, 2).await;

    let response = app
        .clone()
        .oneshot(get_request("/products?page=1&per_page=10", Some(&token)))
        .await
        .unwrap();
    let first = body_json(response).await;
    assert_eq!(first["total"], 2);

    seed_products(&state, 1).await;

    // Equivalent query with reordered parameters hits the same entry
    let response = app
        .oneshot(get_request("/products?per_page=10&page=1", Some(&token)))
        .await
        .unwrap();
    let second = body_json(response).await;
    assert_eq!(second, first);
}

#[tokio::test]
async fn customer_detail_is_cached() {
    let (app, state) = test_app().await;
    let (_, token) = seed_user(&state, "sales", Role::Admin).await;

    sqlx::query("INSERT INTO customers (name, email, phone) VALUES ('acme', 'acme@x.com', '1')")
        .execute(&state.db)
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(get_request("/customers/1", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let first = body_json(response).await;
    assert_eq!(first["name"], "acme");

    sqlx::query("UPDATE customers SET name = 'globex' WHERE id = 1")
        .execute(&state.db)
        .await
        .unwrap();

    // Rename stays invisible until the TTL lapses
    let response = app
        .oneshot(get_request("/customers/1", Some(&token)))
        .await
        .unwrap();
    let second = body_json(response).await;
    assert_eq!(second["name"], "acme");
}

#[tokio::test]
async fn employee_list_is_never_cached() {
    let (app, state) = test_app().await;
    let (_, token) = seed_user(&state, "hr", Role::Admin).await;

    let response = app
        .clone()
        .oneshot(get_request("/employees", Some(&token)))
        .await
        .unwrap();
    let before = body_json(response).await;
    assert_eq!(before["total"], 0);

    sqlx::query(
        "INSERT INTO employees (name, position, email, phone) VALUES ('a', 'b', 'a@x.com', '1')",
    )
    .execute(&state.db)
    .await
    .unwrap();

    let response = app
        .oneshot(get_request("/employees", Some(&token)))
        .await
        .unwrap();
    let after = body_json(response).await;
    assert_eq!(after["total"], 1);
}

#[tokio::test]
async fn auth_endpoint_throttled_after_limit() {
    let mut config = test_config();
    config.rate_limit.auth = RateLimitConfig {
        limit: 2,
        window_secs: 60,
    };
    let (app, _) = test_app_with(config).await;

    let login = || {
        json_request(
            "POST",
            "/auth/login",
            None,
            json!({ "username": "ghost", "password": "whatever1" }),
        )
    };

    for _ in 0..2 {
        let response = app.clone().oneshot(login()).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let response = app.clone().oneshot(login()).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Rate limit exceeded");

    // Rejected attempts keep counting
    let response = app.oneshot(login()).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn order_creation_computes_total_server_side() {
    let (app, state) = test_app().await;
    let (_, user) = seed_user(&state, "buyer", Role::User).await;

    sqlx::query("INSERT INTO products (name, price) VALUES ('gear', 2.5)")
        .execute(&state.db)
        .await
        .unwrap();
    sqlx::query("INSERT INTO customers (name, email, phone) VALUES ('acme', 'acme@x.com', '1')")
        .execute(&state.db)
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/orders",
            Some(&user),
            json!({ "customer_id": 1, "product_id": 1, "quantity": 4 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let order = body_json(response).await;
    assert_eq!(order["total_price"], 10.0);

    let response = app
        .oneshot(json_request(
            "POST",
            "/orders",
            Some(&user),
            json!({ "customer_id": 1, "product_id": 999, "quantity": 1 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid product_id.");
}

#[tokio::test]
async fn analytics_validation_and_envelope() {
    let (app, state) = test_app().await;
    let (_, token) = seed_user(&state, "boss", Role::Admin).await;

    let response = app
        .clone()
        .oneshot(get_request("/analytics/production-efficiency", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(get_request(
            "/analytics/customer-lifetime-value?threshold=-5",
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(get_request("/analytics/employee-performance", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "success");
    assert!(body["data"].is_array());
}

#[tokio::test]
async fn analytics_reports_aggregate_correctly() {
    let (app, state) = test_app().await;
    let (_, token) = seed_user(&state, "boss", Role::Admin).await;

    sqlx::query("INSERT INTO products (name, price) VALUES ('gear', 2.0), ('cog', 3.0)")
        .execute(&state.db)
        .await
        .unwrap();
    sqlx::query(
        "INSERT INTO employees (name, position, email, phone) VALUES ('Ada', 'Eng', 'a@x.com', '1')",
    )
    .execute(&state.db)
    .await
    .unwrap();
    sqlx::query(
        "INSERT INTO production_records (product_id, employee_id, quantity_produced, date_produced) \
         VALUES (1, 1, 10, '2026-08-01'), (2, 1, 5, '2026-08-01'), (1, 1, 7, '2026-08-02')",
    )
    .execute(&state.db)
    .await
    .unwrap();

    let response = app
        .clone()
        .oneshot(get_request("/analytics/employee-performance", Some(&token)))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"][0]["employee_name"], "Ada");
    assert_eq!(body["data"][0]["total_quantity"], 22);

    let response = app
        .oneshot(get_request(
            "/analytics/production-efficiency?date=2026-08-01",
            Some(&token),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["total_produced"], 10);
}

#[tokio::test]
async fn users_listing_admin_but_detail_super_admin_only() {
    let (app, state) = test_app().await;
    let (_, admin) = seed_user(&state, "admin4", Role::Admin).await;
    let (root_id, root) = seed_user(&state, "root3", Role::SuperAdmin).await;

    let response = app
        .clone()
        .oneshot(get_request("/users", Some(&admin)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total"], 2);
    // Password hashes never leave the server
    assert!(!body.to_string().contains("password_hash"));

    let response = app
        .clone()
        .oneshot(get_request(&format!("/users/{root_id}"), Some(&admin)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .oneshot(get_request(&format!("/users/{root_id}"), Some(&root)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_route_is_404_with_error_envelope() {
    let (app, _) = test_app().await;
    let response = app.oneshot(get_request("/nope", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Not Found");
}
