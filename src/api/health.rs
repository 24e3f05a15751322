//! Health and index endpoints

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
}

async fn index() -> Json<Value> {
    Json(json!({ "message": "Welcome to the Factory Management API" }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}
