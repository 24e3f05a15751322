//! Analytics endpoints (admin only, cached)
//!
//! Aggregate reports over orders and production data. All endpoints share
//! the read limiter and the response cache; the reports are expensive
//! enough that serving a slightly stale result is the right trade.

use axum::{
    extract::{Query, State},
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::db::AnalyticsRepository;
use crate::middleware::auth::require_role;
use crate::middleware::cache::response_cache_middleware;
use crate::middleware::rate_limit::rate_limit_middleware;
use crate::models::Role;
use crate::utils::error::{map_db_error, AppError, AppResult};
use crate::AppState;

const DEFAULT_VALUE_THRESHOLD: f64 = 1000.0;

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/employee-performance", get(employee_performance))
        .route("/top-products", get(top_products))
        .route("/customer-lifetime-value", get(customer_lifetime_value))
        .route("/production-efficiency", get(production_efficiency))
        .layer(from_fn_with_state(
            state.response_cache.clone(),
            response_cache_middleware,
        ))
        .layer(from_fn_with_state(
            state.read_limiter.clone(),
            rate_limit_middleware,
        ))
        .layer(from_fn(require_role(Role::Admin)))
}

fn report(data: impl serde::Serialize) -> Json<Value> {
    Json(json!({ "data": data, "status": "success" }))
}

async fn employee_performance(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let rows = AnalyticsRepository::new(&state.db)
        .employee_performance()
        .await
        .map_err(map_db_error)?;
    Ok(report(rows))
}

async fn top_products(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let rows = AnalyticsRepository::new(&state.db)
        .top_products()
        .await
        .map_err(map_db_error)?;
    Ok(report(rows))
}

#[derive(Debug, Deserialize)]
struct ThresholdParams {
    threshold: Option<String>,
}

async fn customer_lifetime_value(
    State(state): State<AppState>,
    Query(params): Query<ThresholdParams>,
) -> AppResult<Json<Value>> {
    let threshold = match params.threshold {
        Some(raw) => raw
            .parse::<f64>()
            .map_err(|_| AppError::Validation("threshold must be a number.".to_string()))?,
        None => DEFAULT_VALUE_THRESHOLD,
    };
    if threshold < 0.0 {
        return Err(AppError::Validation(
            "threshold must not be negative.".to_string(),
        ));
    }

    let rows = AnalyticsRepository::new(&state.db)
        .customer_lifetime_value(threshold)
        .await
        .map_err(map_db_error)?;
    Ok(report(rows))
}

#[derive(Debug, Deserialize)]
struct DateParams {
    date: Option<String>,
}

async fn production_efficiency(
    State(state): State<AppState>,
    Query(params): Query<DateParams>,
) -> AppResult<Json<Value>> {
    let raw = params.date.ok_or_else(|| {
        AppError::Validation("date query parameter is required (YYYY-MM-DD).".to_string())
    })?;
    let date = NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .map_err(|_| AppError::Validation("date must be in YYYY-MM-DD format.".to_string()))?;

    let rows = AnalyticsRepository::new(&state.db)
        .production_efficiency(date)
        .await
        .map_err(map_db_error)?;
    Ok(report(rows))
}
