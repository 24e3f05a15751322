//! Employee endpoints (admin only)
//!
//! Employee data is deliberately never cached: HR edits must be visible on
//! the next read.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use validator::Validate;

use crate::db::EmployeeRepository;
use crate::middleware::auth::require_role;
use crate::middleware::rate_limit::rate_limit_middleware;
use crate::models::{employee, Employee, EmployeePayload, Role};
use crate::utils::error::{map_db_error, AppError, AppResult};
use crate::utils::pagination::PageParams;
use crate::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    let reads = Router::new()
        .route("/", get(list_employees))
        .route("/{id}", get(get_employee))
        .layer(from_fn_with_state(
            state.read_limiter.clone(),
            rate_limit_middleware,
        ));

    let writes = Router::new()
        .route("/", post(create_employee))
        .route("/{id}", axum::routing::put(update_employee).delete(delete_employee))
        .layer(from_fn_with_state(
            state.write_limiter.clone(),
            rate_limit_middleware,
        ));

    Router::new()
        .merge(reads)
        .merge(writes)
        .layer(from_fn(require_role(Role::Admin)))
}

async fn list_employees(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<Value>> {
    let q = params.validate(employee::SORTABLE_FIELDS, "name")?;
    let page = EmployeeRepository::new(&state.db)
        .list(&q)
        .await
        .map_err(map_db_error)?;
    Ok(Json(page.envelope("employees", q.include_meta)))
}

async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Employee>> {
    let employee = EmployeeRepository::new(&state.db)
        .get(id)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))?;
    Ok(Json(employee))
}

async fn create_employee(
    State(state): State<AppState>,
    Json(payload): Json<EmployeePayload>,
) -> AppResult<(StatusCode, Json<Employee>)> {
    payload.validate()?;
    let employee = EmployeeRepository::new(&state.db)
        .create(&payload)
        .await
        .map_err(map_db_error)?;
    Ok((StatusCode::CREATED, Json(employee)))
}

async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<EmployeePayload>,
) -> AppResult<Json<Employee>> {
    payload.validate()?;
    let employee = EmployeeRepository::new(&state.db)
        .update(id, &payload)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))?;
    Ok(Json(employee))
}

async fn delete_employee(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Value>> {
    let deleted = EmployeeRepository::new(&state.db)
        .delete(id)
        .await
        .map_err(map_db_error)?;
    if !deleted {
        return Err(AppError::NotFound("Employee not found".to_string()));
    }
    Ok(Json(json!({ "message": "Employee deleted" })))
}
