//! Production record endpoints (admin only, list responses cached)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use validator::Validate;

use crate::db::{EmployeeRepository, ProductRepository, ProductionRepository};
use crate::middleware::auth::require_role;
use crate::middleware::cache::response_cache_middleware;
use crate::middleware::rate_limit::rate_limit_middleware;
use crate::models::{production, ProductionPayload, ProductionRecord, Role};
use crate::utils::error::{map_db_error, AppError, AppResult};
use crate::utils::pagination::PageParams;
use crate::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    let reads = Router::new()
        .route(
            "/",
            get(list_records).layer(from_fn_with_state(
                state.response_cache.clone(),
                response_cache_middleware,
            )),
        )
        .route("/{id}", get(get_record))
        .layer(from_fn_with_state(
            state.read_limiter.clone(),
            rate_limit_middleware,
        ));

    let writes = Router::new()
        .route("/", post(create_record))
        .route("/{id}", put(update_record).delete(delete_record))
        .layer(from_fn_with_state(
            state.write_limiter.clone(),
            rate_limit_middleware,
        ));

    Router::new()
        .merge(reads)
        .merge(writes)
        .layer(from_fn(require_role(Role::Admin)))
}

async fn list_records(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<Value>> {
    let q = params.validate(production::SORTABLE_FIELDS, "date_produced")?;
    let page = ProductionRepository::new(&state.db)
        .list(&q)
        .await
        .map_err(map_db_error)?;
    Ok(Json(page.envelope("production_records", q.include_meta)))
}

async fn get_record(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ProductionRecord>> {
    let record = ProductionRepository::new(&state.db)
        .get(id)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| AppError::NotFound("Production record not found".to_string()))?;
    Ok(Json(record))
}

async fn validate_references(state: &AppState, payload: &ProductionPayload) -> AppResult<()> {
    ProductRepository::new(&state.db)
        .get(payload.product_id)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| AppError::Validation("Invalid product_id.".to_string()))?;

    if let Some(employee_id) = payload.employee_id {
        EmployeeRepository::new(&state.db)
            .get(employee_id)
            .await
            .map_err(map_db_error)?
            .ok_or_else(|| AppError::Validation("Invalid employee_id.".to_string()))?;
    }
    Ok(())
}

async fn create_record(
    State(state): State<AppState>,
    Json(payload): Json<ProductionPayload>,
) -> AppResult<(StatusCode, Json<ProductionRecord>)> {
    payload.validate()?;
    validate_references(&state, &payload).await?;

    let record = ProductionRepository::new(&state.db)
        .create(&payload)
        .await
        .map_err(map_db_error)?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn update_record(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ProductionPayload>,
) -> AppResult<Json<ProductionRecord>> {
    payload.validate()?;
    validate_references(&state, &payload).await?;

    let record = ProductionRepository::new(&state.db)
        .update(id, &payload)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| AppError::NotFound("Production record not found".to_string()))?;
    Ok(Json(record))
}

async fn delete_record(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Value>> {
    let deleted = ProductionRepository::new(&state.db)
        .delete(id)
        .await
        .map_err(map_db_error)?;
    if !deleted {
        return Err(AppError::NotFound("Production record not found".to_string()));
    }
    Ok(Json(json!({ "message": "Production record deleted" })))
}
