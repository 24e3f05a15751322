//! Product endpoints (admin only, list responses cached)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use validator::Validate;

use crate::db::ProductRepository;
use crate::middleware::auth::require_role;
use crate::middleware::cache::response_cache_middleware;
use crate::middleware::rate_limit::rate_limit_middleware;
use crate::models::{product, Product, ProductPayload, Role};
use crate::utils::error::{map_db_error, AppError, AppResult};
use crate::utils::pagination::PageParams;
use crate::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    let reads = Router::new()
        .route(
            "/",
            get(list_products).layer(from_fn_with_state(
                state.response_cache.clone(),
                response_cache_middleware,
            )),
        )
        .route("/{id}", get(get_product))
        .layer(from_fn_with_state(
            state.read_limiter.clone(),
            rate_limit_middleware,
        ));

    let writes = Router::new()
        .route("/", post(create_product))
        .route("/{id}", put(update_product).delete(delete_product))
        .layer(from_fn_with_state(
            state.write_limiter.clone(),
            rate_limit_middleware,
        ));

    Router::new()
        .merge(reads)
        .merge(writes)
        .layer(from_fn(require_role(Role::Admin)))
}

async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<Value>> {
    let q = params.validate(product::SORTABLE_FIELDS, "name")?;
    let page = ProductRepository::new(&state.db)
        .list(&q)
        .await
        .map_err(map_db_error)?;
    Ok(Json(page.envelope("products", q.include_meta)))
}

async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Product>> {
    let product = ProductRepository::new(&state.db)
        .get(id)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;
    Ok(Json(product))
}

async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<ProductPayload>,
) -> AppResult<(StatusCode, Json<Product>)> {
    payload.validate()?;
    let product = ProductRepository::new(&state.db)
        .create(&payload)
        .await
        .map_err(map_db_error)?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ProductPayload>,
) -> AppResult<Json<Product>> {
    payload.validate()?;
    let product = ProductRepository::new(&state.db)
        .update(id, &payload)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;
    Ok(Json(product))
}

async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Value>> {
    let deleted = ProductRepository::new(&state.db)
        .delete(id)
        .await
        .map_err(map_db_error)?;
    if !deleted {
        return Err(AppError::NotFound("Product not found".to_string()));
    }
    Ok(Json(json!({ "message": "Product deleted" })))
}
