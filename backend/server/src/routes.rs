use std::sync::Arc;

use axum::{
    Json,
    extract::{self, Multipart, Path, Query},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Local;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;
use trends::{ProductsCollection, TrendFilter, TrendQuery, TrendSeries, aggregate};

use crate::{
    error::AppError,
    state::State,
    uploads::store_upload,
    utils::{parse_id, patch_from_payload, product_from_payload, sale_from_payload},
};

type AppState = extract::State<Arc<State>>;

#[derive(Debug, Deserialize)]
pub struct TrendParams {
    filter: Option<String>,
    category: Option<String>,
}

pub async fn root_handler() -> impl IntoResponse {
    Json("<h1>Forsit Backend</h1>")
}

pub async fn upload_handler(
    extract::State(state): AppState,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let upload = store_upload(&state.config, multipart).await?;

    Ok(Json(upload))
}

pub async fn add_product_handler(
    extract::State(state): AppState,
    Json(payload): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let product = product_from_payload(payload)?;
    let product = state.store.append_product(product).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Product added successfully", "product": product })),
    ))
}

pub async fn add_sale_handler(
    extract::State(state): AppState,
    Json(payload): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let sale = sale_from_payload(payload)?;
    let sale = state.store.append_sale(sale).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Sale added successfully", "sale": sale })),
    ))
}

pub async fn view_all_products_handler(
    extract::State(state): AppState,
) -> Json<ProductsCollection> {
    Json(state.store.load_products().await)
}

pub async fn view_all_sales_handler(
    extract::State(state): AppState,
    Query(params): Query<TrendParams>,
) -> Json<TrendSeries> {
    let sales = state.store.load_sales().await;

    let query = TrendQuery {
        filter: TrendFilter::from_query(params.filter.as_deref()),
        category: params.category.as_deref().filter(|c| !c.is_empty()),
        now: Local::now().naive_local(),
        week_start: state.config.week_start,
    };

    let aggregation = aggregate(&sales.sales, &query);
    debug!(
        "Trend {:?}: {} matched, {} unparseable",
        query.filter, aggregation.matched, aggregation.unparseable
    );

    Json(aggregation.series)
}

pub async fn view_product_handler(
    extract::State(state): AppState,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let product = state.store.find_product(id).await.ok_or(AppError::NotFound)?;

    Ok(Json(product))
}

pub async fn update_product_handler(
    extract::State(state): AppState,
    Path(id): Path<String>,
    Json(payload): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let patch = patch_from_payload(payload)?;
    let product = state
        .store
        .update_product(id, patch)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(product))
}

pub async fn delete_product_handler(
    extract::State(state): AppState,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let product = state
        .store
        .delete_product(id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(product))
}
