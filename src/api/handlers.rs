use axum::{
    Json,
    extract::{RawQuery, State},
    http::StatusCode,
};
use std::sync::Arc;

use crate::data_models::{Category, Tag};
use crate::errors::SearchError;
use crate::query::{RawSearchParams, normalize};

use super::AppState;
use super::models::{HealthResponse, SearchResponse};

type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

fn error_response(err: SearchError) -> (StatusCode, String) {
    log::error!("{err}");
    (StatusCode::SERVICE_UNAVAILABLE, err.to_string())
}

pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
) -> ApiResult<SearchResponse> {
    // Parsed by hand so malformed values get normalized instead of rejected.
    let raw = RawSearchParams::from_query_string(query.as_deref().unwrap_or_default());
    let query = normalize(&raw);

    let result = state.engine.search(&query).await.map_err(error_response)?;
    Ok(Json(result.into()))
}

pub async fn categories_handler(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Category>> {
    let categories = state
        .taxonomy
        .list_categories()
        .await
        .map_err(error_response)?;
    Ok(Json(categories))
}

pub async fn tags_handler(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Tag>> {
    let tags = state.taxonomy.list_tags().await.map_err(error_response)?;
    Ok(Json(tags))
}

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
