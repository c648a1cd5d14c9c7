use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::query_engine::ArticleFilterEngine;
use crate::store::ContentStore;
use crate::taxonomy::TaxonomyLister;

pub mod handlers;
pub mod models;

/// Shared, read-only state behind every request.
pub struct AppState {
    pub engine: ArticleFilterEngine,
    pub taxonomy: TaxonomyLister,
}

impl AppState {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self {
            engine: ArticleFilterEngine::new(store.clone()),
            taxonomy: TaxonomyLister::new(store),
        }
    }
}

/// The three read-only search operations plus a health probe.
pub fn api_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/search", get(handlers::search_handler))
        .route("/categories", get(handlers::categories_handler))
        .route("/tags", get(handlers::tags_handler))
        .route("/health", get(handlers::health_handler))
        .with_state(state)
}

pub fn create_router(state: Arc<AppState>, static_dir: &str) -> Router {
    // Public read-only API
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api_router(state))
        // Static file serving for the widget assets
        .fallback_service(ServeDir::new(static_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
