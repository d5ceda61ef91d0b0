use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::NotFoundPolicy;
use crate::courses;
use crate::db_mongo::queries::CourseStore;
use crate::health::health_check;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CourseStore>,
    pub not_found: NotFoundPolicy,
}

impl AppState {
    pub fn new(store: Arc<dyn CourseStore>, not_found: NotFoundPolicy) -> Self {
        Self { store, not_found }
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .merge(courses::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
