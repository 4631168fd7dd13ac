//! API handlers for Bookstock REST endpoints

pub mod books;
pub mod health;
pub mod openapi;
pub mod stock;

use std::time::Duration;

use axum::{
    routing::{get, patch},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::AppState;

/// Create the application router with all routes.
///
/// Requests exceeding `request_timeout` are cancelled; any transaction they
/// hold is dropped and rolled back.
pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Catalog
        .route("/books", get(books::list_books).post(books::create_book))
        .route("/books/search", get(books::search_books))
        // Stock
        .route("/checkout", patch(stock::checkout))
        .route("/return", patch(stock::return_copy))
        .with_state(state);

    // OpenAPI documentation
    let openapi = openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
