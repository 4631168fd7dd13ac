//! Checkout and return endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{error::AppResult, models::book::Book};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StockParams {
    /// Book id
    pub id: Option<String>,
}

impl StockParams {
    fn id(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }
}

/// Check out one copy of a book
#[utoipa::path(
    patch,
    path = "/checkout",
    tag = "stock",
    params(StockParams),
    responses(
        (status = 200, description = "Book after checkout", body = Book),
        (status = 400, description = "Missing or invalid id", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse),
        (status = 409, description = "No copies available", body = crate::error::ErrorResponse),
        (status = 503, description = "Store unavailable or commit failed", body = crate::error::ErrorResponse)
    )
)]
pub async fn checkout(
    State(state): State<crate::AppState>,
    Query(params): Query<StockParams>,
) -> AppResult<Json<Book>> {
    let book = state.services.stock.checkout(params.id()).await?;
    Ok(Json(book))
}

/// Return one copy of a book
#[utoipa::path(
    patch,
    path = "/return",
    tag = "stock",
    params(StockParams),
    responses(
        (status = 200, description = "Book after return", body = Book),
        (status = 400, description = "Missing or invalid id", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse),
        (status = 503, description = "Store unavailable or commit failed", body = crate::error::ErrorResponse)
    )
)]
pub async fn return_copy(
    State(state): State<crate::AppState>,
    Query(params): Query<StockParams>,
) -> AppResult<Json<Book>> {
    let book = state.services.stock.return_copy(params.id()).await?;
    Ok(Json(book))
}
