//! Book (catalog) endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::book::{Book, BookSearch, CreateBook},
};

/// List every book
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    responses(
        (status = 200, description = "All books", body = Vec<Book>)
    )
)]
pub async fn list_books(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.catalog.list_books().await?;
    Ok(Json(books))
}

/// Search books by id, title and/or author
#[utoipa::path(
    get,
    path = "/books/search",
    tag = "books",
    params(BookSearch),
    responses(
        (status = 200, description = "Matching books", body = Vec<Book>),
        (status = 400, description = "Id is not a number", body = crate::error::ErrorResponse)
    )
)]
pub async fn search_books(
    State(state): State<crate::AppState>,
    Query(search): Query<BookSearch>,
) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.catalog.search(&search).await?;
    Ok(Json(books))
}

/// Add a book to the catalog
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    Json(book): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let created = state.services.catalog.create_book(book).await?;
    Ok((StatusCode::CREATED, Json(created)))
}
