//! HTTP handlers for the books module, mounted under `/api/books`.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    routing::{get, put},
    Json, Router,
};
use bookshelf_http::error::{AppError, AppResult, ErrorResponse};
use serde_json::json;
use utoipa::OpenApi;

use super::models::{BookId, BookInput, BookView, BooksHealth};
use super::service::{CatalogError, CatalogService};

type Catalog = State<Arc<CatalogService>>;

#[derive(OpenApi)]
#[openapi(
    paths(list_books, add_book, get_book, borrow_book, return_book, health_check),
    components(schemas(BookInput, BookView, BooksHealth, ErrorResponse)),
    tags((name = "Books", description = "Catalog and borrow state"))
)]
pub struct BooksApi;

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        let message = err.to_string();
        match err {
            CatalogError::NotFound(_) | CatalogError::NotAvailable(_) => {
                AppError::not_found(message)
            }
            CatalogError::InvalidInput { missing } => {
                let details = missing
                    .iter()
                    .map(|field| json!({"field": field, "error": "required"}))
                    .collect();
                AppError::validation(details, message)
            }
            CatalogError::Store(store) => AppError::Internal(anyhow::Error::new(store)),
        }
    }
}

/// Router for the books module, bound to `service`.
pub fn router(service: Arc<CatalogService>) -> Router {
    Router::new()
        .route("/", get(list_books).post(add_book))
        .route("/health", get(health_check))
        .route("/{id}", get(get_book))
        .route("/{id}/borrow", put(borrow_book))
        .route("/{id}/return", put(return_book))
        .with_state(service)
}

fn book_id(path: Result<Path<BookId>, PathRejection>) -> AppResult<BookId> {
    path.map(|Path(id)| id)
        .map_err(|rejection| AppError::bad_request(rejection.body_text()))
}

/// List every book in insertion order
#[utoipa::path(
    get,
    path = "/",
    tag = "Books",
    responses(
        (status = 200, description = "List of books", body = Vec<BookView>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn list_books(State(service): Catalog) -> AppResult<Json<Vec<BookView>>> {
    Ok(Json(service.get_all_books()?))
}

/// Add a book to the catalog
#[utoipa::path(
    post,
    path = "/",
    tag = "Books",
    request_body = BookInput,
    responses(
        (status = 200, description = "Book created", body = BookView),
        (status = 400, description = "Missing title or author, or malformed body", body = ErrorResponse)
    )
)]
async fn add_book(
    State(service): Catalog,
    payload: Result<Json<BookInput>, JsonRejection>,
) -> AppResult<Json<BookView>> {
    let Json(input) = payload.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
    let book = service.add_book(input)?;
    Ok(Json(book.into()))
}

/// Fetch a single book
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Books",
    params(("id" = u64, Path, description = "Book identifier")),
    responses(
        (status = 200, description = "The book", body = BookView),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
async fn get_book(
    State(service): Catalog,
    path: Result<Path<BookId>, PathRejection>,
) -> AppResult<Json<BookView>> {
    let book = service.get_by_id(book_id(path)?)?;
    Ok(Json(book.into()))
}

/// Mark an available book as borrowed
#[utoipa::path(
    put,
    path = "/{id}/borrow",
    tag = "Books",
    params(("id" = u64, Path, description = "Book identifier")),
    responses(
        (status = 200, description = "Book borrowed", body = BookView),
        (status = 404, description = "Book not found or already borrowed", body = ErrorResponse)
    )
)]
async fn borrow_book(
    State(service): Catalog,
    path: Result<Path<BookId>, PathRejection>,
) -> AppResult<Json<BookView>> {
    let book = service.borrow_book(book_id(path)?)?;
    Ok(Json(book.into()))
}

/// Mark a borrowed book as returned
#[utoipa::path(
    put,
    path = "/{id}/return",
    tag = "Books",
    params(("id" = u64, Path, description = "Book identifier")),
    responses(
        (status = 200, description = "Book returned", body = BookView),
        (status = 404, description = "Book not found or not borrowed", body = ErrorResponse)
    )
)]
async fn return_book(
    State(service): Catalog,
    path: Result<Path<BookId>, PathRejection>,
) -> AppResult<Json<BookView>> {
    let book = service.return_book(book_id(path)?)?;
    Ok(Json(book.into()))
}

/// Books health check
#[utoipa::path(
    get,
    path = "/health",
    tag = "Books",
    responses((status = 200, description = "Module is healthy", body = BooksHealth))
)]
async fn health_check(State(service): Catalog) -> AppResult<Json<BooksHealth>> {
    Ok(Json(BooksHealth {
        status: "ok".to_string(),
        books: service.count()?,
    }))
}
