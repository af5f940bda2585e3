//! REST API handlers for the book catalog

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use tracing::info;

use super::models::{Book, BookDraft, BookId};
use crate::{
    envelope::Envelope,
    error::{Error, Result},
    state::SharedState,
    store::bounded,
};

const BOOK_NOT_FOUND: &str = "book with that id";

/// Creates routes for catalog operations
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/books", get(list_books))
        .route("/book/:id", get(get_book))
        .route("/create", post(create_book))
}

/// Endpoint: GET /books
async fn list_books(State(state): State<SharedState>) -> Result<Json<Vec<Book>>> {
    let books = bounded(state.store_timeout, state.catalog.find_all()).await?;
    Ok(Json(books))
}

/// Endpoint: GET /book/:id
/// A non-numeric id is reported the same way as an unknown one.
async fn get_book(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Book>> {
    let id: BookId = id.parse().map_err(|_| Error::NotFound(BOOK_NOT_FOUND))?;

    bounded(state.store_timeout, state.catalog.find_by_id(id))
        .await?
        .map(Json)
        .ok_or(Error::NotFound(BOOK_NOT_FOUND))
}

/// Endpoint: POST /create
async fn create_book(
    State(state): State<SharedState>,
    body: std::result::Result<Json<BookDraft>, JsonRejection>,
) -> Result<Json<Envelope>> {
    let Json(draft) = body.map_err(|e| Error::MalformedBody(e.body_text()))?;

    let book = bounded(state.store_timeout, state.catalog.create(draft)).await?;
    info!(book_id = book.id, title = %book.title, "added book to catalog");

    Ok(Json(
        Envelope::ok("successfully added book").with_book(book),
    ))
}
