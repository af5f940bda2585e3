//! Book Catalog Module
//!
//! A plain repository of books, consumed by the cart service (to snapshot a
//! book into a cart line) and by the HTTP layer (list, view, create).

pub mod handlers;
pub mod models;

use async_trait::async_trait;

use crate::error::Result;
use models::{Book, BookDraft, BookId, NewBook};

pub use handlers::routes;

/// Catalog repository implemented by each store strategy.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Returns `None` if no book has this id.
    async fn find_by_id(&self, id: BookId) -> Result<Option<Book>>;

    /// All books, in no particular order.
    async fn find_all(&self) -> Result<Vec<Book>>;

    /// Persists a validated book and returns it with its assigned id.
    async fn insert(&self, book: NewBook) -> Result<Book>;

    /// Validates the draft, then inserts it.
    async fn create(&self, draft: BookDraft) -> Result<Book> {
        let book = draft.validate()?;
        self.insert(book).await
    }
}
