//! In-memory store
//!
//! Carts and books live in `DashMap`s, which allow concurrent access without
//! an outer mutex. Snapshots are kept like in the relational strategy.

use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};
use std::sync::atomic::{AtomicI64, Ordering};

use super::CartStore;
use crate::{
    cart::models::{Cart, Token},
    catalog::{
        models::{Book, BookId, NewBook},
        Catalog,
    },
    error::{Error, Result},
};

#[derive(Debug)]
pub struct MemoryStore {
    /// Carts keyed by token.
    carts: DashMap<Token, Cart>,
    books: DashMap<BookId, Book>,
    /// Last assigned book id; ids start at 1 like a database sequence.
    last_book_id: AtomicI64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            carts: DashMap::new(),
            books: DashMap::new(),
            last_book_id: AtomicI64::new(0),
        }
    }
}

#[async_trait]
impl CartStore for MemoryStore {
    async fn create_cart(&self, token: &Token) -> Result<()> {
        match self.carts.entry(token.clone()) {
            Entry::Occupied(_) => Err(Error::TokenCollision),
            Entry::Vacant(slot) => {
                slot.insert(Cart::empty(token.clone()));
                Ok(())
            }
        }
    }

    async fn load(&self, token: &Token) -> Result<Option<Cart>> {
        Ok(self.carts.get(token).map(|cart| cart.clone()))
    }

    async fn save(&self, cart: &Cart) -> Result<()> {
        self.carts.insert(cart.token().clone(), cart.clone());
        Ok(())
    }
}

#[async_trait]
impl Catalog for MemoryStore {
    async fn find_by_id(&self, id: BookId) -> Result<Option<Book>> {
        Ok(self.books.get(&id).map(|book| book.clone()))
    }

    async fn find_all(&self) -> Result<Vec<Book>> {
        Ok(self.books.iter().map(|book| book.value().clone()).collect())
    }

    async fn insert(&self, book: NewBook) -> Result<Book> {
        let id = self.last_book_id.fetch_add(1, Ordering::SeqCst) + 1;
        let book = book.into_book(id);
        self.books.insert(id, book.clone());
        Ok(book)
    }
}
