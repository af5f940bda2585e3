//! Shopping Cart Domain Models
//!
//! This module contains the cart, its lines, the session token naming it and
//! the request/response shapes of the cart endpoints.

use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};
use uuid::Uuid;

use crate::catalog::models::{Book, BookId};

// =============================================================================
// Cart Domain Models
// =============================================================================

/// Opaque session token naming exactly one cart
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    /// Generates a fresh random (v4, 122 random bits) token.
    pub fn generate() -> Self {
        Token(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Token {
    fn from(token: String) -> Self {
        Token(token)
    }
}

impl From<&str> for Token {
    fn from(token: &str) -> Self {
        Token(token.to_string())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One (book, quantity) pair within a cart
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartLine {
    pub book_id: BookId,

    /// Always positive once persisted
    pub quantity: u32,

    /// Copy of the book taken when the line was first added. Only kept by
    /// strategies that store snapshots.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book: Option<Book>,
}

/// A cart: its token plus at most one line per book id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    token: Token,
    pub(crate) lines: BTreeMap<BookId, CartLine>,
}

impl Cart {
    /// A freshly issued cart with no lines.
    pub fn empty(token: Token) -> Self {
        Self {
            token,
            lines: BTreeMap::new(),
        }
    }

    /// Rebuilds a cart from stored lines. A later line for the same book id
    /// replaces an earlier one.
    pub fn from_lines(token: Token, lines: impl IntoIterator<Item = CartLine>) -> Self {
        Self {
            token,
            lines: lines.into_iter().map(|line| (line.book_id, line)).collect(),
        }
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    /// Lines ordered by book id.
    pub fn lines(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.values()
    }

    pub fn line(&self, book_id: BookId) -> Option<&CartLine> {
        self.lines.get(&book_id)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The book id to quantity mapping, as kept by the key-value strategy.
    pub fn quantities(&self) -> BTreeMap<BookId, u32> {
        self.lines
            .values()
            .map(|line| (line.book_id, line.quantity))
            .collect()
    }
}

// =============================================================================
// Request / Response Models
// =============================================================================

/// Body of `POST /book`
#[derive(Debug, Deserialize)]
pub struct CartRequest {
    /// Book to add
    pub id: BookId,

    /// Cart to add it to
    pub token: String,

    /// Signed so that zero and negative values reach validation
    pub quantity: i64,
}
