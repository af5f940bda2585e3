//! Catalog Domain Models
//!
//! Books are created once and never updated.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Store-assigned book identifier
pub type BookId = i64;

// =============================================================================
// Catalog Domain Models
// =============================================================================

/// A catalog record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Book {
    /// Store-assigned identifier
    pub id: BookId,

    pub title: String,

    /// Price in the smallest currency unit
    pub price: u64,

    pub isbn: String,

    pub author: String,
}

/// Payload of `POST /create`. Every field is optional so that a missing one
/// surfaces as a validation error instead of a body rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookDraft {
    pub title: Option<String>,
    pub price: Option<i64>,
    pub isbn: Option<String>,
    pub author: Option<String>,
}

/// A draft that passed validation and only lacks its identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub price: u64,
    pub isbn: String,
    pub author: String,
}

impl NewBook {
    /// Attaches the identifier assigned by the store.
    pub fn into_book(self, id: BookId) -> Book {
        Book {
            id,
            title: self.title,
            price: self.price,
            isbn: self.isbn,
            author: self.author,
        }
    }
}

impl BookDraft {
    /// Checks that title, ISBN and author are present and non-blank and that
    /// the price is present and not negative.
    pub fn validate(self) -> Result<NewBook> {
        let title = required("title", self.title)?;
        let isbn = required("isbn", self.isbn)?;
        let author = required("author", self.author)?;

        let price = match self.price {
            None => return Err(Error::Validation("missing field: price".into())),
            Some(price) => u64::try_from(price)
                .map_err(|_| Error::Validation("price must not be negative".into()))?,
        };

        Ok(NewBook {
            title,
            price,
            isbn,
            author,
        })
    }
}

fn required(field: &str, value: Option<String>) -> Result<String> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::Validation(format!("missing field: {field}"))),
    }
}
