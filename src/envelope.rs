//! JSON Response Envelope
//!
//! Every non-listing endpoint answers with the same small object:
//! `{"success": bool, "message"?: string, "token"?: string, "book"?: Book}`.

use serde::Serialize;

use crate::catalog::models::Book;

/// Uniform success/failure body returned by the HTTP layer
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Envelope {
    /// Whether the operation succeeded
    pub success: bool,

    /// Human-readable outcome
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Session token, only set by `GET /token`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Created book, only set by `POST /create`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book: Option<Book>,
}

impl Envelope {
    /// Successful outcome carrying a message.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            token: None,
            book: None,
        }
    }

    /// Successful token issuance.
    pub fn token(token: impl Into<String>) -> Self {
        Self {
            success: true,
            message: None,
            token: Some(token.into()),
            book: None,
        }
    }

    /// Failed outcome carrying the error message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            token: None,
            book: None,
        }
    }

    pub fn with_book(mut self, book: Book) -> Self {
        self.book = Some(book);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn omits_absent_fields() {
        let body = serde_json::to_value(Envelope::token("abc")).unwrap();
        assert_eq!(body, json!({ "success": true, "token": "abc" }));

        let body = serde_json::to_value(Envelope::failure("nope")).unwrap();
        assert_eq!(body, json!({ "success": false, "message": "nope" }));
    }
}
