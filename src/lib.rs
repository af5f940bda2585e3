//! Book Store Cart Library
//!
//! This library provides a book catalog and shopping carts keyed by an
//! opaque session token, served over HTTP, with carts kept in memory, in
//! Postgres, or in Redis.

// Domain modules
pub mod cart;
pub mod catalog;

// Infrastructure
pub mod config;
pub mod envelope;
pub mod error;
pub mod router;
pub mod state;
pub mod store;

pub use error::{Error, Result};
