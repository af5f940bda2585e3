//! Shopping Cart Domain Module
//!
//! This module contains all shopping cart business logic, including:
//! - Domain models (Token, Cart, CartLine, request bodies)
//! - The merge engine and formatting helpers
//! - Per-token write serialization
//! - The cart service used by the handlers
//! - REST API handlers

pub mod handlers;
pub mod helpers;
pub mod locks;
pub mod models;
pub mod service;

// Re-export commonly used types for convenience
pub use handlers::routes;
pub use models::{Cart, CartLine, Token};
pub use service::CartService;
