//! Application State
//!
//! One value, built at startup from the configured stores and shared by all
//! handlers.

use std::{sync::Arc, time::Duration};

use crate::{
    cart::CartService,
    catalog::Catalog,
    config::DEFAULT_STORE_TIMEOUT_MS,
    store::Stores,
};

/// Store calls that take longer than this fail with `StoreUnavailable`.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_millis(DEFAULT_STORE_TIMEOUT_MS);

// =============================================================================
// Application State
// =============================================================================

/// Shared application state that can be safely passed between threads
pub type SharedState = Arc<AppState>;

/// Core application state containing the catalog and cart handles
pub struct AppState {
    /// Catalog used by the book endpoints.
    pub catalog: Arc<dyn Catalog>,

    /// Token issuing and cart merging.
    pub carts: CartService,

    /// Bound applied to every store call made by a handler.
    pub store_timeout: Duration,
}

impl Default for AppState {
    /// In-memory stores with the default timeout.
    fn default() -> Self {
        Self::new(Stores::in_memory(), DEFAULT_STORE_TIMEOUT)
    }
}

impl AppState {
    pub fn new(stores: Stores, store_timeout: Duration) -> Self {
        Self {
            carts: CartService::new(&stores, store_timeout),
            catalog: stores.catalog,
            store_timeout,
        }
    }
}
