//! Cart Store Adapters
//!
//! The rest of the service only sees [`CartStore`] and [`Catalog`]; which
//! strategy sits behind them is picked once at startup from [`StoreKind`].
//!
//! - [`memory`]: in-process maps, snapshots kept.
//! - [`postgres`]: carts and lines as normalized rows, snapshots kept.
//! - [`redis_store`]: each cart as one `bookId:quantity` string, catalog in Postgres.

pub mod codec;
pub mod memory;
pub mod postgres;
pub mod redis_store;

use async_trait::async_trait;
use clap::ValueEnum;
use std::{future::Future, sync::Arc, time::Duration};
use tracing::{info, warn};

use crate::{
    cart::models::{Cart, Token},
    catalog::Catalog,
    config::Config,
    error::Result,
};

/// Bounds for the reconnect backoff.
const MIN_BACKOFF: Duration = Duration::from_millis(1);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Persistence contract for carts, identical across strategies.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Stores an empty cart under `token`.
    ///
    /// Fails with [`Error::TokenCollision`](crate::Error::TokenCollision) if
    /// the token already names a cart.
    async fn create_cart(&self, token: &Token) -> Result<()>;

    /// Returns `None` if no cart was ever issued with this token.
    async fn load(&self, token: &Token) -> Result<Option<Cart>>;

    /// Replaces the stored state of the cart with `cart`.
    async fn save(&self, cart: &Cart) -> Result<()>;
}

/// Which backing strategy serves carts
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    Memory,
    Postgres,
    Redis,
}

/// The two store handles the service is built from
#[derive(Clone)]
pub struct Stores {
    pub carts: Arc<dyn CartStore>,
    pub catalog: Arc<dyn Catalog>,
}

impl Stores {
    /// Both handles backed by one fresh in-memory store.
    pub fn in_memory() -> Self {
        let store = Arc::new(memory::MemoryStore::new());
        Stores {
            carts: store.clone(),
            catalog: store,
        }
    }
}

/// Runs a store call, turning expiry of `limit` into `StoreUnavailable`.
pub async fn bounded<T, F>(limit: Duration, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::time::timeout(limit, call).await?
}

/// Connects the configured strategy, retrying with exponential backoff until
/// the backing services answer.
pub async fn connect(config: &Config) -> Stores {
    match config.store {
        StoreKind::Memory => {
            info!("using in-memory store");
            Stores::in_memory()
        }
        StoreKind::Postgres => {
            let store = Arc::new(
                with_backoff("postgres", config.connect_retry(), || {
                    postgres::PgStore::connect(&config.database_url)
                })
                .await,
            );
            info!("using postgres store");
            Stores {
                carts: store.clone(),
                catalog: store,
            }
        }
        StoreKind::Redis => {
            let catalog = with_backoff("postgres", config.connect_retry(), || {
                postgres::PgStore::connect(&config.database_url)
            })
            .await;
            let carts = with_backoff("redis", config.connect_retry(), || {
                redis_store::RedisCartStore::connect(&config.redis_url)
            })
            .await;
            info!("using redis cart store with postgres catalog");
            Stores {
                carts: Arc::new(carts),
                catalog: Arc::new(catalog),
            }
        }
    }
}

async fn with_backoff<T, F, Fut>(store: &str, initial: Duration, mut attempt: F) -> T
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut delay = clamp_delay(initial);
    loop {
        match attempt().await {
            Ok(connected) => return connected,
            Err(err) => {
                warn!(
                    store,
                    retry_in_ms = delay.as_millis() as u64,
                    "connection failed: {err}"
                );
                tokio::time::sleep(delay).await;
                delay = clamp_delay(delay.saturating_mul(2));
            }
        }
    }
}

fn clamp_delay(delay: Duration) -> Duration {
    delay.clamp(MIN_BACKOFF, MAX_BACKOFF)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn bounded_passes_results_through() {
        let value = bounded(Duration::from_secs(1), async { Ok::<_, Error>(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn bounded_reports_expiry_as_store_unavailable() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, Error>(())
        };
        let err = bounded(Duration::from_millis(10), slow).await.unwrap_err();
        assert!(matches!(err, Error::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn backoff_retries_until_success() {
        let attempts = AtomicU32::new(0);
        let counter = &attempts;
        let value = with_backoff("test", Duration::from_millis(1), || async move {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(Error::StoreUnavailable("refused".into()))
            } else {
                Ok("up")
            }
        })
        .await;

        assert_eq!(value, "up");
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn retry_delay_stays_within_bounds() {
        assert_eq!(clamp_delay(Duration::ZERO), MIN_BACKOFF);
        assert_eq!(clamp_delay(Duration::from_millis(250)), Duration::from_millis(250));
        assert_eq!(clamp_delay(Duration::MAX.saturating_mul(2)), MAX_BACKOFF);
    }

    #[tokio::test]
    async fn zero_initial_delay_still_waits_between_attempts() {
        let attempts = AtomicU32::new(0);
        let counter = &attempts;
        let started = tokio::time::Instant::now();
        with_backoff("test", Duration::ZERO, || async move {
            if counter.fetch_add(1, Ordering::SeqCst) < 3 {
                Err(Error::StoreUnavailable("refused".into()))
            } else {
                Ok(())
            }
        })
        .await;

        assert_eq!(attempts.load(Ordering::SeqCst), 4);
        assert!(started.elapsed() >= MIN_BACKOFF * 7);
    }
}
