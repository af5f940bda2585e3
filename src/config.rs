//! Service Configuration
//!
//! Read from command-line flags, each falling back to an environment variable
//! and then to a default suited to a local run.

use clap::Parser;
use std::{net::SocketAddr, time::Duration};

use crate::store::StoreKind;

/// Postgres defaults: user `postgres`, no password, database `postgres`.
pub const DEFAULT_DATABASE_URL: &str = "postgres://postgres@localhost:5432/postgres";
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
pub const DEFAULT_STORE_TIMEOUT_MS: u64 = 5000;

/// Book catalog and shopping cart HTTP service
#[derive(Parser, Debug, Clone)]
#[command(name = "bookstore-cart", version, about, long_about = None)]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "BOOKSTORE_LISTEN", default_value = "0.0.0.0:3000")]
    pub listen: SocketAddr,

    /// Where carts are kept
    #[arg(long, env = "BOOKSTORE_STORE", value_enum, default_value_t = StoreKind::Memory)]
    pub store: StoreKind,

    /// Postgres connection string, used by the postgres and redis stores
    #[arg(long, env = "DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
    pub database_url: String,

    /// Redis connection string, used by the redis store
    #[arg(long, env = "REDIS_URL", default_value = DEFAULT_REDIS_URL)]
    pub redis_url: String,

    /// Milliseconds a single store call may take
    #[arg(long, env = "BOOKSTORE_STORE_TIMEOUT_MS", default_value_t = DEFAULT_STORE_TIMEOUT_MS)]
    pub store_timeout_ms: u64,

    /// Initial delay between connection attempts at startup, doubled on
    /// every failure
    #[arg(long, env = "BOOKSTORE_CONNECT_RETRY_MS", default_value_t = 1000)]
    pub connect_retry_ms: u64,
}

impl Config {
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn connect_retry(&self) -> Duration {
        Duration::from_millis(self.connect_retry_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let config = Config::try_parse_from([
            "bookstore-cart",
            "--store",
            "redis",
            "--listen",
            "127.0.0.1:8080",
            "--store-timeout-ms",
            "250",
        ])
        .unwrap();

        assert_eq!(config.store, StoreKind::Redis);
        assert_eq!(config.listen, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.store_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn default_timeout_matches_app_state() {
        let config = Config::try_parse_from(["bookstore-cart", "--store", "memory"]).unwrap();
        if std::env::var_os("BOOKSTORE_STORE_TIMEOUT_MS").is_none() {
            assert_eq!(config.store_timeout(), crate::state::DEFAULT_STORE_TIMEOUT);
        }
    }

    #[test]
    fn unknown_store_is_rejected() {
        assert!(Config::try_parse_from(["bookstore-cart", "--store", "mongo"]).is_err());
    }
}
