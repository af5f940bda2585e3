//! Key-value store
//!
//! Each cart is a single string value under `cart:<token>`, holding the
//! entries produced by [`codec::encode_lines`]. An issued cart with no lines
//! is the empty string, so a missing key always means "never issued".
//! Book snapshots are not kept.

use async_trait::async_trait;
use redis::{aio::MultiplexedConnection, AsyncCommands};
use tracing::warn;

use super::{codec, CartStore};
use crate::{
    cart::models::{Cart, CartLine, Token},
    error::{Error, Result},
};

/// Prefix of every cart key.
pub const KEY_PREFIX: &str = "cart:";

#[derive(Clone)]
pub struct RedisCartStore {
    conn: MultiplexedConnection,
}

impl RedisCartStore {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self { conn }
    }

    /// Opens a multiplexed connection to `redis_url`.
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url)?;
        let conn = client.get_multiplexed_tokio_connection().await?;
        Ok(Self::new(conn))
    }
}

pub fn cart_key(token: &Token) -> String {
    format!("{KEY_PREFIX}{token}")
}

/// Builds a cart from a stored value, dropping entries whose quantity decoded
/// to 0.
pub fn cart_from_value(token: Token, value: &str) -> Cart {
    let lines = codec::decode_lines(value)
        .into_iter()
        .filter(|(book_id, quantity)| {
            if *quantity == 0 {
                warn!(%token, book_id, "dropping cart entry with zero quantity");
            }
            *quantity > 0
        })
        .map(|(book_id, quantity)| CartLine {
            book_id,
            quantity,
            book: None,
        })
        .collect::<Vec<_>>();

    Cart::from_lines(token, lines)
}

#[async_trait]
impl CartStore for RedisCartStore {
    async fn create_cart(&self, token: &Token) -> Result<()> {
        let mut conn = self.conn.clone();
        let created: bool = conn.set_nx(cart_key(token), "").await?;
        if !created {
            return Err(Error::TokenCollision);
        }
        Ok(())
    }

    async fn load(&self, token: &Token) -> Result<Option<Cart>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(cart_key(token)).await?;
        Ok(value.map(|value| cart_from_value(token.clone(), &value)))
    }

    async fn save(&self, cart: &Cart) -> Result<()> {
        let mut conn = self.conn.clone();
        let value = codec::encode_lines(&cart.quantities());
        conn.set::<_, _, ()>(cart_key(cart.token()), value).await?;
        Ok(())
    }
}
