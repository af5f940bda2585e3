//! Cart Service
//!
//! Ties the token issuer, the store adapter, the catalog and the merge engine
//! together. Every store call is bounded by the configured timeout.

use std::{sync::Arc, time::Duration};
use tracing::{debug, info, warn};

use super::{
    helpers::{merge, positive_quantity},
    locks::CartLocks,
    models::{Cart, Token},
};
use crate::{
    catalog::{models::BookId, Catalog},
    error::{Error, Result},
    store::{bounded, CartStore, Stores},
};

/// Fresh tokens tried before giving up on a run of collisions.
const MAX_TOKEN_ATTEMPTS: usize = 3;

#[derive(Clone)]
pub struct CartService {
    store: Arc<dyn CartStore>,
    catalog: Arc<dyn Catalog>,
    locks: CartLocks,
    timeout: Duration,
}

impl CartService {
    pub fn new(stores: &Stores, timeout: Duration) -> Self {
        Self {
            store: Arc::clone(&stores.carts),
            catalog: Arc::clone(&stores.catalog),
            locks: CartLocks::new(),
            timeout,
        }
    }

    /// Generates a token and stores an empty cart under it.
    ///
    /// The token is only returned once the cart is persisted.
    pub async fn issue_token(&self) -> Result<Token> {
        for _ in 0..MAX_TOKEN_ATTEMPTS {
            let token = Token::generate();
            match bounded(self.timeout, self.store.create_cart(&token)).await {
                Ok(()) => {
                    info!(%token, "issued cart");
                    return Ok(token);
                }
                Err(Error::TokenCollision) => {
                    warn!(%token, "generated token already names a cart, retrying");
                }
                Err(err) => return Err(err),
            }
        }

        Err(Error::TokenCollision)
    }

    /// Fetches the cart issued under `token`.
    pub async fn load(&self, token: &Token) -> Result<Cart> {
        bounded(self.timeout, self.store.load(token))
            .await?
            .ok_or(Error::NotFound("cart with that token"))
    }

    /// Adds `quantity` copies of a book to the cart and persists the result.
    ///
    /// The cart and the book are both resolved before anything is written, so
    /// a failure leaves the stored cart unchanged.
    pub async fn add_to_cart(&self, token: &Token, book_id: BookId, quantity: i64) -> Result<Cart> {
        let quantity = positive_quantity(quantity)?;

        self.locks
            .with_lock(token, || async move {
                let cart = self.load(token).await?;
                let book = bounded(self.timeout, self.catalog.find_by_id(book_id))
                    .await?
                    .ok_or(Error::BookNotFound(book_id))?;

                let cart = merge(cart, book, quantity)?;
                bounded(self.timeout, self.store.save(&cart)).await?;

                debug!(%token, book_id, quantity = quantity.get(), lines = cart.len(), "merged into cart");
                Ok(cart)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::models::{Book, BookDraft},
        store::memory::MemoryStore,
    };
    use async_trait::async_trait;
    use std::collections::HashSet;

    /// Memory store that yields between reading and writing, which is where a
    /// lost update would slip in without per-token locking.
    struct SlowStore(MemoryStore);

    #[async_trait]
    impl CartStore for SlowStore {
        async fn create_cart(&self, token: &Token) -> Result<()> {
            self.0.create_cart(token).await
        }

        async fn load(&self, token: &Token) -> Result<Option<Cart>> {
            let cart = self.0.load(token).await;
            tokio::time::sleep(Duration::from_millis(2)).await;
            cart
        }

        async fn save(&self, cart: &Cart) -> Result<()> {
            self.0.save(cart).await
        }
    }

    /// Store whose calls never complete.
    struct HangingStore;

    #[async_trait]
    impl CartStore for HangingStore {
        async fn create_cart(&self, _: &Token) -> Result<()> {
            std::future::pending().await
        }

        async fn load(&self, _: &Token) -> Result<Option<Cart>> {
            std::future::pending().await
        }

        async fn save(&self, _: &Cart) -> Result<()> {
            std::future::pending().await
        }
    }

    async fn seeded(carts: Arc<dyn CartStore>) -> (CartService, Book) {
        let catalog = Arc::new(MemoryStore::new());
        let book = catalog
            .create(BookDraft {
                title: Some("Dune".into()),
                price: Some(1299),
                isbn: Some("978-0441013593".into()),
                author: Some("Frank Herbert".into()),
            })
            .await
            .unwrap();

        let stores = Stores { carts, catalog };
        (CartService::new(&stores, Duration::from_secs(2)), book)
    }

    async fn memory_service() -> (CartService, Book) {
        seeded(Arc::new(MemoryStore::new())).await
    }

    #[tokio::test]
    async fn repeated_additions_of_one_book_share_a_line() {
        let (service, book) = memory_service().await;
        let token = service.issue_token().await.unwrap();

        service.add_to_cart(&token, book.id, 2).await.unwrap();
        service.add_to_cart(&token, book.id, 3).await.unwrap();

        let cart = service.load(&token).await.unwrap();
        assert_eq!(cart.len(), 1);
        let line = cart.line(book.id).unwrap();
        assert_eq!(line.quantity, 5);
        assert_eq!(line.book.as_ref(), Some(&book));
    }

    #[tokio::test]
    async fn unknown_token_is_not_found() {
        let (service, book) = memory_service().await;
        let token = Token::from("never-issued");

        assert!(matches!(service.load(&token).await, Err(Error::NotFound(_))));
        assert!(matches!(
            service.add_to_cart(&token, book.id, 1).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn unknown_book_leaves_the_cart_unchanged() {
        let (service, book) = memory_service().await;
        let token = service.issue_token().await.unwrap();
        service.add_to_cart(&token, book.id, 1).await.unwrap();

        let err = service.add_to_cart(&token, 404, 1).await.unwrap_err();
        assert!(matches!(err, Error::BookNotFound(404)));

        let cart = service.load(&token).await.unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.line(book.id).unwrap().quantity, 1);
    }

    #[tokio::test]
    async fn non_positive_quantity_is_rejected() {
        let (service, book) = memory_service().await;
        let token = service.issue_token().await.unwrap();

        for quantity in [0, -3] {
            assert!(matches!(
                service.add_to_cart(&token, book.id, quantity).await,
                Err(Error::Validation(_))
            ));
        }
        assert!(service.load(&token).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn issued_tokens_are_unique() {
        let (service, _) = memory_service().await;
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            assert!(seen.insert(service.issue_token().await.unwrap()));
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_additions_are_all_kept() {
        let (service, book) = seeded(Arc::new(SlowStore(MemoryStore::new()))).await;
        let token = service.issue_token().await.unwrap();

        let book_id = book.id;
        let quantities = [2_i64, 3, 5, 7, 11, 13];
        let tasks = quantities.map(|quantity| {
            let service = service.clone();
            let token = token.clone();
            tokio::spawn(async move { service.add_to_cart(&token, book_id, quantity).await })
        });

        for task in futures_util::future::join_all(tasks).await {
            task.unwrap().unwrap();
        }

        let cart = service.load(&token).await.unwrap();
        assert_eq!(
            i64::from(cart.line(book_id).unwrap().quantity),
            quantities.iter().sum::<i64>()
        );
    }

    #[tokio::test]
    async fn hanging_store_surfaces_as_unavailable() {
        let catalog = Arc::new(MemoryStore::new());
        let stores = Stores {
            carts: Arc::new(HangingStore),
            catalog,
        };
        let service = CartService::new(&stores, Duration::from_millis(20));

        assert!(matches!(
            service.issue_token().await,
            Err(Error::StoreUnavailable(_))
        ));
        assert!(matches!(
            service.load(&Token::from("t")).await,
            Err(Error::StoreUnavailable(_))
        ));
    }
}
