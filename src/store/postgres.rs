//! Relational store
//!
//! Books, carts and cart lines are rows in `books`, `carts` and `cart_items`.
//! A line carries a snapshot of its book, copied when the line was inserted.

use async_trait::async_trait;
use futures_util::TryStreamExt;
use sqlx::{
    postgres::{PgPoolOptions, PgRow},
    query, query_as, raw_sql, FromRow, PgPool, Postgres, Row,
};
use std::time::Duration;

use super::CartStore;
use crate::{
    cart::models::{Cart, CartLine, Token},
    catalog::{
        models::{Book, BookId, NewBook},
        Catalog,
    },
    error::{Error, Result},
};

const SCHEMA_SQL: &str = include_str!("sql/schema.sql");
const GET_BOOK_SQL: &str = include_str!("sql/get_book.sql");
const GET_BOOKS_SQL: &str = include_str!("sql/get_books.sql");
const CREATE_BOOK_SQL: &str = include_str!("sql/create_book.sql");
const CREATE_CART_SQL: &str = include_str!("sql/create_cart.sql");
const GET_CART_SQL: &str = include_str!("sql/get_cart.sql");
const GET_CART_ITEMS_SQL: &str = include_str!("sql/get_cart_items.sql");
const UPSERT_CART_ITEM_SQL: &str = include_str!("sql/upsert_cart_item.sql");
const PRUNE_CART_ITEMS_SQL: &str = include_str!("sql/prune_cart_items.sql");

/// How long a request may wait for a pooled connection.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to `PostgreSQL` and creates the tables if they are missing.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` if the connection or the schema setup fails.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect(database_url)
            .await?;

        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        raw_sql(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl CartStore for PgStore {
    async fn create_cart(&self, token: &Token) -> Result<()> {
        let result = query(CREATE_CART_SQL)
            .bind(token.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::TokenCollision);
        }

        Ok(())
    }

    async fn load(&self, token: &Token) -> Result<Option<Cart>> {
        let exists = query(GET_CART_SQL)
            .bind(token.as_str())
            .fetch_optional(&self.pool)
            .await?;

        if exists.is_none() {
            return Ok(None);
        }

        let lines: Vec<CartLine> = query_as::<Postgres, CartLine>(GET_CART_ITEMS_SQL)
            .bind(token.as_str())
            .fetch(&self.pool)
            .try_collect()
            .await?;

        Ok(Some(Cart::from_lines(token.clone(), lines)))
    }

    /// Upserts every line, then deletes rows for books no longer in the cart,
    /// all in one transaction.
    async fn save(&self, cart: &Cart) -> Result<()> {
        let token = cart.token().as_str();
        let mut tx = self.pool.begin().await?;

        for line in cart.lines() {
            let snapshot = line.book.as_ref();
            query(UPSERT_CART_ITEM_SQL)
                .bind(token)
                .bind(line.book_id)
                .bind(i64::from(line.quantity))
                .bind(snapshot.map(|book| book.title.as_str()))
                .bind(snapshot.map(|book| price_column(book.price)).transpose()?)
                .bind(snapshot.map(|book| book.isbn.as_str()))
                .bind(snapshot.map(|book| book.author.as_str()))
                .execute(&mut *tx)
                .await?;
        }

        let kept: Vec<BookId> = cart.lines().map(|line| line.book_id).collect();
        query(PRUNE_CART_ITEMS_SQL)
            .bind(token)
            .bind(&kept)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl Catalog for PgStore {
    async fn find_by_id(&self, id: BookId) -> Result<Option<Book>> {
        let book = query_as::<Postgres, Book>(GET_BOOK_SQL)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(book)
    }

    async fn find_all(&self) -> Result<Vec<Book>> {
        let books = query_as::<Postgres, Book>(GET_BOOKS_SQL)
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    async fn insert(&self, book: NewBook) -> Result<Book> {
        let created = query_as::<Postgres, Book>(CREATE_BOOK_SQL)
            .bind(&book.title)
            .bind(price_column(book.price)?)
            .bind(&book.isbn)
            .bind(&book.author)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }
}

fn price_column(price: u64) -> Result<i64> {
    i64::try_from(price).map_err(|_| Error::Validation(format!("price {price} is out of range")))
}

fn decode_unsigned<T: TryFrom<i64>>(column: &str, value: i64) -> sqlx::Result<T>
where
    T::Error: std::error::Error + Send + Sync + 'static,
{
    T::try_from(value).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

impl<'r> FromRow<'r, PgRow> for Book {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            price: decode_unsigned("price", row.try_get("price")?)?,
            isbn: row.try_get("isbn")?,
            author: row.try_get("author")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for CartLine {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let book_id: BookId = row.try_get("book_id")?;

        let title: Option<String> = row.try_get("title")?;
        let price: Option<i64> = row.try_get("price")?;
        let isbn: Option<String> = row.try_get("isbn")?;
        let author: Option<String> = row.try_get("author")?;

        let book = match (title, price, isbn, author) {
            (Some(title), Some(price), Some(isbn), Some(author)) => Some(Book {
                id: book_id,
                title,
                price: decode_unsigned("price", price)?,
                isbn,
                author,
            }),
            _ => None,
        };

        Ok(Self {
            book_id,
            quantity: decode_unsigned("quantity", row.try_get("quantity")?)?,
            book,
        })
    }
}
