//! Shopping Cart Business Logic Helpers
//!
//! This module contains the merge engine and a few small helpers for cart
//! operations and formatting. Everything here is pure; persistence is the
//! caller's job.

use std::num::NonZeroU32;

use super::models::{Cart, CartLine};
use crate::{
    catalog::models::Book,
    error::{Error, Result},
};

/// Turns the signed quantity of a request into a positive one.
pub fn positive_quantity(quantity: i64) -> Result<NonZeroU32> {
    u32::try_from(quantity)
        .ok()
        .and_then(NonZeroU32::new)
        .ok_or_else(|| Error::Validation(format!("quantity must be positive, got {quantity}")))
}

/// Merges `quantity` copies of `book` into `cart`.
///
/// # Behaviour
///
/// * If the cart already has a line for the book, its quantity becomes
///   `existing + quantity`. The first snapshot is kept.
/// * Otherwise a new line is added with a snapshot of `book`.
///
/// Fails without touching the cart if the sum does not fit a `u32`.
pub fn merge(mut cart: Cart, book: Book, quantity: NonZeroU32) -> Result<Cart> {
    let quantity = quantity.get();

    if let Some(existing) = cart.lines.get_mut(&book.id) {
        // Aggregate quantities.
        existing.quantity = existing
            .quantity
            .checked_add(quantity)
            .ok_or_else(|| Error::Validation(format!("quantity for book {} overflows", book.id)))?;
    } else {
        cart.lines.insert(
            book.id,
            CartLine {
                book_id: book.id,
                quantity,
                book: Some(book),
            },
        );
    }

    Ok(cart)
}

/// Produces a human-readable one-line summary of a cart.
///
/// Example output: `"2x Dune, 1x #9"` (books without a snapshot show their id).
pub fn format_line_summary(cart: &Cart) -> String {
    cart.lines()
        .map(|line| match &line.book {
            Some(book) => format!("{}x {}", line.quantity, book.title),
            None => format!("{}x #{}", line.quantity, line.book_id),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
