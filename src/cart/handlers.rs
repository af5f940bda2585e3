//! REST API handlers for shopping cart operations
//!
//! This module implements the token, add-to-cart and cart listing endpoints.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use tracing::info;

use super::{
    helpers::format_line_summary,
    models::{CartLine, CartRequest, Token},
};
use crate::{
    envelope::Envelope,
    error::{Error, Result},
    state::SharedState,
};

/// Creates routes for cart-related operations
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/token", get(issue_token))
        .route("/book", post(add_to_cart))
        .route("/cart/:token", get(cart_lines))
}

/// Endpoint: GET /token
/// Issues a token naming a new, empty cart.
async fn issue_token(State(state): State<SharedState>) -> Result<Json<Envelope>> {
    let token = state.carts.issue_token().await?;
    Ok(Json(Envelope::token(token.to_string())))
}

/// Endpoint: POST /book
/// Adds `quantity` copies of book `id` to the cart named by `token`.
async fn add_to_cart(
    State(state): State<SharedState>,
    body: std::result::Result<Json<CartRequest>, JsonRejection>,
) -> Result<Json<Envelope>> {
    let Json(request) = body.map_err(|e| Error::MalformedBody(e.body_text()))?;
    let token = Token::from(request.token);

    let cart = state
        .carts
        .add_to_cart(&token, request.id, request.quantity)
        .await?;

    info!(%token, "cart now holds {}", format_line_summary(&cart));
    Ok(Json(Envelope::ok("added to cart")))
}

/// Endpoint: GET /cart/:token
/// Lists the lines of a cart.
async fn cart_lines(
    State(state): State<SharedState>,
    Path(token): Path<String>,
) -> Result<Json<Vec<CartLine>>> {
    let cart = state.carts.load(&Token::from(token)).await?;
    Ok(Json(cart.lines().cloned().collect()))
}
