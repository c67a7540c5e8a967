//! Cart route handlers.
//!
//! Cart IDs are stored in the session, keyed by cart name, and mapped to
//! records in the in-memory cart store. The session helpers here give the
//! rest of the storefront get-or-create cart semantics.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use redline_core::CartId;

use crate::checkout::{Cart, CartLine};
use crate::error::{AppError, Result};
use crate::filters;
use crate::models::session_keys;
use crate::state::AppState;

/// Name of the storefront's single shopping cart.
pub const DEFAULT_CART_NAME: &str = "cart";

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub slug: String,
    pub name: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: String,
    pub item_count: u32,
}

impl CartView {
    /// Create an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: "$0.00".to_string(),
            item_count: 0,
        }
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart
                .lines
                .iter()
                .map(|line| CartItemView {
                    slug: line.slug.clone(),
                    name: line.name.clone(),
                    quantity: line.quantity,
                    price: line.unit_price.to_string(),
                    line_price: line.total().to_string(),
                })
                .collect(),
            total: cart.total().to_string(),
            item_count: cart.item_count(),
        }
    }
}

// =============================================================================
// Session Helpers
// =============================================================================

fn session_key(name: &str) -> String {
    format!("{}:{name}", session_keys::CART_ID_PREFIX)
}

/// Get the cart ID stored in the session for the given cart name.
pub async fn cart_id_from_session(session: &Session, name: &str) -> Option<CartId> {
    session
        .get::<CartId>(&session_key(name))
        .await
        .ok()
        .flatten()
}

/// Get the session's cart for the given name, creating one if absent.
///
/// The returned ID is stable for the session: two calls with the same name
/// resolve to the same cart, never two separate ones.
///
/// # Errors
///
/// Returns an error when the session cannot be written.
pub async fn get_or_create_cart_id(
    state: &AppState,
    session: &Session,
    name: &str,
) -> Result<CartId> {
    if let Some(id) = cart_id_from_session(session, name).await {
        // A session can outlive the in-memory store across restarts.
        if state.checkout().carts().contains(id).await {
            return Ok(id);
        }
    }

    let id = state.checkout().carts().create(name).await;
    session.insert(&session_key(name), id).await?;
    Ok(id)
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub slug: String,
    pub quantity: Option<u32>,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
}

/// Display cart page.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Response {
    let cart = match cart_id_from_session(&session, DEFAULT_CART_NAME).await {
        Some(cart_id) => match state.checkout().carts().get(cart_id).await {
            Some(cart) => CartView::from(&cart),
            None => CartView::empty(),
        },
        None => CartView::empty(),
    };

    CartShowTemplate { cart }.into_response()
}

/// Add a catalog product to the cart.
///
/// Creates the cart on first use, then redirects back to the cart page.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let product = state
        .catalog()
        .by_slug(&form.slug)
        .ok_or_else(|| AppError::NotFound(format!("product {}", form.slug)))?;

    let quantity = form.quantity.unwrap_or(1).max(1);
    let line = CartLine {
        slug: product.slug.clone(),
        name: product.name.clone(),
        quantity,
        unit_price: product.price,
    };

    let cart_id = get_or_create_cart_id(&state, &session, DEFAULT_CART_NAME).await?;
    state
        .checkout()
        .carts()
        .add_line(cart_id, line)
        .await
        .ok_or(AppError::Checkout(crate::checkout::CheckoutError::NoCart))?;

    Ok(Redirect::to("/cart").into_response())
}
