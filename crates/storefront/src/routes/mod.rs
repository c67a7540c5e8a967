//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Home page
//! GET  /health                  - Health check
//!
//! # Shop
//! GET  /shop                    - Category listing (?category=, ?page=)
//! GET  /shop/{slug}             - Product detail
//! GET  /search                  - Search page; ?autocomplete=1 returns JSON
//!
//! # Cart
//! GET  /cart                    - Cart page
//! POST /cart/add                - Add a product to the cart
//!
//! # Checkout
//! GET  /checkout-address        - Delivery address form
//! POST /checkout-address        - Submit address; redirects to payment
//! GET  /checkout-payment        - Payment placeholder page
//! GET  /checkout-completed      - Completed order (from session order ID)
//! ```

pub mod cart;
pub mod checkout;
pub mod home;
pub mod products;
pub mod search;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware;
use crate::state::AppState;

/// Create the shop routes router.
pub fn shop_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::listing))
        .route("/{slug}", get(products::detail))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Shop routes
        .nest("/shop", shop_routes())
        .route("/search", get(search::search))
        // Cart routes
        .nest("/cart", cart_routes())
        // Checkout
        .route(
            "/checkout-address",
            get(checkout::address_page).post(checkout::address_submit),
        )
        .route("/checkout-payment", get(checkout::payment_page))
        .route("/checkout-completed", get(checkout::completed_page))
}

/// Build the full application: routes, session layer, and state.
///
/// Shared between `main` and the route-level tests.
pub fn app(state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(state.config());

    routes().layer(session_layer).with_state(state)
}
