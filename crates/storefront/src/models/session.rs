//! Session-related types.
//!
//! Types and keys for values carried in the tower-sessions session.

use serde::{Deserialize, Serialize};

/// The signed-in customer's stored profile fields.
///
/// Read-only from the storefront's perspective; used only to prefill
/// otherwise-empty checkout form fields. Every field is optional because
/// profiles are filled in over time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub email: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub street: Option<String>,
    pub zip: Option<String>,
    pub city: Option<String>,
    #[serde(rename = "countryCode")]
    pub country_code: Option<String>,
}

/// Session keys for storefront data.
pub mod keys {
    /// Prefix for per-name cart IDs; the full key is `cart_id:<name>`.
    pub const CART_ID_PREFIX: &str = "cart_id";

    /// Key for the ID of the most recently completed order.
    pub const LAST_ORDER_ID: &str = "last_order_id";

    /// Key for the signed-in customer's profile.
    pub const CUSTOMER_PROFILE: &str = "customer_profile";
}
