//! Domain models for storefront.

pub mod session;

pub use session::CustomerProfile;
pub use session::keys as session_keys;
