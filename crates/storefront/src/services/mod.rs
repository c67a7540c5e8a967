//! Outbound service clients for storefront.
//!
//! # Services
//!
//! - `mail` - Transactional mail (order confirmation)

pub mod mail;

pub use mail::{MailClient, MailError};
