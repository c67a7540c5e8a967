//! Redline Core - Shared types library.
//!
//! This crate provides common domain types used across the Redline Classics
//! components:
//! - `storefront` - Public-facing shop (catalog, checkout)
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no session
//! handling. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, and emails

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
