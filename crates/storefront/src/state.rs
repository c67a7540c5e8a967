//! Application state shared across handlers.

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::checkout::{CartStore, CheckoutManager};
use crate::config::StorefrontConfig;
use crate::orders::{MemoryOrderStore, OrderStore};
use crate::services::{MailClient, MailError};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the catalog, the checkout manager, and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Catalog,
    checkout: CheckoutManager,
    orders: Arc<dyn OrderStore>,
    mail: Option<MailClient>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the mail client cannot be constructed from the
    /// configured mail settings.
    pub fn new(config: StorefrontConfig, catalog: Catalog) -> Result<Self, MailError> {
        let orders: Arc<dyn OrderStore> = Arc::new(MemoryOrderStore::default());
        let checkout = CheckoutManager::new(Arc::new(CartStore::default()), orders.clone());

        let mail = config.mail.as_ref().map(MailClient::new).transpose()?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                checkout,
                orders,
                mail,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get a reference to the checkout manager.
    #[must_use]
    pub fn checkout(&self) -> &CheckoutManager {
        &self.inner.checkout
    }

    /// Get a reference to the order store.
    #[must_use]
    pub fn orders(&self) -> &Arc<dyn OrderStore> {
        &self.inner.orders
    }

    /// Get a reference to the mail client, if mail is configured.
    #[must_use]
    pub fn mail(&self) -> Option<&MailClient> {
        self.inner.mail.as_ref()
    }
}
