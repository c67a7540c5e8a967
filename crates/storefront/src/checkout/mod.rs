//! Checkout step orchestration.
//!
//! A checkout process over a cart is a fixed registry of named steps:
//! `deliveryaddress` followed by a terminal `confirm` step. Step data can
//! be fetched by name at any time; the one public write path,
//! [`CheckoutManager::submit_delivery_address`], validates the form,
//! commits the address step, and commits the confirm step in the same
//! call. Committing the confirm step finalizes the cart into an order.
//!
//! The forced confirm commit is a single atomic transition here: callers
//! never observe an address-committed-but-unconfirmed checkout on the
//! success path.

mod address;
pub mod cart;

pub use address::{
    AddressField, AddressForm, DeliveryAddress, ValidationErrors, prefill, validate,
};
pub use cart::{Cart, CartLine, CartStore};

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use redline_core::{CartId, Email};

use crate::orders::{NewOrder, Order, OrderItem, OrderStore, OrderStoreError};

/// Errors from checkout orchestration. All are fatal to the request.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The requested step name is not part of the checkout process.
    #[error("unknown checkout step: {0}")]
    UnknownStep(String),

    /// A commit was attempted without an active cart.
    #[error("no active cart for checkout")]
    NoCart,

    /// Step persistence or order creation failed. Not retried.
    #[error("step commit failed: {0}")]
    Commit(String),
}

impl From<OrderStoreError> for CheckoutError {
    fn from(e: OrderStoreError) -> Self {
        Self::Commit(e.to_string())
    }
}

/// The steps of the checkout process, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepName {
    DeliveryAddress,
    Confirm,
}

impl StepName {
    /// All configured steps, in sequence.
    pub const ALL: [Self; 2] = [Self::DeliveryAddress, Self::Confirm];

    /// The step's registry name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DeliveryAddress => "deliveryaddress",
            Self::Confirm => "confirm",
        }
    }

    /// Look a step up by its registry name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == name)
    }
}

/// Where a cart's checkout currently stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckoutStatus {
    #[default]
    NotStarted,
    /// The address step has been fetched and awaits a valid submission.
    AddressPending,
    /// Terminal: both steps committed, order created.
    Confirmed,
}

/// Per-cart checkout state: status plus stored step data and commit flags.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckoutState {
    pub status: CheckoutStatus,
    /// Stored data of the `deliveryaddress` step, if any.
    pub address: Option<DeliveryAddress>,
    pub address_committed: bool,
    pub confirmed: bool,
}

/// Read snapshot of one checkout step: its stored data and committed flag.
#[derive(Debug, Clone)]
pub struct CheckoutStep {
    pub name: StepName,
    /// Opaque stored step data; absent when nothing was committed yet.
    pub data: Option<serde_json::Value>,
    pub committed: bool,
}

/// Outcome of a delivery address submission.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Both steps committed; proceed to payment.
    Completed {
        /// The order created by the confirm commit.
        order: Order,
    },
    /// Validation failed; nothing was committed, re-render the form.
    Invalid(ValidationErrors),
}

/// Drives the checkout process over carts.
#[derive(Clone)]
pub struct CheckoutManager {
    carts: Arc<CartStore>,
    orders: Arc<dyn OrderStore>,
}

impl CheckoutManager {
    /// Create a manager over the given cart and order stores.
    #[must_use]
    pub fn new(carts: Arc<CartStore>, orders: Arc<dyn OrderStore>) -> Self {
        Self { carts, orders }
    }

    /// The cart store driven by this manager.
    #[must_use]
    pub fn carts(&self) -> &Arc<CartStore> {
        &self.carts
    }

    /// Fetch a step of the cart's checkout process by name.
    ///
    /// Fetching the address step of a fresh checkout moves it to
    /// `AddressPending`. Steps can be fetched in any order; no strict
    /// sequencing is enforced.
    ///
    /// # Errors
    ///
    /// `UnknownStep` when the name is not configured, `NoCart` when the
    /// cart does not exist.
    pub async fn step(&self, cart_id: CartId, name: &str) -> Result<CheckoutStep, CheckoutError> {
        let step = StepName::parse(name)
            .ok_or_else(|| CheckoutError::UnknownStep(name.to_owned()))?;

        self.carts
            .update(cart_id, |cart| {
                if step == StepName::DeliveryAddress
                    && cart.checkout.status == CheckoutStatus::NotStarted
                {
                    cart.checkout.status = CheckoutStatus::AddressPending;
                }
                snapshot_step(&cart.checkout, step)
            })
            .await
            .ok_or(CheckoutError::NoCart)
    }

    /// Validate and commit a delivery address submission.
    ///
    /// On validation failure, returns [`SubmitOutcome::Invalid`] and
    /// commits nothing. On success, commits the address step and the
    /// terminal confirm step (payload `true`) as one transition; the
    /// confirm commit creates the order and empties the cart.
    ///
    /// # Errors
    ///
    /// `NoCart` when the cart does not exist, `Commit` when the checkout
    /// was already confirmed or order creation fails.
    pub async fn submit_delivery_address(
        &self,
        cart_id: CartId,
        form: &AddressForm,
    ) -> Result<SubmitOutcome, CheckoutError> {
        let address = match validate(form) {
            Ok(address) => address,
            Err(errors) => {
                tracing::debug!(cart_id = %cart_id, fields = errors.len(), "address form invalid");
                return Ok(SubmitOutcome::Invalid(errors));
            }
        };

        let email = Email::parse(&address.email).map_err(|e| CheckoutError::Commit(e.to_string()))?;

        // Commit the address step and snapshot the order input.
        let new_order = self
            .carts
            .update(cart_id, |cart| {
                if cart.checkout.confirmed {
                    return Err(CheckoutError::Commit(
                        "checkout already confirmed for this cart".to_owned(),
                    ));
                }

                cart.checkout.address = Some(address.clone());
                cart.checkout.address_committed = true;

                Ok(NewOrder {
                    email: email.clone(),
                    delivery_address: address.clone(),
                    items: cart
                        .lines
                        .iter()
                        .map(|line| OrderItem {
                            slug: line.slug.clone(),
                            name: line.name.clone(),
                            quantity: line.quantity,
                            unit_price: line.unit_price,
                        })
                        .collect(),
                    total: cart.total(),
                })
            })
            .await
            .ok_or(CheckoutError::NoCart)??;

        // Confirm commit: order creation is the external side effect of the
        // terminal step. A failure here surfaces as Commit and is not retried.
        let order = self.orders.create(new_order).await?;

        self.carts
            .update(cart_id, |cart| {
                cart.checkout.confirmed = true;
                cart.checkout.status = CheckoutStatus::Confirmed;
                cart.lines.clear();
            })
            .await
            .ok_or(CheckoutError::NoCart)?;

        tracing::info!(cart_id = %cart_id, order_id = %order.id, "checkout confirmed");
        Ok(SubmitOutcome::Completed { order })
    }
}

fn snapshot_step(state: &CheckoutState, step: StepName) -> CheckoutStep {
    let (data, committed) = match step {
        StepName::DeliveryAddress => (
            state
                .address
                .as_ref()
                .and_then(|a| serde_json::to_value(a).ok()),
            state.address_committed,
        ),
        StepName::Confirm => (
            state.confirmed.then(|| serde_json::Value::Bool(true)),
            state.confirmed,
        ),
    };

    CheckoutStep {
        name: step,
        data,
        committed,
    }
}
