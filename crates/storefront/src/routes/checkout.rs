//! Checkout route handlers.
//!
//! The address form is the only substantive checkout step; a successful
//! submission confirms the whole checkout and redirects to payment. The
//! completed page reads the finished order back via the session.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use redline_core::OrderId;

use crate::checkout::{AddressForm, DeliveryAddress, StepName, SubmitOutcome, prefill};
use crate::error::{AppError, Result};
use crate::filters;
use crate::models::{CustomerProfile, session_keys};
use crate::orders::Order;
use crate::routes::cart::{CartView, DEFAULT_CART_NAME, get_or_create_cart_id};
use crate::state::AppState;

/// One validation message for the address form.
#[derive(Clone)]
pub struct FormErrorView {
    pub field: String,
    pub message: String,
}

/// Order display data for templates.
#[derive(Clone)]
pub struct OrderView {
    pub ordernumber: String,
    pub email: String,
    pub name: String,
    pub street: String,
    pub city_line: String,
    pub country_code: String,
    pub items: Vec<OrderItemView>,
    pub total: String,
}

/// Order line display data for templates.
#[derive(Clone)]
pub struct OrderItemView {
    pub name: String,
    pub quantity: u32,
    pub line_price: String,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        let address = &order.delivery_address;
        Self {
            ordernumber: order.ordernumber.clone(),
            email: order.email.to_string(),
            name: format!("{} {}", address.firstname, address.lastname),
            street: address.street.clone(),
            city_line: format!("{} {}", address.zip, address.city),
            country_code: address.country_code.clone(),
            items: order
                .items
                .iter()
                .map(|item| OrderItemView {
                    name: item.name.clone(),
                    quantity: item.quantity,
                    line_price: item.total().to_string(),
                })
                .collect(),
            total: order.total.to_string(),
        }
    }
}

/// Delivery address form template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/address.html")]
pub struct AddressTemplate {
    pub cart: CartView,
    pub values: DeliveryAddress,
    pub errors: Vec<FormErrorView>,
}

/// Payment placeholder template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/payment.html")]
pub struct PaymentTemplate {}

/// Completed order template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/completed.html")]
pub struct CompletedTemplate {
    pub order: OrderView,
}

async fn customer_profile(session: &Session) -> Option<CustomerProfile> {
    session
        .get::<CustomerProfile>(session_keys::CUSTOMER_PROFILE)
        .await
        .ok()
        .flatten()
}

async fn cart_view(state: &AppState, cart_id: redline_core::CartId) -> CartView {
    match state.checkout().carts().get(cart_id).await {
        Some(cart) => CartView::from(&cart),
        None => CartView::empty(),
    }
}

/// Display the delivery address form.
///
/// Stored step data is prefilled from the signed-in customer's profile;
/// fields the user already filled are left untouched.
#[instrument(skip(state, session))]
pub async fn address_page(State(state): State<AppState>, session: Session) -> Result<Response> {
    let cart_id = get_or_create_cart_id(&state, &session, DEFAULT_CART_NAME).await?;

    let step = state
        .checkout()
        .step(cart_id, StepName::DeliveryAddress.as_str())
        .await?;
    let stored: Option<DeliveryAddress> =
        step.data.and_then(|v| serde_json::from_value(v).ok());

    let profile = customer_profile(&session).await;
    let values = prefill(stored.as_ref(), profile.as_ref());

    Ok(AddressTemplate {
        cart: cart_view(&state, cart_id).await,
        values,
        errors: Vec::new(),
    }
    .into_response())
}

/// Handle a delivery address submission.
///
/// A valid submission confirms the checkout (address step plus the terminal
/// confirm step), records the new order ID in the session, kicks off the
/// confirmation mail, and redirects to payment. Validation failures
/// re-render the form with field messages; nothing is committed.
#[instrument(skip(state, session, form))]
pub async fn address_submit(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddressForm>,
) -> Result<Response> {
    let cart_id = get_or_create_cart_id(&state, &session, DEFAULT_CART_NAME).await?;

    // Mirror the GET flow so a direct POST still starts the checkout.
    state
        .checkout()
        .step(cart_id, StepName::DeliveryAddress.as_str())
        .await?;

    match state
        .checkout()
        .submit_delivery_address(cart_id, &form)
        .await?
    {
        SubmitOutcome::Invalid(errors) => {
            let errors = errors
                .iter()
                .map(|(field, message)| FormErrorView {
                    field: field.as_str().to_owned(),
                    message: message.to_owned(),
                })
                .collect();

            Ok(AddressTemplate {
                cart: cart_view(&state, cart_id).await,
                values: form.as_draft(),
                errors,
            }
            .into_response())
        }
        SubmitOutcome::Completed { order } => {
            session
                .insert(session_keys::LAST_ORDER_ID, order.id)
                .await?;

            send_confirmation_mail(&state, order);

            Ok(Redirect::to("/checkout-payment").into_response())
        }
    }
}

/// Fire-and-forget the order confirmation mail.
///
/// Mail failures are logged, never surfaced: the order exists regardless.
fn send_confirmation_mail(state: &AppState, order: Order) {
    let Some(mail) = state.mail().cloned() else {
        return;
    };

    tokio::spawn(async move {
        let to = order.email.clone();
        if let Err(e) = mail.send_order_confirmation(&to, &order).await {
            tracing::warn!(
                error = %e,
                ordernumber = %order.ordernumber,
                "failed to send order confirmation mail"
            );
        }
    });
}

/// Payment placeholder page (the post-checkout redirect target).
#[instrument]
pub async fn payment_page() -> Response {
    PaymentTemplate {}.into_response()
}

/// Display the completed order.
///
/// Reads `last_order_id` from the session; a session without a completed
/// order, or an order ID the store no longer knows, is a 404.
#[instrument(skip(state, session))]
pub async fn completed_page(State(state): State<AppState>, session: Session) -> Result<Response> {
    let order_id: OrderId = session
        .get::<OrderId>(session_keys::LAST_ORDER_ID)
        .await
        .ok()
        .flatten()
        .ok_or_else(|| AppError::NotFound("no completed order in this session".to_string()))?;

    let order = state
        .orders()
        .get(order_id)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .ok_or_else(|| AppError::NotFound(format!("order {order_id}")))?;

    Ok(CompletedTemplate {
        order: OrderView::from(&order),
    }
    .into_response())
}
