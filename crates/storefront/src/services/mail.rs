//! Transactional mail API client.
//!
//! Sends the order confirmation mail through an HTTP mail API: a template
//! reference plus a parameter bag, rendered and delivered by the provider.
//! Delivery failures are the caller's to log; checkout never depends on a
//! mail having gone out.

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use thiserror::Error;

use redline_core::Email;

use crate::config::MailConfig;
use crate::orders::Order;

/// Errors that can occur when talking to the mail API.
#[derive(Debug, Error)]
pub enum MailError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Client construction or payload building failed.
    #[error("Mail client error: {0}")]
    Client(String),
}

/// Outgoing message payload: template reference plus parameter bag.
#[derive(Debug, Serialize)]
struct MessageRequest<'a> {
    template: &'a str,
    from: &'a str,
    to: &'a str,
    params: serde_json::Value,
}

/// Mail API client.
#[derive(Clone)]
pub struct MailClient {
    client: reqwest::Client,
    api_url: String,
    from: String,
    order_template: String,
}

impl MailClient {
    /// Create a new mail API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.api_key.expose_secret());
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&auth_value)
                .map_err(|e| MailError::Client(format!("Invalid API key format: {e}")))?,
        );
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_owned(),
            from: config.from.clone(),
            order_template: config.order_template.clone(),
        })
    }

    /// Send the order confirmation mail for a completed order.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or the API rejects the message.
    pub async fn send_order_confirmation(
        &self,
        to: &Email,
        order: &Order,
    ) -> Result<(), MailError> {
        let params = serde_json::json!({
            "ordernumber": order.ordernumber,
            "order": order,
        });

        let body = MessageRequest {
            template: &self.order_template,
            from: &self.from,
            to: to.as_str(),
            params,
        };

        let url = format!("{}/messages", self.api_url);
        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MailError::Api {
                status: status.as_u16(),
                message,
            });
        }

        tracing::info!(ordernumber = %order.ordernumber, "order confirmation mail sent");
        Ok(())
    }
}
