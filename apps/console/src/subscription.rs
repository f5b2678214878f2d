//! Subscription surface: quota introspection and the checkout relay. The
//! payment provider is opaque; this module only posts redirect targets and
//! hands back the returned URL.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use crate::backend::BackendClient;
use crate::config::Config;
use crate::errors::{ConsoleError, Result};

#[derive(Debug, Clone, Deserialize)]
struct UsageDto {
    #[serde(default)]
    annual_limit: i64,
    #[serde(default)]
    annual_usage_count: i64,
    #[serde(default)]
    remaining: i64,
}

/// Annual match quota as the backend reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageSnapshot {
    pub limit: i64,
    pub used: i64,
    pub remaining: i64,
}

/// Checkout-session creation seam. The HTTP implementation talks to the
/// real provider endpoint; tests substitute their own.
#[async_trait]
pub trait CheckoutProvider: Send + Sync {
    /// Create a session and return the redirect URL the user should be sent
    /// to.
    async fn create_session(&self, success_url: &str, cancel_url: &str) -> Result<String>;
}

#[derive(Debug, Clone, Deserialize)]
struct CheckoutSessionDto {
    url: String,
}

pub struct HttpCheckoutProvider {
    http: reqwest::Client,
    endpoint: Option<String>,
}

impl HttpCheckoutProvider {
    pub fn new(endpoint: Option<String>) -> Self {
        HttpCheckoutProvider {
            http: reqwest::Client::new(),
            endpoint,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.checkout_url.clone())
    }
}

#[async_trait]
impl CheckoutProvider for HttpCheckoutProvider {
    async fn create_session(&self, success_url: &str, cancel_url: &str) -> Result<String> {
        let Some(endpoint) = self.endpoint.as_deref() else {
            return Err(ConsoleError::validation(
                "Checkout is not configured for this deployment.",
            ));
        };
        let response = self
            .http
            .post(endpoint)
            .json(&serde_json::json!({
                "successUrl": success_url,
                "cancelUrl": cancel_url,
            }))
            .send()
            .await?;
        if !response.status().is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ConsoleError::transport(if message.is_empty() {
                "Failed to create checkout session".to_string()
            } else {
                message
            }));
        }
        let session: CheckoutSessionDto = response.json().await?;
        Ok(session.url)
    }
}

/// Where the provider sends the user after checkout, derived from the
/// console's own base URL.
pub fn redirect_targets(app_base_url: &str) -> (String, String) {
    let base = app_base_url.trim_end_matches('/');
    (
        format!("{base}/dashboard?checkout=success"),
        format!("{base}/dashboard"),
    )
}

pub struct SubscriptionService {
    client: BackendClient,
    provider: Arc<dyn CheckoutProvider>,
    app_base_url: String,
}

impl SubscriptionService {
    pub fn new(
        client: BackendClient,
        provider: Arc<dyn CheckoutProvider>,
        app_base_url: impl Into<String>,
    ) -> Self {
        SubscriptionService {
            client,
            provider,
            app_base_url: app_base_url.into(),
        }
    }

    /// Current annual usage. Allowed unauthenticated; pro members have no
    /// quota and skip this entirely.
    pub async fn usage(&self) -> Result<UsageSnapshot> {
        let dto: UsageDto = self.client.get_json("/usage", None).await?;
        Ok(UsageSnapshot {
            limit: dto.annual_limit,
            used: dto.annual_usage_count,
            remaining: dto.remaining,
        })
    }

    /// Start an upgrade checkout and return the provider's redirect URL.
    pub async fn start_checkout(&self) -> Result<String> {
        let (success_url, cancel_url) = redirect_targets(&self.app_base_url);
        let url = self.provider.create_session(&success_url, &cancel_url).await?;
        info!("checkout session created");
        Ok(url)
    }
}
