//! Paystack API client implementation

use crate::error::PaystackError;
use crate::types::{Envelope, InitializeData, InitializeRequest, VerifyData};
use nightflix_core::error::GatewayError;
use nightflix_core::providers::{
    CheckoutSession, GatewayVerification, InitializeTransaction, PaymentGateway, ProviderFuture,
};
use nightflix_core::types::PaymentReference;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Client settings.
#[derive(Clone)]
pub struct PaystackSettings {
    /// Secret key; `None` yields a client whose calls fail as misconfigured
    pub secret_key: Option<String>,
    /// API base URL
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl PaystackSettings {
    /// Production API endpoint.
    pub const DEFAULT_BASE_URL: &'static str = "https://api.paystack.co";

    /// Default per-request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Sample key shipped in `.env` templates; treated as absent.
    pub const PLACEHOLDER_KEY: &'static str = "sk_test_your_secret_key";

    /// Settings for the production endpoint with `secret_key`.
    #[must_use]
    pub fn with_secret_key(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: Some(secret_key.into()),
            ..Self::default()
        }
    }

    /// Use another base URL (sandbox proxy, mock server).
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The key, unless it is absent, blank or the placeholder.
    fn usable_key(&self) -> Option<&str> {
        self.secret_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && *key != Self::PLACEHOLDER_KEY)
    }
}

impl Default for PaystackSettings {
    fn default() -> Self {
        Self {
            secret_key: None,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }
}

impl std::fmt::Debug for PaystackSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaystackSettings")
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Paystack API client
#[derive(Clone)]
pub struct PaystackClient {
    client: Client,
    secret_key: Option<String>,
    api_url: String,
}

impl PaystackClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns `PaystackError::RequestFailed` if the HTTP client cannot be built.
    pub fn new(settings: PaystackSettings) -> Result<Self, PaystackError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| PaystackError::RequestFailed(e.to_string()))?;

        let secret_key = settings.usable_key().map(str::to_string);
        if secret_key.is_none() {
            tracing::warn!("Paystack secret key not configured; gateway calls will fail");
        }

        Ok(Self {
            client,
            secret_key,
            api_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Whether a usable secret key is configured.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.secret_key.is_some()
    }

    /// Open a transaction
    ///
    /// # Errors
    ///
    /// Returns errors for a missing key, network failures, API errors, or
    /// parsing failures
    pub async fn initialize_transaction(
        &self,
        request: &InitializeTransaction,
    ) -> Result<CheckoutSession, PaystackError> {
        let secret_key = self.secret_key()?;

        let response = self
            .client
            .post(format!("{}/transaction/initialize", self.api_url))
            .bearer_auth(secret_key)
            .json(&InitializeRequest::from(request))
            .send()
            .await
            .map_err(|e| PaystackError::RequestFailed(e.to_string()))?;

        let data: InitializeData = Self::read_envelope(response).await?;

        Ok(CheckoutSession {
            checkout_url: data.authorization_url,
            access_code: data.access_code,
        })
    }

    /// Look up a transaction
    ///
    /// # Errors
    ///
    /// Returns errors for a missing key, network failures, API errors, or
    /// parsing failures
    pub async fn verify_transaction(
        &self,
        reference: &PaymentReference,
    ) -> Result<GatewayVerification, PaystackError> {
        let secret_key = self.secret_key()?;

        let response = self
            .client
            .get(format!("{}/transaction/verify/{reference}", self.api_url))
            .bearer_auth(secret_key)
            .send()
            .await
            .map_err(|e| PaystackError::RequestFailed(e.to_string()))?;

        let data: VerifyData = Self::read_envelope(response).await?;

        Ok(GatewayVerification {
            status: data.status,
        })
    }

    fn secret_key(&self) -> Result<&str, PaystackError> {
        self.secret_key
            .as_deref()
            .ok_or(PaystackError::MissingSecretKey)
    }

    async fn read_envelope<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, PaystackError> {
        match response.status() {
            status if status.is_success() => {
                let envelope = response
                    .json::<Envelope<T>>()
                    .await
                    .map_err(|e| PaystackError::ResponseParseFailed(e.to_string()))?;

                match envelope.data {
                    Some(data) if envelope.status => Ok(data),
                    _ => Err(PaystackError::Declined(envelope.message)),
                }
            },
            StatusCode::UNAUTHORIZED => Err(PaystackError::Unauthorized),
            status => {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<Envelope<serde_json::Value>>(&body)
                    .map(|envelope| envelope.message)
                    .unwrap_or(body);
                Err(PaystackError::ApiError {
                    status: status.as_u16(),
                    message,
                })
            },
        }
    }
}

impl std::fmt::Debug for PaystackClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaystackClient")
            .field("api_url", &self.api_url)
            .field("configured", &self.is_configured())
            .finish_non_exhaustive()
    }
}

impl PaymentGateway for PaystackClient {
    fn initialize(
        &self,
        request: InitializeTransaction,
    ) -> ProviderFuture<'_, Result<CheckoutSession, GatewayError>> {
        Box::pin(async move {
            self.initialize_transaction(&request).await.map_err(|error| {
                tracing::error!(reference = %request.reference, error = %error, "Paystack initialize failed");
                GatewayError::from(error)
            })
        })
    }

    fn verify<'a>(
        &'a self,
        reference: &'a PaymentReference,
    ) -> ProviderFuture<'a, Result<GatewayVerification, GatewayError>> {
        Box::pin(async move {
            self.verify_transaction(reference).await.map_err(|error| {
                tracing::warn!(reference = %reference, error = %error, "Paystack verify failed");
                GatewayError::from(error)
            })
        })
    }
}
