//! Error types for the Paystack client

use nightflix_core::GatewayError;
use thiserror::Error;

/// Errors that can occur when interacting with the Paystack API
#[derive(Debug, Error)]
pub enum PaystackError {
    /// No usable secret key (absent, blank or the sample placeholder)
    #[error("Paystack secret key is not configured")]
    MissingSecretKey,

    /// HTTP request failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Response parsing failed
    #[error("Response parsing failed: {0}")]
    ResponseParseFailed(String),

    /// Unauthorized - invalid secret key
    #[error("Unauthorized - invalid secret key")]
    Unauthorized,

    /// API returned an error status
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from API
        message: String,
    },

    /// API answered 2xx but with `status: false` or without `data`
    #[error("Paystack declined the request: {0}")]
    Declined(String),
}

impl From<PaystackError> for GatewayError {
    fn from(error: PaystackError) -> Self {
        match error {
            PaystackError::MissingSecretKey => {
                Self::Misconfigured("Paystack secret key is not configured".to_string())
            },
            PaystackError::RequestFailed(message) => Self::Transport(message),
            PaystackError::ResponseParseFailed(message) => Self::InvalidResponse(message),
            PaystackError::Unauthorized => Self::Rejected {
                status: 401,
                message: "invalid secret key".to_string(),
            },
            PaystackError::ApiError { status, message } => Self::Rejected { status, message },
            PaystackError::Declined(message) => Self::Rejected {
                status: 200,
                message,
            },
        }
    }
}
