//! Error types for web handlers.
//!
//! This module bridges lifecycle errors and HTTP responses, implementing
//! Axum's `IntoResponse` trait.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use nightflix_core::TicketError;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Message returned when the gateway has not confirmed a payment.
pub const PAYMENT_NOT_VERIFIED: &str =
    "Payment verification failed. Please ensure payment was completed successfully.";

/// Message returned for unexpected server-side failures.
pub const INTERNAL_ERROR: &str = "Internal server error. Please try again or contact support.";

/// Application error type for web handlers.
///
/// Carries the HTTP status, a user-facing message, a machine-readable code
/// and optional extra body fields. The source error is logged for server
/// errors and never sent to the client.
///
/// # Examples
///
/// ```ignore
/// async fn handler() -> Result<Json<Data>, AppError> {
///     let ticket = lookup(code).await?
///         .ok_or_else(|| AppError::not_found("Invalid ticket code"))?;
///     Ok(Json(ticket))
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Error code (for client error handling)
    code: String,
    /// Extra top-level body fields
    fields: Map<String, Value>,
    /// Internal error (for logging, not exposed to client)
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub fn new(status: StatusCode, message: String, code: String) -> Self {
        Self {
            status,
            message,
            code,
            fields: Map::new(),
            source: None,
        }
    }

    /// Attach the underlying error for logging.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// Add a top-level field to the response body.
    #[must_use]
    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    /// HTTP status of the response.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// User-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Create a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            message.into(),
            "BAD_REQUEST".to_string(),
        )
    }

    /// Create a 404 Not Found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            message.into(),
            "NOT_FOUND".to_string(),
        )
    }

    /// Create a 409 Conflict error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::CONFLICT,
            message.into(),
            "CONFLICT".to_string(),
        )
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            message.into(),
            "INTERNAL_SERVER_ERROR".to_string(),
        )
    }

    /// Create a 503 Service Unavailable error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            message.into(),
            "SERVICE_UNAVAILABLE".to_string(),
        )
    }

    /// The `404 {status: "INVALID"}` answer for an unknown ticket code.
    #[must_use]
    pub fn invalid_ticket_code() -> Self {
        Self::not_found("Invalid ticket code").with_field("status", "INVALID")
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    /// Always `false`.
    success: bool,
    /// Human-readable error message.
    error: String,
    /// Error code (for client error handling).
    code: String,
    /// Endpoint-specific extras (`status`, `paymentStatus`).
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            if let Some(source) = &self.source {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    error = %source,
                    "Internal server error"
                );
            } else {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    "Internal server error"
                );
            }
        }

        let body = ErrorResponse {
            success: false,
            error: self.message,
            code: self.code,
            fields: self.fields,
        };

        (self.status, Json(body)).into_response()
    }
}

/// Convert `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal(INTERNAL_ERROR).with_source(err)
    }
}

/// Malformed or non-JSON request bodies are caller errors.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Rejected request body");
        Self::bad_request("Invalid request body")
    }
}

/// Default mapping of lifecycle errors. Handlers override the not-found
/// message where the endpoint has its own wording.
impl From<TicketError> for AppError {
    fn from(err: TicketError) -> Self {
        match err {
            TicketError::Validation { message } => Self::bad_request(message),
            TicketError::NotFound { .. } => Self::not_found("Ticket not found"),
            TicketError::PaymentNotVerified { .. } => {
                Self::bad_request(PAYMENT_NOT_VERIFIED).with_field("status", "pending")
            },
            TicketError::NotEligible { payment_status, .. } => {
                Self::conflict("Payment not completed")
                    .with_field("paymentStatus", payment_status.as_str())
            },
            TicketError::PaymentInit { .. } => {
                Self::internal("Failed to initialize payment").with_source(anyhow::Error::new(err))
            },
            TicketError::Store(_) => Self::internal(INTERNAL_ERROR).with_source(anyhow::Error::new(err)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use nightflix_core::{PaymentReference, StoreError};

    #[test]
    fn test_error_display() {
        let err = AppError::bad_request("Missing required fields");
        assert_eq!(err.to_string(), "[BAD_REQUEST] Missing required fields");
    }

    #[test]
    fn test_not_verified_maps_to_pending() {
        let err = AppError::from(TicketError::PaymentNotVerified {
            reference: PaymentReference::from_string("ref-1"),
            status: "abandoned".to_string(),
        });
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), PAYMENT_NOT_VERIFIED);
        assert_eq!(err.fields.get("status"), Some(&Value::from("pending")));
    }

    #[test]
    fn test_system_errors_hide_details() {
        let err = AppError::from(TicketError::Store(StoreError::Backend(
            "connection refused".to_string(),
        )));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), INTERNAL_ERROR);
        assert!(err.source.is_some());

        let err = AppError::from(TicketError::PaymentInit {
            reason: "401 invalid key".to_string(),
        });
        assert_eq!(err.message(), "Failed to initialize payment");
    }

    #[test]
    fn test_body_flattens_fields() {
        let body = ErrorResponse {
            success: false,
            error: "Invalid ticket code".to_string(),
            code: "NOT_FOUND".to_string(),
            fields: AppError::invalid_ticket_code().fields,
        };
        let json = serde_json::to_value(body).unwrap();
        assert_eq!(json["status"], "INVALID");
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Invalid ticket code");
    }
}
