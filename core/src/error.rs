//! Error taxonomy for the ticket lifecycle.

use crate::types::{PaymentReference, PaymentStatus, TicketCode, TicketId};
use thiserror::Error;

/// Result type alias for lifecycle operations.
pub type Result<T> = std::result::Result<T, TicketError>;

/// Errors surfaced by the lifecycle engine to its callers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TicketError {
    // ═══════════════════════════════════════════════════════════
    // Caller errors
    // ═══════════════════════════════════════════════════════════

    /// Bad or missing input, or an amount that does not match the tier price.
    ///
    /// Raised before any side effect.
    #[error("{message}")]
    Validation {
        /// User-facing reason
        message: String,
    },

    /// Unknown payment reference or ticket code.
    #[error("{resource} not found: {key}")]
    NotFound {
        /// What was looked up
        resource: &'static str,
        /// The key that matched nothing
        key: String,
    },

    /// Gateway says the payment is not complete. The ticket stays `PENDING`
    /// and the caller may retry.
    #[error("payment {reference} not verified (gateway status: {status})")]
    PaymentNotVerified {
        /// Reference that was checked
        reference: PaymentReference,
        /// Status reported by the gateway, or the transport failure
        status: String,
    },

    /// Redemption attempted before payment completed.
    #[error("ticket {ticket_code} is not eligible for entry (payment {payment_status})")]
    NotEligible {
        /// Scanned code
        ticket_code: TicketCode,
        /// Current payment status
        payment_status: PaymentStatus,
    },

    // ═══════════════════════════════════════════════════════════
    // System errors
    // ═══════════════════════════════════════════════════════════

    /// Gateway rejected or failed payment initialization. The pending ticket
    /// created for it has been removed.
    #[error("failed to initialize payment: {reason}")]
    PaymentInit {
        /// Gateway failure description (not user-facing)
        reason: String,
    },

    /// Record store failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl TicketError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a not-found error for a ticket key.
    #[must_use]
    pub fn ticket_not_found(key: impl Into<String>) -> Self {
        Self::NotFound {
            resource: "Ticket",
            key: key.into(),
        }
    }

    /// Returns `true` if this error is due to caller input or business rules
    /// rather than a system fault.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::NotFound { .. }
                | Self::PaymentNotVerified { .. }
                | Self::NotEligible { .. }
        )
    }
}

/// Errors from a [`TicketStore`](crate::providers::TicketStore).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A unique key (ticket code or payment reference) is already taken.
    #[error("unique constraint violated: {key}")]
    Conflict {
        /// Constraint or key that collided
        key: String,
    },

    /// The record addressed by id does not exist.
    #[error("ticket {0} does not exist")]
    Missing(TicketId),

    /// Backend failure (connection, query, decoding).
    #[error("{0}")]
    Backend(String),
}

/// Errors from a [`PaymentGateway`](crate::providers::PaymentGateway).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Gateway answered with an error response.
    #[error("gateway rejected request (status {status}): {message}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Gateway message
        message: String,
    },

    /// Gateway could not be reached.
    #[error("gateway unreachable: {0}")]
    Transport(String),

    /// Gateway credentials are absent or placeholders.
    #[error("gateway not configured: {0}")]
    Misconfigured(String),

    /// Gateway answered with a body we could not interpret.
    #[error("invalid gateway response: {0}")]
    InvalidResponse(String),
}

impl GatewayError {
    /// Whether the gateway could not be consulted at all.
    ///
    /// Only these failures are eligible for the development bypass.
    #[must_use]
    pub const fn is_unreachable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Misconfigured(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_errors() {
        assert!(TicketError::validation("Missing required fields").is_user_error());
        assert!(TicketError::ticket_not_found("abc").is_user_error());
        assert!(
            !TicketError::PaymentInit {
                reason: "boom".to_string()
            }
            .is_user_error()
        );
        assert!(!TicketError::Store(StoreError::Backend("down".to_string())).is_user_error());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            TicketError::validation("Invalid ticket tier").to_string(),
            "Invalid ticket tier"
        );
        assert_eq!(
            TicketError::ticket_not_found("NF-VIP-00000000").to_string(),
            "Ticket not found: NF-VIP-00000000"
        );
    }

    #[test]
    fn test_gateway_unreachable() {
        assert!(GatewayError::Transport("timeout".to_string()).is_unreachable());
        assert!(GatewayError::Misconfigured("no key".to_string()).is_unreachable());
        assert!(
            !GatewayError::Rejected {
                status: 400,
                message: "bad".to_string()
            }
            .is_unreachable()
        );
        assert!(!GatewayError::InvalidResponse("{}".to_string()).is_unreachable());
    }
}
