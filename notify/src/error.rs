//! Email delivery errors.

use thiserror::Error;

/// Errors raised while building or sending a ticket email.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Sender or recipient address could not be parsed.
    #[error("invalid email address {address:?}: {reason}")]
    InvalidAddress {
        /// The offending address
        address: String,
        /// Parser message
        reason: String,
    },

    /// The message could not be assembled.
    #[error("failed to build email: {0}")]
    Build(String),

    /// The SMTP relay could not be configured or refused the message.
    #[error("SMTP transport error: {0}")]
    Transport(String),
}
