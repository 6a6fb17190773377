//! # Nightflix Notify
//!
//! Ticket email delivery.
//!
//! - [`SmtpNotifier`]: sends plain-text mail through an SMTP relay (production)
//! - [`ConsoleNotifier`]: logs the message instead of sending it (development)
//!
//! Both implement [`nightflix_core::Notifier`]. Delivery failures are logged
//! and reported as `false`; they never reach the lifecycle engine as errors.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod console;
pub mod error;
pub mod smtp;

pub use console::ConsoleNotifier;
pub use error::NotifyError;
pub use smtp::{SmtpNotifier, SmtpSettings};
