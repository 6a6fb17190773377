//! # Paystack Client
//!
//! Client for the two Paystack endpoints the storefront needs:
//! transaction initialization and transaction verification.
//!
//! ## Example
//!
//! ```no_run
//! use nightflix_paystack::{PaystackClient, PaystackSettings};
//! use nightflix_core::PaymentReference;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = PaystackClient::new(PaystackSettings::with_secret_key("sk_test_abc"))?;
//!
//!     let verification = client
//!         .verify_transaction(&PaymentReference::from_string("3f1c..."))
//!         .await?;
//!
//!     println!("Paystack says: {}", verification.status);
//!     Ok(())
//! }
//! ```
//!
//! [`PaystackClient`] implements [`nightflix_core::PaymentGateway`]; its
//! errors are mapped onto [`nightflix_core::GatewayError`] so the lifecycle
//! engine can tell an unreachable gateway from a rejected payment.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod error;
pub mod types;

pub use client::{PaystackClient, PaystackSettings};
pub use error::PaystackError;
