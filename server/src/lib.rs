//! Nightflix storefront server.
//!
//! Reads configuration from the environment, connects the `PostgreSQL`
//! ticket store, the Paystack gateway and the ticket notifier, and serves
//! the HTTP API.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod app;
pub mod config;
pub mod telemetry;

pub use config::Config;
