//! HTTP request handlers.
//!
//! This module contains all HTTP handlers organized by domain.

pub mod health;
pub mod tickets;
pub mod tiers;

pub use health::{health_check, readiness_check};
