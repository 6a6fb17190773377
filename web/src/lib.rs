//! Axum HTTP surface for the Nightflix storefront.
//!
//! Handlers are thin: they parse the request, call the
//! [`TicketLifecycle`](nightflix_core::TicketLifecycle) and map the result
//! (or [`AppError`]) to JSON.
//!
//! # Request Flow
//!
//! 1. **Correlation middleware** assigns an `X-Correlation-ID` and opens a span
//! 2. **Extract data** from the request (JSON body, query)
//! 3. **Call the lifecycle engine**
//! 4. **Map result** to a camelCase JSON response
//!
//! # Example
//!
//! ```ignore
//! use nightflix_web::{AppState, build_router};
//!
//! let app = build_router(AppState::new(lifecycle));
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::AppError;
pub use extractors::{ApiJson, CorrelationId};
pub use middleware::{CORRELATION_ID_HEADER, correlation_id_layer};
pub use router::build_router;
pub use state::AppState;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
