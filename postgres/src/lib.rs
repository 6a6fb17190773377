//! `PostgreSQL` ticket store for the Nightflix storefront.
//!
//! This crate provides [`PostgresTicketStore`], the production implementation
//! of the `TicketStore` trait from `nightflix-core`. It relies on the
//! database for:
//!
//! - Uniqueness of ticket codes and payment references (unique constraints)
//! - Atomic status transitions (`UPDATE ... WHERE <expected status> RETURNING`)
//! - Timestamps (`now()`)
//!
//! # Example
//!
//! ```ignore
//! use nightflix_postgres::PostgresTicketStore;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = sqlx::PgPool::connect("postgres://localhost/nightflix").await?;
//!     let store = PostgresTicketStore::new(pool);
//!     store.migrate().await?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod row;
mod store;

pub use store::PostgresTicketStore;
