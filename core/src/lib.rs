//! # Nightflix Core
//!
//! Ticket lifecycle and payment reconciliation for the Nightflix storefront.
//!
//! This crate holds the domain types, the injected tier catalog, the
//! collaborator traits (record store, payment gateway, notifier) and the
//! [`TicketLifecycle`] engine that drives every ticket through its state
//! machine.
//!
//! ## Core Concepts
//!
//! - **Ticket**: One purchase, carrying a payment status and a venue verification status
//! - **Tier**: What was bought; the [`TierCatalog`] fixes its price and admissions
//! - **Payment reference**: Correlation key shared with the gateway
//! - **Ticket code**: Human-readable code scanned at the venue
//!
//! ## Architecture Principles
//!
//! - Collaborators are injected as trait objects
//! - Status updates are compare-and-swap, so concurrent callers agree on one winner
//! - The ticket email is sent only by the caller that completed the payment
//!
//! ## Example
//!
//! ```ignore
//! use nightflix_core::{LifecycleConfig, PurchaseRequest, TicketLifecycle, TierCatalog};
//!
//! let lifecycle = TicketLifecycle::new(
//!     store,
//!     gateway,
//!     notifier,
//!     TierCatalog::standard(),
//!     LifecycleConfig::for_app_url("https://nightflix.example"),
//! );
//!
//! let receipt = lifecycle
//!     .initialize_purchase(PurchaseRequest {
//!         name: "Ada Obi".into(),
//!         email: "ada@example.com".into(),
//!         phone: "+2348000000000".into(),
//!         tier: "VIP".into(),
//!         amount: 30_000,
//!     })
//!     .await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod catalog;
pub mod environment;
pub mod error;
pub mod lifecycle;
pub mod metrics;
pub mod notice;
pub mod providers;
pub mod types;

pub use catalog::{TierCatalog, TierTerms};
pub use environment::{Clock, IdentityGenerator, RandomIdentities, SystemClock};
pub use error::{GatewayError, Result, StoreError, TicketError};
pub use lifecycle::{LifecycleConfig, TicketLifecycle};
pub use notice::TicketNotice;
pub use providers::{
    CheckoutSession, GatewayVerification, InitializeTransaction, Notifier, PaymentGateway,
    ProviderFuture, TicketStore, TransactionMetadata, UpdateOutcome,
};
pub use types::{
    Buyer, Confirmation, NewTicket, NotificationOutcome, PaymentReference, PaymentStatus,
    PurchaseReceipt, PurchaseRequest, Redemption, Ticket, TicketCode, TicketId, Tier,
    UnknownTier, VerificationStatus,
};
