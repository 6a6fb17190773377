//! Collaborator traits: record store, payment gateway and notifier.
//!
//! The lifecycle engine only talks to these traits. Production
//! implementations live in `nightflix-postgres`, `nightflix-paystack` and
//! `nightflix-notify`; in-memory doubles live in `nightflix-testing`.
//!
//! Note: Methods return boxed futures instead of `async fn` so the traits
//! stay dyn-compatible (object-safe) and can be shared as `Arc<dyn _>`.

use crate::error::{GatewayError, StoreError};
use crate::types::{NewTicket, PaymentReference, Ticket, TicketCode, TicketId, Tier};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

/// Boxed, sendable future returned by collaborator methods.
pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

// ============================================================================
// Record store
// ============================================================================

/// Result of a conditional (compare-and-swap) status update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// This call performed the transition; carries the updated record.
    Applied(Ticket),
    /// The record was not in the expected prior state; carries the current record.
    Unchanged(Ticket),
}

impl UpdateOutcome {
    /// Whether this call performed the transition.
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    /// The record after the update attempt.
    #[must_use]
    pub const fn ticket(&self) -> &Ticket {
        match self {
            Self::Applied(ticket) | Self::Unchanged(ticket) => ticket,
        }
    }

    /// Consume the outcome, returning the record.
    #[must_use]
    pub fn into_ticket(self) -> Ticket {
        match self {
            Self::Applied(ticket) | Self::Unchanged(ticket) => ticket,
        }
    }
}

/// Durable ticket store.
///
/// Implementations must enforce uniqueness of `ticket_code` and
/// `payment_ref` (reporting [`StoreError::Conflict`]) and must make
/// [`complete_payment`](Self::complete_payment) and
/// [`mark_verified`](Self::mark_verified) conditional on the prior status so
/// that exactly one concurrent caller observes `Applied`.
pub trait TicketStore: Send + Sync {
    /// Create a record in `(PENDING, NOT_VERIFIED)`.
    ///
    /// # Errors
    ///
    /// [`StoreError::Conflict`] if the code or reference is taken.
    fn create(&self, ticket: NewTicket) -> ProviderFuture<'_, Result<Ticket, StoreError>>;

    /// Find a record by id.
    ///
    /// # Errors
    ///
    /// Returns error if the backend fails.
    fn find_by_id(&self, id: TicketId) -> ProviderFuture<'_, Result<Option<Ticket>, StoreError>>;

    /// Find a record by payment reference.
    ///
    /// # Errors
    ///
    /// Returns error if the backend fails.
    fn find_by_payment_ref<'a>(
        &'a self,
        reference: &'a PaymentReference,
    ) -> ProviderFuture<'a, Result<Option<Ticket>, StoreError>>;

    /// Find a record by ticket code.
    ///
    /// # Errors
    ///
    /// Returns error if the backend fails.
    fn find_by_code<'a>(
        &'a self,
        code: &'a TicketCode,
    ) -> ProviderFuture<'a, Result<Option<Ticket>, StoreError>>;

    /// Move payment status `PENDING → COMPLETED`, only if currently `PENDING`.
    ///
    /// # Errors
    ///
    /// [`StoreError::Missing`] if the record does not exist.
    fn complete_payment(&self, id: TicketId) -> ProviderFuture<'_, Result<UpdateOutcome, StoreError>>;

    /// Move verification status `NOT_VERIFIED → VERIFIED`, only if currently
    /// `NOT_VERIFIED` and payment is `COMPLETED`.
    ///
    /// # Errors
    ///
    /// [`StoreError::Missing`] if the record does not exist.
    fn mark_verified(&self, id: TicketId) -> ProviderFuture<'_, Result<UpdateOutcome, StoreError>>;

    /// Remove a record. Used only as the compensating action after a failed
    /// payment initialization.
    ///
    /// # Errors
    ///
    /// Returns error if the backend fails.
    fn delete(&self, id: TicketId) -> ProviderFuture<'_, Result<(), StoreError>>;

    /// Check backend connectivity (readiness probes).
    ///
    /// # Errors
    ///
    /// Returns error if the backend is unavailable.
    fn ping(&self) -> ProviderFuture<'_, Result<(), StoreError>>;
}

// ============================================================================
// Payment gateway
// ============================================================================

/// Metadata attached to a gateway transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionMetadata {
    /// Ticket record id
    pub ticket_id: TicketId,
    /// Ticket code
    pub ticket_code: TicketCode,
    /// Tier purchased
    pub tier: Tier,
    /// Buyer name
    pub name: String,
    /// Buyer phone
    pub phone: String,
}

/// Request to open a gateway transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InitializeTransaction {
    /// Buyer email (gateways use it for receipts)
    pub email: String,
    /// Amount in minor currency units
    pub amount_minor: u64,
    /// Our correlation key
    pub reference: PaymentReference,
    /// Ticket metadata
    pub metadata: TransactionMetadata,
    /// Where the gateway sends the buyer after payment
    pub callback_url: String,
}

/// Checkout session opened by the gateway.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Page the buyer is redirected to
    pub checkout_url: String,
    /// Gateway access code for inline checkout
    pub access_code: String,
}

/// Gateway's view of a transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayVerification {
    /// Raw gateway status (`success`, `abandoned`, `failed`, ...)
    pub status: String,
}

impl GatewayVerification {
    /// Status the gateway reports for a paid transaction.
    pub const SUCCESS: &'static str = "success";

    /// Whether the gateway reports the transaction as paid.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == Self::SUCCESS
    }
}

/// Remote payment gateway.
pub trait PaymentGateway: Send + Sync {
    /// Open a transaction and return the checkout session.
    ///
    /// # Errors
    ///
    /// Returns error if the gateway rejects the request or cannot be reached.
    fn initialize(
        &self,
        request: InitializeTransaction,
    ) -> ProviderFuture<'_, Result<CheckoutSession, GatewayError>>;

    /// Look up a transaction by reference.
    ///
    /// # Errors
    ///
    /// Returns error if the gateway rejects the request or cannot be reached.
    fn verify<'a>(
        &'a self,
        reference: &'a PaymentReference,
    ) -> ProviderFuture<'a, Result<GatewayVerification, GatewayError>>;
}

// ============================================================================
// Notifier
// ============================================================================

/// Fire-and-forget message delivery.
///
/// Returns `true` on success. Implementations never propagate failures;
/// they log them and return `false`.
pub trait Notifier: Send + Sync {
    /// Send `body` with `subject` to `to`.
    fn send<'a>(&'a self, to: &'a str, subject: &'a str, body: &'a str) -> ProviderFuture<'a, bool>;
}
