//! In-memory ticket store for fast, deterministic tests.
//!
//! [`InMemoryTicketStore`] honours the same contract as the `PostgreSQL`
//! store: unique ticket codes and payment references, and conditional
//! status updates that report exactly one `Applied` per transition. All
//! state sits behind one mutex, so each operation is atomic.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Poisoned locks only happen after a test already panicked

use nightflix_core::environment::{Clock, SystemClock};
use nightflix_core::error::StoreError;
use nightflix_core::providers::{ProviderFuture, TicketStore, UpdateOutcome};
use nightflix_core::types::{
    NewTicket, PaymentReference, PaymentStatus, Ticket, TicketCode, TicketId, VerificationStatus,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct StoreState {
    tickets: HashMap<TicketId, Ticket>,
    /// Number of upcoming `create` calls that fail with a conflict
    forced_conflicts: usize,
    unavailable: bool,
    fail_deletes: bool,
}

impl StoreState {
    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable {
            Err(StoreError::Backend("store unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

/// In-memory [`TicketStore`].
///
/// # Example
///
/// ```
/// use nightflix_testing::InMemoryTicketStore;
///
/// let store = InMemoryTicketStore::new();
/// assert!(store.is_empty());
/// ```
#[derive(Clone)]
pub struct InMemoryTicketStore {
    state: Arc<Mutex<StoreState>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryTicketStore {
    /// Create an empty store stamped with wall-clock time.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty store stamped with `clock`.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(Mutex::new(StoreState::default())),
            clock,
        }
    }

    /// Insert a record as-is, bypassing uniqueness checks.
    ///
    /// Useful for seeding tickets in a given state.
    pub fn insert(&self, ticket: Ticket) {
        self.state.lock().unwrap().tickets.insert(ticket.id, ticket);
    }

    /// Make the next `count` calls to `create` fail with a conflict.
    pub fn force_conflicts(&self, count: usize) {
        self.state.lock().unwrap().forced_conflicts = count;
    }

    /// Make every operation fail with a backend error while `true`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.lock().unwrap().unavailable = unavailable;
    }

    /// Make `delete` fail while `true`.
    pub fn fail_deletes(&self, fail: bool) {
        self.state.lock().unwrap().fail_deletes = fail;
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().unwrap().tickets.len()
    }

    /// Whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.lock().unwrap().tickets.is_empty()
    }

    /// Snapshot of a record by id.
    #[must_use]
    pub fn get(&self, id: TicketId) -> Option<Ticket> {
        self.state.lock().unwrap().tickets.get(&id).cloned()
    }

    /// Snapshot of a record by payment reference.
    #[must_use]
    pub fn get_by_reference(&self, reference: &PaymentReference) -> Option<Ticket> {
        self.state
            .lock()
            .unwrap()
            .tickets
            .values()
            .find(|ticket| &ticket.payment_ref == reference)
            .cloned()
    }

    /// Snapshot of every record.
    #[must_use]
    pub fn tickets(&self) -> Vec<Ticket> {
        self.state.lock().unwrap().tickets.values().cloned().collect()
    }

    fn create_sync(&self, new_ticket: NewTicket) -> Result<Ticket, StoreError> {
        let mut state = self.state.lock().unwrap();
        state.check_available()?;

        if state.forced_conflicts > 0 {
            state.forced_conflicts -= 1;
            return Err(StoreError::Conflict {
                key: new_ticket.ticket_code.to_string(),
            });
        }

        for existing in state.tickets.values() {
            if existing.ticket_code == new_ticket.ticket_code {
                return Err(StoreError::Conflict {
                    key: new_ticket.ticket_code.to_string(),
                });
            }
            if existing.payment_ref == new_ticket.payment_ref {
                return Err(StoreError::Conflict {
                    key: new_ticket.payment_ref.to_string(),
                });
            }
        }

        let now = self.clock.now();
        let ticket = Ticket {
            id: TicketId::new(),
            ticket_code: new_ticket.ticket_code,
            tier: new_ticket.tier,
            quantity: new_ticket.quantity,
            buyer_name: new_ticket.buyer.name,
            buyer_email: new_ticket.buyer.email,
            buyer_phone: new_ticket.buyer.phone,
            amount: new_ticket.amount,
            payment_ref: new_ticket.payment_ref,
            payment_status: PaymentStatus::Pending,
            verification_status: VerificationStatus::NotVerified,
            created_at: now,
            updated_at: now,
        };
        state.tickets.insert(ticket.id, ticket.clone());
        Ok(ticket)
    }

    fn find_sync(&self, predicate: impl Fn(&Ticket) -> bool) -> Result<Option<Ticket>, StoreError> {
        let state = self.state.lock().unwrap();
        state.check_available()?;
        Ok(state.tickets.values().find(|ticket| predicate(*ticket)).cloned())
    }

    /// Apply `transition` if `expected` holds, atomically.
    fn update_sync(
        &self,
        id: TicketId,
        expected: impl Fn(&Ticket) -> bool,
        transition: impl Fn(&mut Ticket),
    ) -> Result<UpdateOutcome, StoreError> {
        let now = self.clock.now();
        let mut state = self.state.lock().unwrap();
        state.check_available()?;

        let ticket = state.tickets.get_mut(&id).ok_or(StoreError::Missing(id))?;
        if !expected(ticket) {
            return Ok(UpdateOutcome::Unchanged(ticket.clone()));
        }

        transition(ticket);
        ticket.updated_at = now;
        Ok(UpdateOutcome::Applied(ticket.clone()))
    }
}

impl Default for InMemoryTicketStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryTicketStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryTicketStore")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl TicketStore for InMemoryTicketStore {
    fn create(&self, ticket: NewTicket) -> ProviderFuture<'_, Result<Ticket, StoreError>> {
        Box::pin(async move { self.create_sync(ticket) })
    }

    fn find_by_id(&self, id: TicketId) -> ProviderFuture<'_, Result<Option<Ticket>, StoreError>> {
        Box::pin(async move { self.find_sync(|ticket| ticket.id == id) })
    }

    fn find_by_payment_ref<'a>(
        &'a self,
        reference: &'a PaymentReference,
    ) -> ProviderFuture<'a, Result<Option<Ticket>, StoreError>> {
        Box::pin(async move { self.find_sync(|ticket| &ticket.payment_ref == reference) })
    }

    fn find_by_code<'a>(
        &'a self,
        code: &'a TicketCode,
    ) -> ProviderFuture<'a, Result<Option<Ticket>, StoreError>> {
        Box::pin(async move { self.find_sync(|ticket| &ticket.ticket_code == code) })
    }

    fn complete_payment(&self, id: TicketId) -> ProviderFuture<'_, Result<UpdateOutcome, StoreError>> {
        Box::pin(async move {
            self.update_sync(
                id,
                |ticket| ticket.payment_status == PaymentStatus::Pending,
                |ticket| ticket.payment_status = PaymentStatus::Completed,
            )
        })
    }

    fn mark_verified(&self, id: TicketId) -> ProviderFuture<'_, Result<UpdateOutcome, StoreError>> {
        Box::pin(async move {
            self.update_sync(
                id,
                |ticket| {
                    ticket.payment_status == PaymentStatus::Completed
                        && ticket.verification_status == VerificationStatus::NotVerified
                },
                |ticket| ticket.verification_status = VerificationStatus::Verified,
            )
        })
    }

    fn delete(&self, id: TicketId) -> ProviderFuture<'_, Result<(), StoreError>> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            state.check_available()?;
            if state.fail_deletes {
                return Err(StoreError::Backend("delete failed".to_string()));
            }
            state.tickets.remove(&id);
            Ok(())
        })
    }

    fn ping(&self) -> ProviderFuture<'_, Result<(), StoreError>> {
        Box::pin(async move { self.state.lock().unwrap().check_available() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::test_clock;
    use nightflix_core::types::{Buyer, Tier};

    fn new_ticket(code: &str, reference: &str) -> NewTicket {
        NewTicket {
            ticket_code: TicketCode::from_stored(code),
            tier: Tier::Regular,
            quantity: 1,
            buyer: Buyer {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                phone: "0800".to_string(),
            },
            amount: 5_000,
            payment_ref: PaymentReference::from_string(reference),
        }
    }

    fn store() -> InMemoryTicketStore {
        InMemoryTicketStore::with_clock(Arc::new(test_clock()))
    }

    #[tokio::test]
    async fn test_create_starts_pending() {
        let store = store();
        let ticket = store.create(new_ticket("NF-REG-00000001", "ref-1")).await.unwrap();

        assert_eq!(ticket.payment_status, PaymentStatus::Pending);
        assert_eq!(ticket.verification_status, VerificationStatus::NotVerified);
        assert_eq!(ticket.created_at, test_clock().now());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_unique_code_and_reference() {
        let store = store();
        store.create(new_ticket("NF-REG-00000001", "ref-1")).await.unwrap();

        let same_code = store.create(new_ticket("NF-REG-00000001", "ref-2")).await;
        assert!(matches!(same_code, Err(StoreError::Conflict { .. })));

        let same_ref = store.create(new_ticket("NF-REG-00000002", "ref-1")).await;
        assert!(matches!(same_ref, Err(StoreError::Conflict { .. })));

        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_complete_payment_applies_once() {
        let store = store();
        let ticket = store.create(new_ticket("NF-REG-00000001", "ref-1")).await.unwrap();

        assert!(store.complete_payment(ticket.id).await.unwrap().is_applied());
        let second = store.complete_payment(ticket.id).await.unwrap();
        assert!(!second.is_applied());
        assert_eq!(second.ticket().payment_status, PaymentStatus::Completed);
    }

    #[tokio::test]
    async fn test_mark_verified_requires_payment() {
        let store = store();
        let ticket = store.create(new_ticket("NF-REG-00000001", "ref-1")).await.unwrap();

        let pending = store.mark_verified(ticket.id).await.unwrap();
        assert!(!pending.is_applied());
        assert_eq!(pending.ticket().verification_status, VerificationStatus::NotVerified);

        store.complete_payment(ticket.id).await.unwrap();
        assert!(store.mark_verified(ticket.id).await.unwrap().is_applied());
        assert!(!store.mark_verified(ticket.id).await.unwrap().is_applied());
    }

    #[tokio::test]
    async fn test_missing_record() {
        let store = store();
        let id = TicketId::new();
        assert_eq!(
            store.complete_payment(id).await,
            Err(StoreError::Missing(id))
        );
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let store = store();
        store.force_conflicts(1);
        assert!(store.create(new_ticket("NF-REG-00000001", "ref-1")).await.is_err());
        assert!(store.create(new_ticket("NF-REG-00000001", "ref-1")).await.is_ok());

        store.set_unavailable(true);
        assert!(store.ping().await.is_err());
        store.set_unavailable(false);
        assert!(store.ping().await.is_ok());
    }
}
