//! # Nightflix Testing
//!
//! Testing utilities and helpers for the Nightflix storefront.
//!
//! This crate provides:
//! - In-memory implementations of the collaborator traits
//! - Deterministic clock and identifier sources
//! - A harness that wires a [`TicketLifecycle`] to the mocks
//! - Property-based testing strategies
//!
//! ## Example
//!
//! ```ignore
//! use nightflix_testing::{helpers::purchase_request, TestHarness};
//! use nightflix_core::Tier;
//!
//! #[tokio::test]
//! async fn test_purchase_flow() {
//!     let harness = TestHarness::new();
//!     let lifecycle = harness.lifecycle();
//!
//!     let receipt = lifecycle
//!         .initialize_purchase(purchase_request(Tier::Regular))
//!         .await
//!         .unwrap();
//!
//!     assert_eq!(harness.store.len(), 1);
//! }
//! ```

use chrono::{DateTime, Utc};
use nightflix_core::environment::{Clock, IdentityGenerator, RandomIdentities};
use nightflix_core::types::{PaymentReference, TicketCode, Tier};

pub mod payment_mocks;
pub mod store_mocks;

/// Mock implementations of environment traits.
pub mod mocks {
    use super::{
        Clock, DateTime, IdentityGenerator, PaymentReference, RandomIdentities, TicketCode, Tier,
        Utc,
    };
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use nightflix_testing::mocks::FixedClock;
    /// use nightflix_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// Identifier source that hands out queued values first.
    ///
    /// Once a queue is empty it falls back to random identifiers. Queue the
    /// same code twice to provoke a uniqueness conflict.
    #[derive(Debug, Default)]
    pub struct ScriptedIdentities {
        codes: Mutex<VecDeque<String>>,
        references: Mutex<VecDeque<String>>,
    }

    impl ScriptedIdentities {
        /// An empty script (behaves like random identifiers).
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue code suffixes; the tier prefix is applied when handed out.
        #[must_use]
        pub fn with_code_suffixes<I, S>(self, suffixes: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            if let Ok(mut codes) = self.codes.lock() {
                codes.extend(suffixes.into_iter().map(Into::into));
            }
            self
        }

        /// Queue payment references.
        #[must_use]
        pub fn with_references<I, S>(self, references: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            if let Ok(mut queue) = self.references.lock() {
                queue.extend(references.into_iter().map(Into::into));
            }
            self
        }
    }

    impl IdentityGenerator for ScriptedIdentities {
        fn ticket_code(&self, tier: Tier) -> TicketCode {
            let next = self.codes.lock().ok().and_then(|mut codes| codes.pop_front());
            match next {
                Some(suffix) => TicketCode::generate(tier, &suffix),
                None => RandomIdentities.ticket_code(tier),
            }
        }

        fn payment_reference(&self) -> PaymentReference {
            let next = self
                .references
                .lock()
                .ok()
                .and_then(|mut references| references.pop_front());
            next.map_or_else(
                || RandomIdentities.payment_reference(),
                PaymentReference::from_string,
            )
        }
    }
}

/// Test helpers and fixtures.
pub mod helpers {
    use super::mocks::test_clock;
    use super::payment_mocks::{MockPaymentGateway, RecordingNotifier};
    use super::store_mocks::InMemoryTicketStore;
    use super::Clock;
    use nightflix_core::catalog::TierCatalog;
    use nightflix_core::lifecycle::{LifecycleConfig, TicketLifecycle};
    use nightflix_core::types::{
        PaymentReference, PaymentStatus, PurchaseRequest, Ticket, TicketCode, TicketId, Tier,
        VerificationStatus,
    };
    use std::sync::Arc;

    /// Storefront URL used by [`TestHarness`].
    pub const TEST_APP_URL: &str = "https://nightflix.test";

    /// A valid purchase request for `tier` at its standard price.
    #[must_use]
    pub fn purchase_request(tier: Tier) -> PurchaseRequest {
        PurchaseRequest {
            name: "Ada Obi".to_string(),
            email: "ada@example.com".to_string(),
            phone: "+2348000000000".to_string(),
            tier: tier.as_str().to_string(),
            amount: TierCatalog::standard().price_of(tier).unwrap_or_default(),
        }
    }

    /// A stored ticket in the given state, priced from the standard catalog.
    #[must_use]
    pub fn ticket(
        tier: Tier,
        payment_status: PaymentStatus,
        verification_status: VerificationStatus,
    ) -> Ticket {
        let catalog = TierCatalog::standard();
        let id = TicketId::new();
        let now = test_clock().now();
        Ticket {
            id,
            ticket_code: TicketCode::generate(tier, &id.as_uuid().simple().to_string()),
            tier,
            quantity: catalog.quantity_of(tier).unwrap_or(1),
            buyer_name: "Ada Obi".to_string(),
            buyer_email: "ada@example.com".to_string(),
            buyer_phone: "+2348000000000".to_string(),
            amount: catalog.price_of(tier).unwrap_or_default(),
            payment_ref: PaymentReference::new(),
            payment_status,
            verification_status,
            created_at: now,
            updated_at: now,
        }
    }

    /// Lifecycle engine wired to in-memory collaborators.
    ///
    /// The collaborators are public so tests can script them and inspect
    /// what happened.
    #[derive(Clone, Debug)]
    pub struct TestHarness {
        /// Record store
        pub store: Arc<InMemoryTicketStore>,
        /// Payment gateway
        pub gateway: Arc<MockPaymentGateway>,
        /// Notifier
        pub notifier: Arc<RecordingNotifier>,
        /// Engine switches
        pub config: LifecycleConfig,
        /// Tier catalog
        pub catalog: TierCatalog,
    }

    impl TestHarness {
        /// Fresh mocks, standard catalog, production switches.
        #[must_use]
        pub fn new() -> Self {
            Self {
                store: Arc::new(InMemoryTicketStore::with_clock(Arc::new(test_clock()))),
                gateway: Arc::new(MockPaymentGateway::new()),
                notifier: Arc::new(RecordingNotifier::new()),
                config: LifecycleConfig::for_app_url(TEST_APP_URL),
                catalog: TierCatalog::standard(),
            }
        }

        /// Replace the engine switches.
        #[must_use]
        pub fn with_config(mut self, config: LifecycleConfig) -> Self {
            self.config = config;
            self
        }

        /// Replace the tier catalog.
        #[must_use]
        pub fn with_catalog(mut self, catalog: TierCatalog) -> Self {
            self.catalog = catalog;
            self
        }

        /// Build an engine over the harness collaborators.
        #[must_use]
        pub fn lifecycle(&self) -> TicketLifecycle {
            TicketLifecycle::new(
                self.store.clone(),
                self.gateway.clone(),
                self.notifier.clone(),
                self.catalog.clone(),
                self.config.clone(),
            )
        }
    }

    impl Default for TestHarness {
        fn default() -> Self {
            Self::new()
        }
    }

    /// Install a test tracing subscriber honouring `RUST_LOG`.
    ///
    /// Safe to call from every test; only the first call installs.
    pub fn init_test_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }
}

/// Property-based testing strategies using proptest.
pub mod properties {
    use super::Tier;
    use nightflix_core::catalog::TierCatalog;
    use nightflix_core::types::PurchaseRequest;
    use proptest::prelude::*;

    /// Any tier.
    pub fn any_tier() -> impl Strategy<Value = Tier> {
        prop::sample::select(Tier::ALL.to_vec())
    }

    /// Non-blank contact field.
    pub fn contact_field() -> impl Strategy<Value = String> {
        "[A-Za-z][A-Za-z0-9 .@+]{0,30}"
    }

    /// A purchase request that passes validation against the standard catalog.
    pub fn valid_purchase() -> impl Strategy<Value = PurchaseRequest> {
        (any_tier(), contact_field(), contact_field(), contact_field()).prop_map(
            |(tier, name, email, phone)| PurchaseRequest {
                name,
                email,
                phone,
                tier: tier.as_str().to_string(),
                amount: TierCatalog::standard().price_of(tier).unwrap_or_default(),
            },
        )
    }

    /// A tier with a non-zero amount that differs from its standard price.
    pub fn mismatched_amount() -> impl Strategy<Value = (Tier, u64)> {
        (any_tier(), 1u64..1_000_000).prop_filter_map("amount equals price", |(tier, amount)| {
            let price = TierCatalog::standard().price_of(tier)?;
            (amount != price).then_some((tier, amount))
        })
    }
}

// Re-export commonly used items
pub use helpers::{TestHarness, purchase_request};
pub use mocks::{FixedClock, ScriptedIdentities, test_clock};
pub use payment_mocks::{MockPaymentGateway, RecordingNotifier, SentMessage};
pub use store_mocks::InMemoryTicketStore;
