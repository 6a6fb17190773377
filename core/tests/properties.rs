//! Property tests for purchase validation and state monotonicity.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect

use nightflix_core::{
    PaymentStatus, PurchaseRequest, Ticket, TicketCode, TicketError, TierCatalog,
    VerificationStatus,
};
use nightflix_testing::TestHarness;
use nightflix_testing::properties::{any_tier, mismatched_amount, valid_purchase};
use nightflix_testing::purchase_request;
use proptest::prelude::*;

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime should build")
        .block_on(future)
}

#[derive(Clone, Copy, Debug)]
enum Step {
    ConfirmPaid,
    ConfirmUnpaid,
    Redeem,
    Lookup,
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        Just(Step::ConfirmPaid),
        Just(Step::ConfirmUnpaid),
        Just(Step::Redeem),
        Just(Step::Lookup),
    ]
}

/// Position of a ticket in the state machine.
fn rank(ticket: &Ticket) -> u8 {
    match (ticket.payment_status, ticket.verification_status) {
        (PaymentStatus::Pending, VerificationStatus::NotVerified) => 0,
        (PaymentStatus::Completed, VerificationStatus::NotVerified) => 1,
        (PaymentStatus::Completed, VerificationStatus::Verified) => 2,
        (PaymentStatus::Pending, VerificationStatus::Verified) => u8::MAX,
    }
}

proptest! {
    #[test]
    fn prop_mismatched_amount_creates_nothing((tier, amount) in mismatched_amount()) {
        let harness = TestHarness::new();
        let request = PurchaseRequest { amount, ..purchase_request(tier) };

        let result = block_on(harness.lifecycle().initialize_purchase(request));

        prop_assert_eq!(result, Err(TicketError::validation("Invalid amount for selected tier")));
        prop_assert!(harness.store.is_empty());
        prop_assert_eq!(harness.gateway.initialize_calls(), 0);
    }

    #[test]
    fn prop_valid_purchase_creates_well_formed_pending_ticket(request in valid_purchase()) {
        let harness = TestHarness::new();

        let receipt = block_on(harness.lifecycle().initialize_purchase(request.clone())).unwrap();
        let stored = harness.store.get_by_reference(&receipt.reference).unwrap();
        let catalog = TierCatalog::standard();

        prop_assert!(TicketCode::parse(stored.ticket_code.as_str()).is_some());
        let prefix = format!("NF-{}-", stored.tier.code_prefix());
        prop_assert!(stored.ticket_code.as_str().starts_with(&prefix));
        prop_assert_eq!(stored.tier.as_str(), request.tier.as_str());
        prop_assert_eq!(Some(stored.quantity), catalog.quantity_of(stored.tier));
        prop_assert_eq!(Some(stored.amount), catalog.price_of(stored.tier));
        prop_assert_eq!(stored.payment_status, PaymentStatus::Pending);
        prop_assert_eq!(stored.verification_status, VerificationStatus::NotVerified);
    }

    #[test]
    fn prop_statuses_never_regress(tier in any_tier(), steps in prop::collection::vec(step(), 1..24)) {
        let harness = TestHarness::new();
        let lifecycle = harness.lifecycle();
        let receipt = block_on(lifecycle.initialize_purchase(purchase_request(tier))).unwrap();
        let reference = receipt.reference.as_str();
        let code = receipt.ticket_code.as_str();

        let mut previous = 0;
        for step in steps {
            match step {
                Step::ConfirmPaid => {
                    harness.gateway.verify_status("success");
                    block_on(lifecycle.confirm_payment(reference)).unwrap();
                },
                Step::ConfirmUnpaid => {
                    harness.gateway.verify_status("abandoned");
                    let _ = block_on(lifecycle.confirm_payment(reference));
                },
                Step::Redeem => {
                    let _ = block_on(lifecycle.redeem_ticket(code));
                },
                Step::Lookup => {
                    block_on(lifecycle.lookup_ticket(code)).unwrap();
                },
            }

            let current = rank(&harness.store.get_by_reference(&receipt.reference).unwrap());
            prop_assert!(current <= 2, "verified without payment");
            prop_assert!(current >= previous, "status regressed from {} to {}", previous, current);
            previous = current;
        }

        prop_assert!(harness.notifier.attempts() <= 1);
    }
}
