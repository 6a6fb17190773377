//! Environment traits: time and identifier generation.
//!
//! Both are injected so tests can run deterministically.

use crate::types::{PaymentReference, TicketCode, Tier};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Clock trait - abstracts time operations for testability
///
/// # Examples
///
/// ```
/// use nightflix_core::environment::{Clock, SystemClock};
///
/// let clock = SystemClock;
/// let now = clock.now();
/// assert!(now <= chrono::Utc::now());
/// ```
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Source of ticket codes and payment references.
pub trait IdentityGenerator: Send + Sync {
    /// A fresh ticket code for `tier`.
    fn ticket_code(&self, tier: Tier) -> TicketCode;

    /// A fresh payment reference.
    fn payment_reference(&self) -> PaymentReference;
}

/// UUID v4 backed identifiers.
///
/// The code suffix is the first 8 hex characters of a v4 UUID; collisions
/// are rare and handled by the store's unique constraint.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomIdentities;

impl IdentityGenerator for RandomIdentities {
    fn ticket_code(&self, tier: Tier) -> TicketCode {
        TicketCode::generate(tier, &Uuid::new_v4().simple().to_string())
    }

    fn payment_reference(&self) -> PaymentReference {
        PaymentReference::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_codes_are_well_formed() {
        let ids = RandomIdentities;
        for tier in Tier::ALL {
            let code = ids.ticket_code(tier);
            assert!(TicketCode::parse(code.as_str()).is_some(), "bad code {code}");
            assert!(code.as_str().starts_with(&format!("NF-{}-", tier.code_prefix())));
        }
    }

    #[test]
    fn test_random_references_differ() {
        let ids = RandomIdentities;
        assert_ne!(ids.payment_reference(), ids.payment_reference());
    }
}
