//! Domain types for the Nightflix storefront.
//!
//! A [`Ticket`] is the only entity. Its two status fields form a small,
//! strictly monotonic state machine:
//!
//! ```text
//! (PENDING, NOT_VERIFIED) --payment confirmed--> (COMPLETED, NOT_VERIFIED) --redeemed--> (COMPLETED, VERIFIED)
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Store-assigned identifier of a ticket record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(Uuid);

impl TicketId {
    /// Creates a new random `TicketId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `TicketId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TicketId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Venue-scannable ticket code, e.g. `NF-VIP-3FA2B81C`.
///
/// Format: `NF-<3-letter tier prefix>-<8 uppercase hex characters>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketCode(String);

impl TicketCode {
    /// Brand prefix shared by every code.
    pub const BRAND: &'static str = "NF";

    /// Number of hex characters in the random suffix.
    pub const SUFFIX_LEN: usize = 8;

    /// Build a code for `tier` from a random suffix.
    ///
    /// The suffix is truncated to [`Self::SUFFIX_LEN`] characters and uppercased.
    #[must_use]
    pub fn generate(tier: Tier, random_hex: &str) -> Self {
        let suffix: String = random_hex
            .chars()
            .filter(char::is_ascii_hexdigit)
            .take(Self::SUFFIX_LEN)
            .collect::<String>()
            .to_ascii_uppercase();
        Self(format!("{}-{}-{suffix}", Self::BRAND, tier.code_prefix()))
    }

    /// Parse and validate a code.
    ///
    /// Returns `None` when the input does not have the `NF-XXX-XXXXXXXX` shape.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.split('-');
        let (Some(brand), Some(prefix), Some(suffix), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return None;
        };

        let well_formed = brand == Self::BRAND
            && prefix.len() == 3
            && prefix.chars().all(|c| c.is_ascii_uppercase())
            && suffix.len() == Self::SUFFIX_LEN
            && suffix
                .chars()
                .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c));

        well_formed.then(|| Self(raw.to_string()))
    }

    /// Wrap a stored code without validation.
    ///
    /// Used by stores when reading back records they persisted themselves.
    #[must_use]
    pub fn from_stored(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Get the code as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TicketCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Correlation key shared with the payment gateway for one transaction.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentReference(String);

impl PaymentReference {
    /// Creates a new random reference (UUID v4 text).
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wrap an existing reference, e.g. one echoed back by the gateway.
    #[must_use]
    pub fn from_string(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Get the reference as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PaymentReference {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PaymentReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Tiers
// ============================================================================

/// Ticket tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    /// Single general admission
    Regular,
    /// Single VIP admission
    Vip,
    /// Group bundle admitting five
    #[serde(rename = "GANG_OF_5")]
    GangOf5,
}

impl Tier {
    /// All tiers, in catalog display order.
    pub const ALL: [Self; 3] = [Self::Regular, Self::Vip, Self::GangOf5];

    /// Wire name (`REGULAR`, `VIP`, `GANG_OF_5`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Regular => "REGULAR",
            Self::Vip => "VIP",
            Self::GangOf5 => "GANG_OF_5",
        }
    }

    /// First three letters of the wire name, used in ticket codes.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        &self.as_str()[..3]
    }

    /// Human-readable name (`GANG OF 5`).
    #[must_use]
    pub fn display_name(self) -> String {
        self.as_str().replace('_', " ")
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known tier wire name.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown ticket tier: {0}")]
pub struct UnknownTier(pub String);

impl FromStr for Tier {
    type Err = UnknownTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tier| tier.as_str() == s)
            .ok_or_else(|| UnknownTier(s.to_string()))
    }
}

// ============================================================================
// Statuses
// ============================================================================

/// Payment status of a ticket. Moves `Pending → Completed` only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Awaiting gateway confirmation
    Pending,
    /// Gateway confirmed the payment
    Completed,
}

impl PaymentStatus {
    /// Wire name (`PENDING`, `COMPLETED`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "COMPLETED" => Ok(Self::Completed),
            other => Err(format!("unknown payment status: {other}")),
        }
    }
}

/// Venue verification status. Moves `NotVerified → Verified` only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    /// Not yet scanned at the venue
    NotVerified,
    /// Scanned and admitted
    Verified,
}

impl VerificationStatus {
    /// Wire name (`NOT_VERIFIED`, `VERIFIED`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotVerified => "NOT_VERIFIED",
            Self::Verified => "VERIFIED",
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VerificationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NOT_VERIFIED" => Ok(Self::NotVerified),
            "VERIFIED" => Ok(Self::Verified),
            other => Err(format!("unknown verification status: {other}")),
        }
    }
}

// ============================================================================
// Ticket
// ============================================================================

/// Buyer contact details captured at purchase time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buyer {
    /// Attendee name
    pub name: String,
    /// Email the ticket is sent to
    pub email: String,
    /// Phone number
    pub phone: String,
}

/// A purchased (or pending) ticket.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    /// Store-assigned identifier
    pub id: TicketId,
    /// Venue-scannable code
    pub ticket_code: TicketCode,
    /// Purchased tier
    pub tier: Tier,
    /// Admissions covered by this ticket
    pub quantity: u32,
    /// Buyer name
    pub buyer_name: String,
    /// Buyer email
    pub buyer_email: String,
    /// Buyer phone
    pub buyer_phone: String,
    /// Price paid, in major currency units
    pub amount: u64,
    /// Gateway correlation key
    pub payment_ref: PaymentReference,
    /// Payment status
    pub payment_status: PaymentStatus,
    /// Venue verification status
    pub verification_status: VerificationStatus,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    /// Whether the gateway has confirmed payment.
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Completed
    }

    /// Whether the ticket has been admitted at the venue.
    #[must_use]
    pub fn is_redeemed(&self) -> bool {
        self.verification_status == VerificationStatus::Verified
    }

    /// Whether the ticket may be admitted at the venue.
    #[must_use]
    pub fn is_redeemable(&self) -> bool {
        self.is_paid() && !self.is_redeemed()
    }

    /// Buyer contact details.
    #[must_use]
    pub fn buyer(&self) -> Buyer {
        Buyer {
            name: self.buyer_name.clone(),
            email: self.buyer_email.clone(),
            phone: self.buyer_phone.clone(),
        }
    }
}

/// Fields supplied when creating a ticket record.
///
/// The store assigns `id` and timestamps and always starts the record at
/// `(PENDING, NOT_VERIFIED)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewTicket {
    /// Venue-scannable code
    pub ticket_code: TicketCode,
    /// Purchased tier
    pub tier: Tier,
    /// Admissions covered
    pub quantity: u32,
    /// Buyer contact details
    pub buyer: Buyer,
    /// Price, in major currency units
    pub amount: u64,
    /// Gateway correlation key
    pub payment_ref: PaymentReference,
}

// ============================================================================
// Engine inputs and outputs
// ============================================================================

/// Purchase request as submitted by the checkout form.
///
/// Fields are raw: blank strings, a zero amount and unknown tiers are
/// rejected by the lifecycle engine.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PurchaseRequest {
    /// Attendee name
    pub name: String,
    /// Attendee email
    pub email: String,
    /// Attendee phone
    pub phone: String,
    /// Tier wire name
    pub tier: String,
    /// Amount the client expects to pay, in major units
    pub amount: u64,
}

/// Result of a successful purchase initialization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseReceipt {
    /// Payment reference to confirm later
    pub reference: PaymentReference,
    /// Gateway checkout page
    pub checkout_url: String,
    /// Gateway access code
    pub access_code: String,
    /// Code of the pending ticket
    pub ticket_code: TicketCode,
}

/// What happened to the ticket email during confirmation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationOutcome {
    /// No email was attempted (ticket already completed, or another request completed it)
    NotAttempted,
    /// Notifier reported success
    Sent,
    /// Notifier reported failure (logged, not propagated)
    Failed,
}

impl NotificationOutcome {
    /// `Some(true|false)` if an email was attempted.
    #[must_use]
    pub const fn email_sent(self) -> Option<bool> {
        match self {
            Self::NotAttempted => None,
            Self::Sent => Some(true),
            Self::Failed => Some(false),
        }
    }
}

/// Result of confirming a payment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Confirmation {
    /// Ticket after confirmation (always `COMPLETED`)
    pub ticket: Ticket,
    /// `true` only for the call that moved the ticket to `COMPLETED`
    pub newly_completed: bool,
    /// Outcome of the ticket email
    pub notification: NotificationOutcome,
}

/// Result of redeeming a ticket at the venue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Redemption {
    /// Ticket after redemption (always `VERIFIED`)
    pub ticket: Ticket,
    /// `false` only for the call that moved the ticket to `VERIFIED`
    pub already_verified: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_wire_names_round_trip() {
        for tier in Tier::ALL {
            assert_eq!(tier.as_str().parse::<Tier>().unwrap(), tier);
            let json = serde_json::to_string(&tier).unwrap();
            assert_eq!(json, format!("\"{}\"", tier.as_str()));
        }
    }

    #[test]
    fn test_unknown_tier_rejected() {
        assert_eq!(
            "PLATINUM".parse::<Tier>(),
            Err(UnknownTier("PLATINUM".to_string()))
        );
        assert!("regular".parse::<Tier>().is_err());
    }

    #[test]
    fn test_code_prefixes() {
        assert_eq!(Tier::Regular.code_prefix(), "REG");
        assert_eq!(Tier::Vip.code_prefix(), "VIP");
        assert_eq!(Tier::GangOf5.code_prefix(), "GAN");
        assert_eq!(Tier::GangOf5.display_name(), "GANG OF 5");
    }

    #[test]
    fn test_ticket_code_generate_uppercases_and_truncates() {
        let code = TicketCode::generate(Tier::Vip, "3fa2b81c-9d4e-4a51-b0f7-0c1d2e3f4a5b");
        assert_eq!(code.as_str(), "NF-VIP-3FA2B81C");
        assert!(TicketCode::parse(code.as_str()).is_some());
    }

    #[test]
    fn test_ticket_code_parse_rejects_malformed() {
        assert!(TicketCode::parse("NF-VIP-3FA2B81").is_none());
        assert!(TicketCode::parse("NF-VIP-3fa2b81c").is_none());
        assert!(TicketCode::parse("XX-VIP-3FA2B81C").is_none());
        assert!(TicketCode::parse("NF-VI-3FA2B81C").is_none());
        assert!(TicketCode::parse("NF-VIP-3FA2B81C-01").is_none());
        assert!(TicketCode::parse("NF-VIP-3FA2B81G").is_none());
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&VerificationStatus::NotVerified).unwrap(),
            "\"NOT_VERIFIED\""
        );
        assert_eq!("COMPLETED".parse::<PaymentStatus>(), Ok(PaymentStatus::Completed));
        assert!("DONE".parse::<PaymentStatus>().is_err());
    }

    #[test]
    fn test_notification_outcome_email_sent() {
        assert_eq!(NotificationOutcome::NotAttempted.email_sent(), None);
        assert_eq!(NotificationOutcome::Sent.email_sent(), Some(true));
        assert_eq!(NotificationOutcome::Failed.email_sent(), Some(false));
    }
}
