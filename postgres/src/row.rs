//! Row mapping for the `tickets` table.

use chrono::{DateTime, Utc};
use nightflix_core::error::StoreError;
use nightflix_core::types::{PaymentReference, Ticket, TicketCode, TicketId};
use uuid::Uuid;

/// Column list shared by every query returning a ticket.
pub(crate) const TICKET_COLUMNS: &str = "id, ticket_code, tier, quantity, buyer_name, buyer_email, \
     buyer_phone, amount, payment_ref, payment_status, verification_status, created_at, updated_at";

/// Raw `tickets` row.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct TicketRow {
    pub id: Uuid,
    pub ticket_code: String,
    pub tier: String,
    pub quantity: i32,
    pub buyer_name: String,
    pub buyer_email: String,
    pub buyer_phone: String,
    pub amount: i64,
    pub payment_ref: String,
    pub payment_status: String,
    pub verification_status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<TicketRow> for Ticket {
    type Error = StoreError;

    fn try_from(row: TicketRow) -> Result<Self, Self::Error> {
        let corrupt = |column: &str, detail: String| {
            StoreError::Backend(format!("invalid {column} for ticket {}: {detail}", row.id))
        };

        Ok(Self {
            id: TicketId::from_uuid(row.id),
            tier: row
                .tier
                .parse()
                .map_err(|e: nightflix_core::types::UnknownTier| corrupt("tier", e.to_string()))?,
            quantity: u32::try_from(row.quantity)
                .map_err(|e| corrupt("quantity", e.to_string()))?,
            amount: u64::try_from(row.amount).map_err(|e| corrupt("amount", e.to_string()))?,
            payment_status: row
                .payment_status
                .parse()
                .map_err(|e| corrupt("payment_status", e))?,
            verification_status: row
                .verification_status
                .parse()
                .map_err(|e| corrupt("verification_status", e))?,
            ticket_code: TicketCode::from_stored(row.ticket_code),
            payment_ref: PaymentReference::from_string(row.payment_ref),
            buyer_name: row.buyer_name,
            buyer_email: row.buyer_email,
            buyer_phone: row.buyer_phone,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
