//! `PostgreSQL` implementation of [`TicketStore`].

use crate::row::{TICKET_COLUMNS, TicketRow};
use nightflix_core::error::StoreError;
use nightflix_core::providers::{ProviderFuture, TicketStore, UpdateOutcome};
use nightflix_core::types::{NewTicket, PaymentReference, Ticket, TicketCode, TicketId};
use sqlx::PgPool;

/// `PostgreSQL` ticket store.
///
/// Provides persistent ticket storage with database-enforced uniqueness and
/// compare-and-swap status transitions.
#[derive(Clone, Debug)]
pub struct PostgresTicketStore {
    /// `PostgreSQL` connection pool.
    pool: PgPool,
}

impl PostgresTicketStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run database migrations.
    ///
    /// # Errors
    ///
    /// Returns error if migrations fail.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(format!("Migration failed: {e}")))?;
        Ok(())
    }

    async fn insert(&self, ticket: NewTicket) -> Result<Ticket, StoreError> {
        let quantity = i32::try_from(ticket.quantity)
            .map_err(|e| StoreError::Backend(format!("quantity out of range: {e}")))?;
        let amount = i64::try_from(ticket.amount)
            .map_err(|e| StoreError::Backend(format!("amount out of range: {e}")))?;

        let row: TicketRow = sqlx::query_as(&format!(
            r"
            INSERT INTO tickets (
                id, ticket_code, tier, quantity, buyer_name, buyer_email,
                buyer_phone, amount, payment_ref
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {TICKET_COLUMNS}
            "
        ))
        .bind(*TicketId::new().as_uuid())
        .bind(ticket.ticket_code.as_str())
        .bind(ticket.tier.as_str())
        .bind(quantity)
        .bind(&ticket.buyer.name)
        .bind(&ticket.buyer.email)
        .bind(&ticket.buyer.phone)
        .bind(amount)
        .bind(ticket.payment_ref.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    metrics::counter!("nightflix_store_conflicts_total").increment(1);
                    return StoreError::Conflict {
                        key: db_err.constraint().unwrap_or("unique").to_string(),
                    };
                }
            }
            StoreError::Backend(format!("Failed to create ticket: {e}"))
        })?;

        row.try_into()
    }

    async fn find_where(
        &self,
        column: &'static str,
        value: &str,
    ) -> Result<Option<Ticket>, StoreError> {
        let row: Option<TicketRow> = sqlx::query_as(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets WHERE {column} = $1"
        ))
        .bind(value)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(format!("Failed to get ticket: {e}")))?;

        row.map(Ticket::try_from).transpose()
    }

    async fn find_id(&self, id: TicketId) -> Result<Option<Ticket>, StoreError> {
        let row: Option<TicketRow> =
            sqlx::query_as(&format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE id = $1"))
                .bind(*id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| StoreError::Backend(format!("Failed to get ticket: {e}")))?;

        row.map(Ticket::try_from).transpose()
    }

    /// Run a conditional `UPDATE ... RETURNING`; on no match, report the
    /// current row as unchanged.
    async fn transition(
        &self,
        id: TicketId,
        set: &'static str,
        expected: &'static str,
    ) -> Result<UpdateOutcome, StoreError> {
        let updated: Option<TicketRow> = sqlx::query_as(&format!(
            r"
            UPDATE tickets
            SET {set}, updated_at = now()
            WHERE id = $1 AND {expected}
            RETURNING {TICKET_COLUMNS}
            "
        ))
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(format!("Failed to update ticket: {e}")))?;

        if let Some(row) = updated {
            return Ok(UpdateOutcome::Applied(row.try_into()?));
        }

        match self.find_id(id).await? {
            Some(current) => Ok(UpdateOutcome::Unchanged(current)),
            None => Err(StoreError::Missing(id)),
        }
    }
}

impl TicketStore for PostgresTicketStore {
    fn create(&self, ticket: NewTicket) -> ProviderFuture<'_, Result<Ticket, StoreError>> {
        Box::pin(self.insert(ticket))
    }

    fn find_by_id(&self, id: TicketId) -> ProviderFuture<'_, Result<Option<Ticket>, StoreError>> {
        Box::pin(self.find_id(id))
    }

    fn find_by_payment_ref<'a>(
        &'a self,
        reference: &'a PaymentReference,
    ) -> ProviderFuture<'a, Result<Option<Ticket>, StoreError>> {
        Box::pin(self.find_where("payment_ref", reference.as_str()))
    }

    fn find_by_code<'a>(
        &'a self,
        code: &'a TicketCode,
    ) -> ProviderFuture<'a, Result<Option<Ticket>, StoreError>> {
        Box::pin(self.find_where("ticket_code", code.as_str()))
    }

    fn complete_payment(&self, id: TicketId) -> ProviderFuture<'_, Result<UpdateOutcome, StoreError>> {
        Box::pin(self.transition(
            id,
            "payment_status = 'COMPLETED'",
            "payment_status = 'PENDING'",
        ))
    }

    fn mark_verified(&self, id: TicketId) -> ProviderFuture<'_, Result<UpdateOutcome, StoreError>> {
        Box::pin(self.transition(
            id,
            "verification_status = 'VERIFIED'",
            "verification_status = 'NOT_VERIFIED' AND payment_status = 'COMPLETED'",
        ))
    }

    fn delete(&self, id: TicketId) -> ProviderFuture<'_, Result<(), StoreError>> {
        Box::pin(async move {
            sqlx::query("DELETE FROM tickets WHERE id = $1")
                .bind(*id.as_uuid())
                .execute(&self.pool)
                .await
                .map_err(|e| StoreError::Backend(format!("Failed to delete ticket: {e}")))?;

            tracing::debug!(ticket_id = %id, "Ticket deleted");
            Ok(())
        })
    }

    fn ping(&self) -> ProviderFuture<'_, Result<(), StoreError>> {
        Box::pin(async move {
            sqlx::query("SELECT 1")
                .execute(&self.pool)
                .await
                .map_err(|e| StoreError::Backend(format!("Database unavailable: {e}")))?;
            Ok(())
        })
    }
}
