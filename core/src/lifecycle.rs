//! Ticket lifecycle engine.
//!
//! Drives a ticket through
//! `(PENDING, NOT_VERIFIED) → (COMPLETED, NOT_VERIFIED) → (COMPLETED, VERIFIED)`.
//!
//! The engine holds no mutable state of its own. Every transition is a
//! conditional update on the [`TicketStore`], so any number of engine
//! instances (or concurrent requests on one instance) agree on which caller
//! performed a transition. Only that caller sends the ticket email.

use crate::catalog::{TierCatalog, TierTerms};
use crate::environment::{IdentityGenerator, RandomIdentities};
use crate::error::{Result, StoreError, TicketError};
use crate::metrics;
use crate::notice::TicketNotice;
use crate::providers::{
    InitializeTransaction, Notifier, PaymentGateway, TicketStore, TransactionMetadata,
    UpdateOutcome,
};
use crate::types::{
    Buyer, Confirmation, NewTicket, NotificationOutcome, PaymentReference, PurchaseReceipt,
    PurchaseRequest, Redemption, Ticket, TicketCode, Tier,
};
use std::sync::Arc;
use std::time::Instant;

/// Engine switches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LifecycleConfig {
    /// When `false`, an unreachable or unconfigured gateway is treated as a
    /// successful verification. Development only.
    pub require_gateway_verification: bool,
    /// Enables [`TicketLifecycle::simulate_payment`].
    pub allow_payment_simulation: bool,
    /// Where the gateway redirects the buyer after checkout.
    pub callback_url: String,
    /// Public storefront URL, used for links in the ticket email.
    pub app_url: String,
}

impl LifecycleConfig {
    /// Production defaults for a storefront served at `app_url`.
    ///
    /// The callback URL is `<app_url>/success`.
    #[must_use]
    pub fn for_app_url(app_url: impl Into<String>) -> Self {
        let app_url = app_url.into();
        let callback_url = format!("{}/success", app_url.trim_end_matches('/'));
        Self {
            require_gateway_verification: true,
            allow_payment_simulation: false,
            callback_url,
            app_url,
        }
    }

    /// Set whether gateway verification is mandatory.
    #[must_use]
    pub const fn with_gateway_verification(mut self, required: bool) -> Self {
        self.require_gateway_verification = required;
        self
    }

    /// Set whether simulated payments are accepted.
    #[must_use]
    pub const fn with_payment_simulation(mut self, allowed: bool) -> Self {
        self.allow_payment_simulation = allowed;
        self
    }
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self::for_app_url("http://localhost:3000")
    }
}

/// A purchase request that passed validation.
#[derive(Clone, Debug)]
struct ValidatedPurchase {
    tier: Tier,
    terms: TierTerms,
    amount_minor: u64,
    buyer: Buyer,
}

/// The ticket lifecycle engine.
///
/// Cheap to clone; all collaborators are shared.
#[derive(Clone)]
pub struct TicketLifecycle {
    store: Arc<dyn TicketStore>,
    gateway: Arc<dyn PaymentGateway>,
    notifier: Arc<dyn Notifier>,
    identities: Arc<dyn IdentityGenerator>,
    catalog: TierCatalog,
    config: LifecycleConfig,
}

impl TicketLifecycle {
    /// Create an engine using random ticket codes and payment references.
    #[must_use]
    pub fn new(
        store: Arc<dyn TicketStore>,
        gateway: Arc<dyn PaymentGateway>,
        notifier: Arc<dyn Notifier>,
        catalog: TierCatalog,
        config: LifecycleConfig,
    ) -> Self {
        Self {
            store,
            gateway,
            notifier,
            identities: Arc::new(RandomIdentities),
            catalog,
            config,
        }
    }

    /// Replace the identifier source.
    #[must_use]
    pub fn with_identities(mut self, identities: Arc<dyn IdentityGenerator>) -> Self {
        self.identities = identities;
        self
    }

    /// The tier catalog in force.
    #[must_use]
    pub const fn catalog(&self) -> &TierCatalog {
        &self.catalog
    }

    /// The engine switches in force.
    #[must_use]
    pub const fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// Check that the record store is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::Store`] if the store is unavailable.
    pub async fn check_store(&self) -> Result<()> {
        Ok(self.store.ping().await?)
    }

    // ========================================================================
    // Purchase
    // ========================================================================

    /// Validate a purchase, record a pending ticket and open a gateway
    /// checkout for it.
    ///
    /// # Errors
    ///
    /// - [`TicketError::Validation`] for missing fields, an unknown tier or an
    ///   amount that differs from the tier price. Nothing is stored.
    /// - [`TicketError::PaymentInit`] if the gateway fails. The pending
    ///   ticket is deleted again.
    /// - [`TicketError::Store`] if the ticket cannot be recorded.
    pub async fn initialize_purchase(&self, request: PurchaseRequest) -> Result<PurchaseReceipt> {
        let purchase = match self.validate_purchase(request) {
            Ok(purchase) => purchase,
            Err(error) => {
                metrics::record_purchase("rejected");
                return Err(error);
            },
        };

        let ticket = self.create_pending(&purchase).await?;

        tracing::info!(
            ticket_id = %ticket.id,
            ticket_code = %ticket.ticket_code,
            reference = %ticket.payment_ref,
            tier = %ticket.tier,
            "Pending ticket created"
        );

        let request = InitializeTransaction {
            email: ticket.buyer_email.clone(),
            amount_minor: purchase.amount_minor,
            reference: ticket.payment_ref.clone(),
            metadata: TransactionMetadata {
                ticket_id: ticket.id,
                ticket_code: ticket.ticket_code.clone(),
                tier: ticket.tier,
                name: ticket.buyer_name.clone(),
                phone: ticket.buyer_phone.clone(),
            },
            callback_url: self.config.callback_url.clone(),
        };

        let started = Instant::now();
        let result = self.gateway.initialize(request).await;
        metrics::record_gateway_call("initialize", started.elapsed());

        match result {
            Ok(session) => {
                metrics::record_purchase("initialized");
                tracing::info!(
                    reference = %ticket.payment_ref,
                    ticket_code = %ticket.ticket_code,
                    "Payment initialized"
                );
                Ok(PurchaseReceipt {
                    reference: ticket.payment_ref,
                    checkout_url: session.checkout_url,
                    access_code: session.access_code,
                    ticket_code: ticket.ticket_code,
                })
            },
            Err(error) => {
                metrics::record_purchase("gateway_failed");
                tracing::error!(
                    reference = %ticket.payment_ref,
                    error = %error,
                    "Payment initialization failed, removing pending ticket"
                );
                if let Err(delete_error) = self.store.delete(ticket.id).await {
                    tracing::error!(
                        ticket_id = %ticket.id,
                        error = %delete_error,
                        "Failed to remove pending ticket after gateway failure"
                    );
                }
                Err(TicketError::PaymentInit {
                    reason: error.to_string(),
                })
            },
        }
    }

    fn validate_purchase(&self, request: PurchaseRequest) -> Result<ValidatedPurchase> {
        let PurchaseRequest {
            name,
            email,
            phone,
            tier,
            amount,
        } = request;

        let missing = [&name, &email, &phone, &tier]
            .iter()
            .any(|field| field.trim().is_empty());
        if missing || amount == 0 {
            return Err(TicketError::validation("Missing required fields"));
        }

        let tier = self.catalog.parse_tier(tier.trim())?;
        let terms = self
            .catalog
            .terms_of(tier)
            .ok_or_else(|| TicketError::validation("Invalid ticket tier"))?;

        if amount != terms.price {
            tracing::debug!(%tier, amount, price = terms.price, "Amount does not match tier price");
            return Err(TicketError::validation("Invalid amount for selected tier"));
        }

        let amount_minor = terms
            .price
            .checked_mul(100)
            .ok_or_else(|| TicketError::validation("Invalid amount for selected tier"))?;

        Ok(ValidatedPurchase {
            tier,
            terms,
            amount_minor,
            buyer: Buyer {
                name: name.trim().to_string(),
                email: email.trim().to_string(),
                phone: phone.trim().to_string(),
            },
        })
    }

    fn new_ticket(&self, purchase: &ValidatedPurchase) -> NewTicket {
        NewTicket {
            ticket_code: self.identities.ticket_code(purchase.tier),
            tier: purchase.tier,
            quantity: purchase.terms.quantity,
            buyer: purchase.buyer.clone(),
            amount: purchase.terms.price,
            payment_ref: self.identities.payment_reference(),
        }
    }

    /// Store a pending ticket, regenerating identifiers once on collision.
    async fn create_pending(&self, purchase: &ValidatedPurchase) -> Result<Ticket> {
        match self.store.create(self.new_ticket(purchase)).await {
            Err(StoreError::Conflict { key }) => {
                tracing::warn!(key = %key, "Identifier collision, regenerating");
                Ok(self.store.create(self.new_ticket(purchase)).await?)
            },
            other => Ok(other?),
        }
    }

    // ========================================================================
    // Payment
    // ========================================================================

    /// Reconcile a payment with the gateway and complete the ticket.
    ///
    /// Idempotent: a ticket that is already `COMPLETED` is returned as-is
    /// without consulting the gateway or sending another email.
    ///
    /// # Errors
    ///
    /// - [`TicketError::Validation`] if `reference` is blank.
    /// - [`TicketError::NotFound`] for an unknown reference.
    /// - [`TicketError::PaymentNotVerified`] if the gateway does not report
    ///   success. The ticket stays `PENDING`.
    pub async fn confirm_payment(&self, reference: &str) -> Result<Confirmation> {
        let ticket = self.find_for_payment(reference).await?;

        if ticket.is_paid() {
            metrics::record_payment("duplicate");
            tracing::debug!(reference = %ticket.payment_ref, "Payment already confirmed");
            return Ok(Self::unchanged(ticket));
        }

        self.verify_with_gateway(&ticket.payment_ref).await?;
        self.complete(ticket).await
    }

    /// Mark a ticket paid without consulting the gateway.
    ///
    /// Development aid; same completion and email path as
    /// [`confirm_payment`](Self::confirm_payment).
    ///
    /// # Errors
    ///
    /// - [`TicketError::Validation`] if simulation is disabled or
    ///   `reference` is blank.
    /// - [`TicketError::NotFound`] for an unknown reference.
    pub async fn simulate_payment(&self, reference: &str) -> Result<Confirmation> {
        if !self.config.allow_payment_simulation {
            return Err(TicketError::validation("Payment simulation is disabled"));
        }

        let ticket = self.find_for_payment(reference).await?;

        if ticket.is_paid() {
            metrics::record_payment("duplicate");
            return Ok(Self::unchanged(ticket));
        }

        tracing::warn!(reference = %ticket.payment_ref, "Simulating payment");
        self.complete(ticket).await
    }

    async fn find_for_payment(&self, reference: &str) -> Result<Ticket> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(TicketError::validation("Reference parameter is required"));
        }

        let reference = PaymentReference::from_string(reference);
        self.store
            .find_by_payment_ref(&reference)
            .await?
            .ok_or_else(|| TicketError::ticket_not_found(reference.as_str()))
    }

    /// Ask the gateway whether `reference` is paid.
    async fn verify_with_gateway(&self, reference: &PaymentReference) -> Result<()> {
        let started = Instant::now();
        let result = self.gateway.verify(reference).await;
        metrics::record_gateway_call("verify", started.elapsed());

        match result {
            Ok(verification) if verification.is_success() => Ok(()),
            Ok(verification) => {
                metrics::record_payment("not_verified");
                tracing::info!(
                    reference = %reference,
                    status = %verification.status,
                    "Payment not completed"
                );
                Err(TicketError::PaymentNotVerified {
                    reference: reference.clone(),
                    status: verification.status,
                })
            },
            Err(error) if error.is_unreachable() && !self.config.require_gateway_verification => {
                metrics::record_payment("bypassed");
                tracing::warn!(
                    reference = %reference,
                    error = %error,
                    "Gateway unavailable, treating payment as verified (verification not required)"
                );
                Ok(())
            },
            Err(error) => {
                metrics::record_payment("not_verified");
                tracing::warn!(reference = %reference, error = %error, "Payment verification failed");
                Err(TicketError::PaymentNotVerified {
                    reference: reference.clone(),
                    status: error.to_string(),
                })
            },
        }
    }

    /// Apply `PENDING → COMPLETED` and notify if this call won.
    async fn complete(&self, ticket: Ticket) -> Result<Confirmation> {
        match self.store.complete_payment(ticket.id).await? {
            UpdateOutcome::Applied(ticket) => {
                metrics::record_payment("completed");
                metrics::record_sale(ticket.tier, ticket.quantity, ticket.amount);
                tracing::info!(
                    reference = %ticket.payment_ref,
                    ticket_code = %ticket.ticket_code,
                    tier = %ticket.tier,
                    "Payment completed"
                );

                let notification = self.notify(&ticket).await;
                Ok(Confirmation {
                    ticket,
                    newly_completed: true,
                    notification,
                })
            },
            UpdateOutcome::Unchanged(ticket) => {
                metrics::record_payment("duplicate");
                tracing::debug!(
                    reference = %ticket.payment_ref,
                    "Payment completed by a concurrent request"
                );
                Ok(Self::unchanged(ticket))
            },
        }
    }

    async fn notify(&self, ticket: &Ticket) -> NotificationOutcome {
        let notice = TicketNotice::for_ticket(ticket, &self.config.app_url);
        let sent = self
            .notifier
            .send(&notice.to, &notice.subject, &notice.body)
            .await;
        metrics::record_notification(sent);

        if sent {
            tracing::info!(ticket_code = %ticket.ticket_code, "Ticket email sent");
            NotificationOutcome::Sent
        } else {
            tracing::warn!(ticket_code = %ticket.ticket_code, "Ticket email not sent");
            NotificationOutcome::Failed
        }
    }

    fn unchanged(ticket: Ticket) -> Confirmation {
        Confirmation {
            ticket,
            newly_completed: false,
            notification: NotificationOutcome::NotAttempted,
        }
    }

    // ========================================================================
    // Venue
    // ========================================================================

    /// Admit a ticket at the venue.
    ///
    /// Idempotent: the call that performs the transition gets
    /// `already_verified == false`; every other call gets `true`.
    ///
    /// # Errors
    ///
    /// - [`TicketError::Validation`] if `code` is blank.
    /// - [`TicketError::NotFound`] for an unknown code.
    /// - [`TicketError::NotEligible`] if payment has not completed.
    pub async fn redeem_ticket(&self, code: &str) -> Result<Redemption> {
        let ticket = match self.find_by_code(code).await? {
            Some(ticket) => ticket,
            None => {
                metrics::record_redemption("unknown");
                tracing::info!(ticket_code = %code.trim(), "Unknown ticket code scanned");
                return Err(TicketError::ticket_not_found(code.trim()));
            },
        };

        if !ticket.is_paid() {
            return Err(Self::not_eligible(&ticket));
        }

        if ticket.is_redeemed() {
            metrics::record_redemption("repeat");
            tracing::info!(ticket_code = %ticket.ticket_code, "Ticket already verified");
            return Ok(Redemption {
                ticket,
                already_verified: true,
            });
        }

        match self.store.mark_verified(ticket.id).await? {
            UpdateOutcome::Applied(ticket) => {
                metrics::record_redemption("admitted");
                tracing::info!(
                    ticket_code = %ticket.ticket_code,
                    quantity = ticket.quantity,
                    "Ticket verified"
                );
                Ok(Redemption {
                    ticket,
                    already_verified: false,
                })
            },
            UpdateOutcome::Unchanged(ticket) if ticket.is_redeemed() => {
                metrics::record_redemption("repeat");
                Ok(Redemption {
                    ticket,
                    already_verified: true,
                })
            },
            UpdateOutcome::Unchanged(ticket) => Err(Self::not_eligible(&ticket)),
        }
    }

    fn not_eligible(ticket: &Ticket) -> TicketError {
        metrics::record_redemption("not_eligible");
        tracing::info!(
            ticket_code = %ticket.ticket_code,
            payment_status = %ticket.payment_status,
            "Ticket not eligible for entry"
        );
        TicketError::NotEligible {
            ticket_code: ticket.ticket_code.clone(),
            payment_status: ticket.payment_status,
        }
    }

    /// Read a ticket by code. No side effects.
    ///
    /// # Errors
    ///
    /// - [`TicketError::Validation`] if `code` is blank.
    /// - [`TicketError::Store`] if the store fails.
    pub async fn lookup_ticket(&self, code: &str) -> Result<Option<Ticket>> {
        self.find_by_code(code).await
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Ticket>> {
        let code = code.trim();
        if code.is_empty() {
            return Err(TicketError::validation("Ticket code is required"));
        }
        Ok(self
            .store
            .find_by_code(&TicketCode::from_stored(code))
            .await?)
    }
}

impl std::fmt::Debug for TicketLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TicketLifecycle")
            .field("catalog", &self.catalog)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_url_derived_from_app_url() {
        let config = LifecycleConfig::for_app_url("https://nightflix.example/");
        assert_eq!(config.callback_url, "https://nightflix.example/success");
        assert!(config.require_gateway_verification);
        assert!(!config.allow_payment_simulation);
    }

    #[test]
    fn test_config_switches() {
        let config = LifecycleConfig::default()
            .with_gateway_verification(false)
            .with_payment_simulation(true);
        assert!(!config.require_gateway_verification);
        assert!(config.allow_payment_simulation);
        assert_eq!(config.app_url, "http://localhost:3000");
    }
}
