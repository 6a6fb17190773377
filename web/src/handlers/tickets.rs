//! Ticket purchase, payment confirmation and venue endpoints.
//!
//! All routes live under `/api/tickets`:
//!
//! ```text
//! POST /purchase           start a purchase, returns the checkout URL
//! GET  /confirm?reference  reconcile the payment with the gateway
//! GET  /simulate?reference mark paid without the gateway (when enabled)
//! POST /redeem             admit a ticket at the venue
//! GET  /lookup?code        read a ticket
//! ```

use crate::error::AppError;
use crate::extractors::{ApiJson, CorrelationId};
use crate::state::AppState;
use crate::WebResult;
use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use nightflix_core::{
    Confirmation, PaymentStatus, PurchaseReceipt, PurchaseRequest, Ticket, TicketCode,
    TicketError, TicketId, Tier, VerificationStatus,
};
use serde::{Deserialize, Serialize};

// ============================================================================
// Request types
// ============================================================================

/// `?reference=` query.
#[derive(Debug, Default, Deserialize)]
pub struct ReferenceQuery {
    /// Payment reference
    pub reference: Option<String>,
}

/// `?code=` query.
#[derive(Debug, Default, Deserialize)]
pub struct CodeQuery {
    /// Ticket code
    pub code: Option<String>,
}

/// Venue scan body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RedeemRequest {
    /// Scanned ticket code
    pub ticket_code: String,
}

// ============================================================================
// Response types
// ============================================================================

/// Successful purchase initialization.
#[derive(Debug, Serialize)]
pub struct PurchaseResponse {
    /// Always `true`
    pub success: bool,
    /// Reference, checkout URL, access code and ticket code
    #[serde(flatten)]
    pub receipt: PurchaseReceipt,
}

/// Confirmed payment.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmResponse {
    /// Always `true`
    pub success: bool,
    /// The completed ticket
    pub ticket: Ticket,
    /// Present only when this request sent the ticket email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_sent: Option<bool>,
}

impl From<Confirmation> for ConfirmResponse {
    fn from(confirmation: Confirmation) -> Self {
        Self {
            success: true,
            email_sent: confirmation.notification.email_sent(),
            ticket: confirmation.ticket,
        }
    }
}

/// Simulated payment.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateResponse {
    /// Always `true`
    pub success: bool,
    /// Fixed confirmation text
    pub message: &'static str,
    /// The completed ticket
    pub ticket: Ticket,
    /// Present only when this request sent the ticket email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_sent: Option<bool>,
    /// Where the storefront should send the buyer next
    pub redirect_to: String,
}

/// Ticket as shown to venue staff after a scan.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemedTicketView {
    id: TicketId,
    ticket_code: TicketCode,
    tier: Tier,
    quantity: u32,
    buyer_name: String,
    buyer_email: String,
    verification_status: VerificationStatus,
    verified_at: DateTime<Utc>,
}

impl From<Ticket> for RedeemedTicketView {
    fn from(ticket: Ticket) -> Self {
        Self {
            id: ticket.id,
            ticket_code: ticket.ticket_code,
            tier: ticket.tier,
            quantity: ticket.quantity,
            buyer_name: ticket.buyer_name,
            buyer_email: ticket.buyer_email,
            verification_status: ticket.verification_status,
            verified_at: ticket.updated_at,
        }
    }
}

/// Admitted (or previously admitted) ticket.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemResponse {
    /// Always `true`
    pub success: bool,
    /// Always `true`
    pub verified: bool,
    /// `false` only for the scan that admitted the ticket
    pub already_verified: bool,
    /// Human-readable outcome
    pub message: &'static str,
    /// Ticket details
    pub ticket: RedeemedTicketView,
}

/// Scan of a ticket whose payment has not completed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IneligibleResponse {
    /// Always `false`
    pub success: bool,
    /// Always `false`
    pub eligible: bool,
    /// Human-readable reason
    pub error: &'static str,
    /// Always `INVALID`
    pub status: &'static str,
    /// Current payment status
    pub payment_status: PaymentStatus,
}

/// Ticket as returned by lookup.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketView {
    id: TicketId,
    ticket_code: TicketCode,
    tier: Tier,
    quantity: u32,
    buyer_name: String,
    buyer_email: String,
    payment_status: PaymentStatus,
    verification_status: VerificationStatus,
    amount: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<Ticket> for TicketView {
    fn from(ticket: Ticket) -> Self {
        Self {
            id: ticket.id,
            ticket_code: ticket.ticket_code,
            tier: ticket.tier,
            quantity: ticket.quantity,
            buyer_name: ticket.buyer_name,
            buyer_email: ticket.buyer_email,
            payment_status: ticket.payment_status,
            verification_status: ticket.verification_status,
            amount: ticket.amount,
            created_at: ticket.created_at,
            updated_at: ticket.updated_at,
        }
    }
}

/// Lookup result.
#[derive(Debug, Serialize)]
pub struct LookupResponse {
    /// Always `true`
    pub success: bool,
    /// Ticket details
    pub ticket: TicketView,
}

// ============================================================================
// Handlers
// ============================================================================

/// Start a purchase.
///
/// Validates the request against the tier catalog, records a pending ticket
/// and returns the gateway checkout URL.
///
/// # Errors
///
/// - 400 for missing fields, an unknown tier or a wrong amount
/// - 500 if the gateway refuses to initialize (the pending ticket is removed)
pub async fn purchase(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    ApiJson(request): ApiJson<PurchaseRequest>,
) -> WebResult<Json<PurchaseResponse>> {
    tracing::info!(
        correlation_id = %correlation_id.0,
        tier = %request.tier,
        "Purchase requested"
    );

    let receipt = state.lifecycle.initialize_purchase(request).await?;

    Ok(Json(PurchaseResponse {
        success: true,
        receipt,
    }))
}

/// Reconcile a payment with the gateway.
///
/// # Errors
///
/// - 400 when `reference` is missing, or the gateway does not report success
///   (`status: "pending"`)
/// - 404 for an unknown reference
pub async fn confirm(
    State(state): State<AppState>,
    Query(query): Query<ReferenceQuery>,
) -> WebResult<Json<ConfirmResponse>> {
    let reference = query.reference.unwrap_or_default();

    let confirmation = state
        .lifecycle
        .confirm_payment(&reference)
        .await
        .map_err(|e| not_found_as(e, "Ticket not found. Please complete your purchase."))?;

    Ok(Json(confirmation.into()))
}

/// Mark a payment complete without the gateway.
///
/// # Errors
///
/// - 400 when simulation is disabled or `reference` is missing
/// - 404 for an unknown reference
pub async fn simulate(
    State(state): State<AppState>,
    Query(query): Query<ReferenceQuery>,
) -> WebResult<Json<SimulateResponse>> {
    let reference = query.reference.unwrap_or_default();

    let confirmation = state
        .lifecycle
        .simulate_payment(&reference)
        .await
        .map_err(|e| not_found_as(e, "Ticket not found. Please complete a purchase first."))?;

    Ok(Json(SimulateResponse {
        success: true,
        message: "Payment simulated successfully",
        email_sent: confirmation.notification.email_sent(),
        redirect_to: format!("/success?reference={}", confirmation.ticket.payment_ref),
        ticket: confirmation.ticket,
    }))
}

/// Admit a ticket at the venue.
///
/// A ticket whose payment has not completed is answered with 200 and
/// `success: false`, matching what the scanner app expects.
///
/// # Errors
///
/// - 400 when `ticketCode` is missing
/// - 404 `{status: "INVALID"}` for an unknown code
pub async fn redeem(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    ApiJson(request): ApiJson<RedeemRequest>,
) -> WebResult<Response> {
    tracing::info!(
        correlation_id = %correlation_id.0,
        ticket_code = %request.ticket_code,
        "Ticket scanned"
    );

    match state.lifecycle.redeem_ticket(&request.ticket_code).await {
        Ok(redemption) => Ok(Json(RedeemResponse {
            success: true,
            verified: true,
            already_verified: redemption.already_verified,
            message: if redemption.already_verified {
                "Ticket already verified"
            } else {
                "Ticket verified successfully"
            },
            ticket: redemption.ticket.into(),
        })
        .into_response()),
        Err(TicketError::NotEligible { payment_status, .. }) => Ok(Json(IneligibleResponse {
            success: false,
            eligible: false,
            error: "Payment not completed",
            status: "INVALID",
            payment_status,
        })
        .into_response()),
        Err(TicketError::NotFound { .. }) => Err(AppError::invalid_ticket_code()),
        Err(other) => Err(other.into()),
    }
}

/// Read a ticket by code.
///
/// # Errors
///
/// - 400 when `code` is missing
/// - 404 `{status: "INVALID"}` for an unknown code
pub async fn lookup(
    State(state): State<AppState>,
    Query(query): Query<CodeQuery>,
) -> WebResult<Json<LookupResponse>> {
    let code = query.code.unwrap_or_default();

    let ticket = state
        .lifecycle
        .lookup_ticket(&code)
        .await?
        .ok_or_else(AppError::invalid_ticket_code)?;

    Ok(Json(LookupResponse {
        success: true,
        ticket: ticket.into(),
    }))
}

/// Map `NotFound` to a 404 with an endpoint-specific message.
fn not_found_as(err: TicketError, message: &str) -> AppError {
    match err {
        TicketError::NotFound { .. } => AppError::not_found(message),
        other => other.into(),
    }
}
