//! Business metrics for the storefront.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `nightflix_purchases_total{status}` - Purchase initializations by outcome
//! - `nightflix_payments_total{status}` - Payment confirmations by outcome
//! - `nightflix_revenue_total` - Confirmed revenue in major currency units
//! - `nightflix_tickets_sold_total{tier}` - Admissions sold
//! - `nightflix_redemptions_total{status}` - Venue scans by outcome
//! - `nightflix_notifications_total{status}` - Ticket emails by outcome
//!
//! ## Histograms
//! - `nightflix_gateway_duration_seconds{operation}` - Gateway call latency

use crate::types::Tier;
use metrics::{describe_counter, describe_histogram};
use std::time::Duration;

/// Register all metric descriptions.
///
/// Call once at startup, after the recorder is installed.
pub fn register_business_metrics() {
    describe_counter!(
        "nightflix_purchases_total",
        "Purchase initializations by outcome (initialized, rejected, gateway_failed)"
    );
    describe_counter!(
        "nightflix_payments_total",
        "Payment confirmations by outcome (completed, duplicate, not_verified, bypassed)"
    );
    describe_counter!(
        "nightflix_revenue_total",
        "Confirmed revenue in major currency units"
    );
    describe_counter!("nightflix_tickets_sold_total", "Admissions sold, by tier");
    describe_counter!(
        "nightflix_redemptions_total",
        "Venue scans by outcome (admitted, repeat, not_eligible, unknown)"
    );
    describe_counter!(
        "nightflix_notifications_total",
        "Ticket emails by outcome (sent, failed)"
    );
    describe_histogram!(
        "nightflix_gateway_duration_seconds",
        "Latency of payment gateway calls"
    );

    tracing::info!("Business metrics registered");
}

/// Record a purchase initialization outcome.
pub fn record_purchase(status: &'static str) {
    metrics::counter!("nightflix_purchases_total", "status" => status).increment(1);
}

/// Record a payment confirmation outcome.
pub fn record_payment(status: &'static str) {
    metrics::counter!("nightflix_payments_total", "status" => status).increment(1);
}

/// Record a sale at the moment payment completes.
pub fn record_sale(tier: Tier, quantity: u32, amount: u64) {
    metrics::counter!("nightflix_revenue_total").increment(amount);
    metrics::counter!("nightflix_tickets_sold_total", "tier" => tier.as_str())
        .increment(u64::from(quantity));
}

/// Record a venue scan outcome.
pub fn record_redemption(status: &'static str) {
    metrics::counter!("nightflix_redemptions_total", "status" => status).increment(1);
}

/// Record a ticket email outcome.
pub fn record_notification(sent: bool) {
    let status = if sent { "sent" } else { "failed" };
    metrics::counter!("nightflix_notifications_total", "status" => status).increment(1);
}

/// Record gateway call latency.
pub fn record_gateway_call(operation: &'static str, elapsed: Duration) {
    metrics::histogram!("nightflix_gateway_duration_seconds", "operation" => operation)
        .record(elapsed.as_secs_f64());
}
