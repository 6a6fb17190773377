//! Tier catalog listing for the storefront.

use crate::state::AppState;
use axum::{Json, extract::State};
use nightflix_core::Tier;
use serde::Serialize;

/// One purchasable tier.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierView {
    /// Wire name
    pub tier: Tier,
    /// Human-readable name
    pub display_name: String,
    /// Price in major currency units
    pub price: u64,
    /// Admissions per ticket
    pub quantity: u32,
}

/// Catalog listing.
#[derive(Debug, Serialize)]
pub struct TiersResponse {
    /// Tiers in display order
    pub tiers: Vec<TierView>,
}

/// `GET /api/tiers`
#[allow(clippy::unused_async)]
pub async fn list_tiers(State(state): State<AppState>) -> Json<TiersResponse> {
    let tiers = state
        .lifecycle
        .catalog()
        .iter()
        .map(|(tier, terms)| TierView {
            tier,
            display_name: tier.display_name(),
            price: terms.price,
            quantity: terms.quantity,
        })
        .collect();

    Json(TiersResponse { tiers })
}
