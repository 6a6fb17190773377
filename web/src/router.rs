//! Route table.

use crate::handlers::{health, tickets, tiers};
use crate::middleware::correlation_id_layer;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

/// Build the storefront router.
///
/// ```text
/// GET  /health
/// GET  /ready
/// GET  /api/tiers
/// POST /api/tickets/purchase
/// GET  /api/tickets/confirm
/// GET  /api/tickets/simulate
/// POST /api/tickets/redeem
/// GET  /api/tickets/lookup
/// ```
pub fn build_router(state: AppState) -> Router {
    let ticket_routes = Router::new()
        .route("/purchase", post(tickets::purchase))
        .route("/confirm", get(tickets::confirm))
        .route("/simulate", get(tickets::simulate))
        .route("/redeem", post(tickets::redeem))
        .route("/lookup", get(tickets::lookup));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/api/tiers", get(tiers::list_tiers))
        .nest("/api/tickets", ticket_routes)
        .layer(TraceLayer::new_for_http())
        .layer(correlation_id_layer())
        .with_state(state)
}
