//! Application state for Axum handlers.

use nightflix_core::TicketLifecycle;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Ticket lifecycle engine
    pub lifecycle: Arc<TicketLifecycle>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(lifecycle: TicketLifecycle) -> Self {
        Self {
            lifecycle: Arc::new(lifecycle),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_is_clone() {
        // Axum requires Clone state
        fn assert_clone<T: Clone + Send + Sync + 'static>() {}
        assert_clone::<AppState>();
    }
}
