//! Console notifier for development and testing.

use nightflix_core::providers::{Notifier, ProviderFuture};
use tracing::info;

/// Console notifier.
///
/// Logs emails instead of sending them. Selected when SMTP credentials are
/// not configured, so purchases still complete locally.
#[derive(Clone, Debug, Default)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    /// Create a new console notifier.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Notifier for ConsoleNotifier {
    fn send<'a>(&'a self, to: &'a str, subject: &'a str, body: &'a str) -> ProviderFuture<'a, bool> {
        Box::pin(async move {
            info!(to = %to, subject = %subject, "Ticket email (development mode, not sent)");
            info!("\n{body}");
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_console_notifier_always_succeeds() {
        let notifier = ConsoleNotifier::new();
        assert!(
            notifier
                .send("ada@example.com", "Your Nightflix Ticket - VIP", "body")
                .await
        );
    }
}
