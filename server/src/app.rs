//! Wiring of the lifecycle engine from configuration.

use crate::config::{Config, DatabaseConfig};
use nightflix_core::{Notifier, PaymentGateway, TicketLifecycle, TicketStore};
use nightflix_notify::{ConsoleNotifier, SmtpNotifier};
use nightflix_paystack::PaystackClient;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;

/// Open the `PostgreSQL` pool.
///
/// # Errors
///
/// Returns error if the database cannot be reached within the connect timeout.
pub async fn connect_database(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout))
        .connect(&config.url)
        .await
}

/// The ticket email notifier: SMTP when credentials are configured,
/// otherwise the console.
///
/// # Errors
///
/// Returns error if the SMTP sender address or relay host is invalid.
pub fn build_notifier(config: &Config) -> anyhow::Result<Arc<dyn Notifier>> {
    if let Some(settings) = config.smtp_settings() {
        tracing::info!(
            host = %settings.host,
            port = settings.port,
            from = %settings.from_email,
            "Ticket emails via SMTP"
        );
        return Ok(Arc::new(SmtpNotifier::new(settings)?));
    }

    tracing::warn!("SMTP not configured; ticket emails will be logged, not sent");
    Ok(Arc::new(ConsoleNotifier::new()))
}

/// The payment gateway client.
///
/// # Errors
///
/// Returns error if the HTTP client cannot be built.
pub fn build_gateway(config: &Config) -> anyhow::Result<Arc<dyn PaymentGateway>> {
    let client = PaystackClient::new(config.paystack_settings())?;
    if !client.is_configured() && !config.storefront.require_gateway_verification {
        tracing::warn!("Paystack unconfigured and verification not required: payments will be completed unverified");
    }
    Ok(Arc::new(client))
}

/// Assemble the lifecycle engine over `store`.
///
/// # Errors
///
/// Returns error if the gateway or notifier cannot be built.
pub fn build_lifecycle(
    config: &Config,
    store: Arc<dyn TicketStore>,
) -> anyhow::Result<TicketLifecycle> {
    let lifecycle_config = config.lifecycle_config();
    if lifecycle_config.allow_payment_simulation {
        tracing::warn!("Payment simulation endpoint is enabled");
    }

    Ok(TicketLifecycle::new(
        store,
        build_gateway(config)?,
        build_notifier(config)?,
        config.catalog(),
        lifecycle_config,
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use nightflix_core::{Tier, TicketError};
    use nightflix_testing::{InMemoryTicketStore, purchase_request};
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<&str, &str> = pairs.iter().copied().collect();
        Config::from_source(|key| vars.get(key).map(|v| (*v).to_string()))
    }

    #[tokio::test]
    async fn test_unconfigured_gateway_rolls_back_purchase() {
        let store = Arc::new(InMemoryTicketStore::new());
        let lifecycle = build_lifecycle(&config_from(&[]), store.clone()).unwrap();

        let result = lifecycle.initialize_purchase(purchase_request(Tier::Vip)).await;

        assert!(matches!(result, Err(TicketError::PaymentInit { .. })));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_configured_prices_reach_engine() {
        let lifecycle = build_lifecycle(
            &config_from(&[("PRICE_REGULAR", "7500"), ("ALLOW_PAYMENT_SIMULATION", "true")]),
            Arc::new(InMemoryTicketStore::new()),
        )
        .unwrap();

        assert_eq!(lifecycle.catalog().price_of(Tier::Regular), Some(7_500));
        assert!(lifecycle.config().allow_payment_simulation);
    }

    #[tokio::test]
    async fn test_smtp_notifier_selected_with_credentials() {
        let config = config_from(&[
            ("SMTP_USER", "tickets@nightflix.ng"),
            ("SMTP_PASSWORD", "secret"),
        ]);
        assert!(build_notifier(&config).is_ok());
    }
}
