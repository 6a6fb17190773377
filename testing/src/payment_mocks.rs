//! Scriptable payment gateway and recording notifier.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Poisoned locks only happen after a test already panicked

use nightflix_core::error::GatewayError;
use nightflix_core::providers::{
    CheckoutSession, GatewayVerification, InitializeTransaction, Notifier, PaymentGateway,
    ProviderFuture,
};
use nightflix_core::types::PaymentReference;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ============================================================================
// Payment gateway
// ============================================================================

#[derive(Debug)]
struct GatewayScript {
    initialize_error: Option<GatewayError>,
    verify_result: Result<String, GatewayError>,
    verify_by_reference: HashMap<PaymentReference, String>,
    initialized: Vec<InitializeTransaction>,
    verified: Vec<PaymentReference>,
}

/// In-memory [`PaymentGateway`].
///
/// By default every initialization succeeds with a checkout URL derived
/// from the reference, and every verification reports `success`.
/// Verification yields to the scheduler once, so concurrent confirmations
/// interleave between the read and the conditional update.
///
/// # Example
///
/// ```
/// use nightflix_testing::MockPaymentGateway;
///
/// let gateway = MockPaymentGateway::new();
/// gateway.verify_status("abandoned");
/// assert_eq!(gateway.verify_calls(), 0);
/// ```
#[derive(Clone, Debug)]
pub struct MockPaymentGateway {
    script: Arc<Mutex<GatewayScript>>,
}

impl MockPaymentGateway {
    /// Base URL of generated checkout pages.
    pub const CHECKOUT_BASE: &'static str = "https://checkout.paystack.test";

    /// A gateway that accepts everything.
    #[must_use]
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(GatewayScript {
                initialize_error: None,
                verify_result: Ok(GatewayVerification::SUCCESS.to_string()),
                verify_by_reference: HashMap::new(),
                initialized: Vec::new(),
                verified: Vec::new(),
            })),
        }
    }

    /// Fail every subsequent initialization with `error`.
    pub fn fail_initialize(&self, error: GatewayError) {
        self.script.lock().unwrap().initialize_error = Some(error);
    }

    /// Report `status` for every subsequent verification.
    pub fn verify_status(&self, status: &str) {
        self.script.lock().unwrap().verify_result = Ok(status.to_string());
    }

    /// Report `status` when `reference` is verified, overriding the default.
    pub fn verify_status_for(&self, reference: &PaymentReference, status: &str) {
        self.script
            .lock()
            .unwrap()
            .verify_by_reference
            .insert(reference.clone(), status.to_string());
    }

    /// Fail every subsequent verification with `error`.
    pub fn fail_verify(&self, error: GatewayError) {
        self.script.lock().unwrap().verify_result = Err(error);
    }

    /// Requests passed to `initialize`, in call order.
    #[must_use]
    pub fn initialized(&self) -> Vec<InitializeTransaction> {
        self.script.lock().unwrap().initialized.clone()
    }

    /// Number of `initialize` calls.
    #[must_use]
    pub fn initialize_calls(&self) -> usize {
        self.script.lock().unwrap().initialized.len()
    }

    /// Number of `verify` calls.
    #[must_use]
    pub fn verify_calls(&self) -> usize {
        self.script.lock().unwrap().verified.len()
    }

    /// Checkout URL the mock returns for `reference`.
    #[must_use]
    pub fn checkout_url_for(reference: &PaymentReference) -> String {
        format!("{}/{reference}", Self::CHECKOUT_BASE)
    }
}

impl Default for MockPaymentGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl PaymentGateway for MockPaymentGateway {
    fn initialize(
        &self,
        request: InitializeTransaction,
    ) -> ProviderFuture<'_, Result<CheckoutSession, GatewayError>> {
        Box::pin(async move {
            let mut script = self.script.lock().unwrap();
            let reference = request.reference.clone();
            script.initialized.push(request);

            if let Some(error) = &script.initialize_error {
                return Err(error.clone());
            }

            Ok(CheckoutSession {
                checkout_url: Self::checkout_url_for(&reference),
                access_code: format!("access_{reference}"),
            })
        })
    }

    fn verify<'a>(
        &'a self,
        reference: &'a PaymentReference,
    ) -> ProviderFuture<'a, Result<GatewayVerification, GatewayError>> {
        Box::pin(async move {
            let result = {
                let mut script = self.script.lock().unwrap();
                script.verified.push(reference.clone());
                match script.verify_by_reference.get(reference) {
                    Some(status) => Ok(status.clone()),
                    None => script.verify_result.clone(),
                }
            };

            tokio::task::yield_now().await;

            result.map(|status| GatewayVerification { status })
        })
    }
}

// ============================================================================
// Notifier
// ============================================================================

/// A message captured by [`RecordingNotifier`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SentMessage {
    /// Destination address
    pub to: String,
    /// Subject line
    pub subject: String,
    /// Body
    pub body: String,
}

/// [`Notifier`] that records every message it is asked to send.
///
/// Attempts are recorded even when the notifier is set to fail.
#[derive(Clone, Debug)]
pub struct RecordingNotifier {
    messages: Arc<Mutex<Vec<SentMessage>>>,
    succeed: Arc<AtomicBool>,
    attempts: Arc<AtomicUsize>,
}

impl RecordingNotifier {
    /// A notifier whose sends succeed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            messages: Arc::new(Mutex::new(Vec::new())),
            succeed: Arc::new(AtomicBool::new(true)),
            attempts: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A notifier whose sends fail.
    #[must_use]
    pub fn failing() -> Self {
        let notifier = Self::new();
        notifier.set_succeed(false);
        notifier
    }

    /// Switch between succeeding and failing sends.
    pub fn set_succeed(&self, succeed: bool) {
        self.succeed.store(succeed, Ordering::SeqCst);
    }

    /// Messages received so far.
    #[must_use]
    pub fn sent(&self) -> Vec<SentMessage> {
        self.messages.lock().unwrap().clone()
    }

    /// Number of send attempts.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Default for RecordingNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for RecordingNotifier {
    fn send<'a>(&'a self, to: &'a str, subject: &'a str, body: &'a str) -> ProviderFuture<'a, bool> {
        Box::pin(async move {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            self.messages.lock().unwrap().push(SentMessage {
                to: to.to_string(),
                subject: subject.to_string(),
                body: body.to_string(),
            });
            self.succeed.load(Ordering::SeqCst)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nightflix_core::types::{TicketCode, TicketId, Tier};
    use nightflix_core::providers::TransactionMetadata;

    fn request(reference: &PaymentReference) -> InitializeTransaction {
        InitializeTransaction {
            email: "ada@example.com".to_string(),
            amount_minor: 500_000,
            reference: reference.clone(),
            metadata: TransactionMetadata {
                ticket_id: TicketId::new(),
                ticket_code: TicketCode::from_stored("NF-REG-00000001"),
                tier: Tier::Regular,
                name: "Ada".to_string(),
                phone: "0800".to_string(),
            },
            callback_url: "http://localhost:3000/success".to_string(),
        }
    }

    #[tokio::test]
    async fn test_gateway_defaults() {
        let gateway = MockPaymentGateway::new();
        let reference = PaymentReference::from_string("ref-1");

        let session = gateway.initialize(request(&reference)).await.unwrap();
        assert_eq!(session.checkout_url, "https://checkout.paystack.test/ref-1");
        assert!(gateway.verify(&reference).await.unwrap().is_success());
        assert_eq!(gateway.initialize_calls(), 1);
        assert_eq!(gateway.verify_calls(), 1);
    }

    #[tokio::test]
    async fn test_gateway_scripting() {
        let gateway = MockPaymentGateway::new();
        let paid = PaymentReference::from_string("paid");
        let other = PaymentReference::from_string("other");

        gateway.verify_status("abandoned");
        gateway.verify_status_for(&paid, "success");
        assert!(gateway.verify(&paid).await.unwrap().is_success());
        assert_eq!(gateway.verify(&other).await.unwrap().status, "abandoned");

        gateway.fail_initialize(GatewayError::Transport("down".to_string()));
        assert!(gateway.initialize(request(&other)).await.is_err());
        assert_eq!(gateway.initialized().len(), 1);
    }

    #[tokio::test]
    async fn test_recording_notifier() {
        let notifier = RecordingNotifier::failing();
        assert!(!notifier.send("a@b.c", "hi", "body").await);
        notifier.set_succeed(true);
        assert!(notifier.send("a@b.c", "hi", "body").await);
        assert_eq!(notifier.attempts(), 2);
        assert_eq!(notifier.sent()[0].subject, "hi");
    }
}
