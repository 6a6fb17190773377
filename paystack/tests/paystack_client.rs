//! Paystack client against a mock HTTP server.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use nightflix_core::providers::{InitializeTransaction, PaymentGateway, TransactionMetadata};
use nightflix_core::{GatewayError, PaymentReference, TicketCode, TicketId, Tier};
use nightflix_paystack::{PaystackClient, PaystackError, PaystackSettings};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SECRET: &str = "sk_test_1234567890";

fn client_for(server: &MockServer) -> PaystackClient {
    PaystackClient::new(PaystackSettings::with_secret_key(SECRET).base_url(server.uri()))
        .expect("client should build")
}

fn transaction(reference: &str) -> InitializeTransaction {
    InitializeTransaction {
        email: "ada@example.com".to_string(),
        amount_minor: 500_000,
        reference: PaymentReference::from_string(reference),
        metadata: TransactionMetadata {
            ticket_id: TicketId::new(),
            ticket_code: TicketCode::from_stored("NF-REG-0A1B2C3D"),
            tier: Tier::Regular,
            name: "Ada Obi".to_string(),
            phone: "+2348000000000".to_string(),
        },
        callback_url: "https://nightflix.test/success".to_string(),
    }
}

#[tokio::test]
async fn initialize_returns_checkout_session() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/transaction/initialize"))
        .and(header("authorization", format!("Bearer {SECRET}").as_str()))
        .and(body_partial_json(json!({
            "email": "ada@example.com",
            "amount": 500_000,
            "reference": "ref-1",
            "callback_url": "https://nightflix.test/success",
            "metadata": { "ticketCode": "NF-REG-0A1B2C3D", "tier": "REGULAR" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": true,
            "message": "Authorization URL created",
            "data": {
                "authorization_url": "https://checkout.paystack.com/abc123",
                "access_code": "abc123",
                "reference": "ref-1"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = client_for(&server)
        .initialize_transaction(&transaction("ref-1"))
        .await
        .unwrap();

    assert_eq!(session.checkout_url, "https://checkout.paystack.com/abc123");
    assert_eq!(session.access_code, "abc123");
}

#[tokio::test]
async fn initialize_error_status_maps_to_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/transaction/initialize"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "status": false,
            "message": "Duplicate Transaction Reference"
        })))
        .mount(&server)
        .await;

    let error = client_for(&server)
        .initialize(transaction("ref-1"))
        .await
        .unwrap_err();

    assert_eq!(
        error,
        GatewayError::Rejected {
            status: 400,
            message: "Duplicate Transaction Reference".to_string()
        }
    );
}

#[tokio::test]
async fn verify_reports_gateway_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/transaction/verify/ref-paid"))
        .and(header("authorization", format!("Bearer {SECRET}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": true,
            "message": "Verification successful",
            "data": { "status": "success", "reference": "ref-paid", "amount": 500_000 }
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/transaction/verify/ref-abandoned"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": true,
            "message": "Verification successful",
            "data": { "status": "abandoned", "reference": "ref-abandoned", "amount": 500_000 }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);

    let paid = client
        .verify(&PaymentReference::from_string("ref-paid"))
        .await
        .unwrap();
    assert!(paid.is_success());

    let abandoned = client
        .verify(&PaymentReference::from_string("ref-abandoned"))
        .await
        .unwrap();
    assert!(!abandoned.is_success());
    assert_eq!(abandoned.status, "abandoned");
}

#[tokio::test]
async fn verify_unauthorized() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "status": false,
            "message": "Invalid key"
        })))
        .mount(&server)
        .await;

    let result = client_for(&server)
        .verify_transaction(&PaymentReference::from_string("ref-1"))
        .await;

    assert!(matches!(result, Err(PaystackError::Unauthorized)));
}

#[tokio::test]
async fn declined_envelope_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": false,
            "message": "Transaction reference not found"
        })))
        .mount(&server)
        .await;

    let result = client_for(&server)
        .verify_transaction(&PaymentReference::from_string("ref-1"))
        .await;

    assert!(matches!(result, Err(PaystackError::Declined(message)) if message == "Transaction reference not found"));
}

#[tokio::test]
async fn malformed_body_is_invalid_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let error = client_for(&server)
        .verify(&PaymentReference::from_string("ref-1"))
        .await
        .unwrap_err();

    assert!(matches!(error, GatewayError::InvalidResponse(_)));
    assert!(!error.is_unreachable());
}

#[tokio::test]
async fn slow_gateway_times_out_as_unreachable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let client = PaystackClient::new(
        PaystackSettings::with_secret_key(SECRET)
            .base_url(server.uri())
            .timeout(Duration::from_millis(100)),
    )
    .unwrap();

    let error = client
        .verify(&PaymentReference::from_string("ref-1"))
        .await
        .unwrap_err();

    assert!(matches!(error, GatewayError::Transport(_)));
    assert!(error.is_unreachable());
}

#[tokio::test]
async fn unconfigured_client_never_calls_out() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = PaystackClient::new(
        PaystackSettings::with_secret_key(PaystackSettings::PLACEHOLDER_KEY).base_url(server.uri()),
    )
    .unwrap();

    let error = client
        .verify(&PaymentReference::from_string("ref-1"))
        .await
        .unwrap_err();

    assert!(matches!(error, GatewayError::Misconfigured(_)));
}
