//! Paystack wire types.

use nightflix_core::providers::InitializeTransaction;
use serde::{Deserialize, Serialize};

/// Every Paystack response is wrapped in this envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    /// Whether the call succeeded
    pub status: bool,
    /// Human-readable message
    #[serde(default)]
    pub message: String,
    /// Payload, absent on failure
    pub data: Option<T>,
}

/// Body of `POST /transaction/initialize`.
#[derive(Debug, Clone, Serialize)]
pub struct InitializeRequest {
    /// Customer email
    pub email: String,
    /// Amount in kobo
    pub amount: u64,
    /// Merchant reference
    pub reference: String,
    /// Ticket details shown on the Paystack dashboard
    pub metadata: Metadata,
    /// Redirect after payment
    pub callback_url: String,
}

/// Transaction metadata.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// Ticket record id
    pub ticket_id: String,
    /// Ticket code
    pub ticket_code: String,
    /// Tier wire name
    pub tier: String,
    /// Buyer name
    pub name: String,
    /// Buyer phone
    pub phone: String,
    /// Fields rendered on the Paystack receipt
    #[serde(rename = "custom_fields")]
    pub custom_fields: Vec<CustomField>,
}

/// A labelled value shown on the Paystack receipt.
#[derive(Debug, Clone, Serialize)]
pub struct CustomField {
    /// Label
    pub display_name: String,
    /// Machine name
    pub variable_name: String,
    /// Value
    pub value: String,
}

impl From<&InitializeTransaction> for InitializeRequest {
    fn from(request: &InitializeTransaction) -> Self {
        let metadata = &request.metadata;
        Self {
            email: request.email.clone(),
            amount: request.amount_minor,
            reference: request.reference.to_string(),
            metadata: Metadata {
                ticket_id: metadata.ticket_id.to_string(),
                ticket_code: metadata.ticket_code.to_string(),
                tier: metadata.tier.as_str().to_string(),
                name: metadata.name.clone(),
                phone: metadata.phone.clone(),
                custom_fields: vec![CustomField {
                    display_name: "Ticket Code".to_string(),
                    variable_name: "ticket_code".to_string(),
                    value: metadata.ticket_code.to_string(),
                }],
            },
            callback_url: request.callback_url.clone(),
        }
    }
}

/// `data` of a successful initialization.
#[derive(Debug, Clone, Deserialize)]
pub struct InitializeData {
    /// Checkout page
    pub authorization_url: String,
    /// Inline checkout access code
    pub access_code: String,
    /// Echoed reference
    #[serde(default)]
    pub reference: Option<String>,
}

/// `data` of a verification.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyData {
    /// Transaction status (`success`, `abandoned`, `failed`, ...)
    pub status: String,
    /// Echoed reference
    #[serde(default)]
    pub reference: Option<String>,
    /// Amount in kobo
    #[serde(default)]
    pub amount: Option<u64>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use nightflix_core::providers::TransactionMetadata;
    use nightflix_core::types::{PaymentReference, TicketCode, TicketId, Tier};
    use serde_json::json;

    #[test]
    fn test_initialize_request_wire_format() {
        let ticket_id = TicketId::new();
        let transaction = InitializeTransaction {
            email: "ada@example.com".to_string(),
            amount_minor: 3_000_000,
            reference: PaymentReference::from_string("ref-1"),
            metadata: TransactionMetadata {
                ticket_id,
                ticket_code: TicketCode::from_stored("NF-VIP-3FA2B81C"),
                tier: Tier::Vip,
                name: "Ada Obi".to_string(),
                phone: "+2348000000000".to_string(),
            },
            callback_url: "https://nightflix.example/success".to_string(),
        };

        let body = serde_json::to_value(InitializeRequest::from(&transaction)).unwrap();

        assert_eq!(
            body,
            json!({
                "email": "ada@example.com",
                "amount": 3_000_000,
                "reference": "ref-1",
                "metadata": {
                    "ticketId": ticket_id.to_string(),
                    "ticketCode": "NF-VIP-3FA2B81C",
                    "tier": "VIP",
                    "name": "Ada Obi",
                    "phone": "+2348000000000",
                    "custom_fields": [{
                        "display_name": "Ticket Code",
                        "variable_name": "ticket_code",
                        "value": "NF-VIP-3FA2B81C"
                    }]
                },
                "callback_url": "https://nightflix.example/success"
            })
        );
    }

    #[test]
    fn test_verify_envelope_parses() {
        let envelope: Envelope<VerifyData> = serde_json::from_value(json!({
            "status": true,
            "message": "Verification successful",
            "data": { "status": "success", "reference": "ref-1", "amount": 500_000, "currency": "NGN" }
        }))
        .unwrap();

        let data = envelope.data.unwrap();
        assert_eq!(data.status, "success");
        assert_eq!(data.amount, Some(500_000));
    }

    #[test]
    fn test_failure_envelope_has_no_data() {
        let envelope: Envelope<VerifyData> = serde_json::from_value(json!({
            "status": false,
            "message": "Transaction reference not found"
        }))
        .unwrap();

        assert!(!envelope.status);
        assert!(envelope.data.is_none());
    }
}
