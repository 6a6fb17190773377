//! Ticket email content.

use crate::types::Ticket;
use std::fmt::Write as _;

/// Message sent to the buyer once payment is confirmed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TicketNotice {
    /// Destination address
    pub to: String,
    /// Subject line
    pub subject: String,
    /// Plain-text body
    pub body: String,
}

impl TicketNotice {
    /// Compose the notice for `ticket`, linking back to `app_url`.
    #[must_use]
    pub fn for_ticket(ticket: &Ticket, app_url: &str) -> Self {
        let tier = ticket.tier.display_name();
        let link = format!(
            "{}/success?reference={}",
            app_url.trim_end_matches('/'),
            ticket.payment_ref
        );

        let mut body = String::new();
        let _ = writeln!(body, "Thank you for purchasing your Nightflix ticket!");
        let _ = writeln!(body);
        let _ = writeln!(body, "{tier} Ticket");
        let _ = writeln!(body, "  Attendee Name:  {}", ticket.buyer_name);
        let _ = writeln!(body, "  Email:          {}", ticket.buyer_email);
        let _ = writeln!(body, "  Phone:          {}", ticket.buyer_phone);
        let _ = writeln!(body, "  Quantity:       {} ticket(s)", ticket.quantity);
        let _ = writeln!(body, "  Amount Paid:    NGN {}", group_thousands(ticket.amount));
        let _ = writeln!(body, "  Payment Status: {}", ticket.payment_status);
        let _ = writeln!(body);
        let _ = writeln!(body, "TICKET CODE (show at venue): {}", ticket.ticket_code);
        let _ = writeln!(body);
        let _ = writeln!(
            body,
            "Please show this ticket code at the venue entrance for verification."
        );
        let _ = writeln!(body, "View your ticket online: {link}");
        let _ = writeln!(body);
        let _ = write!(body, "Payment Reference: {}", ticket.payment_ref);

        Self {
            to: ticket.buyer_email.clone(),
            subject: format!("Your Nightflix Ticket - {tier}"),
            body,
        }
    }
}

/// `30000` → `30,000`
fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        PaymentReference, PaymentStatus, TicketCode, TicketId, Tier, VerificationStatus,
    };
    use chrono::Utc;

    fn ticket() -> Ticket {
        Ticket {
            id: TicketId::new(),
            ticket_code: TicketCode::from_stored("NF-GAN-0A1B2C3D"),
            tier: Tier::GangOf5,
            quantity: 5,
            buyer_name: "Ada Obi".to_string(),
            buyer_email: "ada@example.com".to_string(),
            buyer_phone: "+2348000000000".to_string(),
            amount: 20_000,
            payment_ref: PaymentReference::from_string("ref-123"),
            payment_status: PaymentStatus::Completed,
            verification_status: VerificationStatus::NotVerified,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_notice_contents() {
        let notice = TicketNotice::for_ticket(&ticket(), "https://nightflix.example/");

        assert_eq!(notice.to, "ada@example.com");
        assert_eq!(notice.subject, "Your Nightflix Ticket - GANG OF 5");
        assert!(notice.body.contains("NF-GAN-0A1B2C3D"));
        assert!(notice.body.contains("5 ticket(s)"));
        assert!(notice.body.contains("NGN 20,000"));
        assert!(
            notice
                .body
                .contains("https://nightflix.example/success?reference=ref-123")
        );
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(5_000), "5,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }
}
