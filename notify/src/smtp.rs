//! SMTP notifier implementation using Lettre.

use crate::error::NotifyError;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use nightflix_core::providers::{Notifier, ProviderFuture};

/// Port on which the relay expects implicit TLS; every other port uses STARTTLS.
const IMPLICIT_TLS_PORT: u16 = 465;

/// SMTP connection and sender settings.
#[derive(Clone)]
pub struct SmtpSettings {
    /// SMTP server address (e.g. `smtp.gmail.com`)
    pub host: String,
    /// SMTP server port (587 for STARTTLS, 465 for implicit TLS)
    pub port: u16,
    /// Authentication username
    pub username: String,
    /// Authentication password
    pub password: String,
    /// Sender address
    pub from_email: String,
    /// Sender display name
    pub from_name: String,
}

impl std::fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("from_email", &self.from_email)
            .field("from_name", &self.from_name)
            .finish()
    }
}

/// SMTP notifier.
///
/// Sends the ticket email as `text/plain` through an authenticated relay.
///
/// # Examples
///
/// ```ignore
/// use nightflix_notify::{SmtpNotifier, SmtpSettings};
///
/// let notifier = SmtpNotifier::new(SmtpSettings {
///     host: "smtp.gmail.com".to_string(),
///     port: 587,
///     username: "tickets@nightflix.example".to_string(),
///     password: "app_password".to_string(),
///     from_email: "tickets@nightflix.example".to_string(),
///     from_name: "Nightflix".to_string(),
/// })?;
/// ```
#[derive(Clone)]
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    /// Create a notifier for the given relay.
    ///
    /// No connection is made until the first send.
    ///
    /// # Errors
    ///
    /// Returns error if the sender address is invalid or the relay host
    /// cannot be configured for TLS.
    pub fn new(settings: SmtpSettings) -> Result<Self, NotifyError> {
        let from = sender_mailbox(&settings.from_name, &settings.from_email)?;

        let builder = if settings.port == IMPLICIT_TLS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
        }
        .map_err(|e| NotifyError::Transport(format!("SMTP relay error: {e}")))?;

        let transport = builder
            .port(settings.port)
            .credentials(Credentials::new(settings.username, settings.password))
            .build();

        Ok(Self { transport, from })
    }

    /// Build and send one message.
    ///
    /// # Errors
    ///
    /// Returns error if the recipient is invalid or the relay rejects the message.
    pub async fn deliver(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        let email = build_message(self.from.clone(), to, subject, body)?;

        self.transport
            .send(email)
            .await
            .map_err(|e| NotifyError::Transport(format!("Failed to send email: {e}")))?;

        Ok(())
    }
}

impl std::fmt::Debug for SmtpNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpNotifier")
            .field("from", &self.from.to_string())
            .finish_non_exhaustive()
    }
}

impl Notifier for SmtpNotifier {
    fn send<'a>(&'a self, to: &'a str, subject: &'a str, body: &'a str) -> ProviderFuture<'a, bool> {
        Box::pin(async move {
            match self.deliver(to, subject, body).await {
                Ok(()) => {
                    tracing::debug!(to = %to, subject = %subject, "Email sent");
                    true
                },
                Err(error) => {
                    tracing::error!(to = %to, error = %error, "Failed to send email");
                    false
                },
            }
        })
    }
}

fn sender_mailbox(name: &str, email: &str) -> Result<Mailbox, NotifyError> {
    let address: Address = email.parse().map_err(|e: lettre::address::AddressError| {
        NotifyError::InvalidAddress {
            address: email.to_string(),
            reason: e.to_string(),
        }
    })?;
    let name = Some(name.trim().to_string()).filter(|name| !name.is_empty());
    Ok(Mailbox::new(name, address))
}

fn build_message(from: Mailbox, to: &str, subject: &str, body: &str) -> Result<Message, NotifyError> {
    let recipient: Mailbox = to.parse().map_err(|e: lettre::address::AddressError| {
        NotifyError::InvalidAddress {
            address: to.to_string(),
            reason: e.to_string(),
        }
    })?;

    Message::builder()
        .from(from)
        .to(recipient)
        .subject(subject)
        .header(ContentType::TEXT_PLAIN)
        .body(body.to_string())
        .map_err(|e| NotifyError::Build(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sender_mailbox_with_display_name() {
        let mailbox = sender_mailbox("Nightflix", "tickets@nightflix.example").unwrap();
        assert_eq!(mailbox.name.as_deref(), Some("Nightflix"));
        assert_eq!(mailbox.email.to_string(), "tickets@nightflix.example");
    }

    #[test]
    fn test_sender_mailbox_without_display_name() {
        let mailbox = sender_mailbox("  ", "tickets@nightflix.example").unwrap();
        assert_eq!(mailbox.name, None);
    }

    #[test]
    fn test_invalid_sender_rejected() {
        let result = sender_mailbox("Nightflix", "not-an-address");
        assert!(matches!(result, Err(NotifyError::InvalidAddress { .. })));
    }

    #[test]
    fn test_message_is_plain_text() {
        let from = sender_mailbox("Nightflix", "tickets@nightflix.example").unwrap();
        let message = build_message(
            from,
            "ada@example.com",
            "Your Nightflix Ticket - VIP",
            "TICKET CODE: NF-VIP-3FA2B81C",
        )
        .unwrap();

        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: Your Nightflix Ticket - VIP"));
        assert!(raw.contains("Content-Type: text/plain"));
        assert!(raw.contains("NF-VIP-3FA2B81C"));
    }

    #[test]
    fn test_invalid_recipient_rejected() {
        let from = sender_mailbox("Nightflix", "tickets@nightflix.example").unwrap();
        let result = build_message(from, "nobody", "subject", "body");
        assert!(matches!(result, Err(NotifyError::InvalidAddress { .. })));
    }
}
