use crate::client::{AlertMail, MailRelay};
use crate::config::MailConfig;
use crate::error::NotifyError;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use log::{debug, info};
use std::time::Instant;

/// SMTP relay reached with STARTTLS and mandatory credentials.
///
/// The transport is built once and reused for every send.
pub struct SmtpRelay {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    host: String,
}

impl SmtpRelay {
    pub fn new(config: &MailConfig) -> Result<Self, NotifyError> {
        // Fail at startup rather than on the first alert.
        config.sender.parse::<Mailbox>()?;
        config.recipient.parse::<Mailbox>()?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.relay_host)?
            .port(config.relay_port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .timeout(Some(config.timeout()))
            .build();

        info!(
            "Mail relay configured: {}:{} (STARTTLS)",
            config.relay_host, config.relay_port
        );

        Ok(Self {
            transport,
            host: config.relay_host.clone(),
        })
    }
}

pub fn build_message(mail: &AlertMail) -> Result<Message, NotifyError> {
    let message = Message::builder()
        .from(mail.from.parse::<Mailbox>()?)
        .to(mail.to.parse::<Mailbox>()?)
        .subject(mail.subject.as_str())
        .header(ContentType::TEXT_PLAIN)
        .body(mail.body.clone())?;
    Ok(message)
}

impl MailRelay for SmtpRelay {
    async fn send(&self, mail: &AlertMail) -> Result<(), NotifyError> {
        let start = Instant::now();
        let message = build_message(mail)?;
        self.transport.send(message).await?;
        debug!(
            "SMTP send via {} took: {} ms",
            self.host,
            start.elapsed().as_millis()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mail(from: &str) -> AlertMail {
        AlertMail {
            from: from.to_string(),
            to: "ops@example.com".to_string(),
            subject: "Alert: Threshold Exceeded".to_string(),
            body: "Temperature/humidity have exceeded the threshold.".to_string(),
        }
    }

    #[test]
    fn test_build_message_headers() {
        let message = build_message(&mail("Sensor <sensor@example.com>")).unwrap();
        let formatted = String::from_utf8(message.formatted()).unwrap();
        assert!(formatted.contains("Subject: Alert: Threshold Exceeded"));
        assert!(formatted.contains("To: ops@example.com"));
        assert!(formatted.contains("sensor@example.com"));
    }

    #[test]
    fn test_build_message_rejects_bad_address() {
        assert!(matches!(
            build_message(&mail("not an address")),
            Err(NotifyError::Address(_))
        ));
    }

    #[tokio::test]
    async fn test_relay_rejects_bad_sender_at_startup() {
        let config = MailConfig {
            relay_host: "smtp.example.com".to_string(),
            relay_port: 587,
            username: "monitor".to_string(),
            password: "secret".to_string(),
            sender: "nope".to_string(),
            recipient: "ops@example.com".to_string(),
            subject: String::new(),
            body: String::new(),
            timeout_ms: 1000,
        };
        assert!(SmtpRelay::new(&config).is_err());
    }
}
