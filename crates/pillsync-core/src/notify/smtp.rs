//! Email delivery by SMTP submission.

use std::time::Duration;

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::config::EmailConfig;

use super::{Channel, NotifyError, NotifyResult};

pub struct SmtpEmailChannel {
    transport: SmtpTransport,
    sender: Mailbox,
}

impl SmtpEmailChannel {
    /// Build the transport; no connection is made until the first send.
    pub fn new(config: &EmailConfig) -> NotifyResult<Self> {
        let server = config.smtp_server.trim();
        if server.is_empty() {
            return Err(NotifyError::Config("email smtp_server is empty".into()));
        }
        let login = config.sender_email.trim();
        let sender: Mailbox = login
            .parse()
            .map_err(|e| NotifyError::Config(format!("invalid sender_email {:?}: {}", login, e)))?;

        let builder = if config.use_tls {
            SmtpTransport::starttls_relay(server)?
        } else {
            SmtpTransport::builder_dangerous(server)
        };
        let mut builder = builder
            .port(config.smtp_port)
            .timeout(Some(Duration::from_secs(config.timeout_secs)));
        if !config.sender_password.is_empty() {
            builder = builder.credentials(Credentials::new(login.to_string(), config.sender_password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            sender,
        })
    }

    fn compose(&self, recipient: &str, subject: &str, body: &str) -> NotifyResult<Message> {
        let to: Mailbox = recipient
            .trim()
            .parse()
            .map_err(|e| NotifyError::Message(format!("invalid recipient {:?}: {}", recipient, e)))?;

        Message::builder()
            .from(self.sender.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| NotifyError::Message(e.to_string()))
    }
}

impl Channel for SmtpEmailChannel {
    fn name(&self) -> &str {
        "email"
    }

    fn send(&self, recipient: &str, subject: &str, body: &str) -> NotifyResult<()> {
        let message = self.compose(recipient, subject, body)?;
        self.transport.send(&message)?;
        tracing::info!(recipient, "Email sent");
        Ok(())
    }
}
