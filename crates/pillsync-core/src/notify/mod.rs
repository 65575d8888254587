//! Care-team notifications for verification results.
//!
//! Pipeline: Message composition → Per-contact dispatch (email, then SMS) → Log line

mod messages;
mod smtp;
mod twilio;

pub use messages::*;
pub use smtp::*;
pub use twilio::*;

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::config::NotificationConfig;
use crate::models::{CareTeam, Contact, NotificationReport, VerificationRecord};

/// Notification errors.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("Invalid message: {0}")]
    Message(String),

    #[error("{channel} provider rejected message ({status}): {body}")]
    Rejected {
        channel: String,
        status: u16,
        body: String,
    },

    #[error("Invalid channel configuration: {0}")]
    Config(String),
}

pub type NotifyResult<T> = Result<T, NotifyError>;

/// A delivery channel for notifications.
pub trait Channel: Send + Sync {
    fn name(&self) -> &str;

    fn send(&self, recipient: &str, subject: &str, body: &str) -> NotifyResult<()>;
}

/// Sends verification results to a patient's care team.
pub struct NotificationService {
    email: Option<Box<dyn Channel>>,
    sms: Option<Box<dyn Channel>>,
    log_file: Option<PathBuf>,
}

/// One line of the notification log.
#[derive(Serialize)]
struct LogEntry<'a> {
    timestamp: String,
    user_id: &'a str,
    verified: bool,
    status: &'a NotificationReport,
}

impl NotificationService {
    /// Build the enabled channels from configuration.
    pub fn from_config(config: &NotificationConfig) -> NotifyResult<Self> {
        let email = if config.email.enabled {
            Some(Box::new(SmtpEmailChannel::new(&config.email)?) as Box<dyn Channel>)
        } else {
            None
        };

        let sms = if config.sms.enabled {
            Some(Box::new(TwilioSmsChannel::new(&config.sms)?) as Box<dyn Channel>)
        } else {
            None
        };

        let log_file = config.notification_logs.then(|| config.log_file.clone());

        tracing::debug!(
            email = email.is_some(),
            sms = sms.is_some(),
            "Notification channels configured"
        );
        Ok(Self::with_channels(email, sms, log_file))
    }

    /// Assemble a service from explicit channels.
    pub fn with_channels(
        email: Option<Box<dyn Channel>>,
        sms: Option<Box<dyn Channel>>,
        log_file: Option<PathBuf>,
    ) -> Self {
        Self { email, sms, log_file }
    }

    /// Notify the care team about a verification result.
    pub fn notify(&self, team: &CareTeam, record: &VerificationRecord) -> NotificationReport {
        let mut report = NotificationReport::default();

        if team.is_empty() {
            report.errors.push("No contacts found for user".into());
            return report;
        }

        let notification = Notification::for_verification(record);

        if let Some(doctor) = &team.doctor {
            report.sent_to_doctor = self.send_to(doctor, &notification, &mut report.errors);
            if report.sent_to_doctor {
                report.total_sent += 1;
            }
        }

        let mut family_sent = 0;
        for member in &team.family {
            if self.send_to(member, &notification, &mut report.errors) {
                family_sent += 1;
            }
        }
        report.sent_to_family = family_sent > 0;
        report.total_sent += family_sent;

        tracing::info!(
            user_id = %record.user_id,
            verified = record.verified,
            total_sent = report.total_sent,
            "Notifications dispatched"
        );

        if let Some(path) = &self.log_file {
            if let Err(e) = append_log(path, &record.user_id, record.verified, &report) {
                tracing::warn!(path = %path.display(), error = %e, "Failed to write notification log");
            }
        }

        report
    }

    /// Email first; SMS when email did not go out or the alert is high priority.
    fn send_to(&self, contact: &Contact, notification: &Notification, errors: &mut Vec<String>) -> bool {
        let mut sent = false;

        if let (Some(address), Some(channel)) = (contact.email(), &self.email) {
            sent = deliver(
                channel.as_ref(),
                contact,
                address,
                &notification.subject,
                &notification.body,
                errors,
            );
        }

        if !sent || notification.priority == Priority::High {
            if let (Some(phone), Some(channel)) = (contact.phone(), &self.sms) {
                let text = notification.sms_text();
                if deliver(channel.as_ref(), contact, phone, &notification.subject, &text, errors) {
                    sent = true;
                }
            }
        }

        sent
    }
}

fn deliver(
    channel: &dyn Channel,
    contact: &Contact,
    recipient: &str,
    subject: &str,
    body: &str,
    errors: &mut Vec<String>,
) -> bool {
    match channel.send(recipient, subject, body) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(channel = channel.name(), contact = %contact.name, error = %e, "Delivery failed");
            errors.push(format!("{} to {} failed: {}", channel.name(), contact.name, e));
            false
        }
    }
}

fn append_log(path: &Path, user_id: &str, verified: bool, report: &NotificationReport) -> NotifyResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let entry = LogEntry {
        timestamp: chrono::Utc::now().to_rfc3339(),
        user_id,
        verified,
        status: report,
    };
    let line = serde_json::to_string(&entry).map_err(|e| NotifyError::Io(e.into()))?;

    let mut file = std::fs::OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", line)?;
    Ok(())
}
