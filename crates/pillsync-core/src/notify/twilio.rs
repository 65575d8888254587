//! SMS delivery through the Twilio REST API.

use std::time::Duration;

use super::{Channel, NotifyError, NotifyResult};
use crate::config::SmsConfig;

const TWILIO_API_BASE: &str = "https://api.twilio.com";

pub struct TwilioSmsChannel {
    base_url: String,
    account_sid: String,
    auth_token: String,
    from_number: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl TwilioSmsChannel {
    pub fn new(config: &SmsConfig) -> NotifyResult<Self> {
        Self::with_base_url(config, TWILIO_API_BASE)
    }

    /// Point at another API host (used against local test servers).
    pub fn with_base_url(config: &SmsConfig, base_url: &str) -> NotifyResult<Self> {
        for (field, value) in [
            ("account_sid", &config.account_sid),
            ("auth_token", &config.auth_token),
            ("from_number", &config.from_number),
        ] {
            if value.trim().is_empty() {
                return Err(NotifyError::Config(format!("sms {} is empty", field)));
            }
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| NotifyError::Http(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            from_number: config.from_number.clone(),
            client,
            timeout_secs: config.timeout_secs,
        })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        )
    }
}

impl Channel for TwilioSmsChannel {
    fn name(&self) -> &str {
        "sms"
    }

    fn send(&self, recipient: &str, _subject: &str, body: &str) -> NotifyResult<()> {
        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("To", recipient), ("From", self.from_number.as_str()), ("Body", body)])
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    NotifyError::Http(format!("Request timed out after {}s", self.timeout_secs))
                } else {
                    NotifyError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(NotifyError::Rejected {
                channel: self.name().to_string(),
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(recipient, "SMS sent");
        Ok(())
    }
}
