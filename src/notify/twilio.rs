use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use super::{NotificationSink, NotifyError};
use crate::config::TwilioConfig;

const TWILIO_API_BASE: &str = "https://api.twilio.com/2010-04-01";
const WHATSAPP_PREFIX: &str = "whatsapp:";
const REQUEST_TIMEOUT_SECS: u64 = 15;

/// E.164-style number: optional '+', 8 to 15 digits, no leading zero.
static RE_PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[1-9]\d{7,14}$").expect("valid regex"));

/// WhatsApp delivery through the Twilio Messages API.
pub struct TwilioWhatsAppSink {
    base_url: String,
    config: TwilioConfig,
    client: reqwest::blocking::Client,
}

impl TwilioWhatsAppSink {
    pub fn new(config: TwilioConfig) -> Result<Self, NotifyError> {
        Self::with_base_url(config, TWILIO_API_BASE)
    }

    /// Point the sink at a different API host.
    pub fn with_base_url(config: TwilioConfig, base_url: &str) -> Result<Self, NotifyError> {
        if config.account_sid.is_empty() || config.auth_token.is_empty() {
            return Err(NotifyError::NotConfigured(
                "Twilio account SID and auth token are required".into(),
            ));
        }
        if config.whatsapp_from.is_empty() {
            return Err(NotifyError::NotConfigured(
                "Twilio WhatsApp sender number is required".into(),
            ));
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| NotifyError::Http(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            config,
            client,
        })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/Accounts/{}/Messages.json",
            self.base_url, self.config.account_sid
        )
    }
}

/// Validate a phone number and add the `whatsapp:` channel prefix.
/// Spaces, dashes and parentheses are ignored; an existing prefix is kept.
pub fn whatsapp_address(destination: &str) -> Result<String, NotifyError> {
    let trimmed = destination.trim();
    let bare = trimmed.strip_prefix(WHATSAPP_PREFIX).unwrap_or(trimmed);
    let number: String = bare
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();
    if !RE_PHONE.is_match(&number) {
        return Err(NotifyError::InvalidDestination(destination.to_string()));
    }
    Ok(format!("{WHATSAPP_PREFIX}{number}"))
}

impl NotificationSink for TwilioWhatsAppSink {
    fn name(&self) -> &'static str {
        "twilio-whatsapp"
    }

    fn send(&self, destination: &str, message: &str) -> Result<(), NotifyError> {
        let to = whatsapp_address(destination)?;
        let from = whatsapp_address(&self.config.whatsapp_from)?;

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&[("To", to.as_str()), ("From", from.as_str()), ("Body", message)])
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    NotifyError::Http(format!(
                        "Request timed out after {REQUEST_TIMEOUT_SECS}s"
                    ))
                } else {
                    NotifyError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(to = %to, "WhatsApp message accepted");
        Ok(())
    }
}
