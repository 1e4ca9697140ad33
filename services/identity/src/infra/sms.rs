use std::time::Duration;

use anyhow::{Context as _, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use clubhouse_domain::phone::PhoneIdentity;

use crate::domain::repository::Notifier;

const TEXTBELT_URL: &str = "https://textbelt.com/text";
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct TextbeltMessage<'a> {
    phone: String,
    message: &'a str,
    key: &'a str,
}

#[derive(Debug, Deserialize)]
struct TextbeltResponse {
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

/// SMS through Textbelt, or log-only when no API key is configured.
#[derive(Clone)]
pub struct SmsNotifier {
    client: Client,
    api_key: Option<String>,
}

impl SmsNotifier {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
        }
    }

    pub fn is_live(&self) -> bool {
        self.api_key.is_some()
    }

    async fn deliver(&self, key: &str, phone: &PhoneIdentity, message: &str) -> Result<bool> {
        let body = TextbeltMessage {
            phone: provider_number(phone),
            message,
            key,
        };
        let response = self
            .client
            .post(TEXTBELT_URL)
            .timeout(SEND_TIMEOUT)
            .json(&body)
            .send()
            .await
            .context("send textbelt request")?;
        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("textbelt returned {status}");
        }
        let parsed: TextbeltResponse = response.json().await.context("decode textbelt response")?;
        if let Some(error) = parsed.error.filter(|_| !parsed.success) {
            warn!(phone = %phone.masked(), error = %error, "sms rejected by provider");
        }
        Ok(parsed.success)
    }
}

/// Textbelt expects a country code; ten-digit numbers are North American.
fn provider_number(phone: &PhoneIdentity) -> String {
    if phone.as_str().len() == 10 {
        format!("1{phone}")
    } else {
        phone.to_string()
    }
}

impl Notifier for SmsNotifier {
    async fn send(&self, phone: &PhoneIdentity, message: &str) -> bool {
        let Some(key) = self.api_key.as_deref() else {
            info!(phone = %phone.masked(), "sms delivery disabled, message not sent");
            return false;
        };
        match self.deliver(key, phone, message).await {
            Ok(delivered) => delivered,
            Err(e) => {
                warn!(phone = %phone.masked(), error = %format!("{e:#}"), "sms delivery failed");
                false
            }
        }
    }
}
