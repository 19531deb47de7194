use std::future::Future;

use serde::Deserialize;

use crate::config::SmsConfig;

pub trait SmsSender {
    /// Sends `body` to the configured contact and returns the provider message id.
    fn send(&self, body: &str) -> impl Future<Output = Result<String, SmsError>>;
}

#[derive(Debug, thiserror::Error)]
pub enum SmsError {
    #[error("failed to build sms http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("sms is disabled")]
    Disabled,
    #[error("sms request timed out")]
    Timeout,
    #[error("sms network error: {0}")]
    Network(String),
    #[error("sms api error: status={status}, message={message}")]
    ApiError { status: u16, message: String },
}

impl From<reqwest::Error> for SmsError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(e.to_string())
        }
    }
}

/// Twilio Messages API client.
#[derive(Debug, Clone)]
pub struct TwilioSms {
    config: SmsConfig,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    sid: Option<String>,
    message: Option<String>,
}

impl TwilioSms {
    pub fn new(config: &SmsConfig) -> Result<Self, SmsError> {
        Ok(Self {
            config: config.clone(),
            client: super::http_client(config.timeout_secs).map_err(SmsError::Client)?,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.config.enabled
            && !self.config.account_sid.is_empty()
            && !self.config.auth_token.is_empty()
            && !self.config.from_number.is_empty()
            && !self.config.to_number.is_empty()
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.config.api_base.trim_end_matches('/'),
            self.config.account_sid
        )
    }
}

impl SmsSender for TwilioSms {
    async fn send(&self, body: &str) -> Result<String, SmsError> {
        if !self.is_configured() {
            return Err(SmsError::Disabled);
        }

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&[
                ("Body", body),
                ("From", self.config.from_number.as_str()),
                ("To", self.config.to_number.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let parsed: Option<MessageResponse> = response.json().await.ok();

        if !status.is_success() {
            return Err(SmsError::ApiError {
                status: status.as_u16(),
                message: parsed
                    .and_then(|r| r.message)
                    .unwrap_or_else(|| status.to_string()),
            });
        }

        let sid = parsed.and_then(|r| r.sid).unwrap_or_default();
        tracing::info!(sid = %sid, "SMS sent");
        Ok(sid)
    }
}
