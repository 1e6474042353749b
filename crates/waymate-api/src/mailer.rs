use anyhow::{Result, bail};
use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

/// Email dispatch collaborator. Implementations deliver the plaintext OTP or
/// reset token to the user; the core never persists what it hands over here.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()>;
}

#[derive(Serialize)]
struct OutboundMail<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// Mailer backed by an HTTP transactional-mail API.
pub struct HttpMailer {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    from: String,
}

impl HttpMailer {
    pub fn new(endpoint: String, api_key: String, from: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key,
            from,
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&OutboundMail {
                from: &self.from,
                to,
                subject,
                text: body,
            })
            .send()
            .await?;

        if !resp.status().is_success() {
            bail!("mail API returned {}", resp.status());
        }
        Ok(())
    }
}

/// Dev fallback when no mail API is configured. Logs the dispatch without
/// the body — codes and tokens must not end up in the log.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, _body: &str) -> Result<()> {
        info!(to, subject, "Mail dispatch skipped (no mail API configured)");
        Ok(())
    }
}
