use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::core::config::redact_url;

const TIMEOUT_SECS: u64 = 10;
/// Longest response body kept for logging.
const MAX_LOGGED_BODY: usize = 512;

/// JSON envelope accepted by Slack-style incoming webhooks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct WebhookResponse {
    pub status: u16,
    pub body: String,
}

/// Sends a payload to a webhook URL. Only transport failures are errors;
/// any HTTP status comes back as a response.
#[async_trait]
pub trait WebhookTransport: Send + Sync {
    async fn post_json(&self, url: &str, payload: &WebhookPayload) -> Result<WebhookResponse>;
}

pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl WebhookTransport for ReqwestTransport {
    async fn post_json(&self, url: &str, payload: &WebhookPayload) -> Result<WebhookResponse> {
        let response = self
            .client
            .post(url)
            .json(payload)
            .send()
            .await
            .context("Failed to send webhook request")?;
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Ok(WebhookResponse { status, body })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// No webhook configured; the message was logged instead.
    DryRun,
    Delivered { status: u16 },
    Rejected { status: u16 },
    Failed { error: String },
}

fn truncate(body: &str) -> &str {
    match body.char_indices().nth(MAX_LOGGED_BODY) {
        Some((i, _)) => &body[..i],
        None => body,
    }
}

/// Wrap `message` in a code fence so Slack renders the columns monospaced.
pub fn code_block(message: &str) -> String {
    format!("```\n{}\n```", message)
}

/// Post `message` to `webhook_url`, or log it when no URL is configured.
///
/// Never fails: a rejected or failed delivery is logged and reported in the
/// returned outcome.
pub async fn deliver(
    message: &str,
    webhook_url: Option<&str>,
    transport: &dyn WebhookTransport,
) -> DeliveryOutcome {
    let url = match webhook_url.map(str::trim).filter(|u| !u.is_empty()) {
        Some(url) => url,
        None => {
            info!("No webhook configured, logging report instead:\n{}", message);
            return DeliveryOutcome::DryRun;
        }
    };

    let payload = WebhookPayload {
        text: code_block(message),
    };
    let target = redact_url(url);

    match transport.post_json(url, &payload).await {
        Ok(response) if (200..300).contains(&response.status) => {
            info!(status = response.status, webhook = %target, "Report delivered");
            DeliveryOutcome::Delivered {
                status: response.status,
            }
        }
        Ok(response) => {
            warn!(
                status = response.status,
                webhook = %target,
                body = truncate(&response.body),
                "Webhook rejected report"
            );
            DeliveryOutcome::Rejected {
                status: response.status,
            }
        }
        Err(e) => {
            let error = format!("{:#}", e);
            error!(webhook = %target, error = %error, "Webhook delivery failed");
            DeliveryOutcome::Failed { error }
        }
    }
}
