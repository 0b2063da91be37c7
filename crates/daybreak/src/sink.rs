//! Notification sink adapters and digest rendering.

use async_trait::async_trait;
use daybreak_core::{CapabilityError, Digest, NotificationSink, Priority};
use tracing::info;

/// Render a digest as a chat-style text block.
pub fn render_digest_text(digest: &Digest) -> String {
    let mut lines = vec![format!(
        "Daily digest: {} finding(s), generated {}",
        digest.findings.len(),
        digest.generated_at.format("%Y-%m-%d %H:%M UTC"),
    )];

    for finding in &digest.findings {
        lines.push(format!(
            "- [{}] {} ({})",
            priority_label(finding.priority),
            finding.title,
            finding.source_agent,
        ));
    }

    if !digest.failures.is_empty() {
        lines.push(format!("{} agent(s) failed this run:", digest.failures.len()));
        for failure in &digest.failures {
            lines.push(format!("- {}: {}", failure.agent_name, failure.message));
        }
    }

    lines.join("\n")
}

fn priority_label(priority: Priority) -> &'static str {
    match priority {
        Priority::Urgent => "urgent",
        Priority::High => "high",
        Priority::Normal => "normal",
        Priority::Low => "low",
    }
}

/// Sink that writes the digest to the log. Used when no webhook is
/// configured; it never fails.
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn send(&self, digest: &Digest) -> Result<(), CapabilityError> {
        info!(
            run_id = %digest.run_id,
            findings = digest.findings.len(),
            "digest:\n{}",
            render_digest_text(digest)
        );
        Ok(())
    }
}

/// Sink that POSTs the rendered digest to a webhook as JSON.
pub struct WebhookSink {
    url: String,
    client: reqwest::Client,
}

impl WebhookSink {
    /// Create a sink targeting the given webhook URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl NotificationSink for WebhookSink {
    async fn send(&self, digest: &Digest) -> Result<(), CapabilityError> {
        let payload = serde_json::json!({
            "run_id": digest.run_id,
            "generated_at": digest.generated_at,
            "text": render_digest_text(digest),
            "finding_count": digest.findings.len(),
        });

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| CapabilityError::Delivery(format!("webhook request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else if status.is_client_error() {
            // A structurally invalid request will not get better on retry
            Err(CapabilityError::Rejected(format!(
                "webhook rejected digest: HTTP {}",
                status
            )))
        } else {
            Err(CapabilityError::Delivery(format!(
                "webhook returned HTTP {}",
                status
            )))
        }
    }
}
