use crate::core::store::{MatchNotifier, NotificationError};
use crate::models::{Match, RefreshReport};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

/// Webhook notification sink
///
/// POSTs a small JSON event for each new match and each completed refresh.
/// Callers treat every error as non-fatal.
pub struct WebhookNotifier {
    url: String,
    client: Client,
}

impl WebhookNotifier {
    /// Create a new webhook notifier
    pub fn new(url: String, timeout: Duration) -> Result<Self, NotificationError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { url, client })
    }

    async fn post(&self, payload: serde_json::Value) -> Result<(), NotificationError> {
        let delivery_id = uuid::Uuid::new_v4().to_string();

        let response = self
            .client
            .post(&self.url)
            .header("X-Delivery-Id", &delivery_id)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(NotificationError::Rejected(response.status().as_u16()));
        }

        tracing::debug!("Delivered webhook {} to {}", delivery_id, self.url);
        Ok(())
    }
}

#[async_trait]
impl MatchNotifier for WebhookNotifier {
    async fn on_new_match(&self, created: &Match) -> Result<(), NotificationError> {
        self.post(json!({
            "event": "match.created",
            "match_id": created.id,
            "project_id": created.project_id,
            "vendor_id": created.vendor_id,
            "score": created.score,
            "created_at": created.created_at,
        }))
        .await
    }

    async fn on_refresh_completed(&self, report: &RefreshReport) -> Result<(), NotificationError> {
        self.post(json!({
            "event": "matches.refreshed",
            "projects_processed": report.projects_processed,
            "projects_failed": report.projects_failed,
            "matches_created": report.matches_created,
            "matches_updated": report.matches_updated,
            "date": chrono::Utc::now().date_naive(),
        }))
        .await
    }
}

/// Notification sink that only logs
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl MatchNotifier for LogNotifier {
    async fn on_new_match(&self, created: &Match) -> Result<(), NotificationError> {
        tracing::info!(
            "New vendor match for project {}: vendor {} (score {})",
            created.project_id,
            created.vendor_id,
            created.score
        );
        Ok(())
    }

    async fn on_refresh_completed(&self, report: &RefreshReport) -> Result<(), NotificationError> {
        tracing::info!(
            "Match refresh complete: {} projects, {} matches updated",
            report.projects_processed,
            report.matches_updated
        );
        Ok(())
    }
}
