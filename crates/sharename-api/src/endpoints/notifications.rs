// Notification endpoints

use futures_util::future::try_join_all;
use serde_json::json;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::Notification;

impl ApiClient {
    /// `GET notifications/`
    pub async fn list_notifications(&self) -> Result<Vec<Notification>, Error> {
        self.get_list("notifications/").await
    }

    /// `PATCH notifications/{id}/`
    pub async fn mark_notification_read(&self, id: i64) -> Result<(), Error> {
        self.patch(&format!("notifications/{id}/"), &json!({ "read": true }))
            .await?;
        Ok(())
    }

    /// Mark every unread notification read, one PATCH each, concurrently.
    /// Returns how many were marked.
    pub async fn mark_all_notifications_read(&self) -> Result<usize, Error> {
        let unread: Vec<i64> = self
            .list_notifications()
            .await?
            .into_iter()
            .filter(|n| !n.read)
            .map(|n| n.id)
            .collect();
        debug!(count = unread.len(), "marking notifications read");

        try_join_all(unread.iter().map(|id| self.mark_notification_read(*id))).await?;
        Ok(unread.len())
    }
}
