//! Port interface for notification storage

use async_trait::async_trait;
use clinica_domain::{Notification, Result};

/// Trait for persisting notifications
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Insert a notification row
    async fn insert(&self, notification: Notification) -> Result<()>;

    /// The `limit` most recent notifications for a user, newest first
    async fn recent(&self, user_id: &str, limit: usize) -> Result<Vec<Notification>>;

    /// Flip the read flag on the recipient's own row.
    ///
    /// Returns false when the row does not exist, belongs to someone
    /// else, or was already read - all of which are no-ops for the caller.
    async fn mark_read(&self, user_id: &str, notification_id: &str) -> Result<bool>;
}
