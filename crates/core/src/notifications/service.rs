//! Notification feed service - core business logic

use std::sync::Arc;

use clinica_domain::constants::NOTIFICATION_FEED_LIMIT;
use clinica_domain::{
    ChangeEvent, CurrentUser, Notification, NotificationFeed, NotificationKind, Result,
};
use tracing::{debug, info};

use super::ports::NotificationRepository;
use crate::realtime::ports::ChangePublisher;

/// Notification feed service
///
/// Inserts are published to the recipient's change topic only after the
/// row has committed; reads derive their counts from confirmed state, so
/// there is no optimistic local bookkeeping to roll back.
pub struct NotificationService {
    repository: Arc<dyn NotificationRepository>,
    publisher: Arc<dyn ChangePublisher>,
}

impl NotificationService {
    /// Create a new notification service
    pub fn new(
        repository: Arc<dyn NotificationRepository>,
        publisher: Arc<dyn ChangePublisher>,
    ) -> Self {
        Self { repository, publisher }
    }

    /// The feed shown on mount: the 10 newest rows plus the unread count
    /// within that window.
    pub async fn feed(&self, user: &CurrentUser) -> Result<NotificationFeed> {
        let window = self.repository.recent(&user.id, NOTIFICATION_FEED_LIMIT).await?;
        Ok(NotificationFeed::from_window(window))
    }

    /// Mark one of the caller's notifications read and return the fresh
    /// feed.
    ///
    /// Marking an unknown, foreign, or already-read row is a no-op; the
    /// returned count is always derived from stored state and never goes
    /// below zero.
    pub async fn mark_as_read(
        &self,
        user: &CurrentUser,
        notification_id: &str,
    ) -> Result<NotificationFeed> {
        let changed = self.repository.mark_read(&user.id, notification_id).await?;
        if changed {
            debug!(user_id = %user.id, notification_id, "notification marked read");
        } else {
            debug!(user_id = %user.id, notification_id, "mark-as-read was a no-op");
        }
        self.feed(user).await
    }

    /// Insert a notification and publish the insert to live viewers.
    pub async fn notify(
        &self,
        user_id: &str,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        link: Option<String>,
    ) -> Result<Notification> {
        let notification = Notification::new(user_id, kind, title, message, link);
        self.repository.insert(notification.clone()).await?;
        self.publisher
            .publish(ChangeEvent::NotificationInserted { notification: notification.clone() });

        info!(
            user_id,
            kind = kind.as_str(),
            notification_id = %notification.id,
            "notification delivered"
        );
        Ok(notification)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    #[derive(Default)]
    struct MemNotifications {
        rows: Mutex<Vec<Notification>>,
    }

    #[async_trait]
    impl NotificationRepository for MemNotifications {
        async fn insert(&self, notification: Notification) -> Result<()> {
            self.rows.lock().unwrap().push(notification);
            Ok(())
        }

        async fn recent(&self, user_id: &str, limit: usize) -> Result<Vec<Notification>> {
            let rows = self.rows.lock().unwrap();
            let mut out: Vec<_> = rows.iter().filter(|n| n.user_id == user_id).cloned().collect();
            out.reverse();
            out.truncate(limit);
            Ok(out)
        }

        async fn mark_read(&self, user_id: &str, notification_id: &str) -> Result<bool> {
            let mut rows = self.rows.lock().unwrap();
            match rows
                .iter_mut()
                .find(|n| n.id == notification_id && n.user_id == user_id && !n.read)
            {
                Some(row) => {
                    row.read = true;
                    Ok(true)
                }
                None => Ok(false),
            }
        }
    }

    #[derive(Default)]
    struct RecordingPublisher {
        events: Mutex<Vec<ChangeEvent>>,
    }

    impl ChangePublisher for RecordingPublisher {
        fn publish(&self, event: ChangeEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    fn user() -> CurrentUser {
        CurrentUser { id: "u-1".into(), email: "u1@example.com".into(), display_name: None }
    }

    fn service() -> (NotificationService, Arc<MemNotifications>, Arc<RecordingPublisher>) {
        let repo = Arc::new(MemNotifications::default());
        let publisher = Arc::new(RecordingPublisher::default());
        let service = NotificationService::new(repo.clone(), publisher.clone());
        (service, repo, publisher)
    }

    #[tokio::test]
    async fn feed_is_capped_at_the_window_size() {
        let (service, _, _) = service();
        for i in 0..15 {
            service
                .notify(&user().id, NotificationKind::System, format!("n{i}"), "m", None)
                .await
                .unwrap();
        }

        let feed = service.feed(&user()).await.unwrap();
        assert_eq!(feed.notifications.len(), NOTIFICATION_FEED_LIMIT);
        assert_eq!(feed.unread, NOTIFICATION_FEED_LIMIT);
    }

    #[tokio::test]
    async fn mark_as_read_decrements_by_exactly_one() {
        let (service, _, _) = service();
        let a = service.notify(&user().id, NotificationKind::System, "a", "m", None).await.unwrap();
        service.notify(&user().id, NotificationKind::System, "b", "m", None).await.unwrap();

        let before = service.feed(&user()).await.unwrap();
        assert_eq!(before.unread, 2);

        let after = service.mark_as_read(&user(), &a.id).await.unwrap();
        assert_eq!(after.unread, 1);
    }

    #[tokio::test]
    async fn marking_twice_never_goes_below_zero() {
        let (service, _, _) = service();
        let n = service.notify(&user().id, NotificationKind::System, "a", "m", None).await.unwrap();

        let first = service.mark_as_read(&user(), &n.id).await.unwrap();
        assert_eq!(first.unread, 0);
        let second = service.mark_as_read(&user(), &n.id).await.unwrap();
        assert_eq!(second.unread, 0);
    }

    #[tokio::test]
    async fn recipients_cannot_mark_foreign_rows() {
        let (service, repo, _) = service();
        let n = service.notify("u-2", NotificationKind::System, "a", "m", None).await.unwrap();

        service.mark_as_read(&user(), &n.id).await.unwrap();
        assert!(!repo.rows.lock().unwrap()[0].read);
    }

    #[tokio::test]
    async fn notify_publishes_after_the_insert_commits() {
        let (service, repo, publisher) = service();
        service.notify(&user().id, NotificationKind::System, "a", "m", None).await.unwrap();

        assert_eq!(repo.rows.lock().unwrap().len(), 1);
        let events = publisher.events.lock().unwrap();
        assert!(matches!(events.as_slice(), [ChangeEvent::NotificationInserted { .. }]));
    }
}
