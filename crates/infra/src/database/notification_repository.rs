//! Notification repository implementation using SQLite

use std::sync::Arc;

use async_trait::async_trait;
use clinica_core::notifications::ports::NotificationRepository as NotificationRepositoryPort;
use clinica_domain::{Notification, NotificationKind, Result as DomainResult};
use rusqlite::{params, Row};
use tokio::task;

use super::manager::DbManager;
use super::{bool_to_int, int_to_bool, map_join_error, map_sql_error};

/// SQLite-backed implementation of `NotificationRepository`
pub struct SqliteNotificationRepository {
    db: Arc<DbManager>,
}

impl SqliteNotificationRepository {
    /// Create a new repository instance
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl NotificationRepositoryPort for SqliteNotificationRepository {
    async fn insert(&self, notification: Notification) -> DomainResult<()> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            conn.execute(
                "INSERT INTO notifications (
                    id, user_id, kind, title, message, link, read, created_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    &notification.id,
                    &notification.user_id,
                    notification.kind.as_str(),
                    &notification.title,
                    &notification.message,
                    &notification.link,
                    &bool_to_int(notification.read),
                    &notification.created_at,
                ],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn recent(&self, user_id: &str, limit: usize) -> DomainResult<Vec<Notification>> {
        let db = Arc::clone(&self.db);
        let user_id = user_id.to_string();

        task::spawn_blocking(move || -> DomainResult<Vec<Notification>> {
            let conn = db.get_connection()?;
            let mut stmt = conn
                .prepare(
                    "SELECT id, user_id, kind, title, message, link, read, created_at
                     FROM notifications
                     WHERE user_id = ?1
                     ORDER BY created_at DESC, id DESC
                     LIMIT ?2",
                )
                .map_err(map_sql_error)?;
            let rows = stmt
                .query_map(params![&user_id, &(limit as i64)], map_notification_row)
                .map_err(map_sql_error)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(map_sql_error)?;
            Ok(rows)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn mark_read(&self, user_id: &str, notification_id: &str) -> DomainResult<bool> {
        let db = Arc::clone(&self.db);
        let user_id = user_id.to_string();
        let notification_id = notification_id.to_string();

        task::spawn_blocking(move || -> DomainResult<bool> {
            let conn = db.get_connection()?;
            let changed = conn
                .execute(
                    "UPDATE notifications SET read = 1
                     WHERE id = ?1 AND user_id = ?2 AND read = 0",
                    params![&notification_id, &user_id],
                )
                .map_err(map_sql_error)?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_join_error)?
    }
}

/// Map a row to a Notification
fn map_notification_row(row: &Row) -> rusqlite::Result<Notification> {
    let kind: String = row.get(2)?;
    Ok(Notification {
        id: row.get(0)?,
        user_id: row.get(1)?,
        kind: NotificationKind::parse(&kind).unwrap_or(NotificationKind::System),
        title: row.get(3)?,
        message: row.get(4)?,
        link: row.get(5)?,
        read: int_to_bool(row.get(6)?),
        created_at: row.get(7)?,
    })
}
