//! Notification types
//!
//! Notifications are inserted by the services as side effects of lifecycle
//! transitions; only the recipient flips the read flag.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Category of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    InvitationAccepted,
    JoinRequestSubmitted,
    JoinRequestApproved,
    JoinRequestRejected,
    System,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvitationAccepted => "invitation_accepted",
            Self::JoinRequestSubmitted => "join_request_submitted",
            Self::JoinRequestApproved => "join_request_approved",
            Self::JoinRequestRejected => "join_request_rejected",
            Self::System => "system",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "invitation_accepted" => Some(Self::InvitationAccepted),
            "join_request_submitted" => Some(Self::JoinRequestSubmitted),
            "join_request_approved" => Some(Self::JoinRequestApproved),
            "join_request_rejected" => Some(Self::JoinRequestRejected),
            "system" => Some(Self::System),
            _ => None,
        }
    }
}

/// A per-user notification row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
    pub read: bool,
    pub created_at: i64,
}

impl Notification {
    /// Build a fresh unread notification.
    pub fn new(
        user_id: impl Into<String>,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        link: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            kind,
            title: title.into(),
            message: message.into(),
            link,
            read: false,
            created_at: Utc::now().timestamp(),
        }
    }
}

/// The feed returned on initial fetch: the newest window plus the unread
/// count within it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationFeed {
    pub notifications: Vec<Notification>,
    pub unread: usize,
}

impl NotificationFeed {
    /// Assemble a feed from a fetched window, deriving the unread count.
    pub fn from_window(notifications: Vec<Notification>) -> Self {
        let unread = notifications.iter().filter(|n| !n.read).count();
        Self { notifications, unread }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unread_count_matches_fetched_window() {
        let mut a = Notification::new("u-1", NotificationKind::System, "t", "m", None);
        a.read = true;
        let b = Notification::new("u-1", NotificationKind::System, "t", "m", None);
        let c = Notification::new("u-1", NotificationKind::System, "t", "m", None);

        let feed = NotificationFeed::from_window(vec![a, b, c]);
        assert_eq!(feed.unread, 2);
    }

    #[test]
    fn empty_window_has_zero_unread() {
        let feed = NotificationFeed::from_window(Vec::new());
        assert_eq!(feed.unread, 0);
    }
}
