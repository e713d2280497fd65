//! Row-change events published to live viewers
//!
//! The change feed replaces the original per-feature realtime
//! subscriptions with one typed topic/event pair. A topic identifies a
//! single row's change stream; events are published only after the
//! underlying write has been confirmed by the store.

use serde::{Deserialize, Serialize};

use crate::types::doctor::AvailabilityStatus;
use crate::types::notification::Notification;

/// A single row's change stream, scoped the way viewers subscribe
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum Topic {
    /// A doctor's availability flag, keyed by the doctor's user id
    Availability { doctor_user_id: String },
    /// A user's notification inserts, keyed by the recipient's user id
    Notifications { user_id: String },
}

impl Topic {
    /// Stable channel key used by the hub.
    pub fn key(&self) -> String {
        match self {
            Self::Availability { doctor_user_id } => format!("availability:{doctor_user_id}"),
            Self::Notifications { user_id } => format!("notifications:{user_id}"),
        }
    }
}

/// A confirmed row change
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChangeEvent {
    AvailabilityChanged {
        doctor_user_id: String,
        status: AvailabilityStatus,
        at: i64,
    },
    NotificationInserted {
        notification: Notification,
    },
}

impl ChangeEvent {
    /// The topic this event belongs to.
    pub fn topic(&self) -> Topic {
        match self {
            Self::AvailabilityChanged { doctor_user_id, .. } => {
                Topic::Availability { doctor_user_id: doctor_user_id.clone() }
            }
            Self::NotificationInserted { notification } => {
                Topic::Notifications { user_id: notification.user_id.clone() }
            }
        }
    }
}
