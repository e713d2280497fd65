//! Join request types
//!
//! A join request is a user-initiated ask to join a practice, decided by a
//! practice admin. At most one *pending* request may exist per
//! (user, practice) pair; the storage layer enforces this and surfaces the
//! violation as a duplicate-request conflict.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::types::staff::StaffRole;

/// Lifecycle state of a join request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinRequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl JoinRequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// A request to join a practice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRequest {
    pub id: String,
    pub user_id: String,
    pub practice_id: String,
    pub role: StaffRole,
    pub message: Option<String>,
    pub status: JoinRequestStatus,
    pub decided_by: Option<String>,
    pub decided_at: Option<i64>,
    pub created_at: i64,
}

impl JoinRequest {
    /// Build a fresh pending request.
    pub fn new(
        user_id: impl Into<String>,
        practice_id: impl Into<String>,
        role: StaffRole,
        message: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            practice_id: practice_id.into(),
            role,
            message,
            status: JoinRequestStatus::Pending,
            decided_by: None,
            decided_at: None,
            created_at: Utc::now().timestamp(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == JoinRequestStatus::Pending
    }
}

/// Payload for submitting a join request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewJoinRequest {
    pub role: StaffRole,
    pub message: Option<String>,
}
