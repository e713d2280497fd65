//! Invitation types
//!
//! An invitation is a time-boxed, single-use token inviting a specific
//! email address into a practice with a given role.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::constants::INVITATION_TTL_DAYS;
use crate::types::staff::StaffRole;

/// Lifecycle state of an invitation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Expired,
    Revoked,
}

impl InvitationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Expired => "expired",
            Self::Revoked => "revoked",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "accepted" => Some(Self::Accepted),
            "expired" => Some(Self::Expired),
            "revoked" => Some(Self::Revoked),
            _ => None,
        }
    }
}

/// A practice invitation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invitation {
    pub id: String,
    pub practice_id: String,
    pub email: String,
    pub role: StaffRole,
    pub department: Option<String>,
    pub invited_by: String,
    pub token: String,
    pub status: InvitationStatus,
    pub expires_at: i64,
    pub accepted_by: Option<String>,
    pub accepted_at: Option<i64>,
    pub created_at: i64,
}

impl Invitation {
    /// Build a pending invitation with a fresh token and a 7-day expiry.
    pub fn new(
        practice_id: impl Into<String>,
        email: impl Into<String>,
        role: StaffRole,
        department: Option<String>,
        invited_by: impl Into<String>,
    ) -> Self {
        let now = Utc::now().timestamp();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            practice_id: practice_id.into(),
            email: email.into(),
            role,
            department,
            invited_by: invited_by.into(),
            token: uuid::Uuid::new_v4().to_string(),
            status: InvitationStatus::Pending,
            expires_at: now + INVITATION_TTL_DAYS * 86_400,
            accepted_by: None,
            accepted_at: None,
            created_at: now,
        }
    }

    /// Check if the invitation's expiry has passed.
    ///
    /// Expiry wins over stored status: an expired row is invalid even when
    /// the status column still reads `pending`.
    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.expires_at
    }
}

/// Payload for creating an invitation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewInvitation {
    pub email: String,
    pub role: StaffRole,
    pub department: Option<String>,
}

/// Result of invitation creation
///
/// `email_sent` is false when the record was persisted but the outbound
/// notification failed; creation itself still succeeded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvitationReceipt {
    pub invitation: Invitation,
    pub email_sent: bool,
}

/// Result of a successful acceptance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceptedInvitation {
    pub practice_id: String,
    pub staff: crate::types::staff::StaffRecord,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_invitations_are_pending_for_seven_days() {
        let inv = Invitation::new("p-1", "doc@example.com", StaffRole::Doctor, None, "u-owner");
        assert_eq!(inv.status, InvitationStatus::Pending);
        assert_eq!(inv.expires_at - inv.created_at, INVITATION_TTL_DAYS * 86_400);
        assert!(!inv.is_expired(inv.created_at));
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let inv = Invitation::new("p-1", "doc@example.com", StaffRole::Doctor, None, "u-owner");
        assert!(inv.is_expired(inv.expires_at));
        assert!(!inv.is_expired(inv.expires_at - 1));
    }

    #[test]
    fn tokens_are_unique_per_invitation() {
        let a = Invitation::new("p-1", "a@example.com", StaffRole::Nurse, None, "u-owner");
        let b = Invitation::new("p-1", "a@example.com", StaffRole::Nurse, None, "u-owner");
        assert_ne!(a.token, b.token);
    }
}
