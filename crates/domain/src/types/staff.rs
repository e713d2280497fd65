//! Staff record types
//!
//! The staff record is the join table granting a user a role within a
//! practice. The active record is the sole source of practice-scoped
//! permissions.

use serde::{Deserialize, Serialize};

/// Role a staff member holds within a practice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    Admin,
    Doctor,
    Nurse,
    Receptionist,
}

impl StaffRole {
    /// Stable string form used in storage and over the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Doctor => "doctor",
            Self::Nurse => "nurse",
            Self::Receptionist => "receptionist",
        }
    }

    /// Parse the storage form back into a role.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Self::Admin),
            "doctor" => Some(Self::Doctor),
            "nurse" => Some(Self::Nurse),
            "receptionist" => Some(Self::Receptionist),
            _ => None,
        }
    }
}

/// Lifecycle state of a staff record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffStatus {
    Active,
    Inactive,
}

impl StaffStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            _ => None,
        }
    }
}

/// How a staff record came to exist
///
/// Exactly one of these paths produced any given record: the practice
/// creation flow, an accepted invitation, or an approved join request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffOrigin {
    Owner,
    Invitation,
    JoinRequest,
}

impl StaffOrigin {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Invitation => "invitation",
            Self::JoinRequest => "join_request",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "owner" => Some(Self::Owner),
            "invitation" => Some(Self::Invitation),
            "join_request" => Some(Self::JoinRequest),
            _ => None,
        }
    }
}

/// Membership of a user in a practice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffRecord {
    pub id: String,
    pub user_id: String,
    pub practice_id: String,
    pub role: StaffRole,
    pub department: Option<String>,
    pub status: StaffStatus,
    pub origin: StaffOrigin,
    pub created_at: i64,
}

impl StaffRecord {
    /// Build a fresh active staff record.
    pub fn new(
        user_id: impl Into<String>,
        practice_id: impl Into<String>,
        role: StaffRole,
        department: Option<String>,
        origin: StaffOrigin,
        now: i64,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            practice_id: practice_id.into(),
            role,
            department,
            status: StaffStatus::Active,
            origin,
            created_at: now,
        }
    }

    /// Whether this record currently grants permissions.
    pub fn is_active(&self) -> bool {
        self.status == StaffStatus::Active
    }
}
