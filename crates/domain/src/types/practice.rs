//! Practice types
//!
//! A practice is the tenant unit of the portal: staff records, invitations
//! and join requests are all scoped to one.

use serde::{Deserialize, Serialize};

/// A medical practice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Practice {
    pub id: String,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Payload for creating a practice during onboarding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPractice {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
}

/// Partial update applied by a practice admin
///
/// `None` fields are left untouched. Practices are never hard-deleted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PracticeUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl PracticeUpdate {
    /// True when the update carries no changes at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.address.is_none() && self.phone.is_none() && self.email.is_none()
    }
}
