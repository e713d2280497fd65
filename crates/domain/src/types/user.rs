//! Session user types
//!
//! The authenticated caller as reported by the external identity provider.
//! Only the subset the portal needs crosses this boundary; profiles are
//! never stored locally.

use serde::{Deserialize, Serialize};

/// The authenticated user attached to a request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Identity-provider subject id
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
}

impl CurrentUser {
    /// Case-insensitive email comparison, used for invitation-identity
    /// enforcement.
    pub fn email_matches(&self, other: &str) -> bool {
        self.email.eq_ignore_ascii_case(other)
    }
}
