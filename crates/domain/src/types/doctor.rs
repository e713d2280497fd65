//! Doctor profile types

use serde::{Deserialize, Serialize};

/// A doctor's availability flag, mirrored live to patient-facing views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityStatus {
    Active,
    Away,
}

impl AvailabilityStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Away => "away",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "away" => Some(Self::Away),
            _ => None,
        }
    }

    /// The other state; two toggles return to the original value.
    pub fn toggled(self) -> Self {
        match self {
            Self::Active => Self::Away,
            Self::Away => Self::Active,
        }
    }
}

/// A doctor's practice-facing profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorProfile {
    /// Identity-provider user id; doubles as the profile key
    pub user_id: String,
    pub practice_id: String,
    pub specialty: String,
    pub license_number: String,
    pub availability: AvailabilityStatus,
    /// Free-form working hours text, e.g. "Mon-Fri 9:00-17:00"
    pub working_hours: Option<String>,
    pub updated_at: i64,
}

/// Payload for creating or updating the caller's own profile
///
/// Availability is deliberately absent: it moves through the dedicated
/// availability operations so every transition is published.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDoctorProfile {
    pub practice_id: String,
    pub specialty: String,
    pub license_number: String,
    pub working_hours: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_is_an_involution() {
        assert_eq!(AvailabilityStatus::Active.toggled(), AvailabilityStatus::Away);
        assert_eq!(AvailabilityStatus::Active.toggled().toggled(), AvailabilityStatus::Active);
    }
}
