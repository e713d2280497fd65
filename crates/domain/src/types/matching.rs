//! Physician matching types
//!
//! Wire shapes for the matching proxy. Field names are camelCase to match
//! the portal's public contract; the candidate list comes back from the
//! model gateway and is rendered as-is, with no local ranking.

use serde::{Deserialize, Serialize};

use crate::constants::{MAX_CHIEF_CONCERN_LEN, MAX_LOCATION_LEN};
use crate::errors::{ClinicaError, Result};

/// How soon the patient needs to be seen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Routine,
    Soon,
    Urgent,
}

impl Urgency {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Routine => "routine",
            Self::Soon => "soon",
            Self::Urgent => "urgent",
        }
    }
}

/// A structured patient query forwarded to the model gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchQuery {
    pub chief_concern: String,
    pub location: String,
    pub urgency: Urgency,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insurance_provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_preference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub virtual_visit: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepting_new_patients: Option<bool>,
}

impl MatchQuery {
    /// Shape-validate the query before any upstream call is made.
    ///
    /// # Errors
    /// Returns `ClinicaError::Validation` when a required field is empty or
    /// a length cap is exceeded.
    pub fn validate(&self) -> Result<()> {
        if self.chief_concern.trim().is_empty() {
            return Err(ClinicaError::Validation("chiefConcern is required".into()));
        }
        if self.chief_concern.chars().count() > MAX_CHIEF_CONCERN_LEN {
            return Err(ClinicaError::Validation(format!(
                "chiefConcern exceeds {MAX_CHIEF_CONCERN_LEN} characters"
            )));
        }
        if self.location.trim().is_empty() {
            return Err(ClinicaError::Validation("location is required".into()));
        }
        if self.location.chars().count() > MAX_LOCATION_LEN {
            return Err(ClinicaError::Validation(format!(
                "location exceeds {MAX_LOCATION_LEN} characters"
            )));
        }
        Ok(())
    }
}

/// A candidate physician as returned by the gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicianCandidate {
    pub id: String,
    pub name: String,
    pub specialty: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub distance: String,
    #[serde(default)]
    pub availability: String,
    #[serde(default)]
    pub match_score: f64,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub education: String,
    #[serde(default)]
    pub certifications: Vec<String>,
    #[serde(default)]
    pub experience: String,
}

/// The candidate list rendered by the caller
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchResponse {
    pub physicians: Vec<PhysicianCandidate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(concern: &str, location: &str) -> MatchQuery {
        MatchQuery {
            chief_concern: concern.into(),
            location: location.into(),
            urgency: Urgency::Routine,
            specialty: None,
            insurance_provider: None,
            preferred_gender: None,
            language_preference: None,
            virtual_visit: None,
            accepting_new_patients: None,
        }
    }

    #[test]
    fn accepts_a_query_at_the_length_caps() {
        let q = query(&"a".repeat(MAX_CHIEF_CONCERN_LEN), &"b".repeat(MAX_LOCATION_LEN));
        assert!(q.validate().is_ok());
    }

    #[test]
    fn rejects_an_oversized_chief_concern() {
        let q = query(&"a".repeat(MAX_CHIEF_CONCERN_LEN + 1), "Boston");
        assert!(matches!(q.validate(), Err(ClinicaError::Validation(_))));
    }

    #[test]
    fn rejects_blank_required_fields() {
        assert!(query("  ", "Boston").validate().is_err());
        assert!(query("headache", "").validate().is_err());
    }

    #[test]
    fn wire_field_names_are_camel_case() {
        let json = serde_json::to_value(query("headache", "Boston")).unwrap();
        assert!(json.get("chiefConcern").is_some());
        assert_eq!(json.get("urgency").and_then(|v| v.as_str()), Some("routine"));
    }
}
