//! Availability service - core business logic
//!
//! Writes are confirmed by the store before local state or live viewers
//! see them; a failed write changes nothing anywhere.

use std::sync::Arc;

use chrono::Utc;
use clinica_domain::{
    AvailabilityStatus, ChangeEvent, ClinicaError, CurrentUser, DoctorProfile, NewDoctorProfile,
    Result,
};
use tracing::info;

use super::ports::DoctorProfileRepository;
use crate::realtime::ports::ChangePublisher;

/// Doctor availability service
pub struct PresenceService {
    doctors: Arc<dyn DoctorProfileRepository>,
    publisher: Arc<dyn ChangePublisher>,
}

impl PresenceService {
    /// Create a new presence service
    pub fn new(
        doctors: Arc<dyn DoctorProfileRepository>,
        publisher: Arc<dyn ChangePublisher>,
    ) -> Self {
        Self { doctors, publisher }
    }

    /// Fetch a doctor's profile
    pub async fn profile(&self, user_id: &str) -> Result<DoctorProfile> {
        self.doctors
            .get(user_id)
            .await?
            .ok_or_else(|| ClinicaError::NotFound(format!("doctor profile {user_id}")))
    }

    /// Create or update the caller's own profile.
    ///
    /// Availability carries over from the existing profile; a brand new
    /// profile starts `active`.
    pub async fn save_profile(
        &self,
        actor: &CurrentUser,
        new: NewDoctorProfile,
    ) -> Result<DoctorProfile> {
        if new.specialty.trim().is_empty() {
            return Err(ClinicaError::Validation("specialty is required".into()));
        }
        if new.license_number.trim().is_empty() {
            return Err(ClinicaError::Validation("license number is required".into()));
        }

        let availability = match self.doctors.get(&actor.id).await? {
            Some(existing) => existing.availability,
            None => AvailabilityStatus::Active,
        };
        let profile = DoctorProfile {
            user_id: actor.id.clone(),
            practice_id: new.practice_id,
            specialty: new.specialty.trim().to_string(),
            license_number: new.license_number.trim().to_string(),
            availability,
            working_hours: new.working_hours,
            updated_at: Utc::now().timestamp(),
        };
        self.doctors.upsert(profile.clone()).await?;

        info!(user_id = %actor.id, "doctor profile saved");
        Ok(profile)
    }

    /// Current availability, fetched once when a viewer mounts.
    pub async fn availability(&self, user_id: &str) -> Result<AvailabilityStatus> {
        Ok(self.profile(user_id).await?.availability)
    }

    /// Write an explicit availability value for the caller.
    pub async fn set_availability(
        &self,
        actor: &CurrentUser,
        status: AvailabilityStatus,
    ) -> Result<AvailabilityStatus> {
        let now = Utc::now().timestamp();
        let confirmed = self
            .doctors
            .set_availability(&actor.id, status, now)
            .await?
            .ok_or_else(|| ClinicaError::NotFound(format!("doctor profile {}", actor.id)))?;

        self.publish(&actor.id, confirmed, now);
        Ok(confirmed)
    }

    /// Flip the caller's availability.
    ///
    /// Two toggles return the status to its original value and publish
    /// two distinct change events.
    pub async fn toggle_availability(&self, actor: &CurrentUser) -> Result<AvailabilityStatus> {
        let now = Utc::now().timestamp();
        let confirmed = self
            .doctors
            .toggle_availability(&actor.id, now)
            .await?
            .ok_or_else(|| ClinicaError::NotFound(format!("doctor profile {}", actor.id)))?;

        self.publish(&actor.id, confirmed, now);
        Ok(confirmed)
    }

    fn publish(&self, doctor_user_id: &str, status: AvailabilityStatus, at: i64) {
        self.publisher.publish(ChangeEvent::AvailabilityChanged {
            doctor_user_id: doctor_user_id.to_string(),
            status,
            at,
        });
        info!(doctor_user_id, status = status.as_str(), "availability changed");
    }
}
