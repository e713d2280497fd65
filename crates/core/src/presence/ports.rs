//! Port interface for doctor profiles

use async_trait::async_trait;
use clinica_domain::{AvailabilityStatus, DoctorProfile, Result};

/// Trait for persisting doctor profiles
#[async_trait]
pub trait DoctorProfileRepository: Send + Sync {
    /// Insert or replace a doctor's profile
    async fn upsert(&self, profile: DoctorProfile) -> Result<()>;

    /// Fetch a profile by the doctor's user id
    async fn get(&self, user_id: &str) -> Result<Option<DoctorProfile>>;

    /// Write an availability value; returns the confirmed value, or None
    /// when no profile exists
    async fn set_availability(
        &self,
        user_id: &str,
        status: AvailabilityStatus,
        at: i64,
    ) -> Result<Option<AvailabilityStatus>>;

    /// Flip availability in the store and return the confirmed new value,
    /// or None when no profile exists
    async fn toggle_availability(
        &self,
        user_id: &str,
        at: i64,
    ) -> Result<Option<AvailabilityStatus>>;
}
