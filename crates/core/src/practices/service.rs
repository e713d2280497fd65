//! Practice management service - core business logic

use std::sync::Arc;

use chrono::Utc;
use clinica_domain::{
    ClinicaError, CurrentUser, NewPractice, Practice, PracticeUpdate, Result, StaffOrigin,
    StaffRecord, StaffRole,
};
use tracing::info;

use super::ports::{PracticeRepository, StaffRepository};
use crate::utils::is_valid_email;

/// Require an active admin staff record for the practice.
///
/// The active staff record is the sole source of practice-scoped
/// permissions; no other signal grants admin rights.
pub async fn require_admin(
    staff: &dyn StaffRepository,
    user_id: &str,
    practice_id: &str,
) -> Result<StaffRecord> {
    let record = require_member(staff, user_id, practice_id).await?;
    if record.role != StaffRole::Admin {
        return Err(ClinicaError::Forbidden("practice admin role required".into()));
    }
    Ok(record)
}

/// Require any active staff record for the practice.
pub async fn require_member(
    staff: &dyn StaffRepository,
    user_id: &str,
    practice_id: &str,
) -> Result<StaffRecord> {
    staff
        .find_active(user_id, practice_id)
        .await?
        .ok_or_else(|| ClinicaError::Forbidden("not an active member of this practice".into()))
}

/// Practice onboarding and administration
pub struct PracticeService {
    practices: Arc<dyn PracticeRepository>,
    staff: Arc<dyn StaffRepository>,
}

impl PracticeService {
    /// Create a new practice service
    pub fn new(practices: Arc<dyn PracticeRepository>, staff: Arc<dyn StaffRepository>) -> Self {
        Self { practices, staff }
    }

    /// Create a practice with the caller as its owning admin.
    ///
    /// The practice row and the owner's staff record (origin `owner`) are
    /// written in a single transaction, mirroring the privileged
    /// server-side function the original portal called at onboarding.
    pub async fn create_practice(&self, owner: &CurrentUser, new: NewPractice) -> Result<Practice> {
        validate_new_practice(&new)?;

        let now = Utc::now().timestamp();
        let practice = Practice {
            id: uuid::Uuid::new_v4().to_string(),
            name: new.name.trim().to_string(),
            address: new.address.trim().to_string(),
            phone: new.phone.trim().to_string(),
            email: new.email.trim().to_string(),
            created_at: now,
            updated_at: now,
        };
        let record = StaffRecord::new(
            owner.id.clone(),
            practice.id.clone(),
            StaffRole::Admin,
            None,
            StaffOrigin::Owner,
            now,
        );

        self.practices.create_with_owner(practice.clone(), record).await?;

        info!(practice_id = %practice.id, owner_id = %owner.id, "practice created");
        Ok(practice)
    }

    /// Fetch a practice by id
    pub async fn get_practice(&self, id: &str) -> Result<Practice> {
        self.practices
            .get(id)
            .await?
            .ok_or_else(|| ClinicaError::NotFound(format!("practice {id}")))
    }

    /// Apply an admin's partial update and return the fresh row.
    pub async fn update_practice(
        &self,
        actor: &CurrentUser,
        practice_id: &str,
        update: PracticeUpdate,
    ) -> Result<Practice> {
        require_admin(self.staff.as_ref(), &actor.id, practice_id).await?;

        if update.is_empty() {
            return Err(ClinicaError::Validation("update carries no changes".into()));
        }
        if let Some(email) = update.email.as_deref() {
            if !is_valid_email(email) {
                return Err(ClinicaError::Validation("invalid practice email".into()));
            }
        }

        let now = Utc::now().timestamp();
        if !self.practices.update(practice_id, update, now).await? {
            return Err(ClinicaError::NotFound(format!("practice {practice_id}")));
        }

        info!(practice_id, actor_id = %actor.id, "practice updated");
        self.get_practice(practice_id).await
    }

    /// Roster of a practice, visible to any active member.
    pub async fn roster(&self, actor: &CurrentUser, practice_id: &str) -> Result<Vec<StaffRecord>> {
        require_member(self.staff.as_ref(), &actor.id, practice_id).await?;
        self.staff.list_for_practice(practice_id).await
    }
}

fn validate_new_practice(new: &NewPractice) -> Result<()> {
    if new.name.trim().is_empty() {
        return Err(ClinicaError::Validation("practice name is required".into()));
    }
    if new.address.trim().is_empty() {
        return Err(ClinicaError::Validation("practice address is required".into()));
    }
    if new.phone.trim().is_empty() {
        return Err(ClinicaError::Validation("practice phone is required".into()));
    }
    if !is_valid_email(new.email.trim()) {
        return Err(ClinicaError::Validation("invalid practice email".into()));
    }
    Ok(())
}
