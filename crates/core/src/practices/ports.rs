//! Port interfaces for practices and staff records
//!
//! These traits define the boundaries between core business logic
//! and infrastructure implementations.

use async_trait::async_trait;
use clinica_domain::{Practice, PracticeUpdate, Result, StaffRecord};

/// Trait for persisting practices
#[async_trait]
pub trait PracticeRepository: Send + Sync {
    /// Insert the practice and its owner's admin staff record atomically.
    async fn create_with_owner(&self, practice: Practice, owner: StaffRecord) -> Result<()>;

    /// Fetch a practice by id
    async fn get(&self, id: &str) -> Result<Option<Practice>>;

    /// Apply a partial update; returns false when no row matched
    async fn update(&self, id: &str, update: PracticeUpdate, updated_at: i64) -> Result<bool>;
}

/// Trait for persisting staff records
#[async_trait]
pub trait StaffRepository: Send + Sync {
    /// Insert a staff record
    async fn insert(&self, record: StaffRecord) -> Result<()>;

    /// The caller's active record for a practice, if any
    async fn find_active(&self, user_id: &str, practice_id: &str) -> Result<Option<StaffRecord>>;

    /// Full roster of a practice
    async fn list_for_practice(&self, practice_id: &str) -> Result<Vec<StaffRecord>>;

    /// Active admins of a practice
    async fn list_admins(&self, practice_id: &str) -> Result<Vec<StaffRecord>>;
}
