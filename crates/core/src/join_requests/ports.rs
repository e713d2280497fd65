//! Port interface for join requests

use async_trait::async_trait;
use clinica_domain::{JoinRequest, Result, StaffRecord};

/// Trait for persisting join requests
#[async_trait]
pub trait JoinRequestRepository: Send + Sync {
    /// Insert a fresh pending request.
    ///
    /// At most one pending request may exist per (user, practice) pair;
    /// implementations surface a violation as `ClinicaError::Conflict`,
    /// distinguishable from generic storage failures.
    async fn insert(&self, request: JoinRequest) -> Result<()>;

    /// Fetch a request by id
    async fn get(&self, id: &str) -> Result<Option<JoinRequest>>;

    /// A practice's requests, newest first
    async fn list_for_practice(&self, practice_id: &str) -> Result<Vec<JoinRequest>>;

    /// Atomically approve a pending request and provision the staff
    /// record; returns false when the request was not pending
    async fn approve_and_provision(
        &self,
        request_id: &str,
        staff: StaffRecord,
        decided_by: &str,
        decided_at: i64,
    ) -> Result<bool>;

    /// Flip a pending request to rejected; returns false when the request
    /// was not pending
    async fn reject(&self, request_id: &str, decided_by: &str, decided_at: i64) -> Result<bool>;
}
