//! Port interfaces for the invitation lifecycle

use async_trait::async_trait;
use clinica_domain::{Invitation, Result, StaffRecord};

/// Trait for persisting invitations
#[async_trait]
pub trait InvitationRepository: Send + Sync {
    /// Insert a fresh pending invitation
    async fn insert(&self, invitation: Invitation) -> Result<()>;

    /// Fetch an invitation by id
    async fn get(&self, id: &str) -> Result<Option<Invitation>>;

    /// Fetch an invitation by its acceptance token
    async fn find_by_token(&self, token: &str) -> Result<Option<Invitation>>;

    /// All invitations issued for a practice, newest first
    async fn list_for_practice(&self, practice_id: &str) -> Result<Vec<Invitation>>;

    /// Persist the expired marker on a row whose expiry has passed
    async fn mark_expired(&self, id: &str) -> Result<()>;

    /// Flip a pending invitation to revoked; returns false when the row
    /// was not pending
    async fn revoke(&self, id: &str) -> Result<bool>;

    /// Atomically consume a pending invitation and provision the staff
    /// record.
    ///
    /// The transition is conditional on `status = 'pending'` and an
    /// unexpired row; returns false when the condition did not hold, so
    /// concurrent acceptance succeeds at most once.
    async fn accept_and_provision(
        &self,
        invitation_id: &str,
        staff: StaffRecord,
        accepted_at: i64,
    ) -> Result<bool>;
}

/// Trait for delivering invitation emails
#[async_trait]
pub trait InvitationMailer: Send + Sync {
    /// Send the acceptance email. Delivery is best-effort from the
    /// caller's point of view; failures must not fail invitation creation.
    async fn send_invitation(
        &self,
        invitation: &Invitation,
        practice_name: &str,
        accept_link: &str,
    ) -> Result<()>;
}
