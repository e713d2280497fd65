//! Join-request lifecycle service - core business logic

use std::sync::Arc;

use chrono::Utc;
use clinica_domain::{
    ClinicaError, CurrentUser, JoinRequest, NewJoinRequest, NotificationKind, Result, StaffOrigin,
    StaffRecord,
};
use tracing::{error, info};

use super::ports::JoinRequestRepository;
use crate::notifications::NotificationService;
use crate::practices::ports::{PracticeRepository, StaffRepository};
use crate::practices::require_admin;

/// Join-request lifecycle service
pub struct JoinRequestService {
    requests: Arc<dyn JoinRequestRepository>,
    staff: Arc<dyn StaffRepository>,
    practices: Arc<dyn PracticeRepository>,
    notifications: Arc<NotificationService>,
}

impl JoinRequestService {
    /// Create a new join-request service
    pub fn new(
        requests: Arc<dyn JoinRequestRepository>,
        staff: Arc<dyn StaffRepository>,
        practices: Arc<dyn PracticeRepository>,
        notifications: Arc<NotificationService>,
    ) -> Self {
        Self { requests, staff, practices, notifications }
    }

    /// Submit a pending request for the current user.
    ///
    /// A second pending request for the same (user, practice) pair comes
    /// back as the repository's duplicate-request conflict; an existing
    /// membership is refused before the insert is attempted.
    pub async fn submit(
        &self,
        user: &CurrentUser,
        practice_id: &str,
        new: NewJoinRequest,
    ) -> Result<JoinRequest> {
        let practice = self
            .practices
            .get(practice_id)
            .await?
            .ok_or_else(|| ClinicaError::NotFound(format!("practice {practice_id}")))?;
        if self.staff.find_active(&user.id, practice_id).await?.is_some() {
            return Err(ClinicaError::Conflict("already a member of this practice".into()));
        }

        let request = JoinRequest::new(user.id.clone(), practice_id, new.role, new.message);
        self.requests.insert(request.clone()).await?;

        for admin in self.staff.list_admins(practice_id).await? {
            if let Err(err) = self
                .notifications
                .notify(
                    &admin.user_id,
                    NotificationKind::JoinRequestSubmitted,
                    "New join request",
                    format!("{} asked to join {} as {}", user.email, practice.name, new.role.as_str()),
                    None,
                )
                .await
            {
                error!(error = %err, admin_id = %admin.user_id, "failed to notify admin of join request");
            }
        }

        info!(
            request_id = %request.id,
            practice_id,
            user_id = %user.id,
            role = new.role.as_str(),
            "join request submitted"
        );
        Ok(request)
    }

    /// Approve a pending request, provisioning the requester's staff
    /// record atomically.
    pub async fn approve(&self, actor: &CurrentUser, request_id: &str) -> Result<StaffRecord> {
        let request = self.get(request_id).await?;
        require_admin(self.staff.as_ref(), &actor.id, &request.practice_id).await?;
        if !request.is_pending() {
            return Err(ClinicaError::Conflict("join request already decided".into()));
        }

        let now = Utc::now().timestamp();
        let record = StaffRecord::new(
            request.user_id.clone(),
            request.practice_id.clone(),
            request.role,
            None,
            StaffOrigin::JoinRequest,
            now,
        );
        let decided = self
            .requests
            .approve_and_provision(request_id, record.clone(), &actor.id, now)
            .await?;
        if !decided {
            return Err(ClinicaError::Conflict("join request already decided".into()));
        }

        self.notify_decision(&request, NotificationKind::JoinRequestApproved, "approved").await;
        info!(request_id, actor_id = %actor.id, "join request approved");
        Ok(record)
    }

    /// Reject a pending request.
    pub async fn reject(&self, actor: &CurrentUser, request_id: &str) -> Result<()> {
        let request = self.get(request_id).await?;
        require_admin(self.staff.as_ref(), &actor.id, &request.practice_id).await?;
        if !request.is_pending() {
            return Err(ClinicaError::Conflict("join request already decided".into()));
        }

        let now = Utc::now().timestamp();
        if !self.requests.reject(request_id, &actor.id, now).await? {
            return Err(ClinicaError::Conflict("join request already decided".into()));
        }

        self.notify_decision(&request, NotificationKind::JoinRequestRejected, "rejected").await;
        info!(request_id, actor_id = %actor.id, "join request rejected");
        Ok(())
    }

    /// List a practice's requests, admin-only.
    pub async fn list(&self, actor: &CurrentUser, practice_id: &str) -> Result<Vec<JoinRequest>> {
        require_admin(self.staff.as_ref(), &actor.id, practice_id).await?;
        self.requests.list_for_practice(practice_id).await
    }

    async fn get(&self, request_id: &str) -> Result<JoinRequest> {
        self.requests
            .get(request_id)
            .await?
            .ok_or_else(|| ClinicaError::NotFound("join request".into()))
    }

    async fn notify_decision(&self, request: &JoinRequest, kind: NotificationKind, verb: &str) {
        if let Err(err) = self
            .notifications
            .notify(
                &request.user_id,
                kind,
                format!("Join request {verb}"),
                format!("Your request to join was {verb}"),
                None,
            )
            .await
        {
            error!(error = %err, request_id = %request.id, "failed to notify requester of decision");
        }
    }
}
