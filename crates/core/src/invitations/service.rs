//! Invitation lifecycle service - core business logic

use std::sync::Arc;

use chrono::Utc;
use clinica_domain::constants::ACCEPT_INVITATION_PATH;
use clinica_domain::{
    AcceptedInvitation, ClinicaError, CurrentUser, Invitation, InvitationReceipt, InvitationStatus,
    NewInvitation, NotificationKind, Result, StaffOrigin, StaffRecord,
};
use tracing::{error, info};

use super::ports::{InvitationMailer, InvitationRepository};
use crate::notifications::NotificationService;
use crate::practices::ports::{PracticeRepository, StaffRepository};
use crate::practices::require_admin;
use crate::utils::is_valid_email;

/// Invitation lifecycle service
pub struct InvitationService {
    invitations: Arc<dyn InvitationRepository>,
    staff: Arc<dyn StaffRepository>,
    practices: Arc<dyn PracticeRepository>,
    mailer: Arc<dyn InvitationMailer>,
    notifications: Arc<NotificationService>,
    public_base_url: String,
}

impl InvitationService {
    /// Create a new invitation service
    pub fn new(
        invitations: Arc<dyn InvitationRepository>,
        staff: Arc<dyn StaffRepository>,
        practices: Arc<dyn PracticeRepository>,
        mailer: Arc<dyn InvitationMailer>,
        notifications: Arc<NotificationService>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            invitations,
            staff,
            practices,
            mailer,
            notifications,
            public_base_url: public_base_url.into(),
        }
    }

    /// Create an invitation and send the acceptance email best-effort.
    ///
    /// A mailer failure is logged and reported as `email_sent: false`;
    /// the persisted invitation stands either way.
    pub async fn create_invitation(
        &self,
        actor: &CurrentUser,
        practice_id: &str,
        new: NewInvitation,
    ) -> Result<InvitationReceipt> {
        let email = new.email.trim().to_ascii_lowercase();
        if !is_valid_email(&email) {
            return Err(ClinicaError::Validation("invalid invitation email".into()));
        }

        require_admin(self.staff.as_ref(), &actor.id, practice_id).await?;
        let practice = self
            .practices
            .get(practice_id)
            .await?
            .ok_or_else(|| ClinicaError::NotFound(format!("practice {practice_id}")))?;

        let invitation =
            Invitation::new(practice_id, email, new.role, new.department, actor.id.clone());
        self.invitations.insert(invitation.clone()).await?;

        let accept_link = self.accept_link(&invitation.token);
        let email_sent = match self
            .mailer
            .send_invitation(&invitation, &practice.name, &accept_link)
            .await
        {
            Ok(()) => true,
            Err(err) => {
                error!(
                    error = %err,
                    invitation_id = %invitation.id,
                    "failed to send invitation email; invitation stands"
                );
                false
            }
        };

        info!(
            invitation_id = %invitation.id,
            practice_id,
            role = invitation.role.as_str(),
            email_sent,
            "invitation created"
        );
        Ok(InvitationReceipt { invitation, email_sent })
    }

    /// Consume an invitation token for the authenticated user.
    ///
    /// Fails closed on every path: unknown token, past expiry (regardless
    /// of stored status), non-pending status, or an email that does not
    /// match the invited address. On success the staff record and status
    /// flip commit together, so a token is consumed at most once.
    pub async fn accept_invitation(
        &self,
        user: &CurrentUser,
        token: &str,
    ) -> Result<AcceptedInvitation> {
        let invitation = self
            .invitations
            .find_by_token(token)
            .await?
            .ok_or_else(|| ClinicaError::NotFound("invitation".into()))?;

        let now = Utc::now().timestamp();
        if invitation.is_expired(now) {
            if invitation.status == InvitationStatus::Pending {
                if let Err(err) = self.invitations.mark_expired(&invitation.id).await {
                    error!(error = %err, invitation_id = %invitation.id, "failed to persist expired marker");
                }
            }
            return Err(ClinicaError::Expired("invitation has expired".into()));
        }
        if invitation.status != InvitationStatus::Pending {
            return Err(ClinicaError::Conflict("invitation is no longer valid".into()));
        }
        if !user.email_matches(&invitation.email) {
            return Err(ClinicaError::Forbidden(
                "invitation was issued to a different email address".into(),
            ));
        }

        let staff = StaffRecord::new(
            user.id.clone(),
            invitation.practice_id.clone(),
            invitation.role,
            invitation.department.clone(),
            StaffOrigin::Invitation,
            now,
        );
        let consumed =
            self.invitations.accept_and_provision(&invitation.id, staff.clone(), now).await?;
        if !consumed {
            // Raced with another acceptance; the token is already spent.
            return Err(ClinicaError::Conflict("invitation is no longer valid".into()));
        }

        if let Err(err) = self
            .notifications
            .notify(
                &invitation.invited_by,
                NotificationKind::InvitationAccepted,
                "Invitation accepted",
                format!("{} joined as {}", user.email, invitation.role.as_str()),
                None,
            )
            .await
        {
            error!(error = %err, invitation_id = %invitation.id, "failed to notify inviter");
        }

        info!(
            invitation_id = %invitation.id,
            practice_id = %invitation.practice_id,
            user_id = %user.id,
            "invitation accepted"
        );
        Ok(AcceptedInvitation { practice_id: invitation.practice_id, staff })
    }

    /// Revoke a pending invitation.
    pub async fn revoke_invitation(&self, actor: &CurrentUser, invitation_id: &str) -> Result<()> {
        let invitation = self
            .invitations
            .get(invitation_id)
            .await?
            .ok_or_else(|| ClinicaError::NotFound("invitation".into()))?;
        require_admin(self.staff.as_ref(), &actor.id, &invitation.practice_id).await?;

        if !self.invitations.revoke(invitation_id).await? {
            return Err(ClinicaError::Conflict("only pending invitations can be revoked".into()));
        }
        info!(invitation_id, actor_id = %actor.id, "invitation revoked");
        Ok(())
    }

    /// List a practice's invitations, admin-only.
    pub async fn list_invitations(
        &self,
        actor: &CurrentUser,
        practice_id: &str,
    ) -> Result<Vec<Invitation>> {
        require_admin(self.staff.as_ref(), &actor.id, practice_id).await?;
        self.invitations.list_for_practice(practice_id).await
    }

    fn accept_link(&self, token: &str) -> String {
        let base = self.public_base_url.trim_end_matches('/');
        format!("{base}{ACCEPT_INVITATION_PATH}?token={token}")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use clinica_domain::{
        ChangeEvent, Notification, Practice, PracticeUpdate, StaffRole, StaffStatus,
    };

    use super::*;
    use crate::notifications::ports::NotificationRepository;
    use crate::realtime::ports::ChangePublisher;

    #[derive(Default)]
    struct MemInvitations {
        rows: Mutex<Vec<Invitation>>,
    }

    #[async_trait]
    impl InvitationRepository for MemInvitations {
        async fn insert(&self, invitation: Invitation) -> Result<()> {
            self.rows.lock().unwrap().push(invitation);
            Ok(())
        }

        async fn get(&self, id: &str) -> Result<Option<Invitation>> {
            Ok(self.rows.lock().unwrap().iter().find(|i| i.id == id).cloned())
        }

        async fn find_by_token(&self, token: &str) -> Result<Option<Invitation>> {
            Ok(self.rows.lock().unwrap().iter().find(|i| i.token == token).cloned())
        }

        async fn list_for_practice(&self, practice_id: &str) -> Result<Vec<Invitation>> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|i| i.practice_id == practice_id)
                .cloned()
                .collect())
        }

        async fn mark_expired(&self, id: &str) -> Result<()> {
            let mut rows = self.rows.lock().unwrap();
            if let Some(row) = rows.iter_mut().find(|i| i.id == id) {
                row.status = InvitationStatus::Expired;
            }
            Ok(())
        }

        async fn revoke(&self, id: &str) -> Result<bool> {
            let mut rows = self.rows.lock().unwrap();
            match rows.iter_mut().find(|i| i.id == id && i.status == InvitationStatus::Pending) {
                Some(row) => {
                    row.status = InvitationStatus::Revoked;
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        async fn accept_and_provision(
            &self,
            invitation_id: &str,
            staff: StaffRecord,
            accepted_at: i64,
        ) -> Result<bool> {
            let mut rows = self.rows.lock().unwrap();
            match rows.iter_mut().find(|i| {
                i.id == invitation_id
                    && i.status == InvitationStatus::Pending
                    && accepted_at < i.expires_at
            }) {
                Some(row) => {
                    row.status = InvitationStatus::Accepted;
                    row.accepted_by = Some(staff.user_id.clone());
                    row.accepted_at = Some(accepted_at);
                    Ok(true)
                }
                None => Ok(false),
            }
        }
    }

    #[derive(Default)]
    struct MemStaff {
        rows: Mutex<Vec<StaffRecord>>,
    }

    #[async_trait]
    impl StaffRepository for MemStaff {
        async fn insert(&self, record: StaffRecord) -> Result<()> {
            self.rows.lock().unwrap().push(record);
            Ok(())
        }

        async fn find_active(
            &self,
            user_id: &str,
            practice_id: &str,
        ) -> Result<Option<StaffRecord>> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .find(|r| {
                    r.user_id == user_id
                        && r.practice_id == practice_id
                        && r.status == StaffStatus::Active
                })
                .cloned())
        }

        async fn list_for_practice(&self, practice_id: &str) -> Result<Vec<StaffRecord>> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.practice_id == practice_id)
                .cloned()
                .collect())
        }

        async fn list_admins(&self, practice_id: &str) -> Result<Vec<StaffRecord>> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|r| {
                    r.practice_id == practice_id
                        && r.role == StaffRole::Admin
                        && r.status == StaffStatus::Active
                })
                .cloned()
                .collect())
        }
    }

    #[derive(Default)]
    struct MemPractices {
        rows: Mutex<Vec<Practice>>,
    }

    #[async_trait]
    impl PracticeRepository for MemPractices {
        async fn create_with_owner(&self, practice: Practice, owner: StaffRecord) -> Result<()> {
            self.rows.lock().unwrap().push(practice);
            drop(owner);
            Ok(())
        }

        async fn get(&self, id: &str) -> Result<Option<Practice>> {
            Ok(self.rows.lock().unwrap().iter().find(|p| p.id == id).cloned())
        }

        async fn update(
            &self,
            _id: &str,
            _update: PracticeUpdate,
            _updated_at: i64,
        ) -> Result<bool> {
            Ok(false)
        }
    }

    /// Mailer that can be told to fail
    struct FlakyMailer {
        fail: bool,
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl InvitationMailer for FlakyMailer {
        async fn send_invitation(
            &self,
            invitation: &Invitation,
            _practice_name: &str,
            accept_link: &str,
        ) -> Result<()> {
            if self.fail {
                return Err(ClinicaError::Upstream("mail provider down".into()));
            }
            self.sent.lock().unwrap().push(format!("{}|{accept_link}", invitation.email));
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemNotifications {
        rows: Mutex<Vec<Notification>>,
    }

    #[async_trait]
    impl NotificationRepository for MemNotifications {
        async fn insert(&self, notification: Notification) -> Result<()> {
            self.rows.lock().unwrap().push(notification);
            Ok(())
        }

        async fn recent(&self, user_id: &str, limit: usize) -> Result<Vec<Notification>> {
            let rows = self.rows.lock().unwrap();
            let mut out: Vec<_> =
                rows.iter().filter(|n| n.user_id == user_id).cloned().collect();
            out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            out.truncate(limit);
            Ok(out)
        }

        async fn mark_read(&self, user_id: &str, notification_id: &str) -> Result<bool> {
            let mut rows = self.rows.lock().unwrap();
            match rows
                .iter_mut()
                .find(|n| n.id == notification_id && n.user_id == user_id && !n.read)
            {
                Some(row) => {
                    row.read = true;
                    Ok(true)
                }
                None => Ok(false),
            }
        }
    }

    struct NullPublisher;

    impl ChangePublisher for NullPublisher {
        fn publish(&self, _event: ChangeEvent) {}
    }

    struct Fixture {
        service: InvitationService,
        invitations: Arc<MemInvitations>,
        inbox: Arc<MemNotifications>,
    }

    fn fixture(mailer_fails: bool) -> Fixture {
        let invitations = Arc::new(MemInvitations::default());
        let staff = Arc::new(MemStaff::default());
        let practices = Arc::new(MemPractices::default());
        let inbox = Arc::new(MemNotifications::default());
        let notifications = Arc::new(NotificationService::new(
            inbox.clone() as Arc<dyn NotificationRepository>,
            Arc::new(NullPublisher),
        ));
        let mailer = Arc::new(FlakyMailer { fail: mailer_fails, sent: Mutex::new(Vec::new()) });

        practices.rows.lock().unwrap().push(Practice {
            id: "p-1".into(),
            name: "Greenfield Family Medicine".into(),
            address: "1 Main St".into(),
            phone: "555-0100".into(),
            email: "front@greenfield.example".into(),
            created_at: 0,
            updated_at: 0,
        });
        staff.rows.lock().unwrap().push(StaffRecord::new(
            "u-admin",
            "p-1",
            StaffRole::Admin,
            None,
            StaffOrigin::Owner,
            0,
        ));

        let service = InvitationService::new(
            invitations.clone(),
            staff,
            practices,
            mailer,
            notifications,
            "https://portal.example.com/",
        );
        Fixture { service, invitations, inbox }
    }

    fn admin() -> CurrentUser {
        CurrentUser { id: "u-admin".into(), email: "admin@greenfield.example".into(), display_name: None }
    }

    fn invitee() -> CurrentUser {
        CurrentUser { id: "u-doc".into(), email: "doc@example.com".into(), display_name: None }
    }

    fn new_invitation() -> NewInvitation {
        NewInvitation { email: "doc@example.com".into(), role: StaffRole::Doctor, department: None }
    }

    #[tokio::test]
    async fn create_persists_and_reports_email_sent() {
        let fx = fixture(false);
        let receipt =
            fx.service.create_invitation(&admin(), "p-1", new_invitation()).await.unwrap();
        assert!(receipt.email_sent);
        assert_eq!(fx.invitations.rows.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn mailer_failure_degrades_but_does_not_fail_creation() {
        let fx = fixture(true);
        let receipt =
            fx.service.create_invitation(&admin(), "p-1", new_invitation()).await.unwrap();
        assert!(!receipt.email_sent);
        // The invitation was still persisted.
        assert_eq!(fx.invitations.rows.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn non_admin_cannot_invite() {
        let fx = fixture(false);
        let outsider =
            CurrentUser { id: "u-x".into(), email: "x@example.com".into(), display_name: None };
        let result = fx.service.create_invitation(&outsider, "p-1", new_invitation()).await;
        assert!(matches!(result, Err(ClinicaError::Forbidden(_))));
    }

    #[tokio::test]
    async fn accept_provisions_staff_and_notifies_inviter() {
        let fx = fixture(false);
        let receipt =
            fx.service.create_invitation(&admin(), "p-1", new_invitation()).await.unwrap();

        let accepted =
            fx.service.accept_invitation(&invitee(), &receipt.invitation.token).await.unwrap();
        assert_eq!(accepted.practice_id, "p-1");
        assert_eq!(accepted.staff.role, StaffRole::Doctor);
        assert_eq!(fx.inbox.rows.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn accept_succeeds_at_most_once_per_token() {
        let fx = fixture(false);
        let receipt =
            fx.service.create_invitation(&admin(), "p-1", new_invitation()).await.unwrap();

        fx.service.accept_invitation(&invitee(), &receipt.invitation.token).await.unwrap();
        let second = fx.service.accept_invitation(&invitee(), &receipt.invitation.token).await;
        assert!(matches!(second, Err(ClinicaError::Conflict(_))));
    }

    #[tokio::test]
    async fn expired_token_fails_regardless_of_status() {
        let fx = fixture(false);
        let receipt =
            fx.service.create_invitation(&admin(), "p-1", new_invitation()).await.unwrap();
        {
            let mut rows = fx.invitations.rows.lock().unwrap();
            rows[0].expires_at = 1; // long past
        }

        let result = fx.service.accept_invitation(&invitee(), &receipt.invitation.token).await;
        assert!(matches!(result, Err(ClinicaError::Expired(_))));
        // Observation persisted the marker.
        assert_eq!(fx.invitations.rows.lock().unwrap()[0].status, InvitationStatus::Expired);
    }

    #[tokio::test]
    async fn mismatched_email_is_refused_server_side() {
        let fx = fixture(false);
        let receipt =
            fx.service.create_invitation(&admin(), "p-1", new_invitation()).await.unwrap();

        let wrong_user =
            CurrentUser { id: "u-z".into(), email: "someone-else@example.com".into(), display_name: None };
        let result = fx.service.accept_invitation(&wrong_user, &receipt.invitation.token).await;
        assert!(matches!(result, Err(ClinicaError::Forbidden(_))));
        // Token untouched by the refused attempt.
        assert_eq!(fx.invitations.rows.lock().unwrap()[0].status, InvitationStatus::Pending);
    }

    #[tokio::test]
    async fn unknown_token_is_not_found() {
        let fx = fixture(false);
        let result = fx.service.accept_invitation(&invitee(), "no-such-token").await;
        assert!(matches!(result, Err(ClinicaError::NotFound(_))));
    }
}
