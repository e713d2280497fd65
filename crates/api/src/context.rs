//! Application context
//!
//! Builds every service over its SQLite and HTTP adapters once at
//! startup; handlers share the context behind an `Arc`.

use std::sync::Arc;

use clinica_core::{
    ChangeFeed, InvitationService, JoinRequestService, MatchingService, NotificationService,
    PracticeService, PresenceService, SessionVerifier,
};
use clinica_domain::{Config, Result};
use clinica_infra::database::{
    SqliteDoctorProfileRepository, SqliteInvitationRepository, SqliteJoinRequestRepository,
    SqliteNotificationRepository, SqlitePracticeRepository, SqliteStaffRepository,
};
use clinica_infra::email::{MailerClient, MailerConfig};
use clinica_infra::identity::{IdentityClient, IdentityClientConfig};
use clinica_infra::matching::{ModelGatewayClient, ModelGatewayConfig};
use clinica_infra::{ChangeHub, DbManager};
use tracing::info;

/// Shared application state
pub struct AppContext {
    pub db: Arc<DbManager>,
    pub feed: Arc<dyn ChangeFeed>,
    pub sessions: Arc<dyn SessionVerifier>,
    pub practices: PracticeService,
    pub invitations: InvitationService,
    pub join_requests: JoinRequestService,
    pub presence: PresenceService,
    pub notifications: Arc<NotificationService>,
    pub matching: MatchingService,
}

impl AppContext {
    /// Wire the full context from configuration.
    ///
    /// Runs migrations on the configured database before any service is
    /// handed out.
    pub fn new(config: &Config) -> Result<Self> {
        let db = Arc::new(DbManager::new(&config.database.path, config.database.pool_size)?);
        db.run_migrations()?;

        let hub = Arc::new(ChangeHub::new());

        let practice_repo = Arc::new(SqlitePracticeRepository::new(db.clone()));
        let staff_repo = Arc::new(SqliteStaffRepository::new(db.clone()));
        let invitation_repo = Arc::new(SqliteInvitationRepository::new(db.clone()));
        let join_request_repo = Arc::new(SqliteJoinRequestRepository::new(db.clone()));
        let doctor_repo = Arc::new(SqliteDoctorProfileRepository::new(db.clone()));
        let notification_repo = Arc::new(SqliteNotificationRepository::new(db.clone()));

        let mailer = Arc::new(MailerClient::new(MailerConfig::from_email_config(&config.email))?);
        let gateway = Arc::new(ModelGatewayClient::new(ModelGatewayConfig::from_matching_config(
            &config.matching,
        ))?);
        let sessions: Arc<dyn SessionVerifier> = Arc::new(IdentityClient::new(
            IdentityClientConfig::from_identity_config(&config.identity),
        )?);

        let notifications =
            Arc::new(NotificationService::new(notification_repo, hub.clone()));
        let practices = PracticeService::new(practice_repo.clone(), staff_repo.clone());
        let invitations = InvitationService::new(
            invitation_repo,
            staff_repo.clone(),
            practice_repo.clone(),
            mailer,
            notifications.clone(),
            config.server.public_base_url.clone(),
        );
        let join_requests = JoinRequestService::new(
            join_request_repo,
            staff_repo,
            practice_repo,
            notifications.clone(),
        );
        let presence = PresenceService::new(doctor_repo, hub.clone());
        let matching = MatchingService::new(gateway);

        info!("application context initialised");
        Ok(Self {
            db,
            feed: hub,
            sessions,
            practices,
            invitations,
            join_requests,
            presence,
            notifications,
            matching,
        })
    }
}
