//! SQLite persistence layer
//!
//! One repository per aggregate, each implementing its core port.
//! Blocking rusqlite work runs on the tokio blocking pool.

pub mod manager;

pub mod doctor_profile_repository;
pub mod invitation_repository;
pub mod join_request_repository;
pub mod notification_repository;
pub mod practice_repository;
pub mod staff_repository;

pub use doctor_profile_repository::SqliteDoctorProfileRepository;
pub use invitation_repository::SqliteInvitationRepository;
pub use join_request_repository::SqliteJoinRequestRepository;
pub use manager::DbManager;
pub use notification_repository::SqliteNotificationRepository;
pub use practice_repository::SqlitePracticeRepository;
pub use staff_repository::SqliteStaffRepository;

use clinica_domain::ClinicaError;

use crate::errors::InfraError;

/// Map a SQLite error through [`InfraError`] into the domain error.
pub(crate) fn map_sql_error(err: rusqlite::Error) -> ClinicaError {
    ClinicaError::from(InfraError::from(err))
}

/// Map a blocking-task join failure into the domain error.
pub(crate) fn map_join_error(err: tokio::task::JoinError) -> ClinicaError {
    ClinicaError::Internal(format!("task join error: {err}"))
}

/// SQLite stores booleans as integers.
pub(crate) fn bool_to_int(value: bool) -> i64 {
    i64::from(value)
}

pub(crate) fn int_to_bool(value: i64) -> bool {
    value != 0
}
