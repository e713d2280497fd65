//! Join request repository implementation using SQLite
//!
//! The one-pending-request-per-(user, practice) invariant lives in a
//! partial unique index; the violation surfaces as the duplicate-request
//! conflict rather than a generic storage failure.

use std::sync::Arc;

use async_trait::async_trait;
use clinica_core::join_requests::ports::JoinRequestRepository as JoinRequestRepositoryPort;
use clinica_domain::{
    ClinicaError, JoinRequest, JoinRequestStatus, Result as DomainResult, StaffRecord, StaffRole,
};
use rusqlite::{params, Row};
use tokio::task;

use super::manager::DbManager;
use super::staff_repository::insert_staff_record;
use super::{map_join_error, map_sql_error};
use crate::errors::InfraError;

const SELECT_COLUMNS: &str =
    "id, user_id, practice_id, role, message, status, decided_by, decided_at, created_at";

/// SQLite-backed implementation of `JoinRequestRepository`
pub struct SqliteJoinRequestRepository {
    db: Arc<DbManager>,
}

impl SqliteJoinRequestRepository {
    /// Create a new repository instance
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl JoinRequestRepositoryPort for SqliteJoinRequestRepository {
    async fn insert(&self, request: JoinRequest) -> DomainResult<()> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            let result = conn.execute(
                "INSERT INTO join_requests (
                    id, user_id, practice_id, role, message, status,
                    decided_by, decided_at, created_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    &request.id,
                    &request.user_id,
                    &request.practice_id,
                    request.role.as_str(),
                    &request.message,
                    request.status.as_str(),
                    &request.decided_by,
                    &request.decided_at,
                    &request.created_at,
                ],
            );

            match result {
                Ok(_) => Ok(()),
                Err(err) => {
                    let infra = InfraError::from(err);
                    if infra.is_unique_violation() {
                        Err(ClinicaError::Conflict(
                            "a pending join request already exists for this practice".into(),
                        ))
                    } else {
                        Err(infra.into())
                    }
                }
            }
        })
        .await
        .map_err(map_join_error)?
    }

    async fn get(&self, id: &str) -> DomainResult<Option<JoinRequest>> {
        let db = Arc::clone(&self.db);
        let id = id.to_string();

        task::spawn_blocking(move || -> DomainResult<Option<JoinRequest>> {
            let conn = db.get_connection()?;

            let result = conn.query_row(
                &format!("SELECT {SELECT_COLUMNS} FROM join_requests WHERE id = ?1"),
                params![&id],
                map_join_request_row,
            );

            match result {
                Ok(request) => Ok(Some(request)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(err) => Err(map_sql_error(err)),
            }
        })
        .await
        .map_err(map_join_error)?
    }

    async fn list_for_practice(&self, practice_id: &str) -> DomainResult<Vec<JoinRequest>> {
        let db = Arc::clone(&self.db);
        let practice_id = practice_id.to_string();

        task::spawn_blocking(move || -> DomainResult<Vec<JoinRequest>> {
            let conn = db.get_connection()?;
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {SELECT_COLUMNS} FROM join_requests
                     WHERE practice_id = ?1 ORDER BY created_at DESC"
                ))
                .map_err(map_sql_error)?;
            let rows = stmt
                .query_map(params![&practice_id], map_join_request_row)
                .map_err(map_sql_error)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(map_sql_error)?;
            Ok(rows)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn approve_and_provision(
        &self,
        request_id: &str,
        staff: StaffRecord,
        decided_by: &str,
        decided_at: i64,
    ) -> DomainResult<bool> {
        let db = Arc::clone(&self.db);
        let request_id = request_id.to_string();
        let decided_by = decided_by.to_string();

        task::spawn_blocking(move || -> DomainResult<bool> {
            let mut conn = db.get_connection()?;
            let tx = conn.transaction().map_err(map_sql_error)?;

            let transitioned = tx
                .execute(
                    "UPDATE join_requests
                     SET status = 'approved', decided_by = ?1, decided_at = ?2
                     WHERE id = ?3 AND status = 'pending'",
                    params![&decided_by, &decided_at, &request_id],
                )
                .map_err(map_sql_error)?;
            if transitioned == 0 {
                return Ok(false);
            }

            insert_staff_record(&tx, &staff).map_err(map_sql_error)?;
            tx.commit().map_err(map_sql_error)?;
            Ok(true)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn reject(
        &self,
        request_id: &str,
        decided_by: &str,
        decided_at: i64,
    ) -> DomainResult<bool> {
        let db = Arc::clone(&self.db);
        let request_id = request_id.to_string();
        let decided_by = decided_by.to_string();

        task::spawn_blocking(move || -> DomainResult<bool> {
            let conn = db.get_connection()?;
            let changed = conn
                .execute(
                    "UPDATE join_requests
                     SET status = 'rejected', decided_by = ?1, decided_at = ?2
                     WHERE id = ?3 AND status = 'pending'",
                    params![&decided_by, &decided_at, &request_id],
                )
                .map_err(map_sql_error)?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_join_error)?
    }
}

/// Map a row to a JoinRequest
fn map_join_request_row(row: &Row) -> rusqlite::Result<JoinRequest> {
    let role: String = row.get(3)?;
    let status: String = row.get(5)?;
    Ok(JoinRequest {
        id: row.get(0)?,
        user_id: row.get(1)?,
        practice_id: row.get(2)?,
        role: StaffRole::parse(&role).unwrap_or(StaffRole::Receptionist),
        message: row.get(4)?,
        status: JoinRequestStatus::parse(&status).unwrap_or(JoinRequestStatus::Rejected),
        decided_by: row.get(6)?,
        decided_at: row.get(7)?,
        created_at: row.get(8)?,
    })
}
