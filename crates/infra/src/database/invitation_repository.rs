//! Invitation repository implementation using SQLite
//!
//! Acceptance is a conditional transition: the status flip and the staff
//! insert commit in one transaction keyed on `status = 'pending'`, so a
//! token is consumed at most once no matter how many acceptances race.

use std::sync::Arc;

use async_trait::async_trait;
use clinica_core::invitations::ports::InvitationRepository as InvitationRepositoryPort;
use clinica_domain::{
    Invitation, InvitationStatus, Result as DomainResult, StaffRecord, StaffRole,
};
use rusqlite::{params, Row};
use tokio::task;

use super::manager::DbManager;
use super::staff_repository::insert_staff_record;
use super::{map_join_error, map_sql_error};

const SELECT_COLUMNS: &str = "id, practice_id, email, role, department, invited_by, token, \
                              status, expires_at, accepted_by, accepted_at, created_at";

/// SQLite-backed implementation of `InvitationRepository`
pub struct SqliteInvitationRepository {
    db: Arc<DbManager>,
}

impl SqliteInvitationRepository {
    /// Create a new repository instance
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl InvitationRepositoryPort for SqliteInvitationRepository {
    async fn insert(&self, invitation: Invitation) -> DomainResult<()> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            conn.execute(
                "INSERT INTO invitations (
                    id, practice_id, email, role, department, invited_by, token,
                    status, expires_at, accepted_by, accepted_at, created_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    &invitation.id,
                    &invitation.practice_id,
                    &invitation.email,
                    invitation.role.as_str(),
                    &invitation.department,
                    &invitation.invited_by,
                    &invitation.token,
                    invitation.status.as_str(),
                    &invitation.expires_at,
                    &invitation.accepted_by,
                    &invitation.accepted_at,
                    &invitation.created_at,
                ],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn get(&self, id: &str) -> DomainResult<Option<Invitation>> {
        self.find_one("id", id).await
    }

    async fn find_by_token(&self, token: &str) -> DomainResult<Option<Invitation>> {
        self.find_one("token", token).await
    }

    async fn list_for_practice(&self, practice_id: &str) -> DomainResult<Vec<Invitation>> {
        let db = Arc::clone(&self.db);
        let practice_id = practice_id.to_string();

        task::spawn_blocking(move || -> DomainResult<Vec<Invitation>> {
            let conn = db.get_connection()?;
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {SELECT_COLUMNS} FROM invitations
                     WHERE practice_id = ?1 ORDER BY created_at DESC"
                ))
                .map_err(map_sql_error)?;
            let rows = stmt
                .query_map(params![&practice_id], map_invitation_row)
                .map_err(map_sql_error)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(map_sql_error)?;
            Ok(rows)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn mark_expired(&self, id: &str) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let id = id.to_string();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            conn.execute(
                "UPDATE invitations SET status = 'expired' WHERE id = ?1 AND status = 'pending'",
                params![&id],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn revoke(&self, id: &str) -> DomainResult<bool> {
        let db = Arc::clone(&self.db);
        let id = id.to_string();

        task::spawn_blocking(move || -> DomainResult<bool> {
            let conn = db.get_connection()?;
            let changed = conn
                .execute(
                    "UPDATE invitations SET status = 'revoked'
                     WHERE id = ?1 AND status = 'pending'",
                    params![&id],
                )
                .map_err(map_sql_error)?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn accept_and_provision(
        &self,
        invitation_id: &str,
        staff: StaffRecord,
        accepted_at: i64,
    ) -> DomainResult<bool> {
        let db = Arc::clone(&self.db);
        let invitation_id = invitation_id.to_string();

        task::spawn_blocking(move || -> DomainResult<bool> {
            let mut conn = db.get_connection()?;
            let tx = conn.transaction().map_err(map_sql_error)?;

            let transitioned = tx
                .execute(
                    "UPDATE invitations
                     SET status = 'accepted', accepted_by = ?1, accepted_at = ?2
                     WHERE id = ?3 AND status = 'pending' AND expires_at > ?2",
                    params![&staff.user_id, &accepted_at, &invitation_id],
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
}

impl SqliteInvitationRepository {
    async fn find_one(&self, column: &'static str, value: &str) -> DomainResult<Option<Invitation>> {
        let db = Arc::clone(&self.db);
        let value = value.to_string();

        task::spawn_blocking(move || -> DomainResult<Option<Invitation>> {
            let conn = db.get_connection()?;

            let result = conn.query_row(
                &format!("SELECT {SELECT_COLUMNS} FROM invitations WHERE {column} = ?1"),
                params![&value],
                map_invitation_row,
            );

            match result {
                Ok(invitation) => Ok(Some(invitation)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(err) => Err(map_sql_error(err)),
            }
        })
        .await
        .map_err(map_join_error)?
    }
}

/// Map a row to an Invitation
fn map_invitation_row(row: &Row) -> rusqlite::Result<Invitation> {
    let role: String = row.get(3)?;
    let status: String = row.get(7)?;
    Ok(Invitation {
        id: row.get(0)?,
        practice_id: row.get(1)?,
        email: row.get(2)?,
        role: StaffRole::parse(&role).unwrap_or(StaffRole::Receptionist),
        department: row.get(4)?,
        invited_by: row.get(5)?,
        token: row.get(6)?,
        status: InvitationStatus::parse(&status).unwrap_or(InvitationStatus::Expired),
        expires_at: row.get(8)?,
        accepted_by: row.get(9)?,
        accepted_at: row.get(10)?,
        created_at: row.get(11)?,
    })
}
