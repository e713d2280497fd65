//! Staff record repository implementation using SQLite

use std::sync::Arc;

use async_trait::async_trait;
use clinica_core::practices::ports::StaffRepository as StaffRepositoryPort;
use clinica_domain::{Result as DomainResult, StaffOrigin, StaffRecord, StaffRole, StaffStatus};
use rusqlite::{params, Connection, Row};
use tokio::task;

use super::manager::DbManager;
use super::{map_join_error, map_sql_error};

/// SQLite-backed implementation of `StaffRepository`
pub struct SqliteStaffRepository {
    db: Arc<DbManager>,
}

impl SqliteStaffRepository {
    /// Create a new repository instance
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl StaffRepositoryPort for SqliteStaffRepository {
    async fn insert(&self, record: StaffRecord) -> DomainResult<()> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            insert_staff_record(&conn, &record).map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn find_active(
        &self,
        user_id: &str,
        practice_id: &str,
    ) -> DomainResult<Option<StaffRecord>> {
        let db = Arc::clone(&self.db);
        let user_id = user_id.to_string();
        let practice_id = practice_id.to_string();

        task::spawn_blocking(move || -> DomainResult<Option<StaffRecord>> {
            let conn = db.get_connection()?;

            let result = conn.query_row(
                "SELECT id, user_id, practice_id, role, department, status, origin, created_at
                 FROM staff
                 WHERE user_id = ?1 AND practice_id = ?2 AND status = 'active'",
                params![&user_id, &practice_id],
                map_staff_row,
            );

            match result {
                Ok(record) => Ok(Some(record)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(err) => Err(map_sql_error(err)),
            }
        })
        .await
        .map_err(map_join_error)?
    }

    async fn list_for_practice(&self, practice_id: &str) -> DomainResult<Vec<StaffRecord>> {
        let db = Arc::clone(&self.db);
        let practice_id = practice_id.to_string();

        task::spawn_blocking(move || -> DomainResult<Vec<StaffRecord>> {
            let conn = db.get_connection()?;
            query_staff(
                &conn,
                "SELECT id, user_id, practice_id, role, department, status, origin, created_at
                 FROM staff WHERE practice_id = ?1
                 ORDER BY created_at ASC",
                &practice_id,
            )
        })
        .await
        .map_err(map_join_error)?
    }

    async fn list_admins(&self, practice_id: &str) -> DomainResult<Vec<StaffRecord>> {
        let db = Arc::clone(&self.db);
        let practice_id = practice_id.to_string();

        task::spawn_blocking(move || -> DomainResult<Vec<StaffRecord>> {
            let conn = db.get_connection()?;
            query_staff(
                &conn,
                "SELECT id, user_id, practice_id, role, department, status, origin, created_at
                 FROM staff
                 WHERE practice_id = ?1 AND role = 'admin' AND status = 'active'
                 ORDER BY created_at ASC",
                &practice_id,
            )
        })
        .await
        .map_err(map_join_error)?
    }
}

fn query_staff(
    conn: &Connection,
    sql: &str,
    practice_id: &str,
) -> DomainResult<Vec<StaffRecord>> {
    let mut stmt = conn.prepare(sql).map_err(map_sql_error)?;
    let rows = stmt
        .query_map(params![practice_id], map_staff_row)
        .map_err(map_sql_error)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(map_sql_error)?;
    Ok(rows)
}

/// Insert a staff record on an existing connection or transaction.
///
/// Shared with the practice and lifecycle repositories so the record can
/// land inside their transactions.
pub(crate) fn insert_staff_record(
    conn: &Connection,
    record: &StaffRecord,
) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO staff (id, user_id, practice_id, role, department, status, origin, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            &record.id,
            &record.user_id,
            &record.practice_id,
            record.role.as_str(),
            &record.department,
            record.status.as_str(),
            record.origin.as_str(),
            &record.created_at,
        ],
    )
}

/// Map a row to a StaffRecord
fn map_staff_row(row: &Row) -> rusqlite::Result<StaffRecord> {
    let role: String = row.get(3)?;
    let status: String = row.get(5)?;
    let origin: String = row.get(6)?;
    Ok(StaffRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        practice_id: row.get(2)?,
        role: StaffRole::parse(&role).unwrap_or(StaffRole::Receptionist),
        department: row.get(4)?,
        status: StaffStatus::parse(&status).unwrap_or(StaffStatus::Inactive),
        origin: StaffOrigin::parse(&origin).unwrap_or(StaffOrigin::Owner),
        created_at: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use clinica_domain::ClinicaError;
    use tempfile::TempDir;

    use super::*;

    fn setup_test_db() -> (Arc<DbManager>, TempDir) {
        let temp_dir = TempDir::new().expect("create temp dir");
        let db_path = temp_dir.path().join("test.db");
        let manager = DbManager::new(db_path, 5).expect("create db manager");
        manager.run_migrations().expect("run migrations");
        seed_practice(&manager);
        (Arc::new(manager), temp_dir)
    }

    fn seed_practice(db: &DbManager) {
        let conn = db.get_connection().expect("connection");
        conn.execute(
            "INSERT INTO practices (id, name, address, phone, email, created_at, updated_at)
             VALUES ('p-1', 'Greenfield', '1 Main St', '555-0100', 'f@g.example', 0, 0)",
            [],
        )
        .expect("seed practice");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn find_active_sees_only_active_records() {
        let (db, _temp_dir) = setup_test_db();
        let repo = SqliteStaffRepository::new(db);

        let mut record =
            StaffRecord::new("u-1", "p-1", StaffRole::Nurse, None, StaffOrigin::Invitation, 10);
        record.status = StaffStatus::Inactive;
        repo.insert(record).await.expect("insert inactive");

        assert!(repo.find_active("u-1", "p-1").await.expect("query").is_none());

        let active =
            StaffRecord::new("u-1", "p-1", StaffRole::Nurse, None, StaffOrigin::Invitation, 20);
        repo.insert(active).await.expect("insert active");
        let found = repo.find_active("u-1", "p-1").await.expect("query");
        assert!(found.is_some_and(|r| r.is_active()));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn second_active_membership_is_rejected_by_the_index() {
        let (db, _temp_dir) = setup_test_db();
        let repo = SqliteStaffRepository::new(db);

        let first =
            StaffRecord::new("u-1", "p-1", StaffRole::Nurse, None, StaffOrigin::Invitation, 10);
        repo.insert(first).await.expect("first insert");

        let second =
            StaffRecord::new("u-1", "p-1", StaffRole::Doctor, None, StaffOrigin::JoinRequest, 20);
        let result = repo.insert(second).await;
        assert!(matches!(result, Err(ClinicaError::Conflict(_))));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn list_admins_filters_by_role() {
        let (db, _temp_dir) = setup_test_db();
        let repo = SqliteStaffRepository::new(db);

        repo.insert(StaffRecord::new("u-1", "p-1", StaffRole::Admin, None, StaffOrigin::Owner, 10))
            .await
            .expect("insert admin");
        repo.insert(StaffRecord::new(
            "u-2",
            "p-1",
            StaffRole::Doctor,
            None,
            StaffOrigin::Invitation,
            20,
        ))
        .await
        .expect("insert doctor");

        let admins = repo.list_admins("p-1").await.expect("list admins");
        assert_eq!(admins.len(), 1);
        assert_eq!(admins[0].user_id, "u-1");

        let roster = repo.list_for_practice("p-1").await.expect("roster");
        assert_eq!(roster.len(), 2);
    }
}
