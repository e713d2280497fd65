//! Practice repository implementation using SQLite

use std::sync::Arc;

use async_trait::async_trait;
use clinica_core::practices::ports::PracticeRepository as PracticeRepositoryPort;
use clinica_domain::{Practice, PracticeUpdate, Result as DomainResult, StaffRecord};
use rusqlite::{params, Row};
use tokio::task;

use super::manager::DbManager;
use super::{map_join_error, map_sql_error};

/// SQLite-backed implementation of `PracticeRepository`
pub struct SqlitePracticeRepository {
    db: Arc<DbManager>,
}

impl SqlitePracticeRepository {
    /// Create a new repository instance
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PracticeRepositoryPort for SqlitePracticeRepository {
    async fn create_with_owner(&self, practice: Practice, owner: StaffRecord) -> DomainResult<()> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<()> {
            let mut conn = db.get_connection()?;
            let tx = conn.transaction().map_err(map_sql_error)?;

            tx.execute(
                "INSERT INTO practices (id, name, address, phone, email, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    &practice.id,
                    &practice.name,
                    &practice.address,
                    &practice.phone,
                    &practice.email,
                    &practice.created_at,
                    &practice.updated_at,
                ],
            )
            .map_err(map_sql_error)?;

            super::staff_repository::insert_staff_record(&tx, &owner).map_err(map_sql_error)?;

            tx.commit().map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn get(&self, id: &str) -> DomainResult<Option<Practice>> {
        let db = Arc::clone(&self.db);
        let id = id.to_string();

        task::spawn_blocking(move || -> DomainResult<Option<Practice>> {
            let conn = db.get_connection()?;

            let result = conn.query_row(
                "SELECT id, name, address, phone, email, created_at, updated_at
                 FROM practices WHERE id = ?1",
                params![&id],
                map_practice_row,
            );

            match result {
                Ok(practice) => Ok(Some(practice)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(err) => Err(map_sql_error(err)),
            }
        })
        .await
        .map_err(map_join_error)?
    }

    async fn update(
        &self,
        id: &str,
        update: PracticeUpdate,
        updated_at: i64,
    ) -> DomainResult<bool> {
        let db = Arc::clone(&self.db);
        let id = id.to_string();

        task::spawn_blocking(move || -> DomainResult<bool> {
            let conn = db.get_connection()?;

            let changed = conn
                .execute(
                    "UPDATE practices SET
                        name = COALESCE(?1, name),
                        address = COALESCE(?2, address),
                        phone = COALESCE(?3, phone),
                        email = COALESCE(?4, email),
                        updated_at = ?5
                     WHERE id = ?6",
                    params![
                        &update.name,
                        &update.address,
                        &update.phone,
                        &update.email,
                        &updated_at,
                        &id,
                    ],
                )
                .map_err(map_sql_error)?;

            Ok(changed > 0)
        })
        .await
        .map_err(map_join_error)?
    }
}

/// Map a row to a Practice
fn map_practice_row(row: &Row) -> rusqlite::Result<Practice> {
    Ok(Practice {
        id: row.get(0)?,
        name: row.get(1)?,
        address: row.get(2)?,
        phone: row.get(3)?,
        email: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use clinica_domain::{StaffOrigin, StaffRole};
    use tempfile::TempDir;

    use super::*;

    fn setup_test_db() -> (Arc<DbManager>, TempDir) {
        let temp_dir = TempDir::new().expect("create temp dir");
        let db_path = temp_dir.path().join("test.db");
        let manager = DbManager::new(db_path, 5).expect("create db manager");
        manager.run_migrations().expect("run migrations");
        (Arc::new(manager), temp_dir)
    }

    fn test_practice() -> Practice {
        Practice {
            id: "p-1".into(),
            name: "Greenfield Family Medicine".into(),
            address: "1 Main St".into(),
            phone: "555-0100".into(),
            email: "front@greenfield.example".into(),
            created_at: 1_000,
            updated_at: 1_000,
        }
    }

    fn owner_record() -> StaffRecord {
        StaffRecord::new("u-owner", "p-1", StaffRole::Admin, None, StaffOrigin::Owner, 1_000)
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn create_with_owner_writes_both_rows() {
        let (db, _temp_dir) = setup_test_db();
        let repo = SqlitePracticeRepository::new(db.clone());

        repo.create_with_owner(test_practice(), owner_record()).await.expect("create practice");

        let retrieved = repo.get("p-1").await.expect("get practice");
        assert!(retrieved.is_some());

        let conn = db.get_connection().expect("connection");
        let staff_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM staff WHERE practice_id = 'p-1'", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(staff_count, 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn get_nonexistent_returns_none() {
        let (db, _temp_dir) = setup_test_db();
        let repo = SqlitePracticeRepository::new(db);

        let retrieved = repo.get("missing").await.expect("get practice");
        assert!(retrieved.is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn partial_update_leaves_other_fields_alone() {
        let (db, _temp_dir) = setup_test_db();
        let repo = SqlitePracticeRepository::new(db);
        repo.create_with_owner(test_practice(), owner_record()).await.expect("create practice");

        let update = PracticeUpdate { phone: Some("555-0199".into()), ..PracticeUpdate::default() };
        let changed = repo.update("p-1", update, 2_000).await.expect("update practice");
        assert!(changed);

        let practice = repo.get("p-1").await.expect("get practice").unwrap();
        assert_eq!(practice.phone, "555-0199");
        assert_eq!(practice.name, "Greenfield Family Medicine");
        assert_eq!(practice.updated_at, 2_000);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn update_of_missing_practice_reports_no_match() {
        let (db, _temp_dir) = setup_test_db();
        let repo = SqlitePracticeRepository::new(db);

        let update = PracticeUpdate { name: Some("X".into()), ..PracticeUpdate::default() };
        let changed = repo.update("missing", update, 2_000).await.expect("update practice");
        assert!(!changed);
    }
}
