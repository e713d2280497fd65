//! Doctor profile repository implementation using SQLite
//!
//! Availability writes return the value the store actually holds after
//! the statement, so callers publish confirmed state only.

use std::sync::Arc;

use async_trait::async_trait;
use clinica_core::presence::ports::DoctorProfileRepository as DoctorProfileRepositoryPort;
use clinica_domain::{AvailabilityStatus, DoctorProfile, Result as DomainResult};
use rusqlite::{params, Row};
use tokio::task;

use super::manager::DbManager;
use super::{map_join_error, map_sql_error};

/// SQLite-backed implementation of `DoctorProfileRepository`
pub struct SqliteDoctorProfileRepository {
    db: Arc<DbManager>,
}

impl SqliteDoctorProfileRepository {
    /// Create a new repository instance
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DoctorProfileRepositoryPort for SqliteDoctorProfileRepository {
    async fn upsert(&self, profile: DoctorProfile) -> DomainResult<()> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            conn.execute(
                "INSERT INTO doctor_profiles (
                    user_id, practice_id, specialty, license_number,
                    availability, working_hours, updated_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(user_id) DO UPDATE SET
                    practice_id = excluded.practice_id,
                    specialty = excluded.specialty,
                    license_number = excluded.license_number,
                    availability = excluded.availability,
                    working_hours = excluded.working_hours,
                    updated_at = excluded.updated_at",
                params![
                    &profile.user_id,
                    &profile.practice_id,
                    &profile.specialty,
                    &profile.license_number,
                    profile.availability.as_str(),
                    &profile.working_hours,
                    &profile.updated_at,
                ],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn get(&self, user_id: &str) -> DomainResult<Option<DoctorProfile>> {
        let db = Arc::clone(&self.db);
        let user_id = user_id.to_string();

        task::spawn_blocking(move || -> DomainResult<Option<DoctorProfile>> {
            let conn = db.get_connection()?;

            let result = conn.query_row(
                "SELECT user_id, practice_id, specialty, license_number,
                        availability, working_hours, updated_at
                 FROM doctor_profiles WHERE user_id = ?1",
                params![&user_id],
                map_doctor_profile_row,
            );

            match result {
                Ok(profile) => Ok(Some(profile)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(err) => Err(map_sql_error(err)),
            }
        })
        .await
        .map_err(map_join_error)?
    }

    async fn set_availability(
        &self,
        user_id: &str,
        status: AvailabilityStatus,
        at: i64,
    ) -> DomainResult<Option<AvailabilityStatus>> {
        let db = Arc::clone(&self.db);
        let user_id = user_id.to_string();

        task::spawn_blocking(move || -> DomainResult<Option<AvailabilityStatus>> {
            let conn = db.get_connection()?;
            let changed = conn
                .execute(
                    "UPDATE doctor_profiles SET availability = ?1, updated_at = ?2
                     WHERE user_id = ?3",
                    params![status.as_str(), &at, &user_id],
                )
                .map_err(map_sql_error)?;

            if changed == 0 {
                Ok(None)
            } else {
                Ok(Some(status))
            }
        })
        .await
        .map_err(map_join_error)?
    }

    async fn toggle_availability(
        &self,
        user_id: &str,
        at: i64,
    ) -> DomainResult<Option<AvailabilityStatus>> {
        let db = Arc::clone(&self.db);
        let user_id = user_id.to_string();

        task::spawn_blocking(move || -> DomainResult<Option<AvailabilityStatus>> {
            let mut conn = db.get_connection()?;
            let tx = conn.transaction().map_err(map_sql_error)?;

            let current = tx.query_row(
                "SELECT availability FROM doctor_profiles WHERE user_id = ?1",
                params![&user_id],
                |row| row.get::<_, String>(0),
            );
            let current = match current {
                Ok(value) => value,
                Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
                Err(err) => return Err(map_sql_error(err)),
            };

            let next = AvailabilityStatus::parse(&current)
                .unwrap_or(AvailabilityStatus::Away)
                .toggled();
            tx.execute(
                "UPDATE doctor_profiles SET availability = ?1, updated_at = ?2
                 WHERE user_id = ?3",
                params![next.as_str(), &at, &user_id],
            )
            .map_err(map_sql_error)?;

            tx.commit().map_err(map_sql_error)?;
            Ok(Some(next))
        })
        .await
        .map_err(map_join_error)?
    }
}

/// Map a row to a DoctorProfile
fn map_doctor_profile_row(row: &Row) -> rusqlite::Result<DoctorProfile> {
    let availability: String = row.get(4)?;
    Ok(DoctorProfile {
        user_id: row.get(0)?,
        practice_id: row.get(1)?,
        specialty: row.get(2)?,
        license_number: row.get(3)?,
        availability: AvailabilityStatus::parse(&availability).unwrap_or(AvailabilityStatus::Away),
        working_hours: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn setup_test_db() -> (Arc<DbManager>, TempDir) {
        let temp_dir = TempDir::new().expect("create temp dir");
        let db_path = temp_dir.path().join("test.db");
        let manager = DbManager::new(db_path, 5).expect("create db manager");
        manager.run_migrations().expect("run migrations");

        let conn = manager.get_connection().expect("connection");
        conn.execute(
            "INSERT INTO practices (id, name, address, phone, email, created_at, updated_at)
             VALUES ('p-1', 'Greenfield', '1 Main St', '555-0100', 'f@g.example', 0, 0)",
            [],
        )
        .expect("seed practice");

        (Arc::new(manager), temp_dir)
    }

    fn test_profile() -> DoctorProfile {
        DoctorProfile {
            user_id: "u-doc".into(),
            practice_id: "p-1".into(),
            specialty: "Cardiology".into(),
            license_number: "MD-1234".into(),
            availability: AvailabilityStatus::Active,
            working_hours: Some("Mon-Fri 9:00-17:00".into()),
            updated_at: 1_000,
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn upsert_then_get_round_trips() {
        let (db, _temp_dir) = setup_test_db();
        let repo = SqliteDoctorProfileRepository::new(db);

        repo.upsert(test_profile()).await.expect("upsert");
        let profile = repo.get("u-doc").await.expect("get").unwrap();
        assert_eq!(profile.specialty, "Cardiology");
        assert_eq!(profile.availability, AvailabilityStatus::Active);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn two_toggles_restore_the_original_value() {
        let (db, _temp_dir) = setup_test_db();
        let repo = SqliteDoctorProfileRepository::new(db);
        repo.upsert(test_profile()).await.expect("upsert");

        let first = repo.toggle_availability("u-doc", 2_000).await.expect("toggle");
        assert_eq!(first, Some(AvailabilityStatus::Away));
        let second = repo.toggle_availability("u-doc", 3_000).await.expect("toggle");
        assert_eq!(second, Some(AvailabilityStatus::Active));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn writes_against_a_missing_profile_return_none() {
        let (db, _temp_dir) = setup_test_db();
        let repo = SqliteDoctorProfileRepository::new(db);

        assert!(repo
            .set_availability("missing", AvailabilityStatus::Away, 2_000)
            .await
            .expect("set")
            .is_none());
        assert!(repo.toggle_availability("missing", 2_000).await.expect("toggle").is_none());
    }
}
