// SQLite VolunteerRepository Implementation

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;
use usher_rota_core::domain::Volunteer;
use usher_rota_core::error::Result;
use usher_rota_core::port::VolunteerRepository;

pub struct SqliteVolunteerRepository {
    pool: SqlitePool,
}

impl SqliteVolunteerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Apply `write` to every volunteer inside one transaction
    async fn write_all(&self, volunteers: &[Volunteer], sql: &str) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        for volunteer in volunteers {
            write(&mut tx, sql, volunteer).await?;
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(())
    }
}

const INSERT_SQL: &str = r#"
    INSERT INTO volunteers (
        id, event_id, group_id, name,
        restricted_role, secondary_role, position_id, created_at
    ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
"#;

// created_at is fixed at submission; everything else follows the caller
const UPSERT_SQL: &str = r#"
    INSERT INTO volunteers (
        id, event_id, group_id, name,
        restricted_role, secondary_role, position_id, created_at
    ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
    ON CONFLICT(id) DO UPDATE SET
        event_id = excluded.event_id,
        group_id = excluded.group_id,
        name = excluded.name,
        restricted_role = excluded.restricted_role,
        secondary_role = excluded.secondary_role,
        position_id = excluded.position_id
"#;

async fn write(tx: &mut Transaction<'_, Sqlite>, sql: &str, volunteer: &Volunteer) -> Result<()> {
    sqlx::query(sql)
        .bind(&volunteer.id)
        .bind(&volunteer.event_id)
        .bind(&volunteer.group_id)
        .bind(&volunteer.name)
        .bind(if volunteer.restricted_role { 1 } else { 0 })
        .bind(if volunteer.secondary_role { 1 } else { 0 })
        .bind(&volunteer.position_id)
        .bind(volunteer.created_at)
        .execute(&mut **tx)
        .await
        .map_err(map_sqlx_error)?;
    Ok(())
}

#[async_trait]
impl VolunteerRepository for SqliteVolunteerRepository {
    async fn fetch_for_event(&self, event_id: &str) -> Result<Vec<Volunteer>> {
        // rowid breaks created_at ties in insertion order
        let rows = sqlx::query_as::<_, VolunteerRow>(
            r#"
            SELECT id, event_id, group_id, name,
                   restricted_role, secondary_role, position_id, created_at
            FROM volunteers
            WHERE event_id = ?
            ORDER BY created_at ASC, rowid ASC
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(VolunteerRow::into_volunteer).collect())
    }

    async fn persist(&self, volunteers: &[Volunteer]) -> Result<()> {
        self.write_all(volunteers, UPSERT_SQL).await?;
        debug!(count = volunteers.len(), "Volunteers persisted");
        Ok(())
    }

    async fn insert_batch(&self, volunteers: &[Volunteer]) -> Result<()> {
        self.write_all(volunteers, INSERT_SQL).await?;
        debug!(count = volunteers.len(), "Volunteer batch inserted");
        Ok(())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct VolunteerRow {
    id: String,
    event_id: String,
    group_id: String,
    name: String,
    restricted_role: i32,
    secondary_role: i32,
    position_id: Option<String>,
    created_at: i64,
}

impl VolunteerRow {
    fn into_volunteer(self) -> Volunteer {
        Volunteer {
            id: self.id,
            event_id: self.event_id,
            group_id: self.group_id,
            name: self.name,
            restricted_role: self.restricted_role != 0,
            secondary_role: self.secondary_role != 0,
            position_id: self.position_id,
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_pool, run_migrations};
    use tokio_test::{assert_err, assert_ok};

    async fn setup_test_db() -> SqliteVolunteerRepository {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteVolunteerRepository::new(pool)
    }

    #[tokio::test]
    async fn test_insert_and_fetch_in_creation_order() {
        let repo = setup_test_db().await;
        let batch = vec![
            Volunteer::new("v2", 200, "ev-1", "g1", "Ben").with_secondary_role(),
            Volunteer::new("v1", 100, "ev-1", "g1", "Ana").with_restricted_role(),
            Volunteer::new("v3", 300, "ev-2", "g1", "Cy"),
        ];
        repo.insert_batch(&batch).await.unwrap();

        let fetched = repo.fetch_for_event("ev-1").await.unwrap();

        assert_eq!(fetched, vec![batch[1].clone(), batch[0].clone()]);
        assert!(fetched[0].restricted_role);
        assert!(fetched[1].secondary_role);
        assert!(fetched.iter().all(|v| v.position_id.is_none()));
    }

    #[tokio::test]
    async fn test_equal_timestamps_keep_insertion_order() {
        let repo = setup_test_db().await;
        repo.insert_batch(&[
            Volunteer::new("z", 5, "ev", "g1", "Z"),
            Volunteer::new("a", 5, "ev", "g1", "A"),
        ])
        .await
        .unwrap();
        // Next batch lands a millisecond later
        repo.insert_batch(&[
            Volunteer::new("m", 6, "ev", "g2", "M"),
            Volunteer::new("b", 6, "ev", "g2", "B"),
        ])
        .await
        .unwrap();

        let names: Vec<_> = repo
            .fetch_for_event("ev")
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.name)
            .collect();
        assert_eq!(names, vec!["Z", "A", "M", "B"]);
    }

    #[tokio::test]
    async fn test_persist_updates_positions() {
        let repo = setup_test_db().await;
        repo.insert_batch(&[
            Volunteer::new("v1", 1, "ev", "g1", "Ana"),
            Volunteer::new("v2", 2, "ev", "g1", "Ben"),
        ])
        .await
        .unwrap();

        let mut volunteers = repo.fetch_for_event("ev").await.unwrap();
        volunteers[0].assign("P1").unwrap();
        volunteers[1].assign("P2").unwrap();
        repo.persist(&volunteers).await.unwrap();

        let stored = repo.fetch_for_event("ev").await.unwrap();
        assert_eq!(stored, volunteers);
    }

    #[tokio::test]
    async fn test_persist_is_idempotent() {
        let repo = setup_test_db().await;
        let volunteers = vec![Volunteer::new("v1", 1, "ev", "g1", "Ana").with_position("P1")];

        assert_ok!(repo.persist(&volunteers).await);
        assert_ok!(repo.persist(&volunteers).await);

        assert_eq!(repo.fetch_for_event("ev").await.unwrap(), volunteers);
    }

    #[tokio::test]
    async fn test_insert_batch_is_atomic() {
        let repo = setup_test_db().await;
        repo.insert_batch(&[Volunteer::new("v1", 1, "ev", "g1", "Ana")])
            .await
            .unwrap();

        // Second record collides with v1: nothing of this batch is kept
        let err = assert_err!(
            repo.insert_batch(&[
                Volunteer::new("v2", 2, "ev", "g2", "Ben"),
                Volunteer::new("v1", 3, "ev", "g2", "Dup"),
            ])
            .await
        );

        assert!(err.is_storage_failure());
        assert!(err.to_string().contains("Unique constraint"));
        let stored = repo.fetch_for_event("ev").await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].name, "Ana");
    }

    #[tokio::test]
    async fn test_persist_keeps_created_at() {
        let repo = setup_test_db().await;
        repo.insert_batch(&[Volunteer::new("v1", 10, "ev", "g1", "Ana")])
            .await
            .unwrap();

        let mut changed = Volunteer::new("v1", 99, "ev", "g1", "Ana").with_position("P3");
        repo.persist(std::slice::from_ref(&changed)).await.unwrap();

        let stored = repo.fetch_for_event("ev").await.unwrap();
        changed.created_at = 10;
        assert_eq!(stored, vec![changed]);
    }
}
