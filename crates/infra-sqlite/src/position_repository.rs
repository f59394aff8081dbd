// SQLite PositionRepository Implementation

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::debug;
use usher_rota_core::domain::Position;
use usher_rota_core::error::Result;
use usher_rota_core::port::PositionRepository;

pub struct SqlitePositionRepository {
    pool: SqlitePool,
}

impl SqlitePositionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert or replace a position in a mass's catalog (activates it)
    pub async fn upsert(&self, church_id: &str, mass_id: &str, position: &Position) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO positions (id, church_id, mass_id, name, zone, is_restricted, sequence, active)
            VALUES (?, ?, ?, ?, ?, ?, ?, 1)
            ON CONFLICT(id) DO UPDATE SET
                church_id = excluded.church_id,
                mass_id = excluded.mass_id,
                name = excluded.name,
                zone = excluded.zone,
                is_restricted = excluded.is_restricted,
                sequence = excluded.sequence,
                active = 1
            "#,
        )
        .bind(&position.id)
        .bind(church_id)
        .bind(mass_id)
        .bind(&position.name)
        .bind(&position.zone)
        .bind(if position.restricted { 1 } else { 0 })
        .bind(position.sequence)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        debug!(position_id = %position.id, church_id, mass_id, "Position saved");
        Ok(())
    }

    /// Retire a position; it stays in storage but leaves the catalog.
    /// Returns false when no such position exists.
    pub async fn deactivate(&self, position_id: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE positions SET active = 0 WHERE id = ?")
            .bind(position_id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl PositionRepository for SqlitePositionRepository {
    async fn fetch_for_mass(&self, church_id: &str, mass_id: &str) -> Result<Vec<Position>> {
        let rows = sqlx::query_as::<_, PositionRow>(
            r#"
            SELECT id, name, zone, is_restricted, sequence
            FROM positions
            WHERE church_id = ? AND mass_id = ? AND active = 1
            ORDER BY sequence ASC, id ASC
            "#,
        )
        .bind(church_id)
        .bind(mass_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(PositionRow::into_position).collect())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PositionRow {
    id: String,
    name: String,
    zone: Option<String>,
    is_restricted: i32,
    sequence: i64,
}

impl PositionRow {
    fn into_position(self) -> Position {
        Position {
            id: self.id,
            name: self.name,
            restricted: self.is_restricted != 0,
            zone: self.zone,
            sequence: self.sequence,
        }
    }
}
