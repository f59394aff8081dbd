// SQLite FeatureFlags Implementation

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::info;
use usher_rota_core::error::Result;
use usher_rota_core::port::{FeatureFlags, ROLE_MODE_FLAG};

/// Flags stored in the `feature_flags` table. A missing row reads as off.
pub struct SqliteFeatureFlags {
    pool: SqlitePool,
}

impl SqliteFeatureFlags {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Stored value of a flag, None when it was never set
    pub async fn get(&self, name: &str) -> Result<Option<bool>> {
        let enabled: Option<i32> =
            sqlx::query_scalar("SELECT enabled FROM feature_flags WHERE name = ?")
                .bind(name)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        Ok(enabled.map(|v| v != 0))
    }

    pub async fn set(&self, name: &str, enabled: bool) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO feature_flags (name, enabled) VALUES (?, ?)
            ON CONFLICT(name) DO UPDATE SET enabled = excluded.enabled
            "#,
        )
        .bind(name)
        .bind(if enabled { 1 } else { 0 })
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        info!(flag = name, enabled, "Feature flag updated");
        Ok(())
    }

    pub async fn set_role_mode(&self, enabled: bool) -> Result<()> {
        self.set(ROLE_MODE_FLAG, enabled).await
    }
}

#[async_trait]
impl FeatureFlags for SqliteFeatureFlags {
    async fn is_role_mode_enabled(&self) -> Result<bool> {
        Ok(self.get(ROLE_MODE_FLAG).await?.unwrap_or(false))
    }
}
