// Usher Rota Infrastructure - SQLite Adapter
// Implements: PositionRepository, VolunteerRepository, FeatureFlags

mod connection;
mod error;
mod feature_flags;
mod migration;
mod position_repository;
mod volunteer_repository;

pub use connection::{create_pool, database_url};
pub use feature_flags::SqliteFeatureFlags;
pub use migration::run_migrations;
pub use position_repository::SqlitePositionRepository;
pub use volunteer_repository::SqliteVolunteerRepository;

// Note: sqlx::Error conversion is handled by `error::map_sqlx_error`
// (orphan rule: cannot implement From<sqlx::Error> for AppError here)
