// Port Layer - Interfaces for external dependencies

pub mod feature_flags;
pub mod id_provider; // For deterministic testing
pub mod position_repository;
pub mod time_provider;
pub mod volunteer_repository;

// Re-exports
pub use feature_flags::{FeatureFlags, StaticFeatureFlags, ROLE_MODE_FLAG};
pub use id_provider::IdProvider;
pub use position_repository::PositionRepository;
pub use time_provider::TimeProvider;
pub use volunteer_repository::VolunteerRepository;
