// Position Repository Port (Interface)

use crate::domain::Position;
use crate::error::Result;
use async_trait::async_trait;

/// Read-only access to the position catalog
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PositionRepository: Send + Sync {
    /// Active positions configured for a mass, ordered by sequence.
    ///
    /// An empty result is valid here; the assignment service treats it as
    /// a configuration-fatal condition.
    async fn fetch_for_mass(&self, church_id: &str, mass_id: &str) -> Result<Vec<Position>>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Mutex, PoisonError};

    /// In-memory catalog keyed by (church, mass)
    #[derive(Default)]
    pub struct InMemoryPositionRepository {
        catalogs: Mutex<HashMap<(String, String), Vec<Position>>>,
        fail: AtomicBool,
        fetches: AtomicUsize,
    }

    impl InMemoryPositionRepository {
        pub fn new() -> Self {
            Self::default()
        }

        /// Replace the catalog of a mass
        pub fn set_catalog(&self, church_id: &str, mass_id: &str, positions: Vec<Position>) {
            self.catalogs
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert((church_id.to_string(), mass_id.to_string()), positions);
        }

        /// Make every subsequent fetch fail with a database error
        pub fn fail_fetches(&self, fail: bool) {
            self.fail.store(fail, Ordering::SeqCst);
        }

        pub fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PositionRepository for InMemoryPositionRepository {
        async fn fetch_for_mass(&self, church_id: &str, mass_id: &str) -> Result<Vec<Position>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(AppError::Database("position catalog unavailable".to_string()));
            }

            let mut positions = self
                .catalogs
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .get(&(church_id.to_string(), mass_id.to_string()))
                .cloned()
                .unwrap_or_default();
            // Stable: equal sequences keep configuration order
            positions.sort_by_key(|p| p.sequence);
            Ok(positions)
        }
    }
}
