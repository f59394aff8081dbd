// Volunteer Repository Port (Interface)

use crate::domain::Volunteer;
use crate::error::Result;
use async_trait::async_trait;

/// Repository interface for event volunteer persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VolunteerRepository: Send + Sync {
    /// Every volunteer ever submitted for the event, across all groups,
    /// in storage (creation) order
    async fn fetch_for_event(&self, event_id: &str) -> Result<Vec<Volunteer>>;

    /// Atomically insert-or-update the full set passed in.
    ///
    /// Either every record is written or none is.
    async fn persist(&self, volunteers: &[Volunteer]) -> Result<()>;

    /// Atomically insert a newly submitted batch
    async fn insert_batch(&self, volunteers: &[Volunteer]) -> Result<()>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Mutex, PoisonError};

    /// In-memory volunteer store preserving insertion order
    #[derive(Default)]
    pub struct InMemoryVolunteerRepository {
        volunteers: Mutex<Vec<Volunteer>>,
        fail_fetch: AtomicBool,
        fail_persist: AtomicBool,
        persist_calls: AtomicUsize,
    }

    impl InMemoryVolunteerRepository {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_volunteers(volunteers: Vec<Volunteer>) -> Self {
            Self {
                volunteers: Mutex::new(volunteers),
                ..Self::default()
            }
        }

        pub fn fail_fetches(&self, fail: bool) {
            self.fail_fetch.store(fail, Ordering::SeqCst);
        }

        pub fn fail_persists(&self, fail: bool) {
            self.fail_persist.store(fail, Ordering::SeqCst);
        }

        pub fn persist_count(&self) -> usize {
            self.persist_calls.load(Ordering::SeqCst)
        }

        /// Snapshot of every stored volunteer
        pub fn all(&self) -> Vec<Volunteer> {
            self.volunteers
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        /// Position of a volunteer by name (test convenience)
        pub fn position_of(&self, name: &str) -> Option<String> {
            self.all()
                .into_iter()
                .find(|v| v.name == name)
                .and_then(|v| v.position_id)
        }
    }

    #[async_trait]
    impl VolunteerRepository for InMemoryVolunteerRepository {
        async fn fetch_for_event(&self, event_id: &str) -> Result<Vec<Volunteer>> {
            if self.fail_fetch.load(Ordering::SeqCst) {
                return Err(AppError::Database("volunteer store unavailable".to_string()));
            }
            Ok(self
                .all()
                .into_iter()
                .filter(|v| v.event_id == event_id)
                .collect())
        }

        async fn persist(&self, volunteers: &[Volunteer]) -> Result<()> {
            self.persist_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_persist.load(Ordering::SeqCst) {
                return Err(AppError::Database("volunteer write rejected".to_string()));
            }

            let mut stored = self
                .volunteers
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            for volunteer in volunteers {
                match stored.iter_mut().find(|v| v.id == volunteer.id) {
                    Some(existing) => *existing = volunteer.clone(),
                    None => stored.push(volunteer.clone()),
                }
            }
            Ok(())
        }

        async fn insert_batch(&self, volunteers: &[Volunteer]) -> Result<()> {
            if self.fail_persist.load(Ordering::SeqCst) {
                return Err(AppError::Database("volunteer write rejected".to_string()));
            }

            let mut stored = self
                .volunteers
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(dup) = volunteers
                .iter()
                .find(|v| stored.iter().any(|s| s.id == v.id))
            {
                return Err(AppError::Database(format!(
                    "Unique constraint violation: volunteer {}",
                    dup.id
                )));
            }
            stored.extend(volunteers.iter().cloned());
            Ok(())
        }
    }
}
