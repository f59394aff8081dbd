// Feature Flag Port

use crate::error::Result;
use async_trait::async_trait;

/// Storage key of the role-mode toggle
pub const ROLE_MODE_FLAG: &str = "role_mode";

/// Runtime feature flags read by the assignment engine
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeatureFlags: Send + Sync {
    /// Whether role-partitioned distribution is enabled.
    ///
    /// Read once per `process_queue` call, never per volunteer.
    async fn is_role_mode_enabled(&self) -> Result<bool>;
}

/// Fixed flag values (configuration-driven deployments and tests)
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticFeatureFlags {
    pub role_mode: bool,
}

impl StaticFeatureFlags {
    pub fn new(role_mode: bool) -> Self {
        Self { role_mode }
    }
}

#[async_trait]
impl FeatureFlags for StaticFeatureFlags {
    async fn is_role_mode_enabled(&self) -> Result<bool> {
        Ok(self.role_mode)
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Toggleable flag store that counts reads
    #[derive(Default)]
    pub struct ToggleFeatureFlags {
        role_mode: AtomicBool,
        reads: AtomicUsize,
    }

    impl ToggleFeatureFlags {
        pub fn new(role_mode: bool) -> Self {
            Self {
                role_mode: AtomicBool::new(role_mode),
                reads: AtomicUsize::new(0),
            }
        }

        pub fn set_role_mode(&self, enabled: bool) {
            self.role_mode.store(enabled, Ordering::SeqCst);
        }

        pub fn read_count(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl FeatureFlags for ToggleFeatureFlags {
        async fn is_role_mode_enabled(&self) -> Result<bool> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(self.role_mode.load(Ordering::SeqCst))
        }
    }
}
