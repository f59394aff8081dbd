//! Position assignment: partition the catalog, recover the rotation cursors
//! from already-assigned volunteers, distribute the pending batch.

pub mod cursor;
pub mod distributor;
pub mod partition;

pub use cursor::{latest_unique_anchor, resolve_cursor};
pub use distributor::{Distribution, PoolKind, RoleDistributor, UnassignedVolunteer};
pub use partition::PositionPools;

use crate::domain::{EventId, Volunteer};
use serde::{Deserialize, Serialize};

/// Next round-robin index for each pool
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursors {
    pub restricted: usize,
    pub general: usize,
}

impl Cursors {
    /// Recover both cursors from the event's volunteers (storage order).
    ///
    /// With role-mode on, the restricted cursor follows restricted-role
    /// volunteers and the general cursor follows everyone else. With
    /// role-mode off there is a single rotation over the general pool, fed
    /// by every volunteer of the event.
    pub fn resolve(volunteers: &[Volunteer], pools: &PositionPools, role_mode: bool) -> Self {
        if role_mode {
            let restricted = used_positions(volunteers, |v| v.restricted_role);
            let general = used_positions(volunteers, |v| !v.restricted_role);
            Self {
                restricted: resolve_cursor(&restricted, &pools.restricted_ids()),
                general: resolve_cursor(&general, &pools.general_ids()),
            }
        } else {
            let everyone = used_positions(volunteers, |_| true);
            Self {
                restricted: 0,
                general: resolve_cursor(&everyone, &pools.general_ids()),
            }
        }
    }
}

/// Position ids held by the selected volunteers, in storage order
fn used_positions(
    volunteers: &[Volunteer],
    include: impl Fn(&Volunteer) -> bool,
) -> Vec<Option<&str>> {
    volunteers
        .iter()
        .filter(|v| include(v))
        .map(|v| v.position_id.as_deref())
        .collect()
}

/// Transient per-item state, recomputed on every processing pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentSession {
    pub event_id: EventId,
    pub role_mode: bool,
    pub pools: PositionPools,
    pub cursors: Cursors,
}

impl AssignmentSession {
    pub fn start(
        event_id: impl Into<String>,
        volunteers: &[Volunteer],
        pools: PositionPools,
        role_mode: bool,
    ) -> Self {
        let cursors = Cursors::resolve(volunteers, &pools, role_mode);
        Self {
            event_id: event_id.into(),
            role_mode,
            pools,
            cursors,
        }
    }

    /// Distribute `batch` from this session's cursors
    pub fn distribute(&self, batch: &[Volunteer]) -> Distribution {
        RoleDistributor::new(&self.pools, self.role_mode).distribute(batch, self.cursors)
    }
}
