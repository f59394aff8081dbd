// Position Catalog Partitioner

use crate::domain::Position;
use serde::{Deserialize, Serialize};

/// A catalog split into its two round-robin pools.
///
/// Both pools keep the catalog's configured order; nothing is re-sorted here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionPools {
    pub restricted: Vec<Position>,
    pub general: Vec<Position>,
}

impl PositionPools {
    /// Split `catalog` by role flag.
    ///
    /// With role-mode disabled, restricted positions are dropped entirely and
    /// the restricted pool is empty.
    pub fn partition(catalog: &[Position], role_mode: bool) -> Self {
        let (restricted, general): (Vec<Position>, Vec<Position>) =
            catalog.iter().cloned().partition(|p| p.restricted);

        Self {
            restricted: if role_mode { restricted } else { Vec::new() },
            general,
        }
    }

    pub fn restricted_ids(&self) -> Vec<&str> {
        self.restricted.iter().map(|p| p.id.as_str()).collect()
    }

    pub fn general_ids(&self) -> Vec<&str> {
        self.general.iter().map(|p| p.id.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.restricted.is_empty() && self.general.is_empty()
    }
}
