// Position Domain Model

use serde::{Deserialize, Serialize};

/// Position identifier
pub type PositionId = String;

/// A physical duty station configured for a recurring mass.
///
/// Positions are read-only input to the assignment engine. `sequence` defines
/// the round-robin order inside the pool the position belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub id: PositionId,
    pub name: String,
    /// Role-restricted position (only restricted-role volunteers when role-mode is on)
    pub restricted: bool,
    /// Informational zone label, carried through to receipts
    pub zone: Option<String>,
    pub sequence: i64,
}

impl Position {
    pub fn new(id: impl Into<String>, name: impl Into<String>, sequence: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            restricted: false,
            zone: None,
            sequence,
        }
    }

    pub fn restricted(mut self) -> Self {
        self.restricted = true;
        self
    }

    pub fn in_zone(mut self, zone: impl Into<String>) -> Self {
        self.zone = Some(zone.into());
        self
    }
}
