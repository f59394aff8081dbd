// Event & Submitting Group Domain Model

use serde::{Deserialize, Serialize};

/// Event identifier (one occurrence of a recurring mass)
pub type EventId = String;

/// Submitting group identifier
pub type GroupId = String;

/// An event volunteers are submitted for.
///
/// Only the identifiers needed to locate the position catalog are carried;
/// dates, names and the rest of the event live in the catalog store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub church_id: String,
    pub mass_id: String,
}

impl Event {
    pub fn new(
        id: impl Into<String>,
        church_id: impl Into<String>,
        mass_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            church_id: church_id.into(),
            mass_id: mass_id.into(),
        }
    }
}

/// Group submitting a batch of volunteers for an event
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmittingGroup {
    pub id: GroupId,
    pub name: Option<String>,
}

impl SubmittingGroup {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}
