// Volunteer Domain Model

use crate::domain::error::{DomainError, Result};
use crate::domain::{EventId, GroupId, Position, PositionId};
use serde::{Deserialize, Serialize};

/// Volunteer ID (UUID v4 in production)
pub type VolunteerId = String;

/// Role class a volunteer is distributed under.
///
/// Derived from the two independent role flags by priority: a volunteer with
/// `restricted_role` set is `Restricted` even when `secondary_role` is also set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoleClass {
    Restricted,
    Secondary,
    General,
}

impl std::fmt::Display for RoleClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoleClass::Restricted => write!(f, "RESTRICTED"),
            RoleClass::Secondary => write!(f, "SECONDARY"),
            RoleClass::General => write!(f, "GENERAL"),
        }
    }
}

/// Volunteer submitted by a group to serve at an event (an "event usher")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volunteer {
    pub id: VolunteerId,
    pub event_id: EventId,
    pub group_id: GroupId,
    pub name: String,

    pub restricted_role: bool,
    pub secondary_role: bool,

    /// None until the processing pass of the submitting batch assigns it
    pub position_id: Option<PositionId>,

    pub created_at: i64, // epoch ms
}

impl Volunteer {
    /// Create a new unassigned volunteer
    ///
    /// # Arguments
    ///
    /// * `id` - Unique volunteer ID (injected, not generated)
    /// * `created_at` - Creation timestamp in epoch ms (injected, not system time)
    /// * `event_id` - Event the volunteer is submitted for
    /// * `group_id` - Submitting group
    /// * `name` - Display name
    pub fn new(
        id: impl Into<String>,
        created_at: i64,
        event_id: impl Into<String>,
        group_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            event_id: event_id.into(),
            group_id: group_id.into(),
            name: name.into(),
            restricted_role: false,
            secondary_role: false,
            position_id: None,
            created_at,
        }
    }

    /// Create a test volunteer with deterministic ID and timestamp.
    ///
    /// IDs are `test-000001`, `test-000002`, ... and timestamps increase by 1000 per call,
    /// so volunteers created later always sort after earlier ones.
    ///
    /// **Note**: Production code injects ID and time via providers.
    pub fn new_test(
        event_id: impl Into<String>,
        group_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static TEST_COUNTER: AtomicU64 = AtomicU64::new(1);

        let counter = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let id = format!("test-{:06}", counter);
        let created_at = (counter * 1000) as i64;

        Self::new(id, created_at, event_id, group_id, name)
    }

    pub fn with_restricted_role(mut self) -> Self {
        self.restricted_role = true;
        self
    }

    pub fn with_secondary_role(mut self) -> Self {
        self.secondary_role = true;
        self
    }

    pub fn with_position(mut self, position_id: impl Into<String>) -> Self {
        self.position_id = Some(position_id.into());
        self
    }

    /// Role class by flag priority (restricted wins over secondary)
    pub fn role_class(&self) -> RoleClass {
        if self.restricted_role {
            RoleClass::Restricted
        } else if self.secondary_role {
            RoleClass::Secondary
        } else {
            RoleClass::General
        }
    }

    /// Whether the volunteer currently holds a position.
    ///
    /// Blank identifiers (empty or whitespace) count as unassigned.
    pub fn is_assigned(&self) -> bool {
        self.position_id
            .as_deref()
            .is_some_and(|id| !id.trim().is_empty())
    }

    /// Assign a position (only valid while unassigned)
    pub fn assign(&mut self, position_id: impl Into<String>) -> Result<()> {
        if let Some(current) = self.position_id.as_deref().filter(|_| self.is_assigned()) {
            return Err(DomainError::AlreadyAssigned {
                volunteer_id: self.id.clone(),
                position_id: current.to_string(),
            });
        }
        self.position_id = Some(position_id.into());
        Ok(())
    }
}

/// Volunteer as submitted by a group, before ID and timestamp are injected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVolunteer {
    pub name: String,
    #[serde(default)]
    pub restricted_role: bool,
    #[serde(default)]
    pub secondary_role: bool,
}

impl NewVolunteer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            restricted_role: false,
            secondary_role: false,
        }
    }

    pub fn restricted(mut self) -> Self {
        self.restricted_role = true;
        self
    }

    pub fn secondary(mut self) -> Self {
        self.secondary_role = true;
        self
    }
}

/// Volunteer augmented with its assigned position, denormalized for display
/// (confirmation receipts)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignedVolunteer {
    pub volunteer_id: VolunteerId,
    pub name: String,
    pub event_id: EventId,
    pub group_id: GroupId,
    pub role_class: RoleClass,
    pub position_id: PositionId,
    pub position_name: String,
    pub zone: Option<String>,
}

impl AssignedVolunteer {
    pub fn from_parts(volunteer: &Volunteer, role_class: RoleClass, position: &Position) -> Self {
        Self {
            volunteer_id: volunteer.id.clone(),
            name: volunteer.name.clone(),
            event_id: volunteer.event_id.clone(),
            group_id: volunteer.group_id.clone(),
            role_class,
            position_id: position.id.clone(),
            position_name: position.name.clone(),
            zone: position.zone.clone(),
        }
    }
}
