// Domain Layer - Pure business logic and entities

pub mod error;
pub mod event;
pub mod position;
pub mod queue;
pub mod volunteer;

// Re-exports
pub use error::DomainError;
pub use event::{Event, EventId, GroupId, SubmittingGroup};
pub use position::{Position, PositionId};
pub use queue::{ConfirmationQueueItem, SubmissionQueue, Ticket};
pub use volunteer::{AssignedVolunteer, NewVolunteer, RoleClass, Volunteer, VolunteerId};
