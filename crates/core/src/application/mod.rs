// Application Layer - Use Cases and Business Logic

pub mod assignment;
pub mod processor;
pub mod submission;

// Re-exports
pub use assignment::{AssignmentSession, Cursors, PositionPools, RoleDistributor};
pub use processor::{AssignmentService, ProcessSummary, ProcessorConfig};
pub use submission::SubmitRequest;
