// Submission - groups hand in volunteers for an event

pub mod submit;

pub use submit::{validate_request, SubmitRequest};
