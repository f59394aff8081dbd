// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Volunteer {volunteer_id} is already assigned to {position_id}")]
    AlreadyAssigned {
        volunteer_id: String,
        position_id: String,
    },
}

pub type Result<T> = std::result::Result<T, DomainError>;
