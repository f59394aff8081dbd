// Submit Use Case - a group hands in its volunteers for an event

use crate::application::processor::constants::{MAX_BATCH_SIZE, MAX_VOLUNTEER_NAME_LEN};
use crate::domain::{Event, NewVolunteer, SubmittingGroup, Volunteer};
use crate::error::{AppError, Result};
use crate::port::{IdProvider, TimeProvider, VolunteerRepository};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Submit request (also the JSON shape read by the CLI)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub event: Event,
    pub group: SubmittingGroup,
    pub volunteers: Vec<NewVolunteer>,
}

/// Reject malformed submissions before anything is written
pub fn validate_request(req: &SubmitRequest) -> Result<()> {
    if req.event.id.trim().is_empty() {
        return Err(AppError::Validation("Event id cannot be empty".to_string()));
    }
    if req.event.church_id.trim().is_empty() || req.event.mass_id.trim().is_empty() {
        return Err(AppError::Validation(format!(
            "Event {} must reference a church and a mass",
            req.event.id
        )));
    }
    if req.group.id.trim().is_empty() {
        return Err(AppError::Validation("Group id cannot be empty".to_string()));
    }
    if req.volunteers.is_empty() {
        return Err(AppError::Validation(
            "Submission must contain at least one volunteer".to_string(),
        ));
    }
    if req.volunteers.len() > MAX_BATCH_SIZE {
        return Err(AppError::Validation(format!(
            "Submission too large: {} volunteers (max {})",
            req.volunteers.len(),
            MAX_BATCH_SIZE
        )));
    }

    for (index, volunteer) in req.volunteers.iter().enumerate() {
        let name = volunteer.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation(format!(
                "Volunteer #{} has an empty name",
                index + 1
            )));
        }
        if name.chars().count() > MAX_VOLUNTEER_NAME_LEN {
            return Err(AppError::Validation(format!(
                "Volunteer name too long (max {} characters): {}",
                MAX_VOLUNTEER_NAME_LEN, name
            )));
        }
    }

    Ok(())
}

/// Execute the submit use case: validate, create unassigned volunteers and
/// store them in one batch.
///
/// All volunteers of the submission share one clock reading. Storage keeps
/// insertion order among equal timestamps, so a batch never interleaves with
/// another group's batch.
///
/// # Arguments
///
/// * `volunteer_repo` - Volunteer repository
/// * `id_provider` - ID generator (injected for determinism)
/// * `time_provider` - Time provider (injected for determinism)
/// * `req` - Submit request
pub async fn execute(
    volunteer_repo: &dyn VolunteerRepository,
    id_provider: &dyn IdProvider,
    time_provider: &dyn TimeProvider,
    req: &SubmitRequest,
) -> Result<Vec<Volunteer>> {
    validate_request(req)?;

    let submitted_at = time_provider.now_millis();
    let volunteers: Vec<Volunteer> = req
        .volunteers
        .iter()
        .map(|new| {
            let mut volunteer = Volunteer::new(
                id_provider.generate_id(),
                submitted_at,
                req.event.id.clone(),
                req.group.id.clone(),
                new.name.trim(),
            );
            volunteer.restricted_role = new.restricted_role;
            volunteer.secondary_role = new.secondary_role;
            volunteer
        })
        .collect();

    volunteer_repo.insert_batch(&volunteers).await?;

    info!(
        event_id = %req.event.id,
        group_id = %req.group.id,
        count = volunteers.len(),
        "Volunteers submitted"
    );

    Ok(volunteers)
}
