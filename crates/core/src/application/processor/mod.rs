// Batch Processor - drains the submission queue and commits assignments

pub mod constants;

use crate::application::assignment::{AssignmentSession, PositionPools, UnassignedVolunteer};
use crate::application::submission::{submit, SubmitRequest};
use crate::domain::{
    AssignedVolunteer, ConfirmationQueueItem, Event, EventId, SubmissionQueue, SubmittingGroup,
    Ticket, Volunteer,
};
use crate::error::{AppError, Result};
use crate::port::{FeatureFlags, IdProvider, PositionRepository, TimeProvider, VolunteerRepository};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Processor tuning
#[derive(Debug, Clone, Default)]
pub struct ProcessorConfig {
    /// Upper bound for one item's resolve→commit span. A timeout leaves the
    /// item queued, like any storage failure.
    pub item_timeout: Option<Duration>,
}

/// Outcome of one `process_queue` call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessSummary {
    pub processed_items: usize,
    /// Everything assigned during the call, sorted by display name
    pub assigned: Vec<AssignedVolunteer>,
    /// Volunteers left unassigned because their pool was empty
    pub unassigned: Vec<UnassignedVolunteer>,
    /// Items still queued after the call
    pub remaining: usize,
}

/// Result of committing one queue item
struct ItemOutcome {
    assigned: Vec<AssignedVolunteer>,
    unassigned: Vec<UnassignedVolunteer>,
}

/// Position-assignment service.
///
/// Constructed once per application and shared by `Arc`. Owns the
/// submission queue; only `process_queue` dequeues. The resolve→commit span
/// of each item runs under a per-event lock, so concurrent callers never
/// distribute from the same snapshot of one event.
pub struct AssignmentService {
    positions: Arc<dyn PositionRepository>,
    volunteers: Arc<dyn VolunteerRepository>,
    flags: Arc<dyn FeatureFlags>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
    config: ProcessorConfig,

    queue: Mutex<SubmissionQueue>,
    last_assigned: Mutex<Vec<AssignedVolunteer>>,
    last_session: Mutex<Option<AssignmentSession>>,
    event_locks: Mutex<HashMap<EventId, Arc<tokio::sync::Mutex<()>>>>,
}

impl AssignmentService {
    pub fn new(
        positions: Arc<dyn PositionRepository>,
        volunteers: Arc<dyn VolunteerRepository>,
        flags: Arc<dyn FeatureFlags>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
        config: ProcessorConfig,
    ) -> Self {
        Self {
            positions,
            volunteers,
            flags,
            id_provider,
            time_provider,
            config,
            queue: Mutex::new(SubmissionQueue::new()),
            last_assigned: Mutex::new(Vec::new()),
            last_session: Mutex::new(None),
            event_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Queue one group's batch for an event
    pub fn enqueue(&self, event: Event, group: SubmittingGroup) -> Ticket {
        let ticket = lock(&self.queue).enqueue(event.clone(), group.clone());
        debug!(ticket, event_id = %event.id, group_id = %group.id, "Batch enqueued");
        ticket
    }

    /// Store a group's volunteers (unassigned) and queue the batch
    pub async fn submit(&self, req: SubmitRequest) -> Result<(Ticket, Vec<Volunteer>)> {
        let created = submit::execute(
            self.volunteers.as_ref(),
            self.id_provider.as_ref(),
            self.time_provider.as_ref(),
            &req,
        )
        .await?;
        let ticket = self.enqueue(req.event, req.group);
        Ok((ticket, created))
    }

    /// FIFO snapshot of pending items
    pub fn queued_items(&self) -> Vec<ConfirmationQueueItem> {
        lock(&self.queue).peek_all()
    }

    /// Records assigned by the last `process_queue` call, sorted by name
    pub fn last_assigned(&self) -> Vec<AssignedVolunteer> {
        lock(&self.last_assigned).clone()
    }

    /// Session of the most recently distributed item
    pub fn last_session(&self) -> Option<AssignmentSession> {
        lock(&self.last_session).clone()
    }

    /// Clear the queue and every cached result. Storage is untouched.
    pub fn reset(&self) {
        lock(&self.queue).clear();
        lock(&self.last_assigned).clear();
        *lock(&self.last_session) = None;
        info!("Assignment service reset");
    }

    /// Process every item queued at the time of the call, oldest first.
    ///
    /// Stops at the first configuration-fatal or storage error; the failing
    /// item and everything behind it stay queued. Items committed before the
    /// failure stay committed and are reported by `last_assigned`.
    pub async fn process_queue(&self) -> Result<ProcessSummary> {
        let pending = lock(&self.queue).len();
        if pending == 0 {
            debug!("Submission queue empty, nothing to process");
            lock(&self.last_assigned).clear();
            return Ok(ProcessSummary::default());
        }

        let role_mode = self.flags.is_role_mode_enabled().await?;
        info!(pending, role_mode, "Processing submission queue");

        let mut summary = ProcessSummary::default();
        let mut failure = None;

        for _ in 0..pending {
            let next = lock(&self.queue).front().cloned();
            let Some(item) = next else {
                break;
            };

            match self.process_item_guarded(&item, role_mode).await {
                Ok(outcome) => {
                    self.dequeue_committed(item.ticket);
                    summary.processed_items += 1;
                    summary.assigned.extend(outcome.assigned);
                    summary.unassigned.extend(outcome.unassigned);
                }
                Err(e) => {
                    error!(
                        ticket = item.ticket,
                        event_id = %item.event.id,
                        group_id = %item.group.id,
                        error = %e,
                        "Queue item failed, left queued"
                    );
                    failure = Some(e);
                    break;
                }
            }
        }

        summary.assigned.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then_with(|| a.volunteer_id.cmp(&b.volunteer_id))
        });
        *lock(&self.last_assigned) = summary.assigned.clone();
        summary.remaining = lock(&self.queue).len();

        if let Some(e) = failure {
            return Err(e);
        }

        info!(
            processed = summary.processed_items,
            assigned = summary.assigned.len(),
            unassigned = summary.unassigned.len(),
            remaining = summary.remaining,
            "Submission queue processed"
        );
        Ok(summary)
    }

    /// Per-event lock plus optional timeout around one item
    async fn process_item_guarded(
        &self,
        item: &ConfirmationQueueItem,
        role_mode: bool,
    ) -> Result<ItemOutcome> {
        let event_lock = self.event_lock(&item.event.id);

        let result = {
            let _guard = event_lock.lock().await;
            match self.config.item_timeout {
                Some(limit) => tokio::time::timeout(limit, self.process_item(item, role_mode))
                    .await
                    .unwrap_or_else(|_| {
                        Err(AppError::Timeout(format!(
                            "item {} (event {}) exceeded {}ms",
                            item.ticket,
                            item.event.id,
                            limit.as_millis()
                        )))
                    }),
                None => self.process_item(item, role_mode).await,
            }
        };

        self.release_event_lock(&item.event.id, event_lock);
        result
    }

    /// Resolving → Distributing → Committing for one item
    async fn process_item(
        &self,
        item: &ConfirmationQueueItem,
        role_mode: bool,
    ) -> Result<ItemOutcome> {
        let event = &item.event;

        // Resolving
        let catalog = self
            .positions
            .fetch_for_mass(&event.church_id, &event.mass_id)
            .await?;
        if catalog.is_empty() {
            return Err(AppError::NoPositionsConfigured {
                event_id: event.id.clone(),
                church_id: event.church_id.clone(),
                mass_id: event.mass_id.clone(),
            });
        }
        let mut volunteers = self.volunteers.fetch_for_event(&event.id).await?;

        // Distributing
        let pools = PositionPools::partition(&catalog, role_mode);
        if pools.is_empty() {
            warn!(
                event_id = %event.id,
                catalog = catalog.len(),
                role_mode,
                "Only restricted positions configured and role mode is off, nothing to hand out"
            );
        }
        let session = AssignmentSession::start(event.id.clone(), &volunteers, pools, role_mode);

        let mut batch: Vec<Volunteer> = volunteers
            .iter()
            .filter(|v| v.group_id == item.group.id && !v.is_assigned())
            .cloned()
            .collect();
        // Stable: equal timestamps keep storage order
        batch.sort_by_key(|v| v.created_at);

        let distribution = session.distribute(&batch);
        debug!(
            event_id = %event.id,
            group_id = %item.group.id,
            batch = batch.len(),
            restricted_cursor = session.cursors.restricted,
            general_cursor = session.cursors.general,
            "Batch distributed"
        );
        *lock(&self.last_session) = Some(session);

        for skipped in &distribution.unassigned {
            warn!(
                event_id = %event.id,
                volunteer_id = %skipped.volunteer_id,
                role_class = %skipped.role_class,
                pool = %skipped.pool,
                "No position available in pool, volunteer left unassigned"
            );
        }

        // Committing
        for assignment in &distribution.assigned {
            let volunteer = volunteers
                .iter_mut()
                .find(|v| v.id == assignment.volunteer_id)
                .ok_or_else(|| {
                    AppError::Internal(format!(
                        "assigned volunteer {} missing from event {}",
                        assignment.volunteer_id, event.id
                    ))
                })?;
            volunteer.assign(assignment.position_id.clone())?;
        }
        self.volunteers.persist(&volunteers).await?;

        info!(
            ticket = item.ticket,
            event_id = %event.id,
            group_id = %item.group.id,
            assigned = distribution.assigned.len(),
            unassigned = distribution.unassigned.len(),
            "Batch committed"
        );

        Ok(ItemOutcome {
            assigned: distribution.assigned,
            unassigned: distribution.unassigned,
        })
    }

    /// Drop the committed item, unless a concurrent caller already did
    fn dequeue_committed(&self, ticket: Ticket) {
        let mut queue = lock(&self.queue);
        if queue.front().map(|item| item.ticket) == Some(ticket) {
            queue.dequeue_front();
        }
    }

    fn event_lock(&self, event_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        lock(&self.event_locks)
            .entry(event_id.to_string())
            .or_default()
            .clone()
    }

    /// Drop the event's lock entry once no other caller holds or awaits it.
    /// Clones are only taken under the map lock, so the count is exact here.
    fn release_event_lock(&self, event_id: &str, event_lock: Arc<tokio::sync::Mutex<()>>) {
        let mut locks = lock(&self.event_locks);
        // Map entry plus ours
        if Arc::strong_count(&event_lock) == 2 {
            locks.remove(event_id);
        }
    }
}

/// Lock a std mutex, ignoring poisoning (the guarded state stays consistent
/// across every critical section here)
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests;
