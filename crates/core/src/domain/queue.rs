// Submission Queue Domain Model

use crate::domain::{Event, SubmittingGroup};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Monotonic queue ticket, unique within one queue instance
pub type Ticket = u64;

/// One pending batch: the volunteers `group` submitted for `event`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationQueueItem {
    pub ticket: Ticket,
    pub event: Event,
    pub group: SubmittingGroup,
}

/// FIFO of pending submissions.
///
/// Never rejects and never deduplicates: the same (event, group) pair queued
/// twice is two independent batches. Only the batch processor dequeues.
#[derive(Debug, Default)]
pub struct SubmissionQueue {
    items: VecDeque<ConfirmationQueueItem>,
    next_ticket: Ticket,
}

impl SubmissionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item and return its ticket
    pub fn enqueue(&mut self, event: Event, group: SubmittingGroup) -> Ticket {
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.items.push_back(ConfirmationQueueItem {
            ticket,
            event,
            group,
        });
        ticket
    }

    /// Oldest item, if any
    pub fn front(&self) -> Option<&ConfirmationQueueItem> {
        self.items.front()
    }

    /// Remove and return the oldest item
    pub fn dequeue_front(&mut self) -> Option<ConfirmationQueueItem> {
        self.items.pop_front()
    }

    /// FIFO snapshot (diagnostics)
    pub fn peek_all(&self) -> Vec<ConfirmationQueueItem> {
        self.items.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfirmationQueueItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drop every pending item. Tickets keep increasing so a stale ticket
    /// never matches a new item.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}
