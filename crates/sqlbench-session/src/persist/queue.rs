//! Debounced write scheduling
//!
//! The queue holds at most one snapshot per connection. Scheduling again
//! replaces the snapshot and pushes the deadline back, so a burst of edits
//! turns into a single write once things go quiet. The queue owns no timers;
//! whoever drives it decides when to call [`PersistQueue::take_due`].

use std::collections::HashMap;
use std::time::{Duration, Instant};

use super::PersistedSession;

#[derive(Debug)]
struct Scheduled {
    deadline: Instant,
    session: PersistedSession,
}

#[derive(Debug)]
pub struct PersistQueue {
    debounce: Duration,
    pending: HashMap<String, Scheduled>,
}

impl PersistQueue {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            pending: HashMap::new(),
        }
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    pub fn schedule(&mut self, connection_id: &str, session: PersistedSession, now: Instant) {
        let deadline = now + self.debounce;
        self.pending
            .insert(connection_id.to_string(), Scheduled { deadline, session });
    }

    /// Remove and return every snapshot whose deadline has passed
    pub fn take_due(&mut self, now: Instant) -> Vec<(String, PersistedSession)> {
        let due: Vec<String> = self
            .pending
            .iter()
            .filter(|(_, s)| s.deadline <= now)
            .map(|(id, _)| id.clone())
            .collect();

        due.into_iter()
            .filter_map(|id| self.pending.remove(&id).map(|s| (id, s.session)))
            .collect()
    }

    /// Remove and return every snapshot regardless of deadline
    pub fn take_all(&mut self) -> Vec<(String, PersistedSession)> {
        self.pending
            .drain()
            .map(|(id, s)| (id, s.session))
            .collect()
    }

    /// Remove the snapshot for one connection
    pub fn take(&mut self, connection_id: &str) -> Option<PersistedSession> {
        self.pending.remove(connection_id).map(|s| s.session)
    }

    /// Earliest deadline, for drivers that want to sleep until the next write
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|s| s.deadline).min()
    }

    pub fn is_pending(&self, connection_id: &str) -> bool {
        self.pending.contains_key(connection_id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
