//! Bounded, most-recent-first action log with running counters.

use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::actions::entry::{ActionEntry, Class};
use crate::observability::metrics;

/// Default number of retained entries.
pub const DEFAULT_CAPACITY: usize = 600;

/// Running totals per class since the last clear.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counters {
    pub ok: u64,
    pub warn: u64,
    pub err: u64,
}

impl Counters {
    fn bump(&mut self, class: Class) {
        match class {
            Class::Ok => self.ok += 1,
            Class::Warn => self.warn += 1,
            Class::Err => self.err += 1,
        }
    }
}

/// A consistent copy of the log taken under one lock.
#[derive(Debug, Clone, Serialize)]
pub struct LogSnapshot {
    pub entries: Vec<ActionEntry>,
    pub counters: Counters,
}

#[derive(Debug)]
struct Inner {
    entries: VecDeque<ActionEntry>,
    counters: Counters,
}

/// Shared handle to the action log. Clones refer to the same log.
#[derive(Debug, Clone)]
pub struct ActionLog {
    capacity: usize,
    inner: Arc<Mutex<Inner>>,
}

impl ActionLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            inner: Arc::new(Mutex::new(Inner {
                entries: VecDeque::with_capacity(capacity),
                counters: Counters::default(),
            })),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Insert at the front, evicting the oldest entries beyond capacity.
    pub fn append(&self, entry: ActionEntry) -> Class {
        let class = entry.class;
        metrics::record_action(&entry.action, class);
        tracing::debug!(
            action = %entry.action,
            code = %entry.code,
            served_by = %entry.served_by,
            class = class.as_str(),
            "Action recorded"
        );

        let mut inner = self.lock();
        inner.counters.bump(class);
        inner.entries.push_front(entry);
        inner.entries.truncate(self.capacity);
        class
    }

    /// Empty the log and zero the counters in one step.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        inner.counters = Counters::default();
    }

    pub fn snapshot(&self) -> LogSnapshot {
        let inner = self.lock();
        LogSnapshot {
            entries: inner.entries.iter().cloned().collect(),
            counters: inner.counters,
        }
    }

    /// Counters and entry count read under the same lock.
    pub fn tally(&self) -> (Counters, usize) {
        let inner = self.lock();
        (inner.counters, inner.entries.len())
    }

    pub fn counters(&self) -> Counters {
        self.lock().counters
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Every critical section leaves Inner consistent, so a poisoned lock is still usable.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ActionLog {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::entry::ResultCode;

    fn entry(n: usize) -> ActionEntry {
        ActionEntry::new(format!("GET /data #{n}"), ResultCode::Status(200))
    }

    #[test]
    fn test_keeps_most_recent_entries_newest_first() {
        let log = ActionLog::new(5);
        for n in 0..12 {
            log.append(entry(n));
        }

        let snapshot = log.snapshot();
        let actions: Vec<_> = snapshot.entries.iter().map(|e| e.action.as_str()).collect();
        assert_eq!(
            actions,
            vec!["GET /data #11", "GET /data #10", "GET /data #9", "GET /data #8", "GET /data #7"]
        );
        // Counters track every append, not just retained entries.
        assert_eq!(snapshot.counters.ok, 12);
    }

    #[test]
    fn test_counters_follow_classification() {
        let log = ActionLog::default();
        log.append(ActionEntry::new("a", ResultCode::Status(200)));
        log.append(ActionEntry::new("b", ResultCode::Status(404)));
        log.append(ActionEntry::new("c", ResultCode::Status(503)));
        log.append(ActionEntry::new("d", ResultCode::Err));

        assert_eq!(
            log.counters(),
            Counters {
                ok: 1,
                warn: 1,
                err: 2
            }
        );
    }

    #[test]
    fn test_clear_resets_entries_and_counters() {
        let log = ActionLog::new(3);
        for n in 0..7 {
            log.append(entry(n));
        }
        log.append(ActionEntry::new("x", ResultCode::Err));

        log.clear();
        let snapshot = log.snapshot();
        assert!(snapshot.entries.is_empty());
        assert_eq!(snapshot.counters, Counters::default());
        assert!(log.is_empty());
    }

    #[test]
    fn test_concurrent_readers_never_see_partial_clear() {
        let log = ActionLog::new(50);
        for n in 0..50 {
            log.append(entry(n));
        }

        let reader = {
            let log = log.clone();
            std::thread::spawn(move || {
                for _ in 0..2_000 {
                    let s = log.snapshot();
                    let total = s.counters.ok + s.counters.warn + s.counters.err;
                    // Nothing is ever evicted here, so entries and counters must agree.
                    assert_eq!(s.entries.len() as u64, total);
                }
            })
        };

        for _ in 0..200 {
            log.clear();
            log.append(entry(0));
        }
        reader.join().unwrap();
    }
}
