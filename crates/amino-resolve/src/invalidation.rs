//! Invalidation epochs.
//!
//! Every chain walk and graph build holds a [`Ticket`] taken when it starts.
//! [`InvalidationLog::mark`] stamps an entity id with a new epoch. A ticket
//! older than a mark whose id appears in its cache key has seen data the
//! invalidation was meant to discard, so its result must not be cached.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Default)]
struct Log {
    epoch: u64,
    marks: HashMap<String, u64>,
    /// Open tickets per starting epoch.
    open: BTreeMap<u64, usize>,
}

fn lock(log: &Mutex<Log>) -> MutexGuard<'_, Log> {
    log.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
pub(crate) struct InvalidationLog {
    log: Arc<Mutex<Log>>,
}

impl InvalidationLog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Open a ticket at the current epoch.
    pub(crate) fn begin(&self) -> Ticket {
        let mut log = lock(&self.log);
        let since = log.epoch;
        *log.open.entry(since).or_default() += 1;
        Ticket {
            log: Arc::clone(&self.log),
            since,
        }
    }

    /// Stamp `entity_id` with a new epoch.
    pub(crate) fn mark(&self, entity_id: &str) {
        let mut log = lock(&self.log);
        log.epoch += 1;
        let epoch = log.epoch;
        log.marks.insert(entity_id.to_string(), epoch);
        // A mark no newer than the oldest open ticket can never match again.
        match log.open.keys().next().copied() {
            Some(oldest) => log.marks.retain(|_, at| *at > oldest),
            None => log.marks.clear(),
        }
    }

    #[cfg(test)]
    fn marks(&self) -> usize {
        lock(&self.log).marks.len()
    }
}

/// An open chain walk or graph build.
pub(crate) struct Ticket {
    log: Arc<Mutex<Log>>,
    since: u64,
}

impl Ticket {
    /// Whether an id contained in `cache_key` was invalidated after this
    /// ticket was opened.
    pub(crate) fn is_stale(&self, cache_key: &str) -> bool {
        lock(&self.log)
            .marks
            .iter()
            .any(|(id, at)| *at > self.since && cache_key.contains(id.as_str()))
    }
}

impl Drop for Ticket {
    fn drop(&mut self) {
        let mut log = lock(&self.log);
        if let Some(count) = log.open.get_mut(&self.since) {
            *count -= 1;
            if *count == 0 {
                log.open.remove(&self.since);
            }
        }
    }
}
