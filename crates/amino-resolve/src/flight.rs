//! In-process single-flight registry.
//!
//! Concurrent calls for the same key share one execution of the operation.
//! The first caller creates a slot holding a shared future; later callers
//! join it. Every caller, including the one that started it, holds a guard
//! that releases its share of the slot on drop, so the slot disappears once
//! the last waiter has seen the outcome, on success, failure, panic, or
//! cancellation alike.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use thiserror::Error;

/// Outcome of a failed flight, identical for every waiter.
#[derive(Debug, Clone, Error)]
pub enum FlightError<E> {
    #[error("operation failed: {0}")]
    Failed(E),

    #[error("operation panicked: {0}")]
    Panicked(String),
}

type Flight<T, E> = Shared<BoxFuture<'static, Result<T, FlightError<E>>>>;

struct Slot<T, E> {
    generation: u64,
    waiters: usize,
    flight: Flight<T, E>,
}

type Slots<T, E> = Mutex<HashMap<String, Slot<T, E>>>;

/// Deduplicates concurrent executions per key.
pub struct SingleFlight<T, E> {
    slots: Arc<Slots<T, E>>,
    generation: AtomicU64,
}

impl<T, E> Default for SingleFlight<T, E> {
    fn default() -> Self {
        Self {
            slots: Arc::new(Mutex::new(HashMap::new())),
            generation: AtomicU64::new(0),
        }
    }
}

fn lock<T, E>(slots: &Slots<T, E>) -> MutexGuard<'_, HashMap<String, Slot<T, E>>> {
    slots.lock().unwrap_or_else(PoisonError::into_inner)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

/// Releases one waiter's share of a slot.
struct WaiterGuard<'a, T, E> {
    slots: &'a Slots<T, E>,
    key: &'a str,
    generation: u64,
}

impl<T, E> Drop for WaiterGuard<'_, T, E> {
    fn drop(&mut self) {
        let mut slots = lock(self.slots);
        let Some(slot) = slots.get_mut(self.key) else {
            return;
        };
        // A newer slot under the same key belongs to a later flight.
        if slot.generation != self.generation {
            return;
        }
        slot.waiters -= 1;
        if slot.waiters == 0 {
            slots.remove(self.key);
        }
    }
}

impl<T, E> SingleFlight<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `operation` for `key`, or join the execution already in flight.
    ///
    /// `operation` is only called by the caller that creates the slot.
    ///
    /// # Errors
    ///
    /// Returns the flight's failure, shared by every waiter:
    /// [`FlightError::Failed`] with the operation's error, or
    /// [`FlightError::Panicked`] if it panicked.
    pub async fn execute<F, Fut>(&self, key: &str, operation: F) -> Result<T, FlightError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let (flight, generation) = {
            let mut slots = lock(&self.slots);
            if let Some(slot) = slots.get_mut(key) {
                slot.waiters += 1;
                tracing::debug!(key, waiters = slot.waiters, "joined in-flight execution");
                (slot.flight.clone(), slot.generation)
            } else {
                let generation = self.generation.fetch_add(1, Ordering::Relaxed);
                let flight = AssertUnwindSafe(operation())
                    .catch_unwind()
                    .map(|outcome| match outcome {
                        Ok(Ok(value)) => Ok(value),
                        Ok(Err(error)) => Err(FlightError::Failed(error)),
                        Err(payload) => Err(FlightError::Panicked(panic_message(payload.as_ref()))),
                    })
                    .boxed()
                    .shared();
                slots.insert(
                    key.to_string(),
                    Slot {
                        generation,
                        waiters: 1,
                        flight: flight.clone(),
                    },
                );
                (flight, generation)
            }
        };

        let _guard = WaiterGuard {
            slots: &self.slots,
            key,
            generation,
        };
        flight.await
    }

    /// Number of keys with an execution in flight.
    pub fn in_flight(&self) -> usize {
        lock(&self.slots).len()
    }

    /// Detach every slot whose key satisfies `matches`. Callers already
    /// waiting keep their execution; the next caller for that key starts a
    /// new one. Returns the number of slots detached.
    pub fn detach(&self, matches: impl Fn(&str) -> bool) -> usize {
        let mut slots = lock(&self.slots);
        let before = slots.len();
        slots.retain(|key, _| !matches(key));
        before - slots.len()
    }
}
