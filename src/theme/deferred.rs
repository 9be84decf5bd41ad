//! Work scheduled for later against a specific render generation
//!
//! A task only runs if the surface it was scheduled for is still on screen.
//! Once the surface is rebuilt its generation moves on and older tasks are
//! dropped when they come due.

use std::fmt::Debug;
use std::time::Instant;

use log::debug;

#[derive(Debug)]
struct Pending<T> {
    due: Instant,
    generation: u64,
    task: T,
}

#[derive(Debug)]
pub struct DeferredQueue<T> {
    pending: Vec<Pending<T>>,
}

impl<T> Default for DeferredQueue<T> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
        }
    }
}

impl<T: Debug> DeferredQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, task: T, generation: u64, due: Instant) {
        self.pending.push(Pending {
            due,
            generation,
            task,
        });
    }

    /// Remove and return every task due at `now` that belongs to
    /// `current_generation`, in scheduling order.
    pub fn take_due(&mut self, now: Instant, current_generation: u64) -> Vec<T> {
        let (due, waiting): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|p| p.due <= now);
        self.pending = waiting;

        due.into_iter()
            .filter_map(|p| {
                if p.generation == current_generation {
                    Some(p.task)
                } else {
                    debug!(
                        "dropping stale deferred task {:?} (generation {} != {})",
                        p.task, p.generation, current_generation
                    );
                    None
                }
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
