//! Repeating interval timers.
//!
//! The column drag protocol auto-scrolls on a fixed interval while the pointer
//! rests near a horizontal edge. The engine never sleeps or spawns threads: it
//! asks an [`IntervalTimer`] to start and stop a repeating timer and the host
//! calls back into the engine whenever that timer fires.
//!
//! Hosts that already own a timer facility implement [`IntervalTimer`] over
//! it. Hosts without one can use [`TimerManager`] and pump it with
//! [`TimerManager::fire_due`] from their event loop.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

use slotmap::{new_key_type, SlotMap};

use crate::error::{Result, TimerError};
use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a timer.
    pub struct TimerId;
}

/// A host-owned source of repeating timers.
pub trait IntervalTimer {
    /// Start a repeating timer. The first fire occurs after `interval`.
    fn start_repeating(&mut self, interval: Duration) -> Result<TimerId>;

    /// Stop a timer. Fails with [`TimerError::InvalidTimerId`] if it is not running.
    fn stop(&mut self, id: TimerId) -> Result<()>;

    /// Check if a timer is currently running.
    fn is_active(&self, id: TimerId) -> bool;
}

/// Internal timer data.
#[derive(Debug)]
struct TimerData {
    /// When this timer should next fire.
    next_fire: Instant,
    /// The repeat interval.
    interval: Duration,
}

/// An entry in the timer queue (min-heap by fire time).
#[derive(Debug, Clone, Copy)]
struct TimerQueueEntry {
    id: TimerId,
    fire_time: Instant,
}

impl PartialEq for TimerQueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.fire_time == other.fire_time
    }
}

impl Eq for TimerQueueEntry {}

impl PartialOrd for TimerQueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerQueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap (BinaryHeap is max-heap by default).
        other.fire_time.cmp(&self.fire_time)
    }
}

/// In-process repeating timer queue.
#[derive(Debug, Default)]
pub struct TimerManager {
    /// All running timers.
    timers: SlotMap<TimerId, TimerData>,
    /// Priority queue of pending fires. Entries of stopped timers are skipped lazily.
    queue: BinaryHeap<TimerQueueEntry>,
}

impl TimerManager {
    /// Create a new timer manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a repeating timer relative to an explicit clock reading.
    pub fn start_repeating_at(&mut self, now: Instant, interval: Duration) -> Result<TimerId> {
        if interval.is_zero() {
            return Err(TimerError::ZeroInterval.into());
        }

        let next_fire = now + interval;
        let id = self.timers.insert(TimerData {
            next_fire,
            interval,
        });
        self.queue.push(TimerQueueEntry {
            id,
            fire_time: next_fire,
        });

        tracing::trace!(target: targets::TIMER, ?id, ?interval, "timer started");
        Ok(id)
    }

    /// Get the duration from `now` until the next timer fires, if any.
    pub fn time_until_next(&mut self, now: Instant) -> Option<Duration> {
        self.discard_stopped();
        self.queue
            .peek()
            .map(|entry| entry.fire_time.saturating_duration_since(now))
    }

    /// Collect every timer due at `now` and reschedule it one interval later.
    ///
    /// A timer that missed several periods fires once.
    #[tracing::instrument(skip(self), target = "lattice_grid_core::timer", level = "trace")]
    pub fn fire_due(&mut self, now: Instant) -> Vec<TimerId> {
        let mut fired = Vec::new();

        while let Some(entry) = self.queue.peek().copied() {
            if entry.fire_time > now {
                break;
            }
            self.queue.pop();

            let Some(timer) = self.timers.get_mut(entry.id) else {
                continue;
            };
            // A stale entry left behind by an earlier reschedule.
            if timer.next_fire != entry.fire_time {
                continue;
            }

            tracing::trace!(target: targets::TIMER, id = ?entry.id, "timer fired");
            fired.push(entry.id);

            timer.next_fire = now + timer.interval;
            self.queue.push(TimerQueueEntry {
                id: entry.id,
                fire_time: timer.next_fire,
            });
        }

        fired
    }

    /// Get the number of running timers.
    pub fn active_count(&self) -> usize {
        self.timers.len()
    }

    fn discard_stopped(&mut self) {
        while let Some(entry) = self.queue.peek() {
            match self.timers.get(entry.id) {
                Some(timer) if timer.next_fire == entry.fire_time => break,
                _ => {
                    self.queue.pop();
                }
            }
        }
    }
}

impl IntervalTimer for TimerManager {
    fn start_repeating(&mut self, interval: Duration) -> Result<TimerId> {
        self.start_repeating_at(Instant::now(), interval)
    }

    fn stop(&mut self, id: TimerId) -> Result<()> {
        match self.timers.remove(id) {
            Some(_) => {
                tracing::trace!(target: targets::TIMER, ?id, "timer stopped");
                Ok(())
            }
            None => Err(TimerError::InvalidTimerId.into()),
        }
    }

    fn is_active(&self, id: TimerId) -> bool {
        self.timers.contains_key(id)
    }
}

static_assertions::assert_impl_all!(TimerManager: Send, Sync);
