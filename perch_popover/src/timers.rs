// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One-shot timers on a virtual clock.
//!
//! The host owns real time and feeds elapsed time in; the queue only orders
//! work. Tasks fire in due order, and tasks due at the same instant fire in the
//! order they were scheduled.
//!
//! ```
//! use std::time::Duration;
//! use perch_popover::TimerQueue;
//!
//! let mut q = TimerQueue::new();
//! let slow = q.schedule(Duration::from_millis(200), "close");
//! let _fast = q.schedule(Duration::from_millis(100), "open");
//! assert!(q.cancel(slow).is_some());
//!
//! let until = Duration::from_millis(250);
//! let fired: Vec<_> = std::iter::from_fn(|| q.pop_due(until)).map(|(_, t)| t).collect();
//! assert_eq!(fired, vec!["open"]);
//! ```

use std::collections::BTreeMap;
use std::time::Duration;

/// Handle of a scheduled task, used to cancel it or to recognise it when it fires.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// A queue of delayed tasks.
#[derive(Clone, Debug)]
pub struct TimerQueue<T> {
    now: Duration,
    next: u64,
    queue: BTreeMap<(Duration, TimerId), T>,
    due: BTreeMap<TimerId, Duration>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next: 0,
            queue: BTreeMap::new(),
            due: BTreeMap::new(),
        }
    }
}

impl<T> TimerQueue<T> {
    /// Create an empty queue at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Run `task` once `delay` has elapsed.
    pub fn schedule(&mut self, delay: Duration, task: T) -> TimerId {
        self.next += 1;
        let id = TimerId(self.next);
        let at = self.now + delay;
        self.queue.insert((at, id), task);
        self.due.insert(id, at);
        id
    }

    /// Cancel a pending task and return it. Cancelling a fired or unknown timer returns `None`.
    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        let at = self.due.remove(&id)?;
        self.queue.remove(&(at, id))
    }

    /// Whether `id` is still waiting to fire.
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.due.contains_key(&id)
    }

    /// Number of pending tasks.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Remove the earliest task due at or before `until`, moving the clock to its due time.
    pub fn pop_due(&mut self, until: Duration) -> Option<(TimerId, T)> {
        let (&(at, id), _) = self.queue.first_key_value()?;
        if at > until {
            return None;
        }
        let task = self.queue.remove(&(at, id))?;
        self.due.remove(&id);
        self.now = self.now.max(at);
        Some((id, task))
    }

    /// Move the clock forward to `until` (never backwards).
    pub fn set_now(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }
}
