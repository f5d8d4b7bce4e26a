// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Continuous re-computation subscriptions.
//!
//! The host's frame/resize/scroll driver walks [`AutoUpdate::active`] and
//! recomputes each subscribed floating element. Subscribing returns an
//! [`UpdateHandle`]; cancelling it stops further updates for that element.

use std::collections::BTreeMap;

/// Cancellation token for one continuous-update subscription.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UpdateHandle(u64);

/// Registry of continuous-update subscriptions keyed by an opaque handle.
#[derive(Clone, Debug)]
pub struct AutoUpdate<K> {
    next: u64,
    subscriptions: BTreeMap<UpdateHandle, K>,
}

impl<K> Default for AutoUpdate<K> {
    fn default() -> Self {
        Self {
            next: 0,
            subscriptions: BTreeMap::new(),
        }
    }
}

impl<K> AutoUpdate<K> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start updating `key` on every frame.
    pub fn subscribe(&mut self, key: K) -> UpdateHandle {
        self.next += 1;
        let handle = UpdateHandle(self.next);
        self.subscriptions.insert(handle, key);
        handle
    }

    /// Stop a subscription, returning its key if it was still active.
    pub fn cancel(&mut self, handle: UpdateHandle) -> Option<K> {
        self.subscriptions.remove(&handle)
    }

    /// Whether `handle` is still subscribed.
    pub fn is_active(&self, handle: UpdateHandle) -> bool {
        self.subscriptions.contains_key(&handle)
    }

    /// Active subscriptions in subscription order.
    pub fn active(&self) -> impl Iterator<Item = (UpdateHandle, &K)> + '_ {
        self.subscriptions.iter().map(|(h, k)| (*h, k))
    }

    /// Number of active subscriptions.
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Whether there are no active subscriptions.
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_is_single_shot() {
        let mut au = AutoUpdate::new();
        let a = au.subscribe("a");
        let b = au.subscribe("b");
        assert_ne!(a, b);
        assert_eq!(au.cancel(a), Some("a"));
        assert_eq!(au.cancel(a), None);
        assert!(!au.is_active(a));
        assert!(au.is_active(b));
        assert_eq!(au.active().map(|(_, k)| *k).collect::<Vec<_>>(), vec!["b"]);
    }
}
