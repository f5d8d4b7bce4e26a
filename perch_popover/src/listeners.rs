// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Listener table: every attached handler is a row addressed by a [`ListenerHandle`].
//!
//! Handlers are plain data naming the popover they act on; the dispatcher in
//! [`Popovers`](crate::Popovers) interprets them. Removing a handle is the only
//! way to detach a listener, so whoever attached it must keep the handle.

use std::collections::BTreeMap;

use perch_dom::ElementId;

use crate::registry::PopoverId;

/// Handle returned when a listener is attached.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerHandle(u64);

/// Where a listener is attached.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Scope {
    /// On one element.
    Element(ElementId),
    /// On the document.
    Document,
}

/// Event kinds the engine listens for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventType {
    /// Pointer click (bubbles).
    Click,
    /// Pointer entered the element (does not bubble).
    MouseEnter,
    /// Pointer left the element (does not bubble).
    MouseLeave,
    /// Key pressed.
    KeyDown,
}

/// What a listener does when it fires.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Handler {
    /// Click trigger: toggle and stop propagation.
    Toggle {
        popover: PopoverId,
        trigger: ElementId,
    },
    /// Hover trigger entered: schedule an open.
    TriggerEnter {
        popover: PopoverId,
        trigger: ElementId,
    },
    /// Hover trigger left: cancel a pending open, schedule a close.
    TriggerLeave { popover: PopoverId },
    /// Pointer reached hover content: cancel a pending close.
    ContentEnter { popover: PopoverId },
    /// Pointer left hover content: schedule a close.
    ContentLeave {
        popover: PopoverId,
        trigger: ElementId,
    },
    /// Document click while open.
    ClickAway { popover: PopoverId },
    /// Document keydown while open.
    Escape { popover: PopoverId },
}

#[derive(Clone, Debug)]
struct Listener {
    scope: Scope,
    event: EventType,
    handler: Handler,
}

/// All attached listeners, in attachment order.
#[derive(Clone, Debug, Default)]
pub(crate) struct ListenerTable {
    next: u64,
    rows: BTreeMap<ListenerHandle, Listener>,
}

impl ListenerTable {
    pub(crate) fn add(&mut self, scope: Scope, event: EventType, handler: Handler) -> ListenerHandle {
        self.next += 1;
        let handle = ListenerHandle(self.next);
        self.rows.insert(
            handle,
            Listener {
                scope,
                event,
                handler,
            },
        );
        handle
    }

    /// Detach a listener. Returns `false` if it was already gone.
    pub(crate) fn remove(&mut self, handle: ListenerHandle) -> bool {
        self.rows.remove(&handle).is_some()
    }

    pub(crate) fn contains(&self, handle: ListenerHandle) -> bool {
        self.rows.contains_key(&handle)
    }

    /// Snapshot of the listeners for `scope` and `event`.
    ///
    /// Dispatch works on the snapshot and re-checks [`ListenerTable::contains`]
    /// before each call, since a handler may detach later rows.
    pub(crate) fn matching(&self, scope: Scope, event: EventType) -> Vec<(ListenerHandle, Handler)> {
        self.rows
            .iter()
            .filter(|(_, l)| l.scope == scope && l.event == event)
            .map(|(h, l)| (*h, l.handler.clone()))
            .collect()
    }

    /// Number of listeners attached at `scope`.
    pub(crate) fn count_at(&self, scope: Scope) -> usize {
        self.rows.values().filter(|l| l.scope == scope).count()
    }

    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn escape(id: &str) -> Handler {
        Handler::Escape {
            popover: PopoverId::from(id),
        }
    }

    #[test]
    fn matching_filters_by_scope_and_event() {
        let mut t = ListenerTable::default();
        let a = t.add(Scope::Document, EventType::KeyDown, escape("a"));
        let _click = t.add(
            Scope::Document,
            EventType::Click,
            Handler::ClickAway {
                popover: PopoverId::from("a"),
            },
        );
        let b = t.add(Scope::Document, EventType::KeyDown, escape("b"));

        let keys: Vec<_> = t
            .matching(Scope::Document, EventType::KeyDown)
            .into_iter()
            .map(|(h, _)| h)
            .collect();
        assert_eq!(keys, vec![a, b], "attachment order is preserved");
        assert_eq!(t.count_at(Scope::Document), 3);
    }

    #[test]
    fn remove_is_single_shot() {
        let mut t = ListenerTable::default();
        let h = t.add(Scope::Document, EventType::KeyDown, escape("a"));
        assert!(t.contains(h));
        assert!(t.remove(h));
        assert!(!t.remove(h));
        assert_eq!(t.len(), 0);
    }
}
