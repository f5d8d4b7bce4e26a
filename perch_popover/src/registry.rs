// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Popover identifiers, per-popover state, and the registry that owns them.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

use perch_dom::ElementId;
use perch_position::UpdateHandle;

use crate::config::PopoverConfig;
use crate::listeners::ListenerHandle;
use crate::timers::TimerId;

/// Identifier of a popover: the `id` of its content element.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PopoverId(String);

impl PopoverId {
    /// The identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PopoverId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for PopoverId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for PopoverId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PopoverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle phase of a popover.
///
/// `Opening` and `Closing` are the steady states with an animation class still applied.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Hidden.
    Closed,
    /// Open, enter animation running.
    Opening,
    /// Open.
    Open,
    /// Closed, exit animation running; content still visible.
    Closing,
}

/// Pending hover-intent timers. At most one of each kind.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct HoverTimers {
    /// Scheduled open.
    pub enter: Option<TimerId>,
    /// Scheduled close.
    pub leave: Option<TimerId>,
}

/// Document-level listeners installed while a popover is open.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DismissalHandlers {
    /// Outside-click listener, once armed.
    pub click_away: Option<ListenerHandle>,
    /// Escape listener.
    pub escape: Option<ListenerHandle>,
    /// Timer that arms the outside-click listener on the next tick.
    pub arm: Option<TimerId>,
}

impl DismissalHandlers {
    /// Whether nothing is installed or pending.
    pub fn is_empty(&self) -> bool {
        self.click_away.is_none() && self.escape.is_none() && self.arm.is_none()
    }
}

/// Mutable state of one popover.
#[derive(Clone, Debug)]
pub struct PopoverState {
    pub(crate) trigger: ElementId,
    pub(crate) content: ElementId,
    pub(crate) config: PopoverConfig,
    pub(crate) is_open: bool,
    pub(crate) update_handle: Option<UpdateHandle>,
    pub(crate) hover_timers: HoverTimers,
    pub(crate) dismissal: DismissalHandlers,
    pub(crate) enter_animation: Option<TimerId>,
    pub(crate) hide_timer: Option<TimerId>,
}

impl PopoverState {
    pub(crate) fn new(trigger: ElementId, content: ElementId, config: PopoverConfig) -> Self {
        Self {
            trigger,
            content,
            config,
            is_open: false,
            update_handle: None,
            hover_timers: HoverTimers::default(),
            dismissal: DismissalHandlers::default(),
            enter_animation: None,
            hide_timer: None,
        }
    }

    /// The trigger that last opened (or bound) this popover.
    pub fn trigger(&self) -> ElementId {
        self.trigger
    }

    /// The content element.
    pub fn content(&self) -> ElementId {
        self.content
    }

    /// Configuration parsed at bind time.
    pub fn config(&self) -> &PopoverConfig {
        &self.config
    }

    /// Whether the popover is open.
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// Continuous-update subscription; present exactly while open.
    pub fn update_handle(&self) -> Option<UpdateHandle> {
        self.update_handle
    }

    /// Pending hover-intent timers.
    pub fn hover_timers(&self) -> HoverTimers {
        self.hover_timers
    }

    /// Installed dismissal listeners.
    pub fn dismissal(&self) -> DismissalHandlers {
        self.dismissal
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        match (self.is_open, self.enter_animation, self.hide_timer) {
            (true, Some(_), _) => Phase::Opening,
            (true, None, _) => Phase::Open,
            (false, _, Some(_)) => Phase::Closing,
            (false, _, None) => Phase::Closed,
        }
    }
}

/// Map from popover identifier to state.
///
/// Entries are created on first bind and persist across cleanup so a later
/// bind can reattach; only [`Popovers::dispose`](crate::Popovers::dispose)
/// removes them.
#[derive(Clone, Debug, Default)]
pub struct PopoverRegistry {
    states: BTreeMap<PopoverId, PopoverState>,
}

impl PopoverRegistry {
    /// State for `id`.
    pub fn get(&self, id: &str) -> Option<&PopoverState> {
        self.states.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut PopoverState> {
        self.states.get_mut(id)
    }

    pub(crate) fn insert(&mut self, id: PopoverId, state: PopoverState) {
        self.states.insert(id, state);
    }

    pub(crate) fn remove(&mut self, id: &str) -> Option<PopoverState> {
        self.states.remove(id)
    }

    /// Whether a state exists for `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.states.contains_key(id)
    }

    /// Identifiers of every open popover.
    pub fn open_ids(&self) -> Vec<PopoverId> {
        self.states
            .iter()
            .filter(|(_, s)| s.is_open)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Number of registered popovers.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether no popover is registered.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// All states in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&PopoverId, &PopoverState)> + '_ {
        self.states.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Rect;
    use perch_dom::{Document, ElementData};

    #[test]
    fn phase_follows_flags_and_timers() {
        let mut doc = Document::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        let body = doc.body();
        let el = doc.insert(Some(body), ElementData::default());
        let mut timers = crate::timers::TimerQueue::new();
        let mut s = PopoverState::new(el, el, PopoverConfig::default());
        assert_eq!(s.phase(), Phase::Closed);
        s.is_open = true;
        s.enter_animation = Some(timers.schedule(std::time::Duration::ZERO, ()));
        assert_eq!(s.phase(), Phase::Opening);
        s.enter_animation = None;
        assert_eq!(s.phase(), Phase::Open);
        s.is_open = false;
        s.hide_timer = Some(timers.schedule(std::time::Duration::ZERO, ()));
        assert_eq!(s.phase(), Phase::Closing);
    }

    #[test]
    fn lookup_by_str_and_open_ids() {
        let mut doc = Document::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        let el = doc.insert(Some(doc.body()), ElementData::default());
        let mut reg = PopoverRegistry::default();
        reg.insert("a".into(), PopoverState::new(el, el, PopoverConfig::default()));
        reg.insert("b".into(), PopoverState::new(el, el, PopoverConfig::default()));
        assert!(reg.contains("a"));
        if let Some(s) = reg.get_mut("b") {
            s.is_open = true;
        }
        assert_eq!(reg.open_ids(), vec![PopoverId::from("b")]);
        assert!(reg.remove("a").is_some());
        assert_eq!(reg.len(), 1);
    }
}
