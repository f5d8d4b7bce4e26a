// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Modal dialogs: at most one open at a time, with an animated close.
//!
//! A modal root carries `data-modal` and an `id`; its dialog box carries
//! `data-modal-content`. Buttons naming the modal in `data-modal-trigger`
//! toggle it, and `data-modal-close` elements inside it close it. While a
//! modal is open the body does not scroll, Escape closes it, and so does a
//! click outside its content, unless the modal opts out.

use std::collections::BTreeMap;
use std::time::Duration;

use perch_dom::{Document, ElementFlags, ElementId, ID_ATTR, Key};
use perch_popover::{TimerId, TimerQueue};
use tracing::debug;

use crate::markup;

/// Attribute names used by modals.
pub mod attrs {
    /// On the modal root.
    pub const ROOT: &str = "data-modal";
    /// On the dialog box inside the root.
    pub const CONTENT: &str = "data-modal-content";
    /// On a button: `id` of the modal it toggles.
    pub const TRIGGER: &str = "data-modal-trigger";
    /// On an element inside the modal that closes it.
    pub const CLOSE: &str = "data-modal-close";
    /// On the root: open as soon as it is bound.
    pub const INITIAL_OPEN: &str = "data-modal-initial-open";
    /// On the root: `"true"` ignores Escape.
    pub const DISABLE_ESC: &str = "data-modal-disable-esc";
    /// On the root: `"true"` ignores outside clicks.
    pub const DISABLE_CLICK_AWAY: &str = "data-modal-disable-click-away";
    /// Projected on the root: `"true"` or `"false"`.
    pub const OPEN: &str = "data-modal-open";
    /// Projected on every trigger of the modal: `"true"` or `"false"`.
    pub const TRIGGER_OPEN: &str = "data-modal-trigger-open";
    /// Set on the root once bound.
    pub const INITIALIZED: &str = "data-modal-initialized";
}

/// Class names toggled for the open and closed looks.
pub mod classes {
    /// Root and content while open.
    pub const VISIBLE: &str = "opacity-100";
    /// Root and content while closed.
    pub const HIDDEN: &str = "opacity-0";
    /// Content while open.
    pub const SCALE_IN: &str = "scale-100";
    /// Content while closed.
    pub const SCALE_OUT: &str = "scale-95";
    /// A trigger carrying this class is treated as disabled.
    pub const DISABLED_TRIGGER: &str = "opacity-50";
}

/// How long a closing modal stays displayed for its exit animation.
pub const HIDE_DELAY: Duration = Duration::from_millis(300);

#[derive(Clone, Debug)]
struct ModalState {
    root: ElementId,
    content: ElementId,
    is_open: bool,
    hide_timer: Option<TimerId>,
}

/// All bound modals of a document.
#[derive(Clone, Debug, Default)]
pub struct Modals {
    modals: BTreeMap<String, ModalState>,
    open: Option<String>,
    timers: TimerQueue<String>,
}

impl Modals {
    /// No modals bound yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind every modal under `root` (inclusive) not yet initialised. Returns
    /// how many were bound.
    ///
    /// Roots without an `id` or without content are skipped.
    pub fn init(&mut self, doc: &mut Document, root: ElementId) -> usize {
        let roots = doc.query(root, |d, e| {
            d.has_attribute(e, attrs::ROOT) && !d.has_attribute(e, attrs::INITIALIZED)
        });
        let mut bound = 0;
        for el in roots {
            doc.set_attribute(el, attrs::INITIALIZED, "true");
            let id = doc.attribute(el, ID_ATTR).unwrap_or("").to_owned();
            let content = markup::find_attr(doc, el, attrs::CONTENT);
            let Some(content) = content.filter(|_| !id.is_empty()) else {
                debug!(root = ?el, "skipping modal without id or content");
                continue;
            };
            self.modals.insert(
                id.clone(),
                ModalState {
                    root: el,
                    content,
                    is_open: false,
                    hide_timer: None,
                },
            );
            bound += 1;
            if doc.has_attribute(el, attrs::INITIAL_OPEN) {
                self.open(doc, &id);
            } else {
                self.set_state(doc, &id, false);
                doc.set_style(el, "display", "none");
            }
        }
        bound
    }

    /// Whether modal `id` is open.
    pub fn is_open(&self, id: &str) -> bool {
        self.modals.get(id).is_some_and(|m| m.is_open)
    }

    /// Identifier of the open modal, if any.
    pub fn open_modal(&self) -> Option<&str> {
        self.open.as_deref()
    }

    /// Pending hide timers.
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Open modal `id`, closing any other open modal immediately.
    pub fn open(&mut self, doc: &mut Document, id: &str) {
        if !self.modals.contains_key(id) {
            debug!(modal = id, "open ignored: unknown modal");
            return;
        }
        if let Some(other) = self.open.clone().filter(|o| o != id) {
            self.close(doc, &other, true);
        }
        let Some(modal) = self.modals.get_mut(id) else {
            return;
        };
        if let Some(hide) = modal.hide_timer.take() {
            self.timers.cancel(hide);
        }
        let (root, content) = (modal.root, modal.content);
        doc.set_style(root, "display", "flex");
        self.set_state(doc, id, true);

        if let Some(first) = first_focusable(doc, content) {
            doc.focus(first);
        }
    }

    /// Close modal `id`.
    ///
    /// Unless `immediate`, the modal stays displayed for [`HIDE_DELAY`] and is
    /// then hidden, provided it was not reopened in the meantime.
    pub fn close(&mut self, doc: &mut Document, id: &str, immediate: bool) {
        let Some(modal) = self.modals.get_mut(id) else {
            return;
        };
        if let Some(hide) = modal.hide_timer.take() {
            self.timers.cancel(hide);
        }
        let root = modal.root;
        self.set_state(doc, id, false);
        if immediate {
            doc.set_style(root, "display", "none");
        } else {
            let timer = self.timers.schedule(HIDE_DELAY, id.to_owned());
            if let Some(modal) = self.modals.get_mut(id) {
                modal.hide_timer = Some(timer);
            }
        }
    }

    /// Open modal `id` if closed, otherwise close it with animation.
    pub fn toggle(&mut self, doc: &mut Document, id: &str) {
        if self.is_open(id) {
            self.close(doc, id, false);
        } else {
            self.open(doc, id);
        }
    }

    /// Deliver a click on `target`. Returns `true` if a modal trigger or close
    /// control consumed it.
    pub fn click(&mut self, doc: &mut Document, target: ElementId) -> bool {
        self.flush(doc);
        if let Some(trigger) = doc.closest(target, attrs::TRIGGER) {
            let disabled =
                doc.has_attribute(trigger, "disabled") || doc.has_class(trigger, classes::DISABLED_TRIGGER);
            if let Some(id) = doc.attribute(trigger, attrs::TRIGGER).map(str::to_owned)
                && !disabled
            {
                self.toggle(doc, &id);
            }
            return true;
        }
        if doc.closest(target, attrs::CLOSE).is_some()
            && let Some(id) = self.owner(doc, target)
        {
            self.close(doc, &id, false);
            return true;
        }
        if let Some(id) = self.open.clone()
            && let Some(modal) = self.modals.get(&id)
            && !markup::flag(doc, modal.root, attrs::DISABLE_CLICK_AWAY)
            && !doc.contains(modal.content, target)
        {
            self.close(doc, &id, false);
        }
        false
    }

    /// Deliver a key press. Escape closes the open modal unless it opts out.
    pub fn key_down(&mut self, doc: &mut Document, key: Key) {
        self.flush(doc);
        if key != Key::Escape {
            return;
        }
        if let Some(id) = self.open.clone()
            && let Some(modal) = self.modals.get(&id)
            && !markup::flag(doc, modal.root, attrs::DISABLE_ESC)
        {
            self.close(doc, &id, false);
        }
    }

    /// Move the clock forward by `elapsed`, hiding modals whose close animation ended.
    pub fn advance(&mut self, doc: &mut Document, elapsed: Duration) {
        let until = self.timers.now() + elapsed;
        while let Some((fired, id)) = self.timers.pop_due(until) {
            if let Some(modal) = self.modals.get_mut(&id)
                && modal.hide_timer == Some(fired)
            {
                modal.hide_timer = None;
                if !modal.is_open {
                    doc.set_style(modal.root, "display", "none");
                }
            }
        }
        self.timers.set_now(until);
    }

    fn flush(&mut self, doc: &mut Document) {
        self.advance(doc, Duration::ZERO);
    }

    /// Identifier of the bound modal whose root contains `el`.
    fn owner(&self, doc: &Document, el: ElementId) -> Option<String> {
        self.modals
            .iter()
            .find(|(_, m)| doc.contains(m.root, el))
            .map(|(id, _)| id.clone())
    }

    fn set_state(&mut self, doc: &mut Document, id: &str, open: bool) {
        let Some(modal) = self.modals.get_mut(id) else {
            return;
        };
        modal.is_open = open;
        let (root, content) = (modal.root, modal.content);
        let flag = if open { "true" } else { "false" };
        doc.set_attribute(root, attrs::OPEN, flag);
        let body = doc.body();
        for trigger in doc.query(body, |d, e| d.attribute(e, attrs::TRIGGER) == Some(id)) {
            doc.set_attribute(trigger, attrs::TRIGGER_OPEN, flag);
        }

        let (on, off) = if open {
            (classes::VISIBLE, classes::HIDDEN)
        } else {
            (classes::HIDDEN, classes::VISIBLE)
        };
        let (scale_on, scale_off) = if open {
            (classes::SCALE_IN, classes::SCALE_OUT)
        } else {
            (classes::SCALE_OUT, classes::SCALE_IN)
        };
        for el in [root, content] {
            doc.remove_class(el, off);
            doc.add_class(el, on);
        }
        doc.remove_class(content, scale_off);
        doc.add_class(content, scale_on);

        if open {
            self.open = Some(id.to_owned());
            doc.set_style(body, "overflow", "hidden");
        } else if self.open.as_deref() == Some(id) {
            self.open = None;
            doc.remove_style(body, "overflow");
        }
    }
}

/// First element under `content` that can take keyboard focus.
fn first_focusable(doc: &Document, content: ElementId) -> Option<ElementId> {
    doc.query(content, |d, e| {
        if e == content {
            return false;
        }
        if let Some(tabindex) = d.attribute(e, "tabindex") {
            return tabindex.trim() != "-1";
        }
        match d.tag(e) {
            Some("button" | "input" | "select" | "textarea") => true,
            Some("a") => d.has_attribute(e, "href"),
            _ => d.flags(e).contains(ElementFlags::FOCUSABLE),
        }
    })
    .into_iter()
    .next()
}
