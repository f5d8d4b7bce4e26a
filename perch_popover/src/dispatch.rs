// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Input entry points: event dispatch through the listener table, and timer delivery.

use std::time::Duration;

use kurbo::Point;
use perch_dom::{Document, ElementId, HoverKind, Key, PointerTransition};
use tracing::warn;

use crate::config::classes;
use crate::lifecycle::hide_content;
use crate::listeners::{EventType, Handler, Scope};
use crate::registry::PopoverId;
use crate::system::{Popovers, Task};
use crate::timers::TimerId;

/// Whether propagation continues after a handler.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Outcome {
    Continue,
    Stop,
}

/// Event payload handed to handlers.
#[derive(Copy, Clone, Debug)]
enum Event {
    Click { target: ElementId },
    Pointer { related: Option<ElementId> },
    Key(Key),
}

impl Popovers {
    /// Deliver a click on `target`.
    ///
    /// The click bubbles from `target` to the body; a click trigger stops it
    /// there. Otherwise document-level listeners (outside-click dismissal) run.
    /// Returns `true` if a popover trigger consumed the click.
    pub fn click(&mut self, doc: &mut Document, target: ElementId) -> bool {
        self.flush(doc);
        if !doc.is_connected(target) {
            return false;
        }
        let event = Event::Click { target };
        let mut stopped = false;
        for element in doc.path_to_root(target).into_iter().rev() {
            for (handle, handler) in self.listeners.matching(Scope::Element(element), EventType::Click) {
                if self.listeners.contains(handle) && self.handle(doc, handler, event) == Outcome::Stop {
                    stopped = true;
                }
            }
            if stopped {
                return true;
            }
        }
        self.dispatch_document(doc, EventType::Click, event);
        false
    }

    /// Deliver a pointer move to page point `pt`.
    pub fn pointer_move(&mut self, doc: &mut Document, pt: Point) {
        self.flush(doc);
        let transitions = self.pointer.pointer_move(doc, pt);
        self.deliver_hover(doc, transitions);
    }

    /// The pointer left the page.
    pub fn pointer_exit(&mut self, doc: &mut Document) {
        self.flush(doc);
        let transitions = self.pointer.pointer_exit();
        self.deliver_hover(doc, transitions);
    }

    /// Deliver a key press to document-level listeners.
    pub fn key_down(&mut self, doc: &mut Document, key: Key) {
        self.flush(doc);
        self.dispatch_document(doc, EventType::KeyDown, Event::Key(key));
    }

    /// Move the engine clock forward by `elapsed`, running every task that falls due.
    ///
    /// Tasks scheduled by a running task are timed from its due instant, so one
    /// long step behaves like many short ones.
    pub fn advance(&mut self, doc: &mut Document, elapsed: Duration) {
        let until = self.timers.now() + elapsed;
        while let Some((id, task)) = self.timers.pop_due(until) {
            self.run_task(doc, id, task);
        }
        self.timers.set_now(until);
    }

    /// Run tasks that are already due without moving the clock.
    pub fn flush(&mut self, doc: &mut Document) {
        self.advance(doc, Duration::ZERO);
    }

    /// Reposition every open popover. Returns how many were placed.
    pub fn animation_frame(&mut self, doc: &mut Document) -> usize {
        let subscribed: Vec<PopoverId> = self
            .auto_update
            .active()
            .map(|(_, id)| id.clone())
            .collect();
        let mut placed = 0;
        for id in subscribed {
            match self.reposition(doc, id.as_str()) {
                Ok(_) => placed += 1,
                Err(err) => warn!(popover = %id, %err, "keeping last position"),
            }
        }
        placed
    }

    fn dispatch_document(&mut self, doc: &mut Document, event_type: EventType, event: Event) {
        for (handle, handler) in self.listeners.matching(Scope::Document, event_type) {
            if self.listeners.contains(handle) {
                self.handle(doc, handler, event);
            }
        }
    }

    fn deliver_hover(&mut self, doc: &mut Document, transitions: Vec<PointerTransition>) {
        for t in transitions {
            let event_type = match t.kind {
                HoverKind::Enter => EventType::MouseEnter,
                HoverKind::Leave => EventType::MouseLeave,
            };
            let event = Event::Pointer { related: t.related };
            for (handle, handler) in self.listeners.matching(Scope::Element(t.element), event_type) {
                if self.listeners.contains(handle) {
                    self.handle(doc, handler, event);
                }
            }
        }
    }

    fn handle(&mut self, doc: &mut Document, handler: Handler, event: Event) -> Outcome {
        match handler {
            Handler::Toggle { popover, trigger } => {
                self.toggle_from(doc, popover.as_str(), trigger);
                return Outcome::Stop;
            }
            Handler::TriggerEnter { popover, trigger } => self.hover_enter(popover, trigger),
            Handler::TriggerLeave { popover } => {
                let related = pointer_related(event);
                self.hover_leave(doc, popover, related, HoverSide::Trigger);
            }
            Handler::ContentEnter { popover } => {
                if let Some(state) = self.registry.get_mut(popover.as_str()) {
                    if let Some(leave) = state.hover_timers.leave.take() {
                        self.timers.cancel(leave);
                    }
                }
            }
            Handler::ContentLeave { popover, trigger } => {
                let related = pointer_related(event);
                self.hover_leave(doc, popover, related, HoverSide::Content(trigger));
            }
            Handler::ClickAway { popover } => {
                let Event::Click { target } = event else {
                    return Outcome::Continue;
                };
                let outside = self.registry.get(popover.as_str()).is_some_and(|s| {
                    s.is_open && !doc.contains(s.trigger, target) && !doc.contains(s.content, target)
                });
                if outside {
                    self.close(doc, popover.as_str(), false);
                }
            }
            Handler::Escape { popover } => {
                if matches!(event, Event::Key(Key::Escape)) {
                    self.close(doc, popover.as_str(), false);
                }
            }
        }
        Outcome::Continue
    }

    fn hover_enter(&mut self, popover: PopoverId, trigger: ElementId) {
        let Some(state) = self.registry.get_mut(popover.as_str()) else {
            return;
        };
        let stale = [state.hover_timers.leave.take(), state.hover_timers.enter.take()];
        for timer in stale.into_iter().flatten() {
            self.timers.cancel(timer);
        }
        if state.is_open {
            return;
        }
        let delay = state.config.hover_delay;
        state.hover_timers.enter = Some(self.timers.schedule(delay, Task::HoverOpen { popover, trigger }));
    }

    fn hover_leave(
        &mut self,
        doc: &Document,
        popover: PopoverId,
        related: Option<ElementId>,
        from: HoverSide,
    ) {
        let Some(state) = self.registry.get_mut(popover.as_str()) else {
            return;
        };
        if from == HoverSide::Trigger {
            if let Some(enter) = state.hover_timers.enter.take() {
                self.timers.cancel(enter);
            }
        }
        let other = match from {
            HoverSide::Trigger => state.content,
            HoverSide::Content(trigger) => trigger,
        };
        if related.is_some_and(|r| doc.contains(other, r)) || !state.is_open {
            return;
        }
        if let Some(leave) = state.hover_timers.leave.take() {
            self.timers.cancel(leave);
        }
        let delay = state.config.hover_out_delay;
        state.hover_timers.leave = Some(self.timers.schedule(delay, Task::HoverClose { popover }));
    }

    fn run_task(&mut self, doc: &mut Document, fired: TimerId, task: Task) {
        match task {
            Task::PollEngine { attempt } => self.poll_engine(doc, attempt),
            Task::HoverOpen { popover, trigger } => {
                let due = self
                    .registry
                    .get_mut(popover.as_str())
                    .is_some_and(|s| take_if(&mut s.hover_timers.enter, fired));
                if due {
                    self.open_from(doc, popover.as_str(), Some(trigger));
                }
            }
            Task::HoverClose { popover } => {
                let due = self
                    .registry
                    .get_mut(popover.as_str())
                    .is_some_and(|s| take_if(&mut s.hover_timers.leave, fired));
                if due {
                    self.close(doc, popover.as_str(), false);
                }
            }
            Task::EnterAnimationDone { popover } => {
                if let Some(state) = self.registry.get_mut(popover.as_str()) {
                    if take_if(&mut state.enter_animation, fired) {
                        doc.remove_class(state.content, classes::ANIMATE_IN);
                    }
                }
            }
            Task::HideContent { popover } => {
                if let Some(state) = self.registry.get_mut(popover.as_str()) {
                    if take_if(&mut state.hide_timer, fired) && !state.is_open {
                        hide_content(doc, state.content);
                    }
                }
            }
            Task::ArmClickAway { popover } => {
                if let Some(state) = self.registry.get_mut(popover.as_str()) {
                    if take_if(&mut state.dismissal.arm, fired) && state.is_open {
                        state.dismissal.click_away = Some(self.listeners.add(
                            Scope::Document,
                            EventType::Click,
                            Handler::ClickAway { popover },
                        ));
                    }
                }
            }
        }
    }
}

/// Which half of a hover pair the pointer left.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum HoverSide {
    Trigger,
    Content(ElementId),
}

fn pointer_related(event: Event) -> Option<ElementId> {
    match event {
        Event::Pointer { related } => related,
        _ => None,
    }
}

/// Clear `slot` if it holds the timer that just fired.
fn take_if(slot: &mut Option<TimerId>, fired: TimerId) -> bool {
    if *slot == Some(fired) {
        *slot = None;
        true
    } else {
        false
    }
}
