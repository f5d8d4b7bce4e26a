// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Open/close transitions, exclusivity, and state projection.

use std::time::Duration;

use perch_dom::{Document, ElementId};
use perch_position::Computed;
use tracing::{debug, warn};

use crate::anchor;
use crate::config::{attrs, classes};
use crate::error::{PopoverError, Result};
use crate::listeners::{EventType, Handler, Scope};
use crate::portal::ensure_portal;
use crate::registry::{DismissalHandlers, PopoverId};
use crate::system::{Popovers, Task};

impl Popovers {
    /// Open popover `id`, closing any other open popover immediately first.
    ///
    /// No-op if it is already open, unknown, or the positioning engine is not ready.
    pub fn open(&mut self, doc: &mut Document, id: &str) {
        self.open_from(doc, id, None);
    }

    /// Close popover `id`.
    ///
    /// With `immediate` the content is hidden now and no hide timer remains;
    /// otherwise the exit animation plays and the content is hidden once it
    /// ends, unless the popover was reopened in the meantime. Calling this on a
    /// closed popover only cuts a running exit animation short (when `immediate`).
    pub fn close(&mut self, doc: &mut Document, id: &str, immediate: bool) {
        let exit = self.options.exit_animation();
        let Some(state) = self.registry.get_mut(id) else {
            debug!(popover = id, "close ignored: unknown popover");
            return;
        };
        let content = state.content;

        if !state.is_open {
            if immediate {
                if let Some(hide) = state.hide_timer.take() {
                    self.timers.cancel(hide);
                    hide_content(doc, content);
                }
            }
            return;
        }

        if let Some(handle) = state.update_handle.take() {
            self.auto_update.cancel(handle);
        }
        let dismissal = core::mem::take(&mut state.dismissal);
        for handle in [dismissal.click_away, dismissal.escape].into_iter().flatten() {
            self.listeners.remove(handle);
        }
        let pending = [
            dismissal.arm,
            state.hover_timers.enter.take(),
            state.hover_timers.leave.take(),
            state.enter_animation.take(),
            state.hide_timer.take(),
        ];
        for timer in pending.into_iter().flatten() {
            self.timers.cancel(timer);
        }
        state.is_open = false;

        if immediate {
            hide_content(doc, content);
        } else {
            doc.remove_class(content, classes::ANIMATE_IN);
            doc.add_class(content, classes::ANIMATE_OUT);
            state.hide_timer = Some(self.timers.schedule(
                exit,
                Task::HideContent {
                    popover: PopoverId::from(id),
                },
            ));
        }
        self.project(doc, id);
        debug!(popover = id, immediate, "popover closed");
    }

    /// Close popover `id` if it is open, otherwise open it.
    pub fn toggle(&mut self, doc: &mut Document, id: &str) {
        if self.is_open(id) {
            self.close(doc, id, false);
        } else {
            self.open(doc, id);
        }
    }

    pub(crate) fn open_from(&mut self, doc: &mut Document, id: &str, trigger: Option<ElementId>) {
        if let Err(err) = self.try_open(doc, id, trigger) {
            debug!(popover = id, %err, "open skipped");
        }
    }

    pub(crate) fn toggle_from(&mut self, doc: &mut Document, id: &str, trigger: ElementId) {
        if self.is_open(id) {
            self.close(doc, id, false);
        } else {
            self.open_from(doc, id, Some(trigger));
        }
    }

    fn try_open(&mut self, doc: &mut Document, id: &str, trigger: Option<ElementId>) -> Result<()> {
        if self.engine.is_none() {
            return Err(PopoverError::EngineNotReady);
        }
        let state = self
            .registry
            .get(id)
            .ok_or_else(|| PopoverError::ContentNotFound(id.to_owned()))?;
        if state.is_open {
            return Ok(());
        }
        let content = state.content;
        if !doc.is_alive(content) {
            return Err(PopoverError::ContentNotFound(id.to_owned()));
        }

        for other in self.registry.open_ids() {
            if other.as_str() != id {
                self.close(doc, other.as_str(), true);
            }
        }

        let popover = PopoverId::from(id);
        let portal = ensure_portal(doc, &mut self.portal, self.options.portal_z_index);
        if doc.parent(content) != Some(portal) {
            doc.append_child(portal, content);
        }

        doc.set_style(content, "display", "block");
        doc.remove_class(content, classes::ANIMATE_OUT);
        doc.add_class(content, classes::ANIMATE_IN);
        let enter = self.timers.schedule(
            self.options.enter_animation(),
            Task::EnterAnimationDone {
                popover: popover.clone(),
            },
        );

        let state = self
            .registry
            .get_mut(id)
            .ok_or_else(|| PopoverError::ContentNotFound(id.to_owned()))?;
        if let Some(trigger) = trigger {
            state.trigger = trigger;
        }
        let stale = [
            state.hover_timers.enter.take(),
            state.hover_timers.leave.take(),
            state.hide_timer.take(),
            state.enter_animation.replace(enter),
        ];
        for timer in stale.into_iter().flatten() {
            self.timers.cancel(timer);
        }
        let config = state.config.clone();

        if let Err(err) = self.reposition(doc, id) {
            warn!(popover = id, %err, "keeping last position");
        }

        let update_handle = self.auto_update.subscribe(popover.clone());

        let escape = config.dismiss_on_escape.then(|| {
            self.listeners.add(
                Scope::Document,
                EventType::KeyDown,
                Handler::Escape {
                    popover: popover.clone(),
                },
            )
        });
        let arm = config.dismiss_on_click_away.then(|| {
            self.timers.schedule(
                Duration::ZERO,
                Task::ArmClickAway {
                    popover: popover.clone(),
                },
            )
        });

        let state = self
            .registry
            .get_mut(id)
            .ok_or_else(|| PopoverError::ContentNotFound(id.to_owned()))?;
        state.update_handle = Some(update_handle);
        state.dismissal = DismissalHandlers {
            click_away: None,
            escape,
            arm,
        };
        state.is_open = true;
        self.project(doc, id);
        debug!(popover = id, "popover opened");
        Ok(())
    }

    pub(crate) fn reposition(&self, doc: &mut Document, id: &str) -> Result<Computed> {
        let engine = self.engine.as_deref().ok_or(PopoverError::EngineNotReady)?;
        let state = self
            .registry
            .get(id)
            .ok_or_else(|| PopoverError::ContentNotFound(id.to_owned()))?;
        anchor::place(
            doc,
            engine,
            state.trigger,
            state.content,
            &state.config,
            &self.options,
        )
        .map_err(|source| PopoverError::Position {
            popover: id.to_owned(),
            source,
        })
    }

    /// Mirror the open flag onto the content and every trigger naming `id`.
    pub(crate) fn project(&self, doc: &mut Document, id: &str) {
        let Some(state) = self.registry.get(id) else {
            return;
        };
        let value = if state.is_open { "true" } else { "false" };
        doc.set_attribute(state.content, attrs::OPEN, value);
        let body = doc.body();
        let triggers = doc.query(body, |d, e| d.attribute(e, attrs::TRIGGER) == Some(id));
        for trigger in triggers {
            doc.set_attribute(trigger, attrs::OPEN, value);
        }
    }

    pub(crate) fn cancel_hover_timers(&mut self, id: &str) {
        if let Some(state) = self.registry.get_mut(id) {
            let timers = core::mem::take(&mut state.hover_timers);
            for timer in [timers.enter, timers.leave].into_iter().flatten() {
                self.timers.cancel(timer);
            }
        }
    }
}

pub(crate) fn hide_content(doc: &mut Document, content: ElementId) {
    doc.set_style(content, "display", "none");
    doc.remove_class(content, classes::ANIMATE_IN);
    doc.remove_class(content, classes::ANIMATE_OUT);
}
