// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scan-and-bind of trigger elements, and their teardown.

use perch_dom::{Document, ElementId};
use tracing::debug;

use crate::config::{PopoverConfig, TriggerMode, attrs};
use crate::error::{PopoverError, Result};
use crate::listeners::{EventType, Handler, Scope};
use crate::registry::{PopoverId, PopoverState};
use crate::system::{Popovers, TriggerBinding};

impl Popovers {
    /// Bind every unbound trigger under `root` (inclusive). Returns how many were bound.
    ///
    /// Safe to call repeatedly, for example after the host inserts new markup:
    /// triggers already carrying the bind marker are skipped, and triggers whose
    /// content cannot be found are skipped without being marked. Does nothing
    /// until the positioning engine is ready.
    pub fn init(&mut self, doc: &mut Document, root: ElementId) -> usize {
        if self.engine.is_none() {
            debug!(?root, err = %PopoverError::EngineNotReady, "popover init skipped");
            return 0;
        }
        self.prune_dead_bindings(doc);
        let triggers = doc.query(root, |d, e| {
            d.has_attribute(e, attrs::TRIGGER) && !d.has_attribute(e, attrs::BOUND)
        });
        let mut bound = 0;
        for trigger in triggers {
            match self.bind_trigger(doc, trigger) {
                Ok(()) => bound += 1,
                Err(err) => debug!(?trigger, %err, "skipping popover trigger"),
            }
        }
        bound
    }

    /// Tear down every trigger under `root` (inclusive): close its popover
    /// immediately, cancel its hover timers, and detach its listeners.
    ///
    /// Registry entries survive so the same triggers can be bound again.
    /// Bindings whose trigger element no longer exists are dropped as well,
    /// as they are at the start of every [`init`](Self::init).
    pub fn cleanup(&mut self, doc: &mut Document, root: ElementId) {
        let triggers = doc.query(root, |d, e| d.has_attribute(e, attrs::TRIGGER));
        for trigger in triggers {
            if let Some(id) = doc.attribute(trigger, attrs::TRIGGER).map(str::to_owned) {
                self.close(doc, &id, true);
                self.cancel_hover_timers(&id);
            }
            self.unbind(trigger);
            doc.remove_attribute(trigger, attrs::BOUND);
        }
        self.prune_dead_bindings(doc);
    }

    /// Clean up every trigger of popover `id` and forget its state.
    pub fn dispose(&mut self, doc: &mut Document, id: &str) {
        self.close(doc, id, true);
        self.cancel_hover_timers(id);
        let triggers: Vec<ElementId> = self
            .bindings
            .iter()
            .filter(|(_, b)| b.popover.as_str() == id)
            .map(|(&t, _)| t)
            .collect();
        for trigger in triggers {
            self.unbind(trigger);
            doc.remove_attribute(trigger, attrs::BOUND);
        }
        if self.registry.remove(id).is_some() {
            debug!(popover = id, "popover disposed");
        }
    }

    fn bind_trigger(&mut self, doc: &mut Document, trigger: ElementId) -> Result<()> {
        let id = doc
            .attribute(trigger, attrs::TRIGGER)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(PopoverError::MissingTriggerId)?
            .to_owned();
        let content = doc
            .element_by_id(&id)
            .ok_or_else(|| PopoverError::ContentNotFound(id.clone()))?;
        let mode: TriggerMode = doc.attribute(trigger, attrs::TYPE).unwrap_or("").parse()?;
        let config = PopoverConfig::from_content(doc, content);

        if self.registry.contains(&id) {
            // Settle the old elements before switching references.
            self.close(doc, &id, true);
            self.cancel_hover_timers(&id);
        }
        let popover = PopoverId::from(id.as_str());
        match self.registry.get_mut(&id) {
            Some(state) => {
                state.trigger = trigger;
                state.content = content;
                state.config = config;
            }
            None => self
                .registry
                .insert(popover.clone(), PopoverState::new(trigger, content, config)),
        }

        self.unbind(trigger);
        let on_trigger = Scope::Element(trigger);
        let handles = match mode {
            TriggerMode::Click => vec![self.listeners.add(
                on_trigger,
                EventType::Click,
                Handler::Toggle {
                    popover: popover.clone(),
                    trigger,
                },
            )],
            TriggerMode::Hover => {
                let on_content = Scope::Element(content);
                vec![
                    self.listeners.add(
                        on_trigger,
                        EventType::MouseEnter,
                        Handler::TriggerEnter {
                            popover: popover.clone(),
                            trigger,
                        },
                    ),
                    self.listeners.add(
                        on_trigger,
                        EventType::MouseLeave,
                        Handler::TriggerLeave {
                            popover: popover.clone(),
                        },
                    ),
                    self.listeners.add(
                        on_content,
                        EventType::MouseEnter,
                        Handler::ContentEnter {
                            popover: popover.clone(),
                        },
                    ),
                    self.listeners.add(
                        on_content,
                        EventType::MouseLeave,
                        Handler::ContentLeave {
                            popover: popover.clone(),
                            trigger,
                        },
                    ),
                ]
            }
        };
        self.bindings.insert(
            trigger,
            TriggerBinding {
                popover,
                mode,
                handles,
            },
        );
        doc.set_attribute(trigger, attrs::BOUND, "true");
        self.project(doc, &id);
        debug!(popover = %id, ?trigger, ?mode, "bound popover trigger");
        Ok(())
    }

    /// Drop bindings whose trigger was removed from the document. A popover
    /// still anchored to such a trigger is closed and its hover timers are
    /// cancelled first.
    fn prune_dead_bindings(&mut self, doc: &mut Document) {
        let dead: Vec<(ElementId, PopoverId)> = self
            .bindings
            .iter()
            .filter(|&(&t, _)| !doc.is_alive(t))
            .map(|(&t, b)| (t, b.popover.clone()))
            .collect();
        for (trigger, popover) in dead {
            let anchored = self
                .registry
                .get(popover.as_str())
                .is_some_and(|s| s.trigger() == trigger);
            if anchored {
                self.close(doc, popover.as_str(), true);
                self.cancel_hover_timers(popover.as_str());
            }
            self.unbind(trigger);
            debug!(popover = %popover, ?trigger, "dropped binding of removed trigger");
        }
    }

    fn unbind(&mut self, trigger: ElementId) {
        if let Some(binding) = self.bindings.remove(&trigger) {
            for handle in binding.handles {
                self.listeners.remove(handle);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Rect;
    use perch_dom::{ElementData, ID_ATTR};
    use perch_position::Floating;

    use super::*;
    use crate::EngineOptions;

    fn page() -> (Document, Popovers) {
        (
            Document::new(Rect::new(0.0, 0.0, 800.0, 600.0)),
            Popovers::with_engine(EngineOptions::default(), Floating),
        )
    }

    fn add_pair(doc: &mut Document, id: &str, mode: Option<&str>) -> (ElementId, ElementId) {
        let body = doc.body();
        let trigger = doc.insert(
            Some(body),
            ElementData::new("button").with_bounds(Rect::new(10.0, 10.0, 90.0, 40.0)),
        );
        doc.set_attribute(trigger, attrs::TRIGGER, id);
        if let Some(mode) = mode {
            doc.set_attribute(trigger, attrs::TYPE, mode);
        }
        let content = doc.insert(
            Some(body),
            ElementData::default().with_bounds(Rect::new(0.0, 0.0, 120.0, 60.0)),
        );
        doc.set_attribute(content, ID_ATTR, id);
        (trigger, content)
    }

    #[test]
    fn init_is_idempotent() {
        let (mut doc, mut popovers) = page();
        let (trigger, _) = add_pair(&mut doc, "a", None);
        let body = doc.body();
        assert_eq!(popovers.init(&mut doc, body), 1);
        assert_eq!(popovers.init(&mut doc, body), 0);
        assert_eq!(popovers.element_listener_count(trigger), 1);
        assert_eq!(doc.attribute(trigger, attrs::BOUND), Some("true"));
        assert_eq!(doc.attribute(trigger, attrs::OPEN), Some("false"));
    }

    #[test]
    fn hover_binds_four_listeners() {
        let (mut doc, mut popovers) = page();
        let (trigger, content) = add_pair(&mut doc, "tip", Some("hover"));
        let body = doc.body();
        popovers.init(&mut doc, body);
        assert_eq!(popovers.trigger_mode(trigger), Some(TriggerMode::Hover));
        assert_eq!(popovers.element_listener_count(trigger), 2);
        assert_eq!(popovers.element_listener_count(content), 2);
    }

    #[test]
    fn missing_content_is_skipped_and_retried() {
        let (mut doc, mut popovers) = page();
        let body = doc.body();
        let trigger = doc.insert(Some(body), ElementData::new("button"));
        doc.set_attribute(trigger, attrs::TRIGGER, "later");
        assert_eq!(popovers.init(&mut doc, body), 0);
        assert!(!doc.has_attribute(trigger, attrs::BOUND));

        let content = doc.insert(Some(body), ElementData::default());
        doc.set_attribute(content, ID_ATTR, "later");
        assert_eq!(popovers.init(&mut doc, body), 1);
    }

    #[test]
    fn unknown_mode_is_skipped() {
        let (mut doc, mut popovers) = page();
        let (trigger, _) = add_pair(&mut doc, "a", Some("focus"));
        let body = doc.body();
        assert_eq!(popovers.init(&mut doc, body), 0);
        assert_eq!(popovers.listener_count(), 0);
        assert!(!doc.has_attribute(trigger, attrs::BOUND));
    }

    #[test]
    fn cleanup_detaches_and_allows_rebinding() {
        let (mut doc, mut popovers) = page();
        let (trigger, _) = add_pair(&mut doc, "a", None);
        let body = doc.body();
        popovers.init(&mut doc, body);
        popovers.open(&mut doc, "a");
        assert!(popovers.is_open("a"));

        popovers.cleanup(&mut doc, body);
        assert!(!popovers.is_open("a"));
        assert_eq!(popovers.listener_count(), 0);
        assert_eq!(popovers.pending_timers(), 0);
        assert!(popovers.registry().contains("a"), "state persists for reattachment");

        assert_eq!(popovers.init(&mut doc, body), 1);
        assert_eq!(popovers.element_listener_count(trigger), 1);
    }

    #[test]
    fn rebinding_updates_references() {
        let (mut doc, mut popovers) = page();
        let (first, _) = add_pair(&mut doc, "a", None);
        let body = doc.body();
        popovers.init(&mut doc, body);
        doc.remove(first);

        let (second, _) = add_pair(&mut doc, "a", None);
        popovers.cleanup(&mut doc, body);
        assert_eq!(popovers.init(&mut doc, body), 1);
        assert_eq!(popovers.registry().len(), 1);
        assert_eq!(popovers.registry().get("a").map(|s| s.trigger()), Some(second));
        assert_eq!(popovers.listener_count(), 1, "stale trigger listeners are gone");
    }

    #[test]
    fn dispose_forgets_state() {
        let (mut doc, mut popovers) = page();
        let (trigger, _) = add_pair(&mut doc, "a", None);
        let body = doc.body();
        popovers.init(&mut doc, body);
        popovers.dispose(&mut doc, "a");
        assert!(popovers.registry().is_empty());
        assert_eq!(popovers.bound_popover(trigger), None);
        assert!(!doc.has_attribute(trigger, attrs::BOUND));
    }
}
