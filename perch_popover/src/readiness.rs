// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gating on positioning-engine availability.

use perch_dom::Document;
use perch_position::PositioningEngine;
use tracing::{debug, error};

use crate::error::PopoverError;
use crate::system::{Popovers, Task};

/// Something that may eventually produce a positioning engine.
///
/// Closures returning `Option<Box<dyn PositioningEngine>>` implement this.
pub trait EngineSource {
    /// Return the engine if it is available now.
    fn poll(&mut self) -> Option<Box<dyn PositioningEngine>>;
}

impl<F> EngineSource for F
where
    F: FnMut() -> Option<Box<dyn PositioningEngine>>,
{
    fn poll(&mut self) -> Option<Box<dyn PositioningEngine>> {
        self()
    }
}

/// Whether the positioning engine is usable.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Readiness {
    /// Not available yet; `attempts` polls have been made.
    Waiting {
        /// Polls made so far.
        attempts: u32,
    },
    /// Available; triggers can be bound.
    Ready,
    /// Never became available. Popovers stay uninitialized.
    Failed,
}

impl Popovers {
    /// Begin polling `source` for the positioning engine.
    ///
    /// The first poll happens immediately, then one every
    /// [`poll_interval_ms`](crate::EngineOptions::poll_interval_ms) of engine time
    /// up to [`max_poll_attempts`](crate::EngineOptions::max_poll_attempts). On
    /// success the whole document is bound; on exhaustion an error is logged and
    /// the system stays [`Readiness::Failed`].
    pub fn start(&mut self, doc: &mut Document, source: impl EngineSource + 'static) {
        if self.readiness != (Readiness::Waiting { attempts: 0 }) || self.source.is_some() {
            debug!(readiness = ?self.readiness, "popover system already started");
            return;
        }
        self.source = Some(Box::new(source));
        self.poll_engine(doc, 1);
    }

    pub(crate) fn poll_engine(&mut self, doc: &mut Document, attempt: u32) {
        let Some(source) = self.source.as_mut() else {
            return;
        };
        match source.poll() {
            Some(engine) => {
                self.source = None;
                self.engine = Some(engine);
                self.readiness = Readiness::Ready;
                debug!(attempt, "positioning engine ready");
                let body = doc.body();
                self.init(doc, body);
            }
            None if attempt < self.options.max_poll_attempts => {
                self.readiness = Readiness::Waiting { attempts: attempt };
                self.timers.schedule(
                    self.options.poll_interval(),
                    Task::PollEngine {
                        attempt: attempt + 1,
                    },
                );
            }
            None => {
                self.source = None;
                self.readiness = Readiness::Failed;
                let err = PopoverError::EngineUnavailable { attempts: attempt };
                error!(%err, "popover initialization abandoned");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use std::time::Duration;

    use kurbo::Rect;
    use perch_dom::ElementData;
    use perch_position::Floating;

    use crate::config::{EngineOptions, attrs};

    fn doc_with_trigger() -> Document {
        let mut doc = Document::new(Rect::new(0.0, 0.0, 400.0, 300.0));
        let body = doc.body();
        let trigger = doc.insert(
            Some(body),
            ElementData::new("button").with_bounds(Rect::new(10.0, 10.0, 60.0, 30.0)),
        );
        doc.set_attribute(trigger, attrs::TRIGGER, "menu");
        let content = doc.insert(Some(body), ElementData::default());
        doc.set_attribute(content, perch_dom::ID_ATTR, "menu");
        doc
    }

    #[test]
    fn binds_once_the_engine_appears() {
        let mut doc = doc_with_trigger();
        let polls = Rc::new(Cell::new(0_u32));
        let seen = polls.clone();
        let mut popovers = Popovers::default();
        popovers.start(&mut doc, move || {
            seen.set(seen.get() + 1);
            (seen.get() >= 3).then(|| Box::new(Floating) as Box<dyn PositioningEngine>)
        });
        assert_eq!(popovers.readiness(), Readiness::Waiting { attempts: 1 });
        assert!(popovers.registry().is_empty(), "nothing binds before the engine is ready");

        popovers.advance(&mut doc, Duration::from_millis(100));
        assert_eq!(polls.get(), 3);
        assert_eq!(popovers.readiness(), Readiness::Ready);
        assert!(popovers.registry().contains("menu"));
        assert_eq!(popovers.pending_timers(), 0);
    }

    #[test]
    fn gives_up_after_the_attempt_limit() {
        let mut doc = doc_with_trigger();
        let polls = Rc::new(Cell::new(0_u32));
        let seen = polls.clone();
        let options = EngineOptions {
            max_poll_attempts: 4,
            ..EngineOptions::default()
        };
        let mut popovers = Popovers::new(options);
        popovers.start(&mut doc, move || {
            seen.set(seen.get() + 1);
            None::<Box<dyn PositioningEngine>>
        });
        popovers.advance(&mut doc, Duration::from_secs(5));
        assert_eq!(polls.get(), 4);
        assert_eq!(popovers.readiness(), Readiness::Failed);
        let body = doc.body();
        assert_eq!(popovers.init(&mut doc, body), 0);
        assert!(popovers.registry().is_empty());
    }
}
