// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The popover system object and its read-only accessors.

use std::collections::HashMap;
use std::time::Duration;

use perch_dom::{ElementId, PointerTracker};
use perch_position::{AutoUpdate, PositioningEngine};

use crate::config::{EngineOptions, TriggerMode};
use crate::listeners::{ListenerHandle, ListenerTable, Scope};
use crate::readiness::{EngineSource, Readiness};
use crate::registry::{Phase, PopoverId, PopoverRegistry};
use crate::timers::TimerQueue;

/// Deferred work. Every task re-validates the state it acts on when it fires.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Task {
    HoverOpen {
        popover: PopoverId,
        trigger: ElementId,
    },
    HoverClose {
        popover: PopoverId,
    },
    EnterAnimationDone {
        popover: PopoverId,
    },
    HideContent {
        popover: PopoverId,
    },
    ArmClickAway {
        popover: PopoverId,
    },
    PollEngine {
        attempt: u32,
    },
}

/// Listeners owned by one bound trigger.
#[derive(Clone, Debug)]
pub(crate) struct TriggerBinding {
    pub(crate) popover: PopoverId,
    pub(crate) mode: TriggerMode,
    pub(crate) handles: Vec<ListenerHandle>,
}

/// The popover engine for one document.
///
/// Holds every piece of process-wide state the engine needs: the registry, the
/// listener table, the timer queue, continuous-update subscriptions, and the
/// portal container. The document itself is owned by the host and passed to
/// each call.
pub struct Popovers {
    pub(crate) options: EngineOptions,
    pub(crate) readiness: Readiness,
    pub(crate) engine: Option<Box<dyn PositioningEngine>>,
    pub(crate) source: Option<Box<dyn EngineSource>>,
    pub(crate) registry: PopoverRegistry,
    pub(crate) listeners: ListenerTable,
    pub(crate) bindings: HashMap<ElementId, TriggerBinding>,
    pub(crate) timers: TimerQueue<Task>,
    pub(crate) auto_update: AutoUpdate<PopoverId>,
    pub(crate) pointer: PointerTracker,
    pub(crate) portal: Option<ElementId>,
}

impl core::fmt::Debug for Popovers {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Popovers")
            .field("readiness", &self.readiness)
            .field("popovers", &self.registry.len())
            .field("open", &self.registry.open_ids())
            .field("bindings", &self.bindings.len())
            .field("listeners", &self.listeners.len())
            .field("pending_timers", &self.timers.len())
            .field("now", &self.timers.now())
            .finish_non_exhaustive()
    }
}

impl Default for Popovers {
    fn default() -> Self {
        Self::new(EngineOptions::default())
    }
}

impl Popovers {
    /// Create a system that waits for a positioning engine; see [`Popovers::start`].
    pub fn new(options: EngineOptions) -> Self {
        Self {
            options,
            readiness: Readiness::Waiting { attempts: 0 },
            engine: None,
            source: None,
            registry: PopoverRegistry::default(),
            listeners: ListenerTable::default(),
            bindings: HashMap::new(),
            timers: TimerQueue::new(),
            auto_update: AutoUpdate::new(),
            pointer: PointerTracker::new(),
            portal: None,
        }
    }

    /// Create a system whose positioning engine is already available.
    ///
    /// Nothing is bound yet; call [`Popovers::init`] with the document body.
    pub fn with_engine(options: EngineOptions, engine: impl PositioningEngine + 'static) -> Self {
        let mut popovers = Self::new(options);
        popovers.engine = Some(Box::new(engine));
        popovers.readiness = Readiness::Ready;
        popovers
    }

    /// Engine-wide options.
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Positioning-engine readiness.
    pub fn readiness(&self) -> Readiness {
        self.readiness
    }

    /// All popover states.
    pub fn registry(&self) -> &PopoverRegistry {
        &self.registry
    }

    /// Whether popover `id` is open. Unknown identifiers are closed.
    pub fn is_open(&self, id: &str) -> bool {
        self.registry.get(id).is_some_and(|s| s.is_open)
    }

    /// Lifecycle phase of popover `id`. Unknown identifiers are [`Phase::Closed`].
    pub fn phase(&self, id: &str) -> Phase {
        self.registry.get(id).map_or(Phase::Closed, |s| s.phase())
    }

    /// The open popover, if any.
    pub fn open_popover(&self) -> Option<PopoverId> {
        self.registry.open_ids().into_iter().next()
    }

    /// Mode of a bound trigger; `None` if `trigger` is not bound.
    pub fn trigger_mode(&self, trigger: ElementId) -> Option<TriggerMode> {
        self.bindings.get(&trigger).map(|b| b.mode)
    }

    /// Popover a bound trigger controls.
    pub fn bound_popover(&self, trigger: ElementId) -> Option<&PopoverId> {
        self.bindings.get(&trigger).map(|b| &b.popover)
    }

    /// Number of listeners attached anywhere.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Number of document-level listeners (dismissal handlers).
    pub fn document_listener_count(&self) -> usize {
        self.listeners.count_at(Scope::Document)
    }

    /// Number of listeners attached to `element`.
    pub fn element_listener_count(&self, element: ElementId) -> usize {
        self.listeners.count_at(Scope::Element(element))
    }

    /// Number of scheduled tasks.
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Time elapsed on the engine clock.
    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    /// The portal container, once created.
    pub fn portal(&self) -> Option<ElementId> {
        self.portal
    }
}
