// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Perch Popover: attribute-driven popovers over a headless document.
//!
//! ## Overview
//!
//! Markup declares the wiring: a trigger carries `data-popover-trigger="<id>"`
//! naming the `id` of its content element, plus an optional
//! `data-popover-type` of `click` (default) or `hover`. Content carries its own
//! configuration (placement, offset, hover delays, dismissal opt-outs); see
//! [`attrs`] for the full attribute contract and [`PopoverConfig`] for the
//! parsed form.
//!
//! [`Popovers`] owns all engine state:
//!
//! - a [`PopoverRegistry`] with one [`PopoverState`] per content identifier,
//! - the listener table, where every attached handler is addressed by a [`ListenerHandle`],
//! - a [`TimerQueue`] on a virtual clock for hover intent, animations, and readiness polling,
//! - continuous-update subscriptions for open popovers,
//! - the portal container that open content is moved into.
//!
//! ## Lifecycle
//!
//! A popover is `Closed → Opening → Open → Closing → Closed` (see [`Phase`]).
//! Opening one popover closes any other immediately, so at most one is open.
//! While open, Escape and outside clicks close it unless its content opts out.
//!
//! ## Driving the engine
//!
//! The host feeds input through [`Popovers::click`], [`Popovers::pointer_move`],
//! [`Popovers::pointer_exit`], and [`Popovers::key_down`]; passes time with
//! [`Popovers::advance`]; and calls [`Popovers::animation_frame`] to reposition
//! open content after layout changes. Every input entry point first runs tasks
//! that are already due, which stands in for "the next tick".
//!
//! ## Example
//!
//! ```
//! use std::time::Duration;
//! use kurbo::Rect;
//! use perch_dom::{Document, ElementData, ID_ATTR, Key};
//! use perch_popover::{EngineOptions, Phase, Popovers, attrs};
//! use perch_position::Floating;
//!
//! let mut doc = Document::new(Rect::new(0.0, 0.0, 800.0, 600.0));
//! let body = doc.body();
//! let button = doc.insert(
//!     Some(body),
//!     ElementData::new("button").with_bounds(Rect::new(100.0, 100.0, 200.0, 130.0)),
//! );
//! doc.set_attribute(button, attrs::TRIGGER, "menu");
//! let menu = doc.insert(
//!     Some(body),
//!     ElementData::default().with_bounds(Rect::new(0.0, 0.0, 120.0, 80.0)),
//! );
//! doc.set_attribute(menu, ID_ATTR, "menu");
//! doc.set_style(menu, "display", "none");
//!
//! let mut popovers = Popovers::with_engine(EngineOptions::default(), Floating);
//! assert_eq!(popovers.init(&mut doc, body), 1);
//!
//! popovers.click(&mut doc, button);
//! assert!(popovers.is_open("menu"));
//! assert_eq!(doc.attribute(button, attrs::OPEN), Some("true"));
//! assert_eq!(doc.bounds(menu).y0, 134.0);
//!
//! popovers.key_down(&mut doc, Key::Escape);
//! assert_eq!(popovers.phase("menu"), Phase::Closing);
//! popovers.advance(&mut doc, Duration::from_millis(150));
//! assert_eq!(popovers.phase("menu"), Phase::Closed);
//! assert!(!doc.is_displayed(menu));
//! ```

mod anchor;
mod binder;
mod config;
mod dispatch;
mod error;
mod lifecycle;
mod listeners;
mod portal;
mod readiness;
mod registry;
mod system;
mod timers;

pub use config::{EngineOptions, PopoverConfig, TriggerMode, attrs, classes};
pub use error::{PopoverError, Result};
pub use listeners::{EventType, ListenerHandle, Scope};
pub use readiness::{EngineSource, Readiness};
pub use registry::{DismissalHandlers, HoverTimers, Phase, PopoverId, PopoverRegistry, PopoverState};
pub use system::Popovers;
pub use timers::{TimerId, TimerQueue};
