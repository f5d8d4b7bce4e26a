// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Perch DOM: a headless element tree for attribute-driven widgets.
//!
//! Perch DOM stands in for a browser document so interactive behavior can be
//! attached to server-rendered structure and tested without a rendering surface.
//!
//! - Represents a hierarchy of elements with attributes, classes, inline styles and text.
//! - Stores page-space bounds and z-order supplied by the host's layout.
//! - Provides hit testing, reparenting, focus, and hover enter/leave transitions.
//!
//! ## Not a layout engine
//!
//! This crate does not measure or arrange anything. Upstream code computes
//! boxes however it likes and writes them here with [`Document::set_bounds`].
//! The only geometry the crate writes itself is through [`Document::move_to`],
//! which callers use to place floating content.
//!
//! ## API overview
//!
//! - [`Document`]: the tree, rooted at a `body` covering the viewport.
//! - [`ElementId`]: generational handle of an element.
//! - [`ElementData`]: construction data (tag, bounds, z-index, flags).
//! - [`ElementFlags`]: picking and focus controls.
//! - [`PointerTracker`]: pointer moves → [`PointerTransition`]s with related targets.
//! - [`Key`]: keyboard input.
//!
//! ### Minimal usage
//!
//! ```
//! use kurbo::{Point, Rect};
//! use perch_dom::{Document, ElementData};
//!
//! let mut doc = Document::new(Rect::new(0.0, 0.0, 800.0, 600.0));
//! let body = doc.body();
//! let button = doc.insert(
//!     Some(body),
//!     ElementData::new("button").with_bounds(Rect::new(10.0, 10.0, 90.0, 40.0)),
//! );
//! doc.set_attribute(button, "id", "save");
//!
//! assert_eq!(doc.element_by_id("save"), Some(button));
//! assert_eq!(doc.hit_test(Point::new(20.0, 20.0)).unwrap().element, button);
//! ```

mod document;
mod hover;
mod types;

pub use document::{Document, Hit, ID_ATTR};
pub use hover::{HoverEvent, HoverKind, HoverState, PointerTracker, PointerTransition};
pub use types::{ElementData, ElementFlags, ElementId, Key};
