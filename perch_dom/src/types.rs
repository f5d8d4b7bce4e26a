// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the document: element handles, flags, construction data, and keys.

use kurbo::Rect;

/// Identifier for an element in a [`Document`](crate::Document).
///
/// A small, copyable handle made of a slot index and a generation counter.
///
/// ## Semantics
///
/// - On insert, a fresh slot is allocated with generation `1`.
/// - On remove, the slot is freed; every `ElementId` that pointed to it is now stale.
/// - On reuse of a freed slot its generation is incremented, so a stale handle never
///   aliases the new element.
///
/// Use [`Document::is_alive`](crate::Document::is_alive) to check liveness.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub(crate) u32, pub(crate) u32);

impl ElementId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Element flags controlling picking and focus.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ElementFlags: u8 {
        /// Element participates in hit testing (`pointer-events` other than `none`).
        const PICKABLE  = 0b0000_0001;
        /// Element can receive keyboard focus.
        const FOCUSABLE = 0b0000_0010;
    }
}

impl Default for ElementFlags {
    fn default() -> Self {
        Self::PICKABLE
    }
}

/// Construction data for a new element.
///
/// Bounds are page-space (viewport) rectangles supplied by the host's layout;
/// the document does not perform layout.
#[derive(Clone, Debug)]
pub struct ElementData {
    /// Tag name, e.g. `"div"` or `"button"`.
    pub tag: String,
    /// Page-space border box.
    pub bounds: Rect,
    /// Z-order. A non-zero value starts a stacking context for the subtree.
    pub z_index: i32,
    /// Picking and focus flags.
    pub flags: ElementFlags,
}

impl ElementData {
    /// Element with the given tag, zero bounds and default flags.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            bounds: Rect::ZERO,
            z_index: 0,
            flags: ElementFlags::default(),
        }
    }

    /// Set the page-space bounds.
    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.bounds = bounds;
        self
    }

    /// Set the z-index.
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Replace the flags.
    pub fn with_flags(mut self, flags: ElementFlags) -> Self {
        self.flags = flags;
        self
    }
}

impl Default for ElementData {
    fn default() -> Self {
        Self::new("div")
    }
}

/// A keyboard key as delivered to `keydown` handlers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    /// The Escape key.
    Escape,
    /// The Enter key.
    Enter,
    /// The Backspace key.
    Backspace,
    /// Arrow up.
    ArrowUp,
    /// Arrow down.
    ArrowDown,
    /// A printable character.
    Char(char),
    /// Anything else.
    Other,
}
