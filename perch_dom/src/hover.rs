// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hover tracking: turn pointer positions into `mouseenter`/`mouseleave` transitions.
//!
//! ## Usage
//!
//! Feed every pointer move to [`PointerTracker::pointer_move`]. It hit-tests the
//! document, diffs the new body→target path against the previous one with
//! [`HoverState`], and returns one [`PointerTransition`] per element entered or left.
//!
//! ```
//! use kurbo::{Point, Rect};
//! use perch_dom::{Document, ElementData, HoverKind, PointerTracker};
//!
//! let mut doc = Document::new(Rect::new(0.0, 0.0, 100.0, 100.0));
//! let body = doc.body();
//! let button = doc.insert(
//!     Some(body),
//!     ElementData::new("button").with_bounds(Rect::new(10.0, 10.0, 30.0, 30.0)),
//! );
//!
//! let mut tracker = PointerTracker::new();
//! let _ = tracker.pointer_move(&doc, Point::new(50.0, 50.0));
//! let moved = tracker.pointer_move(&doc, Point::new(20.0, 20.0));
//! assert_eq!(moved.len(), 1);
//! assert_eq!(moved[0].kind, HoverKind::Enter);
//! assert_eq!(moved[0].element, button);
//! assert_eq!(moved[0].related, Some(body));
//! ```

use kurbo::Point;

use crate::document::Document;
use crate::types::ElementId;

/// A simple hover state machine over root→target paths.
///
/// Tracks the current hovered path and, when updated with a new path,
/// computes the minimal sequence of leave and enter transitions.
///
/// Ordering semantics:
/// - Leave events are emitted from inner-most to outer-most.
/// - Enter events are emitted from outer-most to inner-most.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HoverState<K: Copy + Eq> {
    current: Vec<K>,
}

// Not derived: a derive would require `K: Default`, which element handles lack.
impl<K: Copy + Eq> Default for HoverState<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// A hover transition event.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HoverEvent<K> {
    /// Pointer enters the given node (in order from outer→inner).
    Enter(K),
    /// Pointer leaves the given node (in order from inner→outer).
    Leave(K),
}

impl<K: Copy + Eq> HoverState<K> {
    /// Create an empty hover state.
    pub fn new() -> Self {
        Self {
            current: Vec::new(),
        }
    }

    /// Return the current root→target path (if any).
    pub fn current_path(&self) -> &[K] {
        &self.current
    }

    /// Clear the current path, returning leave events from inner-most to outer-most.
    pub fn clear(&mut self) -> Vec<HoverEvent<K>> {
        let out = self.current.iter().rev().map(|&k| HoverEvent::Leave(k)).collect();
        self.current.clear();
        out
    }

    /// Update the hover path and return the transitions from the previous path to `new_path`.
    pub fn update_path(&mut self, new_path: &[K]) -> Vec<HoverEvent<K>> {
        // Length of the shared ancestry (depth of the lowest common ancestor).
        let lca = self
            .current
            .iter()
            .zip(new_path)
            .take_while(|(a, b)| a == b)
            .count();

        let mut out: Vec<_> = self.current[lca..]
            .iter()
            .rev()
            .map(|&k| HoverEvent::Leave(k))
            .collect();
        out.extend(new_path[lca..].iter().map(|&k| HoverEvent::Enter(k)));

        self.current.clear();
        self.current.extend_from_slice(new_path);
        out
    }
}

/// Direction of a [`PointerTransition`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HoverKind {
    /// `mouseenter`.
    Enter,
    /// `mouseleave`.
    Leave,
}

/// A `mouseenter`/`mouseleave` delivered to a single element.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PointerTransition {
    /// Enter or leave.
    pub kind: HoverKind,
    /// Element receiving the event.
    pub element: ElementId,
    /// For leave: the innermost element the pointer moved to.
    /// For enter: the innermost element the pointer came from.
    pub related: Option<ElementId>,
}

/// Pointer position tracker producing element-level hover transitions.
#[derive(Clone, Debug, Default)]
pub struct PointerTracker {
    hover: HoverState<ElementId>,
}

impl PointerTracker {
    /// Create a tracker with nothing hovered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Innermost hovered element, if any.
    pub fn hovered(&self) -> Option<ElementId> {
        self.hover.current_path().last().copied()
    }

    /// Hit-test `pt` and return the transitions caused by moving there.
    pub fn pointer_move(&mut self, doc: &Document, pt: Point) -> Vec<PointerTransition> {
        let path = doc.hit_test(pt).map(|h| h.path).unwrap_or_default();
        self.retarget(&path)
    }

    /// The pointer left the page: leave everything.
    pub fn pointer_exit(&mut self) -> Vec<PointerTransition> {
        self.retarget(&[])
    }

    /// Re-run the hover diff against the current layout (for example after an
    /// element under the pointer was shown, hidden, or moved).
    pub fn refresh(&mut self, doc: &Document, pt: Point) -> Vec<PointerTransition> {
        self.pointer_move(doc, pt)
    }

    fn retarget(&mut self, path: &[ElementId]) -> Vec<PointerTransition> {
        let from = self.hovered();
        let to = path.last().copied();
        self.hover
            .update_path(path)
            .into_iter()
            .map(|ev| match ev {
                HoverEvent::Enter(element) => PointerTransition {
                    kind: HoverKind::Enter,
                    element,
                    related: from,
                },
                HoverEvent::Leave(element) => PointerTransition {
                    kind: HoverKind::Leave,
                    element,
                    related: to,
                },
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ElementData;
    use kurbo::Rect;

    #[test]
    fn default_tracker_hovers_nothing() {
        let tracker = PointerTracker::default();
        assert_eq!(tracker.hovered(), None);
        assert!(HoverState::<ElementId>::default().current_path().is_empty());
    }

    // Branch change with shallow LCA: leave inner tail, then enter new branch.
    #[test]
    fn hover_branch_change() {
        let mut h: HoverState<u32> = HoverState::new();
        let _ = h.update_path(&[1, 2, 3]);
        let ev = h.update_path(&[1, 4]);
        assert_eq!(
            ev,
            vec![
                HoverEvent::Leave(3),
                HoverEvent::Leave(2),
                HoverEvent::Enter(4)
            ]
        );
        assert_eq!(h.current_path(), &[1, 4]);
    }

    // Same path repeated: no transitions.
    #[test]
    fn hover_same_path_no_events() {
        let mut h: HoverState<u32> = HoverState::new();
        let _ = h.update_path(&[7, 8]);
        assert!(h.update_path(&[7, 8]).is_empty());
        assert_eq!(h.clear(), vec![HoverEvent::Leave(8), HoverEvent::Leave(7)]);
    }

    #[test]
    fn leave_reports_destination_as_related() {
        let mut doc = Document::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        let body = doc.body();
        let trigger = doc.insert(
            Some(body),
            ElementData::default().with_bounds(Rect::new(0.0, 0.0, 20.0, 20.0)),
        );
        let panel = doc.insert(
            Some(body),
            ElementData::default().with_bounds(Rect::new(0.0, 30.0, 50.0, 60.0)),
        );

        let mut t = PointerTracker::new();
        let _ = t.pointer_move(&doc, Point::new(5.0, 5.0));
        assert_eq!(t.hovered(), Some(trigger));

        let ev = t.pointer_move(&doc, Point::new(5.0, 40.0));
        assert_eq!(
            ev,
            vec![
                PointerTransition {
                    kind: HoverKind::Leave,
                    element: trigger,
                    related: Some(panel),
                },
                PointerTransition {
                    kind: HoverKind::Enter,
                    element: panel,
                    related: Some(trigger),
                },
            ]
        );

        let ev = t.pointer_exit();
        assert_eq!(ev.len(), 2, "leaves panel then body");
        assert!(ev.iter().all(|e| e.kind == HoverKind::Leave && e.related.is_none()));
    }
}
