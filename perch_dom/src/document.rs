// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core document implementation: structure, updates, queries.

use std::collections::BTreeMap;

use kurbo::{Point, Rect};

use crate::types::{ElementData, ElementFlags, ElementId};

/// Attribute holding an element's document-unique identifier.
pub const ID_ATTR: &str = "id";

#[derive(Clone, Debug)]
struct Node {
    generation: u32,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    tag: String,
    attributes: BTreeMap<String, String>,
    classes: Vec<String>,
    style: BTreeMap<String, String>,
    text: String,
    bounds: Rect,
    z_index: i32,
    flags: ElementFlags,
}

impl Node {
    fn new(generation: u32, data: ElementData) -> Self {
        Self {
            generation,
            parent: None,
            children: Vec::new(),
            tag: data.tag,
            attributes: BTreeMap::new(),
            classes: Vec::new(),
            style: BTreeMap::new(),
            text: String::new(),
            bounds: data.bounds,
            z_index: data.z_index,
            flags: data.flags,
        }
    }
}

/// Result of a hit test.
#[derive(Clone, Debug)]
pub struct Hit {
    /// The matched element.
    pub element: ElementId,
    /// Path from the body to the element (inclusive).
    pub path: Vec<ElementId>,
}

/// A headless element tree rooted at a `body` element.
///
/// Bounds are stored in page space. Elements that are not connected to the
/// body (freshly inserted without a parent, or detached) are invisible to
/// [`Document::element_by_id`] and [`Document::hit_test`].
pub struct Document {
    nodes: Vec<Option<Node>>,
    generations: Vec<u32>,
    free_list: Vec<usize>,
    body: ElementId,
    viewport: Rect,
    focused: Option<ElementId>,
}

impl core::fmt::Debug for Document {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        f.debug_struct("Document")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("viewport", &self.viewport)
            .field("focused", &self.focused)
            .finish_non_exhaustive()
    }
}

impl Document {
    /// Create a document whose body covers `viewport`.
    pub fn new(viewport: Rect) -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            body: ElementId::new(0, 1),
            viewport,
            focused: None,
        };
        doc.body = doc.insert(None, ElementData::new("body").with_bounds(viewport));
        doc
    }

    /// The root element.
    pub fn body(&self) -> ElementId {
        self.body
    }

    /// The visible page area used for collision handling.
    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    /// Resize the viewport (and the body with it).
    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
        let body = self.body;
        self.set_bounds(body, viewport);
    }

    /// Insert a new element as the last child of `parent`, or detached if `None`.
    pub fn insert(&mut self, parent: Option<ElementId>, data: ElementData) -> ElementId {
        let idx = if let Some(idx) = self.free_list.pop() {
            self.generations[idx] += 1;
            self.nodes[idx] = Some(Node::new(self.generations[idx], data));
            idx
        } else {
            self.generations.push(1);
            self.nodes.push(Some(Node::new(1, data)));
            self.nodes.len() - 1
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "ElementId uses 32-bit indices by design."
        )]
        let id = ElementId::new(idx as u32, self.generations[idx]);
        if let Some(p) = parent {
            self.append_child(p, id);
        }
        id
    }

    /// Move `child` (and its subtree) to the end of `parent`'s children.
    ///
    /// Returns `false` without changes if either handle is stale or if the move
    /// would make an element its own ancestor.
    pub fn append_child(&mut self, parent: ElementId, child: ElementId) -> bool {
        if !self.is_alive(parent) || !self.is_alive(child) || self.contains(child, parent) {
            return false;
        }
        if let Some(old) = self.node(child).parent {
            self.node_mut(old).children.retain(|c| *c != child);
        }
        self.node_mut(parent).children.push(child);
        self.node_mut(child).parent = Some(parent);
        true
    }

    /// Remove an element and its subtree.
    ///
    /// The body cannot be removed.
    pub fn remove(&mut self, id: ElementId) {
        if !self.is_alive(id) || id == self.body {
            return;
        }
        if let Some(parent) = self.node(id).parent {
            self.node_mut(parent).children.retain(|c| *c != id);
        }
        self.free_subtree(id);
    }

    /// Whether `id` refers to a live element.
    pub fn is_alive(&self, id: ElementId) -> bool {
        self.nodes
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .is_some_and(|n| n.generation == id.1)
    }

    /// Whether `id` is live and attached under the body.
    pub fn is_connected(&self, id: ElementId) -> bool {
        self.is_alive(id) && self.path_to_root(id).first() == Some(&self.body)
    }

    /// Parent of an element.
    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.get(id)?.parent
    }

    /// Children of an element in document order.
    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Tag name of an element.
    pub fn tag(&self, id: ElementId) -> Option<&str> {
        self.get(id).map(|n| n.tag.as_str())
    }

    /// First connected element whose `id` attribute equals `value`.
    pub fn element_by_id(&self, value: &str) -> Option<ElementId> {
        self.descendants(self.body)
            .into_iter()
            .find(|&e| self.attribute(e, ID_ATTR) == Some(value))
    }

    // --- attributes, classes, styles, text ---

    /// Read an attribute.
    pub fn attribute(&self, id: ElementId, name: &str) -> Option<&str> {
        self.get(id)?.attributes.get(name).map(String::as_str)
    }

    /// Whether an attribute is present.
    pub fn has_attribute(&self, id: ElementId, name: &str) -> bool {
        self.attribute(id, name).is_some()
    }

    /// Set an attribute.
    pub fn set_attribute(&mut self, id: ElementId, name: &str, value: impl Into<String>) {
        if let Some(n) = self.get_mut(id) {
            n.attributes.insert(name.to_owned(), value.into());
        }
    }

    /// Remove an attribute.
    pub fn remove_attribute(&mut self, id: ElementId, name: &str) {
        if let Some(n) = self.get_mut(id) {
            n.attributes.remove(name);
        }
    }

    /// Whether the class list contains `class`.
    pub fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.get(id).is_some_and(|n| n.classes.iter().any(|c| c == class))
    }

    /// Add a class if not present.
    pub fn add_class(&mut self, id: ElementId, class: &str) {
        if let Some(n) = self.get_mut(id)
            && !n.classes.iter().any(|c| c == class)
        {
            n.classes.push(class.to_owned());
        }
    }

    /// Remove a class if present.
    pub fn remove_class(&mut self, id: ElementId, class: &str) {
        if let Some(n) = self.get_mut(id) {
            n.classes.retain(|c| c != class);
        }
    }

    /// Read an inline style property (e.g. `"display"`, `"left"`, `"--custom"`).
    pub fn style(&self, id: ElementId, property: &str) -> Option<&str> {
        self.get(id)?.style.get(property).map(String::as_str)
    }

    /// Set an inline style property.
    pub fn set_style(&mut self, id: ElementId, property: &str, value: impl Into<String>) {
        if let Some(n) = self.get_mut(id) {
            n.style.insert(property.to_owned(), value.into());
        }
    }

    /// Remove an inline style property.
    pub fn remove_style(&mut self, id: ElementId, property: &str) {
        if let Some(n) = self.get_mut(id) {
            n.style.remove(property);
        }
    }

    /// Own text content.
    pub fn text(&self, id: ElementId) -> &str {
        self.get(id).map(|n| n.text.as_str()).unwrap_or("")
    }

    /// Replace the own text content.
    pub fn set_text(&mut self, id: ElementId, text: impl Into<String>) {
        if let Some(n) = self.get_mut(id) {
            n.text = text.into();
        }
    }

    // --- geometry ---

    /// Page-space border box.
    pub fn bounds(&self, id: ElementId) -> Rect {
        self.get(id).map(|n| n.bounds).unwrap_or(Rect::ZERO)
    }

    /// Replace the page-space border box.
    pub fn set_bounds(&mut self, id: ElementId, bounds: Rect) {
        if let Some(n) = self.get_mut(id) {
            n.bounds = bounds;
        }
    }

    /// Move the border box so its top-left corner sits at `origin`, keeping its size.
    pub fn move_to(&mut self, id: ElementId, origin: Point) {
        if let Some(n) = self.get_mut(id) {
            n.bounds = n.bounds.with_origin(origin);
        }
    }

    /// Z-index of an element.
    pub fn z_index(&self, id: ElementId) -> i32 {
        self.get(id).map(|n| n.z_index).unwrap_or(0)
    }

    /// Update the z-index.
    pub fn set_z_index(&mut self, id: ElementId, z: i32) {
        if let Some(n) = self.get_mut(id) {
            n.z_index = z;
        }
    }

    /// Flags of an element.
    pub fn flags(&self, id: ElementId) -> ElementFlags {
        self.get(id).map(|n| n.flags).unwrap_or_else(ElementFlags::empty)
    }

    /// Replace the flags.
    pub fn set_flags(&mut self, id: ElementId, flags: ElementFlags) {
        if let Some(n) = self.get_mut(id) {
            n.flags = flags;
        }
    }

    /// Whether the element is connected and neither it nor an ancestor has `display: none`.
    pub fn is_displayed(&self, id: ElementId) -> bool {
        self.is_connected(id)
            && self
                .path_to_root(id)
                .iter()
                .all(|&e| self.style(e, "display") != Some("none"))
    }

    // --- tree queries ---

    /// Whether `node` is `ancestor` or one of its descendants.
    pub fn contains(&self, ancestor: ElementId, node: ElementId) -> bool {
        if !self.is_alive(ancestor) {
            return false;
        }
        let mut cur = Some(node);
        while let Some(c) = cur {
            if c == ancestor {
                return true;
            }
            cur = self.parent(c);
        }
        false
    }

    /// Nearest ancestor-or-self carrying attribute `name`.
    pub fn closest(&self, id: ElementId, name: &str) -> Option<ElementId> {
        let mut cur = Some(id).filter(|&e| self.is_alive(e));
        while let Some(c) = cur {
            if self.has_attribute(c, name) {
                return Some(c);
            }
            cur = self.parent(c);
        }
        None
    }

    /// Nearest ancestor-or-self carrying class `class`.
    pub fn closest_class(&self, id: ElementId, class: &str) -> Option<ElementId> {
        let mut cur = Some(id).filter(|&e| self.is_alive(e));
        while let Some(c) = cur {
            if self.has_class(c, class) {
                return Some(c);
            }
            cur = self.parent(c);
        }
        None
    }

    /// `root` and all its descendants in pre-order.
    pub fn descendants(&self, root: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        if !self.is_alive(root) {
            return out;
        }
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.node(id).children.iter().rev().copied());
        }
        out
    }

    /// Elements under `root` (inclusive, pre-order) matching `pred`.
    pub fn query(
        &self,
        root: ElementId,
        pred: impl Fn(&Self, ElementId) -> bool,
    ) -> Vec<ElementId> {
        self.descendants(root)
            .into_iter()
            .filter(|&e| pred(self, e))
            .collect()
    }

    /// Elements under `root` (inclusive, pre-order) carrying attribute `name`.
    pub fn query_attr(&self, root: ElementId, name: &str) -> Vec<ElementId> {
        self.query(root, |d, e| d.has_attribute(e, name))
    }

    /// Path from the outermost ancestor to `id` (inclusive).
    pub fn path_to_root(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut cur = Some(id).filter(|&e| self.is_alive(e));
        while let Some(c) = cur {
            out.push(c);
            cur = self.node(c).parent;
        }
        out.reverse();
        out
    }

    /// Topmost displayed, pickable element under `pt`.
    ///
    /// Candidates are ranked by the z-index of their outermost stacking
    /// context, then by document order (later wins).
    pub fn hit_test(&self, pt: Point) -> Option<Hit> {
        let mut best: Option<(ElementId, i32)> = None;
        let mut stack = vec![(self.body, 0_i32)];
        while let Some((id, context_z)) = stack.pop() {
            let node = self.node(id);
            if node.style.get("display").is_some_and(|d| d == "none") {
                continue;
            }
            let z = if context_z == 0 { node.z_index } else { context_z };
            if node.flags.contains(ElementFlags::PICKABLE) && node.bounds.contains(pt) {
                match best {
                    Some((_, z_best)) if z < z_best => {}
                    _ => best = Some((id, z)),
                }
            }
            stack.extend(node.children.iter().rev().map(|&c| (c, z)));
        }
        best.map(|(element, _)| Hit {
            element,
            path: self.path_to_root(element),
        })
    }

    // --- focus ---

    /// Move focus to `id`. Returns `false` if the element is not connected.
    pub fn focus(&mut self, id: ElementId) -> bool {
        if !self.is_connected(id) {
            return false;
        }
        self.focused = Some(id);
        true
    }

    /// Clear focus.
    pub fn blur(&mut self) {
        self.focused = None;
    }

    /// The focused element, if it is still connected.
    pub fn active_element(&self) -> Option<ElementId> {
        self.focused.filter(|&e| self.is_connected(e))
    }

    // --- internals ---

    fn get(&self, id: ElementId) -> Option<&Node> {
        self.nodes
            .get(id.idx())?
            .as_ref()
            .filter(|n| n.generation == id.1)
    }

    fn get_mut(&mut self, id: ElementId) -> Option<&mut Node> {
        self.nodes
            .get_mut(id.idx())?
            .as_mut()
            .filter(|n| n.generation == id.1)
    }

    fn node(&self, id: ElementId) -> &Node {
        self.get(id).expect("dangling ElementId")
    }

    fn node_mut(&mut self, id: ElementId) -> &mut Node {
        self.get_mut(id).expect("dangling ElementId")
    }

    fn free_subtree(&mut self, id: ElementId) {
        for child in self.node(id).children.clone() {
            self.free_subtree(child);
        }
        if self.focused == Some(id) {
            self.focused = None;
        }
        self.nodes[id.idx()] = None;
        self.free_list.push(id.idx());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed(x0: f64, y0: f64, x1: f64, y1: f64) -> ElementData {
        ElementData::default().with_bounds(Rect::new(x0, y0, x1, y1))
    }

    #[test]
    fn insert_and_hit_test() {
        let mut doc = Document::new(Rect::new(0.0, 0.0, 200.0, 200.0));
        let body = doc.body();
        let a = doc.insert(Some(body), boxed(10.0, 10.0, 60.0, 60.0));
        let b = doc.insert(Some(body), boxed(40.0, 40.0, 120.0, 120.0));

        let hit = doc.hit_test(Point::new(50.0, 50.0)).unwrap();
        assert_eq!(hit.element, b, "later sibling wins at equal z");
        assert_eq!(hit.path, vec![body, b]);

        doc.set_z_index(a, 5);
        let hit = doc.hit_test(Point::new(50.0, 50.0)).unwrap();
        assert_eq!(hit.element, a, "higher z wins");
    }

    #[test]
    fn hidden_and_unpickable_elements_are_skipped() {
        let mut doc = Document::new(Rect::new(0.0, 0.0, 200.0, 200.0));
        let body = doc.body();
        let overlay = doc.insert(
            Some(body),
            boxed(0.0, 0.0, 200.0, 200.0)
                .with_z_index(100)
                .with_flags(ElementFlags::empty()),
        );
        let panel = doc.insert(Some(overlay), boxed(0.0, 0.0, 50.0, 50.0));
        let under = doc.insert(Some(body), boxed(0.0, 0.0, 100.0, 100.0));

        let hit = doc.hit_test(Point::new(10.0, 10.0)).unwrap();
        assert_eq!(hit.element, panel, "child inherits the overlay stacking context");

        let hit = doc.hit_test(Point::new(80.0, 80.0)).unwrap();
        assert_eq!(hit.element, under, "unpickable overlay lets hits through");

        doc.set_style(panel, "display", "none");
        let hit = doc.hit_test(Point::new(10.0, 10.0)).unwrap();
        assert_eq!(hit.element, under);
        assert!(!doc.is_displayed(panel));
    }

    #[test]
    fn reparent_moves_subtree_and_rejects_cycles() {
        let mut doc = Document::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        let body = doc.body();
        let a = doc.insert(Some(body), ElementData::default());
        let b = doc.insert(Some(body), ElementData::default());
        let leaf = doc.insert(Some(a), ElementData::default());

        assert!(doc.append_child(b, a));
        assert_eq!(doc.path_to_root(leaf), vec![body, b, a, leaf]);
        assert!(!doc.append_child(leaf, b), "cannot move an ancestor under its descendant");
        assert!(doc.children(body).iter().all(|&c| c != a));
    }

    #[test]
    fn element_by_id_ignores_detached_elements() {
        let mut doc = Document::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        let detached = doc.insert(None, ElementData::default());
        doc.set_attribute(detached, ID_ATTR, "menu");
        assert_eq!(doc.element_by_id("menu"), None);

        let body = doc.body();
        doc.append_child(body, detached);
        assert_eq!(doc.element_by_id("menu"), Some(detached));
    }

    #[test]
    fn removed_handles_go_stale() {
        let mut doc = Document::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        let body = doc.body();
        let a = doc.insert(Some(body), ElementData::default());
        let child = doc.insert(Some(a), ElementData::default());
        assert!(doc.focus(child));

        doc.remove(a);
        assert!(!doc.is_alive(a));
        assert!(!doc.is_alive(child));
        assert_eq!(doc.active_element(), None);

        let reused = doc.insert(Some(body), ElementData::default());
        assert_ne!(reused, a);
        assert_ne!(reused, child);
        doc.set_attribute(a, "x", "1");
        assert_eq!(doc.attribute(reused, "x"), None, "stale handle must not alias");
    }

    #[test]
    fn queries_are_pre_order_and_inclusive() {
        let mut doc = Document::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        let body = doc.body();
        let a = doc.insert(Some(body), ElementData::default());
        let a1 = doc.insert(Some(a), ElementData::default());
        let b = doc.insert(Some(body), ElementData::default());
        for e in [a, a1, b] {
            doc.set_attribute(e, "data-x", "");
        }
        assert_eq!(doc.query_attr(body, "data-x"), vec![a, a1, b]);
        assert_eq!(doc.query_attr(a, "data-x"), vec![a, a1]);
        assert_eq!(doc.closest(a1, "data-x"), Some(a1));
        doc.add_class(a, "menu");
        assert_eq!(doc.closest_class(a1, "menu"), Some(a));
        assert!(doc.contains(a, a1));
        assert!(!doc.contains(b, a1));
    }
}
