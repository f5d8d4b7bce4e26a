// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Small queries over widget markup shared by the widget modules.

use perch_dom::{Document, ElementId};

/// Attribute holding an input's current value.
pub(crate) const VALUE: &str = "value";

/// `true` when attribute `name` reads exactly `"true"`.
pub(crate) fn flag(doc: &Document, el: ElementId, name: &str) -> bool {
    doc.attribute(el, name) == Some("true")
}

/// First descendant of `root` (exclusive) carrying attribute `name`.
pub(crate) fn find_attr(doc: &Document, root: ElementId, name: &str) -> Option<ElementId> {
    doc.query_attr(root, name).into_iter().find(|&e| e != root)
}

/// First descendant of `root` (exclusive) carrying class `class`.
pub(crate) fn find_class(doc: &Document, root: ElementId, class: &str) -> Option<ElementId> {
    doc.query(root, |d, e| e != root && d.has_class(e, class))
        .into_iter()
        .next()
}

/// First `<input type="hidden">` under `root` (exclusive).
pub(crate) fn hidden_input(doc: &Document, root: ElementId) -> Option<ElementId> {
    doc.query(root, |d, e| {
        e != root && d.tag(e) == Some("input") && d.attribute(e, "type") == Some("hidden")
    })
    .into_iter()
    .next()
}

/// Current value of an input element, empty when unset.
pub(crate) fn input_value(doc: &Document, input: ElementId) -> &str {
    doc.attribute(input, VALUE).unwrap_or("")
}

/// Remove every child of `el`.
pub(crate) fn clear_children(doc: &mut Document, el: ElementId) {
    for child in doc.children(el).to_vec() {
        doc.remove(child);
    }
}
