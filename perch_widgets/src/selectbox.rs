// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Select box: a trigger button whose list of items lives in popover content.
//!
//! The trigger names its list with `data-selectbox-content-id`; the list is the
//! popover content with that `id`, so the trigger normally also carries
//! `data-popover-trigger` with the same value. The selection is kept on the
//! items themselves (`data-selectbox-selected`) and projected into the
//! trigger's `.select-value` element and its hidden `<input>`.

use perch_dom::{Document, ElementData, ElementId, ID_ATTR, Key};
use perch_popover::Popovers;
use tracing::debug;

use crate::error::{Result, WidgetError};
use crate::markup::{self, VALUE};

/// Attribute names read and written by the select box.
pub mod attrs {
    /// On the trigger: `id` of the item list.
    pub const CONTENT_ID: &str = "data-selectbox-content-id";
    /// On the trigger: `"true"` allows several selected items.
    pub const MULTIPLE: &str = "data-selectbox-multiple";
    /// On the trigger: `"true"` renders the selection as removable pills.
    pub const SHOW_PILLS: &str = "data-selectbox-show-pills";
    /// On the trigger: summary template, `{n}` is replaced by the count.
    pub const SELECTED_COUNT_TEXT: &str = "data-selectbox-selected-count-text";
    /// On the trigger: set once the display has been initialised.
    pub const SETUP: &str = "data-selectbox-setup";
    /// On an item: submitted value.
    pub const VALUE: &str = "data-selectbox-value";
    /// On an item: `"true"` when selected.
    pub const SELECTED: &str = "data-selectbox-selected";
    /// On an item: `"true"` when it cannot be chosen.
    pub const DISABLED: &str = "data-selectbox-disabled";
    /// On the search input inside the list.
    pub const SEARCH: &str = "data-selectbox-search";
    /// On a pill's remove button.
    pub const PILL_REMOVE: &str = "data-selectbox-pill-remove";
    /// On the value element: text shown when nothing is selected.
    pub const PLACEHOLDER: &str = "data-placeholder";
}

/// Class names the select box relies on.
pub mod classes {
    /// A selectable item in the list.
    pub const ITEM: &str = "select-item";
    /// The label inside an item.
    pub const ITEM_TEXT: &str = "select-item-text";
    /// The value display inside the trigger.
    pub const VALUE: &str = "select-value";
    /// A rendered pill.
    pub const PILL: &str = "select-pill";
    /// Applied to the value display while the placeholder is shown.
    pub const MUTED: &str = "text-muted-foreground";
    /// Applied to selected items and to the hovered item.
    pub const SELECTED: &str = "bg-accent";
}

const DEFAULT_PLACEHOLDER: &str = "Select...";
const DEFAULT_COUNT_TEXT: &str = "{n} items selected";
/// With pills enabled, more selections than this collapse into the count text.
const MAX_PILLS: usize = 3;

/// A bound select box.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SelectBox {
    trigger: ElementId,
    content: ElementId,
    value: ElementId,
}

impl SelectBox {
    /// Resolve the parts of the select box rooted at `trigger`.
    pub fn from_trigger(doc: &Document, trigger: ElementId) -> Result<Self> {
        let missing = |part| WidgetError::MissingElement {
            widget: "selectbox",
            part,
        };
        let content = doc
            .attribute(trigger, attrs::CONTENT_ID)
            .and_then(|id| doc.element_by_id(id))
            .ok_or(missing("content"))?;
        let value = markup::find_class(doc, trigger, classes::VALUE).ok_or(missing("value display"))?;
        Ok(Self {
            trigger,
            content,
            value,
        })
    }

    /// The select box owning `el`, where `el` is an item, a pill, or anything
    /// else inside the list or the trigger.
    pub fn containing(doc: &Document, el: ElementId) -> Option<Self> {
        let trigger = match doc.closest(el, attrs::CONTENT_ID) {
            Some(trigger) => trigger,
            None => doc.path_to_root(el).into_iter().rev().find_map(|e| {
                let id = doc.attribute(e, ID_ATTR)?;
                doc.query(doc.body(), |d, t| d.attribute(t, attrs::CONTENT_ID) == Some(id))
                    .into_iter()
                    .next()
            })?,
        };
        Self::from_trigger(doc, trigger).ok()
    }

    /// The trigger button.
    pub fn trigger(&self) -> ElementId {
        self.trigger
    }

    /// The item list (popover content).
    pub fn content(&self) -> ElementId {
        self.content
    }

    /// Popover identifier of the item list.
    pub fn popover_id<'a>(&self, doc: &'a Document) -> Option<&'a str> {
        doc.attribute(self.content, ID_ATTR)
    }

    /// Whether several items may be selected.
    pub fn is_multiple(&self, doc: &Document) -> bool {
        markup::flag(doc, self.trigger, attrs::MULTIPLE)
    }

    /// All items in document order.
    pub fn items(&self, doc: &Document) -> Vec<ElementId> {
        doc.query(self.content, |d, e| d.has_class(e, classes::ITEM))
    }

    /// Items not hidden by the search filter.
    pub fn visible_items(&self, doc: &Document) -> Vec<ElementId> {
        self.items(doc)
            .into_iter()
            .filter(|&e| doc.style(e, "display") != Some("none"))
            .collect()
    }

    /// Selected items in document order.
    pub fn selected_items(&self, doc: &Document) -> Vec<ElementId> {
        self.items(doc)
            .into_iter()
            .filter(|&e| markup::flag(doc, e, attrs::SELECTED))
            .collect()
    }

    /// Values of the selected items.
    pub fn selected_values(&self, doc: &Document) -> Vec<String> {
        self.selected_items(doc)
            .into_iter()
            .map(|e| doc.attribute(e, attrs::VALUE).unwrap_or("").to_owned())
            .collect()
    }

    /// Render the selection into the value display and the hidden input.
    pub fn update_display(&self, doc: &mut Document) {
        let selected = self.selected_items(doc);
        let input = markup::hidden_input(doc, self.trigger);
        markup::clear_children(doc, self.value);

        if selected.is_empty() {
            let placeholder = doc
                .attribute(self.value, attrs::PLACEHOLDER)
                .unwrap_or(DEFAULT_PLACEHOLDER)
                .to_owned();
            doc.set_text(self.value, placeholder);
            doc.add_class(self.value, classes::MUTED);
            if let Some(input) = input {
                doc.set_attribute(input, VALUE, "");
            }
            return;
        }
        doc.remove_class(self.value, classes::MUTED);

        let values = self.selected_values(doc);
        if !self.is_multiple(doc) {
            let text = item_text(doc, selected[0]);
            doc.set_text(self.value, text);
            if let Some(input) = input {
                doc.set_attribute(input, VALUE, values[0].as_str());
            }
            return;
        }

        let pills = markup::flag(doc, self.trigger, attrs::SHOW_PILLS);
        if pills && selected.len() <= MAX_PILLS {
            doc.set_text(self.value, "");
            for (&item, value) in selected.iter().zip(&values) {
                let text = item_text(doc, item);
                let pill = doc.insert(Some(self.value), ElementData::new("span"));
                doc.add_class(pill, classes::PILL);
                doc.set_text(pill, text);
                let remove = doc.insert(Some(pill), ElementData::new("button"));
                doc.set_attribute(remove, "type", "button");
                doc.set_attribute(remove, attrs::PILL_REMOVE, "");
                doc.set_attribute(remove, attrs::VALUE, value.as_str());
                doc.set_text(remove, "×");
            }
        } else {
            let template = doc
                .attribute(self.trigger, attrs::SELECTED_COUNT_TEXT)
                .unwrap_or(DEFAULT_COUNT_TEXT);
            let summary = template.replace("{n}", &selected.len().to_string());
            doc.set_text(self.value, summary);
        }
        if let Some(input) = input {
            doc.set_attribute(input, VALUE, values.join(","));
        }
    }

    /// Flip the selection state of `item`.
    ///
    /// In single mode every other item is deselected first, and the list
    /// closes with focus returning to the trigger. Disabled items are ignored.
    pub fn toggle_item(&self, doc: &mut Document, popovers: &mut Popovers, item: ElementId) {
        if markup::flag(doc, item, attrs::DISABLED) || !doc.contains(self.content, item) {
            return;
        }
        let multiple = self.is_multiple(doc);
        let was_selected = markup::flag(doc, item, attrs::SELECTED);
        if !multiple {
            for other in self.items(doc) {
                set_selected(doc, other, false);
            }
        }
        set_selected(doc, item, !was_selected);
        self.update_display(doc);
        debug!(?item, selected = !was_selected, "selectbox item toggled");

        if !multiple {
            if let Some(id) = self.popover_id(doc).map(str::to_owned) {
                popovers.close(doc, &id, false);
            }
            doc.focus(self.trigger);
        }
    }

    /// Deselect the item behind a pill's remove button.
    pub fn remove_pill(&self, doc: &mut Document, popovers: &mut Popovers, button: ElementId) {
        let Some(value) = doc.attribute(button, attrs::VALUE).map(str::to_owned) else {
            return;
        };
        let item = self
            .items(doc)
            .into_iter()
            .find(|&e| doc.attribute(e, attrs::VALUE) == Some(value.as_str()));
        if let Some(item) = item {
            self.toggle_item(doc, popovers, item);
        }
    }

    /// Show only items whose label or value contains `term`, ignoring case.
    ///
    /// An empty term shows every item.
    pub fn filter_items(&self, doc: &mut Document, term: &str) {
        let term = term.trim().to_lowercase();
        for item in self.items(doc) {
            let text = item_text(doc, item).to_lowercase();
            let value = doc.attribute(item, attrs::VALUE).unwrap_or("").to_lowercase();
            if term.is_empty() || text.contains(&term) || value.contains(&term) {
                doc.remove_style(item, "display");
            } else {
                doc.set_style(item, "display", "none");
            }
        }
    }

    /// Move focus among visible items, wrapping at either end.
    ///
    /// Starts at the first item when focus is not on an item. Returns the
    /// newly focused item.
    pub fn navigate(&self, doc: &mut Document, down: bool) -> Option<ElementId> {
        let visible = self.visible_items(doc);
        if visible.is_empty() {
            return None;
        }
        let n = visible.len();
        let next = match doc
            .active_element()
            .and_then(|a| visible.iter().position(|&e| e == a))
        {
            Some(i) if down => (i + 1) % n,
            Some(i) => (i + n - 1) % n,
            None => 0,
        };
        doc.focus(visible[next]);
        Some(visible[next])
    }

    /// Highlight `item` as hovered and clear the highlight from every other
    /// unselected item. Disabled items are ignored; a selected item keeps its
    /// look. Returns `false` if `item` was ignored.
    pub fn hover_item(&self, doc: &mut Document, item: ElementId) -> bool {
        if markup::flag(doc, item, attrs::DISABLED) || !doc.contains(self.content, item) {
            return false;
        }
        for other in self.items(doc) {
            if !markup::flag(doc, other, attrs::SELECTED) {
                doc.remove_class(other, classes::SELECTED);
            }
        }
        if !markup::flag(doc, item, attrs::SELECTED) {
            doc.add_class(item, classes::SELECTED);
        }
        true
    }

    /// Keyboard handling for the focused element. Returns `true` if the key was used.
    ///
    /// - Typing on the focused trigger opens the list and starts a search.
    /// - Arrow keys move among visible items.
    /// - Enter toggles the focused item.
    /// - Escape on an item returns to the search field; Escape in the search
    ///   field closes the list and refocuses the trigger.
    pub fn handle_key(&self, doc: &mut Document, popovers: &mut Popovers, key: Key) -> bool {
        let Some(active) = doc.active_element() else {
            return false;
        };
        let search = markup::find_attr(doc, self.content, attrs::SEARCH);

        if active == self.trigger {
            let typed = match key {
                Key::Char(c) => Some(c.to_string()),
                Key::Backspace => Some(String::new()),
                _ => None,
            };
            let Some(typed) = typed else {
                return false;
            };
            if let Some(id) = self.popover_id(doc).map(str::to_owned) {
                popovers.open(doc, &id);
            }
            if let Some(search) = search {
                doc.focus(search);
                doc.set_attribute(search, VALUE, typed.as_str());
                self.filter_items(doc, &typed);
            }
            return true;
        }

        if !doc.contains(self.content, active) {
            return false;
        }
        match key {
            Key::ArrowDown | Key::ArrowUp => self.navigate(doc, key == Key::ArrowDown).is_some(),
            Key::Enter if doc.has_class(active, classes::ITEM) => {
                self.toggle_item(doc, popovers, active);
                true
            }
            Key::Escape if doc.has_class(active, classes::ITEM) => {
                if let Some(search) = search {
                    doc.focus(search);
                }
                true
            }
            Key::Escape if Some(active) == search => {
                if let Some(id) = self.popover_id(doc).map(str::to_owned) {
                    popovers.close(doc, &id, false);
                }
                doc.focus(self.trigger);
                true
            }
            _ => false,
        }
    }

    /// Clear the selection and the search, as on form reset.
    pub fn reset(&self, doc: &mut Document) {
        for item in self.items(doc) {
            set_selected(doc, item, false);
        }
        if let Some(search) = markup::find_attr(doc, self.content, attrs::SEARCH) {
            doc.set_attribute(search, VALUE, "");
        }
        self.filter_items(doc, "");
        self.update_display(doc);
    }
}

/// Set up every select box trigger under `root` (inclusive) that has not been
/// set up yet, rendering its initial display.
pub fn init(doc: &mut Document, root: ElementId) -> Vec<SelectBox> {
    let triggers = doc.query(root, |d, e| {
        d.has_attribute(e, attrs::CONTENT_ID) && !d.has_attribute(e, attrs::SETUP)
    });
    let mut bound = Vec::new();
    for trigger in triggers {
        match SelectBox::from_trigger(doc, trigger) {
            Ok(select) => {
                doc.set_attribute(trigger, attrs::SETUP, "true");
                select.update_display(doc);
                bound.push(select);
            }
            Err(err) => debug!(?trigger, %err, "skipping selectbox"),
        }
    }
    bound
}

/// Route a click on `target` to the select box it belongs to.
///
/// Handles pill removal and item toggling. Returns `true` if the click was
/// consumed and should not reach the popover engine.
pub fn click(doc: &mut Document, popovers: &mut Popovers, target: ElementId) -> bool {
    if let Some(button) = doc.closest(target, attrs::PILL_REMOVE) {
        if let Some(select) = SelectBox::containing(doc, button) {
            select.remove_pill(doc, popovers, button);
        }
        return true;
    }
    if let Some(item) = doc.closest_class(target, classes::ITEM)
        && let Some(select) = SelectBox::containing(doc, item)
    {
        select.toggle_item(doc, popovers, item);
        return true;
    }
    false
}

fn item_text(doc: &Document, item: ElementId) -> String {
    markup::find_class(doc, item, classes::ITEM_TEXT)
        .map(|t| doc.text(t).to_owned())
        .unwrap_or_default()
}

fn set_selected(doc: &mut Document, item: ElementId, selected: bool) {
    doc.set_attribute(item, attrs::SELECTED, if selected { "true" } else { "false" });
    if selected {
        doc.add_class(item, classes::SELECTED);
    } else {
        doc.remove_class(item, classes::SELECTED);
    }
}

/// Route a pointer moving over `target` to the select box it belongs to,
/// highlighting the item under it. Returns `true` if an item was highlighted.
pub fn pointer_over(doc: &mut Document, target: ElementId) -> bool {
    let Some(item) = doc.closest_class(target, classes::ITEM) else {
        return false;
    };
    SelectBox::containing(doc, item).is_some_and(|select| select.hover_item(doc, item))
}
