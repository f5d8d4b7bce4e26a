// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tags input: free text turned into a list of removable chips, each mirrored
//! by a hidden `<input>` so the tags submit with the form.

use perch_dom::{Document, ElementData, ElementId, Key};
use tracing::debug;

use crate::error::{Result, WidgetError};
use crate::markup::{self, VALUE};

/// Attribute names used by the tags input.
pub mod attrs {
    /// On the root element.
    pub const ROOT: &str = "data-tagsinput";
    /// On the text field new tags are typed into.
    pub const TEXT_INPUT: &str = "data-tagsinput-text-input";
    /// On the element holding one hidden input per tag.
    pub const HIDDEN_INPUTS: &str = "data-tagsinput-hidden-inputs";
    /// On the element holding the chips.
    pub const CONTAINER: &str = "data-tagsinput-container";
    /// On the root: form field name for the hidden inputs.
    pub const NAME: &str = "data-tagsinput-name";
    /// On each chip.
    pub const CHIP: &str = "data-tagsinput-chip";
    /// On a chip's remove button.
    pub const REMOVE: &str = "data-tagsinput-remove";
    /// Set on the root once bound.
    pub const INITIALIZED: &str = "data-tagsinput-initialized";
    /// On the text field: tags cannot be added or removed.
    pub const DISABLED: &str = "disabled";
}

/// A bound tags input.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TagsInput {
    root: ElementId,
    text_input: ElementId,
    hidden_inputs: ElementId,
    chips: ElementId,
}

impl TagsInput {
    /// Resolve the parts of the tags input rooted at `root`.
    pub fn from_root(doc: &Document, root: ElementId) -> Result<Self> {
        let part = |name: &str, what: &'static str| {
            markup::find_attr(doc, root, name).ok_or(WidgetError::MissingElement {
                widget: "tagsinput",
                part: what,
            })
        };
        Ok(Self {
            root,
            text_input: part(attrs::TEXT_INPUT, "text input")?,
            hidden_inputs: part(attrs::HIDDEN_INPUTS, "hidden inputs")?,
            chips: part(attrs::CONTAINER, "chip container")?,
        })
    }

    /// The root element.
    pub fn root(&self) -> ElementId {
        self.root
    }

    /// The text field.
    pub fn text_input(&self) -> ElementId {
        self.text_input
    }

    /// Whether the text field is disabled.
    pub fn is_disabled(&self, doc: &Document) -> bool {
        doc.has_attribute(self.text_input, attrs::DISABLED)
    }

    /// Current tags in insertion order.
    pub fn tags(&self, doc: &Document) -> Vec<String> {
        self.hidden(doc)
            .into_iter()
            .map(|e| markup::input_value(doc, e).to_owned())
            .collect()
    }

    /// Add `value` as a tag after trimming it.
    ///
    /// Empty values are ignored. A value equal to an existing tag, ignoring
    /// case, is not added again, but the text field is still cleared.
    /// Returns `true` if a chip was added.
    pub fn add_tag(&self, doc: &mut Document, value: &str) -> bool {
        if self.is_disabled(doc) {
            return false;
        }
        let tag = value.trim();
        if tag.is_empty() {
            return false;
        }
        let duplicate = self
            .hidden(doc)
            .into_iter()
            .any(|e| markup::input_value(doc, e).to_lowercase() == tag.to_lowercase());
        doc.set_attribute(self.text_input, VALUE, "");
        if duplicate {
            debug!(tag, "duplicate tag ignored");
            return false;
        }

        let chip = doc.insert(Some(self.chips), ElementData::new("div"));
        doc.set_attribute(chip, attrs::CHIP, "");
        let label = doc.insert(Some(chip), ElementData::new("span"));
        doc.set_text(label, tag);
        let remove = doc.insert(Some(chip), ElementData::new("button"));
        doc.set_attribute(remove, "type", "button");
        doc.set_attribute(remove, attrs::REMOVE, "");

        let name = doc.attribute(self.root, attrs::NAME).unwrap_or("").to_owned();
        let input = doc.insert(Some(self.hidden_inputs), ElementData::new("input"));
        doc.set_attribute(input, "type", "hidden");
        doc.set_attribute(input, "name", name);
        doc.set_attribute(input, VALUE, tag);
        true
    }

    /// Remove the chip containing `el` and its hidden input.
    pub fn remove_chip(&self, doc: &mut Document, el: ElementId) -> bool {
        if self.is_disabled(doc) {
            return false;
        }
        let Some(chip) = doc.closest(el, attrs::CHIP).filter(|&c| doc.contains(self.chips, c)) else {
            return false;
        };
        let tag = doc
            .children(chip)
            .iter()
            .find(|&&c| doc.tag(c) == Some("span"))
            .map(|&c| doc.text(c).trim().to_owned())
            .unwrap_or_default();
        if let Some(input) = self
            .hidden(doc)
            .into_iter()
            .find(|&e| markup::input_value(doc, e) == tag)
        {
            doc.remove(input);
        }
        doc.remove(chip);
        true
    }

    /// Remove the tag with exactly this value.
    pub fn remove_tag(&self, doc: &mut Document, value: &str) -> bool {
        let chip = self.chip_list(doc).into_iter().find(|&chip| {
            doc.children(chip)
                .iter()
                .any(|&c| doc.tag(c) == Some("span") && doc.text(c).trim() == value)
        });
        chip.is_some_and(|chip| self.remove_chip(doc, chip))
    }

    /// Keyboard handling for the text field. Returns `true` if the key was used.
    ///
    /// Enter or `,` commits the typed text; Backspace in an empty field removes
    /// the last chip.
    pub fn handle_key(&self, doc: &mut Document, key: Key) -> bool {
        match key {
            Key::Enter | Key::Char(',') => {
                let typed = markup::input_value(doc, self.text_input).to_owned();
                self.add_tag(doc, &typed);
                true
            }
            Key::Backspace if markup::input_value(doc, self.text_input).is_empty() => {
                if let Some(&last) = self.chip_list(doc).last() {
                    self.remove_chip(doc, last);
                }
                true
            }
            _ => false,
        }
    }

    /// Click handling inside the root. Returns `true` if the click was used.
    ///
    /// A remove button drops its chip; anywhere else except an input focuses
    /// the text field.
    pub fn click(&self, doc: &mut Document, target: ElementId) -> bool {
        if !doc.contains(self.root, target) {
            return false;
        }
        if let Some(button) = doc.closest(target, attrs::REMOVE) {
            self.remove_chip(doc, button);
            return true;
        }
        if doc.tag(target) != Some("input") {
            doc.focus(self.text_input);
        }
        true
    }

    /// Drop every tag and clear the text field, as on form reset.
    pub fn reset(&self, doc: &mut Document) {
        for chip in self.chip_list(doc) {
            doc.remove(chip);
        }
        for input in self.hidden(doc) {
            doc.remove(input);
        }
        doc.set_attribute(self.text_input, VALUE, "");
    }

    fn hidden(&self, doc: &Document) -> Vec<ElementId> {
        doc.children(self.hidden_inputs)
            .iter()
            .copied()
            .filter(|&e| doc.tag(e) == Some("input") && doc.attribute(e, "type") == Some("hidden"))
            .collect()
    }

    fn chip_list(&self, doc: &Document) -> Vec<ElementId> {
        doc.query(self.chips, |d, e| d.has_attribute(e, attrs::CHIP))
    }
}

/// Bind every tags input under `root` (inclusive) not yet initialised.
pub fn init(doc: &mut Document, root: ElementId) -> Vec<TagsInput> {
    let roots = doc.query(root, |d, e| {
        d.has_attribute(e, attrs::ROOT) && !d.has_attribute(e, attrs::INITIALIZED)
    });
    let mut bound = Vec::new();
    for el in roots {
        doc.set_attribute(el, attrs::INITIALIZED, "true");
        match TagsInput::from_root(doc, el) {
            Ok(tags) => bound.push(tags),
            Err(err) => debug!(root = ?el, %err, "skipping tags input"),
        }
    }
    bound
}

#[cfg(test)]
mod tests {
    use kurbo::Rect;

    use super::*;

    fn fixture() -> (Document, TagsInput) {
        let mut doc = Document::new(Rect::new(0.0, 0.0, 400.0, 300.0));
        let body = doc.body();
        let root = doc.insert(Some(body), ElementData::default());
        doc.set_attribute(root, attrs::ROOT, "");
        doc.set_attribute(root, attrs::NAME, "labels");
        let chips = doc.insert(Some(root), ElementData::default());
        doc.set_attribute(chips, attrs::CONTAINER, "");
        let text = doc.insert(Some(root), ElementData::new("input"));
        doc.set_attribute(text, attrs::TEXT_INPUT, "");
        let hidden = doc.insert(Some(root), ElementData::default());
        doc.set_attribute(hidden, attrs::HIDDEN_INPUTS, "");
        let bound = init(&mut doc, body);
        assert_eq!(bound.len(), 1, "one tags input bound");
        (doc, bound[0])
    }

    fn type_text(doc: &mut Document, tags: &TagsInput, text: &str) {
        doc.set_attribute(tags.text_input(), VALUE, text);
    }

    #[test]
    fn enter_and_comma_commit_trimmed_tags() {
        let (mut doc, tags) = fixture();
        type_text(&mut doc, &tags, "  rust ");
        assert!(tags.handle_key(&mut doc, Key::Enter));
        type_text(&mut doc, &tags, "web");
        assert!(tags.handle_key(&mut doc, Key::Char(',')));
        assert_eq!(tags.tags(&doc), vec!["rust".to_owned(), "web".to_owned()]);
        assert_eq!(markup::input_value(&doc, tags.text_input()), "");

        let hidden = doc.query(tags.root(), |d, e| d.attribute(e, "name") == Some("labels"));
        assert_eq!(hidden.len(), 2);
    }

    #[test]
    fn duplicates_are_case_insensitive() {
        let (mut doc, tags) = fixture();
        assert!(tags.add_tag(&mut doc, "Rust"));
        type_text(&mut doc, &tags, "rUST");
        tags.handle_key(&mut doc, Key::Enter);
        assert_eq!(tags.tags(&doc), vec!["Rust".to_owned()]);
        assert_eq!(markup::input_value(&doc, tags.text_input()), "", "field cleared anyway");
        assert!(!tags.add_tag(&mut doc, "   "));
    }

    #[test]
    fn backspace_on_empty_field_removes_last() {
        let (mut doc, tags) = fixture();
        tags.add_tag(&mut doc, "a");
        tags.add_tag(&mut doc, "b");
        type_text(&mut doc, &tags, "x");
        assert!(!tags.handle_key(&mut doc, Key::Backspace), "text is edited, not tags");
        type_text(&mut doc, &tags, "");
        assert!(tags.handle_key(&mut doc, Key::Backspace));
        assert_eq!(tags.tags(&doc), vec!["a".to_owned()]);
    }

    #[test]
    fn remove_button_and_focus_clicks() {
        let (mut doc, tags) = fixture();
        tags.add_tag(&mut doc, "a");
        tags.add_tag(&mut doc, "b");
        let remove = doc.query_attr(tags.root(), attrs::REMOVE)[0];
        assert!(tags.click(&mut doc, remove));
        assert_eq!(tags.tags(&doc), vec!["b".to_owned()]);

        assert!(tags.click(&mut doc, tags.root()));
        assert_eq!(doc.active_element(), Some(tags.text_input()));
        assert!(tags.remove_tag(&mut doc, "b"));
        assert!(tags.tags(&doc).is_empty());
    }

    #[test]
    fn disabled_blocks_edits() {
        let (mut doc, tags) = fixture();
        tags.add_tag(&mut doc, "keep");
        doc.set_attribute(tags.text_input(), attrs::DISABLED, "");
        assert!(!tags.add_tag(&mut doc, "new"));
        assert!(!tags.remove_tag(&mut doc, "keep"));
        assert_eq!(tags.tags(&doc), vec!["keep".to_owned()]);
    }

    #[test]
    fn reset_clears_everything() {
        let (mut doc, tags) = fixture();
        tags.add_tag(&mut doc, "a");
        type_text(&mut doc, &tags, "draft");
        tags.reset(&mut doc);
        assert!(tags.tags(&doc).is_empty());
        assert!(doc.query_attr(tags.root(), attrs::CHIP).is_empty());
        assert_eq!(markup::input_value(&doc, tags.text_input()), "");
    }
}
