// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A select box whose item list is a popover.
//!
//! Clicks go to the widget first and fall through to the popover engine when
//! the widget does not consume them, which is how a host would wire the two.
//!
//! Run:
//! - `cargo run -p perch_demos --example selectbox_basics`

use kurbo::Rect;
use perch_dom::{Document, ElementData, ElementId, ID_ATTR, Key};
use perch_popover::{EngineOptions, Popovers, attrs};
use perch_position::Floating;
use perch_widgets::selectbox::{self, SelectBox};
use tracing_subscriber::EnvFilter;

fn build(doc: &mut Document) -> ElementId {
    let body = doc.body();
    let trigger = doc.insert(
        Some(body),
        ElementData::new("button").with_bounds(Rect::new(40.0, 40.0, 240.0, 72.0)),
    );
    doc.set_attribute(trigger, attrs::TRIGGER, "langs");
    doc.set_attribute(trigger, selectbox::attrs::CONTENT_ID, "langs");
    let value = doc.insert(Some(trigger), ElementData::new("span"));
    doc.add_class(value, selectbox::classes::VALUE);
    let input = doc.insert(Some(trigger), ElementData::new("input"));
    doc.set_attribute(input, "type", "hidden");

    let list = doc.insert(
        Some(body),
        ElementData::default().with_bounds(Rect::new(0.0, 0.0, 200.0, 160.0)),
    );
    doc.set_attribute(list, ID_ATTR, "langs");
    doc.set_attribute(list, attrs::MATCH_WIDTH, "true");
    doc.set_style(list, "display", "none");
    let search = doc.insert(Some(list), ElementData::new("input"));
    doc.set_attribute(search, selectbox::attrs::SEARCH, "");
    for (value, label) in [("rs", "Rust"), ("go", "Go"), ("zig", "Zig")] {
        let item = doc.insert(Some(list), ElementData::default());
        doc.add_class(item, selectbox::classes::ITEM);
        doc.set_attribute(item, selectbox::attrs::VALUE, value);
        let text = doc.insert(Some(item), ElementData::new("span"));
        doc.add_class(text, selectbox::classes::ITEM_TEXT);
        doc.set_text(text, label);
    }
    trigger
}

fn click(doc: &mut Document, popovers: &mut Popovers, target: ElementId) {
    if !selectbox::click(doc, popovers, target) {
        popovers.click(doc, target);
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut doc = Document::new(Rect::new(0.0, 0.0, 800.0, 600.0));
    let trigger = build(&mut doc);
    let body = doc.body();
    let mut popovers = Popovers::with_engine(EngineOptions::default(), Floating);
    popovers.init(&mut doc, body);
    let Some(select) = selectbox::init(&mut doc, body).first().copied() else {
        eprintln!("select box markup is incomplete");
        return;
    };
    let show = |doc: &Document, select: &SelectBox, label: &str| {
        println!("{label:<22} {:?}", select.selected_values(doc));
    };

    click(&mut doc, &mut popovers, trigger);
    println!("list open: {}", popovers.is_open("langs"));

    doc.focus(trigger);
    select.handle_key(&mut doc, &mut popovers, Key::Char('z'));
    println!("visible after 'z': {}", select.visible_items(&doc).len());
    select.handle_key(&mut doc, &mut popovers, Key::ArrowDown);
    select.handle_key(&mut doc, &mut popovers, Key::Enter);
    show(&doc, &select, "picked with keyboard");
    println!("list open: {}", popovers.is_open("langs"));

    select.reset(&mut doc);
    show(&doc, &select, "after reset");
}
