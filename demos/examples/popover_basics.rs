// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Click popovers: open, switch, and dismiss.
//!
//! Two menu buttons share a toolbar. Opening one closes the other, Escape plays
//! the exit animation, and a click elsewhere on the page dismisses.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p perch_demos --example popover_basics`

use std::time::Duration;

use kurbo::Rect;
use perch_dom::{Document, ElementData, ElementId, ID_ATTR, Key};
use perch_popover::{EngineOptions, Popovers, attrs};
use perch_position::Floating;
use tracing_subscriber::EnvFilter;

fn menu(doc: &mut Document, id: &str, at: Rect) -> (ElementId, ElementId) {
    let body = doc.body();
    let button = doc.insert(Some(body), ElementData::new("button").with_bounds(at));
    doc.set_attribute(button, attrs::TRIGGER, id);
    let content = doc.insert(
        Some(body),
        ElementData::default().with_bounds(Rect::new(0.0, 0.0, 180.0, 120.0)),
    );
    doc.set_attribute(content, ID_ATTR, id);
    doc.set_attribute(content, attrs::PLACEMENT, "bottom-start");
    doc.set_style(content, "display", "none");
    (button, content)
}

fn report(doc: &Document, popovers: &Popovers, content: ElementId, label: &str) {
    let id = doc.attribute(content, ID_ATTR).unwrap_or("?");
    let b = doc.bounds(content);
    println!(
        "{label:<28} {id:<6} phase={:?} displayed={} at=({}, {})",
        popovers.phase(id),
        doc.is_displayed(content),
        b.x0,
        b.y0
    );
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut doc = Document::new(Rect::new(0.0, 0.0, 1024.0, 768.0));
    let (file, file_menu) = menu(&mut doc, "file", Rect::new(10.0, 10.0, 70.0, 36.0));
    let (edit, edit_menu) = menu(&mut doc, "edit", Rect::new(80.0, 10.0, 140.0, 36.0));
    let body = doc.body();
    let canvas = doc.insert(
        Some(body),
        ElementData::new("main").with_bounds(Rect::new(0.0, 50.0, 1024.0, 768.0)),
    );

    let mut popovers = Popovers::with_engine(EngineOptions::default(), Floating);
    println!("bound {} triggers", popovers.init(&mut doc, body));

    popovers.click(&mut doc, file);
    report(&doc, &popovers, file_menu, "click file");

    popovers.click(&mut doc, edit);
    report(&doc, &popovers, file_menu, "click edit");
    report(&doc, &popovers, edit_menu, "");

    popovers.key_down(&mut doc, Key::Escape);
    report(&doc, &popovers, edit_menu, "escape");
    popovers.advance(&mut doc, Duration::from_millis(150));
    report(&doc, &popovers, edit_menu, "after exit animation");

    popovers.click(&mut doc, file);
    popovers.click(&mut doc, canvas);
    report(&doc, &popovers, file_menu, "reopen, click away");
    popovers.advance(&mut doc, Duration::from_millis(150));
    report(&doc, &popovers, file_menu, "after exit animation");
}
