// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hover popovers with intent delays, driven by pointer moves over the page.
//!
//! A brush past the trigger never opens the tooltip; resting on it does, and
//! the tooltip stays open while the pointer travels into it.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p perch_demos --example hover_intent`

use std::time::Duration;

use kurbo::{Point, Rect};
use perch_dom::{Document, ElementData, ID_ATTR};
use perch_popover::{EngineOptions, Popovers, attrs};
use perch_position::Floating;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut doc = Document::new(Rect::new(0.0, 0.0, 800.0, 600.0));
    let body = doc.body();
    let help = doc.insert(
        Some(body),
        ElementData::new("span").with_bounds(Rect::new(300.0, 300.0, 320.0, 320.0)),
    );
    doc.set_attribute(help, attrs::TRIGGER, "help");
    doc.set_attribute(help, attrs::TYPE, "hover");
    let tip = doc.insert(
        Some(body),
        ElementData::default().with_bounds(Rect::new(0.0, 0.0, 160.0, 60.0)),
    );
    doc.set_attribute(tip, ID_ATTR, "help");
    doc.set_attribute(tip, attrs::PLACEMENT, "top");
    doc.set_style(tip, "display", "none");
    let arrow = doc.insert(
        Some(tip),
        ElementData::default().with_bounds(Rect::new(0.0, 0.0, 10.0, 10.0)),
    );
    doc.set_attribute(arrow, attrs::ARROW, "");

    let mut popovers = Popovers::with_engine(EngineOptions::default(), Floating);
    popovers.init(&mut doc, body);

    let step = |popovers: &mut Popovers, doc: &mut Document, label: &str, at: Point, wait: u64| {
        popovers.pointer_move(doc, at);
        popovers.advance(doc, Duration::from_millis(wait));
        println!("{label:<24} open={}", popovers.is_open("help"));
    };

    step(&mut popovers, &mut doc, "brush past (50 ms)", Point::new(310.0, 310.0), 50);
    step(&mut popovers, &mut doc, "move away", Point::new(10.0, 10.0), 300);
    step(&mut popovers, &mut doc, "rest on trigger", Point::new(310.0, 310.0), 150);

    let b = doc.bounds(tip);
    println!("tooltip at ({}, {}), arrow at ({}, {})", b.x0, b.y0, doc.bounds(arrow).x0, doc.bounds(arrow).y0);

    let inside = b.center();
    step(&mut popovers, &mut doc, "into the tooltip", inside, 500);
    step(&mut popovers, &mut doc, "away from both", Point::new(700.0, 500.0), 200);
    popovers.advance(&mut doc, Duration::from_millis(150));
    println!("hidden after animation: {}", !doc.is_displayed(tip));
}
