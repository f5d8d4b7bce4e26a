// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Adapter between popover state and the positioning engine.

use kurbo::Point;
use perch_dom::{Document, ElementId};
use perch_position::{
    ComputeRequest, Computed, Middleware, PositionError, PositioningEngine, Side,
};

use crate::config::{EngineOptions, PopoverConfig, attrs};

/// The element to anchor to: the largest child of `trigger` by area, or the
/// trigger itself when it has no child with a non-empty box.
pub(crate) fn reference_element(doc: &Document, trigger: ElementId) -> ElementId {
    let mut best = trigger;
    let mut largest = 0.0;
    for &child in doc.children(trigger) {
        let area = doc.bounds(child).area();
        if area > largest {
            largest = area;
            best = child;
        }
    }
    best
}

/// The arrow element declared inside `content`, if any.
pub(crate) fn arrow_element(doc: &Document, content: ElementId) -> Option<ElementId> {
    doc.query_attr(content, attrs::ARROW)
        .into_iter()
        .find(|&a| a != content)
}

/// Compute and apply the position of `content` relative to `trigger`.
///
/// On error the document is left untouched.
pub(crate) fn place(
    doc: &mut Document,
    engine: &dyn PositioningEngine,
    trigger: ElementId,
    content: ElementId,
    config: &PopoverConfig,
    options: &EngineOptions,
) -> Result<Computed, PositionError> {
    let reference_el = reference_element(doc, trigger);
    let reference = doc.bounds(reference_el);
    let arrow = arrow_element(doc, content);

    let offset = config.offset.unwrap_or(if arrow.is_some() {
        options.arrow_offset
    } else {
        options.offset
    });
    let mut middleware = vec![
        Middleware::Offset(offset),
        Middleware::Flip {
            padding: options.collision_padding,
        },
        Middleware::Shift {
            padding: options.collision_padding,
        },
    ];
    if let Some(arrow) = arrow {
        middleware.push(Middleware::Arrow {
            size: doc.bounds(arrow).size(),
            padding: options.arrow_padding,
        });
    }

    let computed = engine.compute(&ComputeRequest {
        reference,
        floating: doc.bounds(content).size(),
        viewport: doc.viewport(),
        placement: config.placement,
        middleware: &middleware,
    })?;

    doc.move_to(content, computed.origin());
    doc.set_style(content, "left", px(computed.x));
    doc.set_style(content, "top", px(computed.y));
    if config.match_width {
        doc.set_style(content, attrs::WIDTH_PROPERTY, px(reference.width()));
    }
    if let Some(arrow) = arrow {
        style_arrow(doc, content, arrow, &computed, options.arrow_inset);
    }
    Ok(computed)
}

/// Offset the arrow from the middleware output and fuse it visually with the content box.
fn style_arrow(
    doc: &mut Document,
    content: ElementId,
    arrow: ElementId,
    computed: &Computed,
    inset: f64,
) {
    let Some(data) = computed.data.arrow else {
        return;
    };
    let static_side = computed.placement.side.opposite();

    for side in ["left", "top", "right", "bottom"] {
        doc.remove_style(arrow, side);
    }
    if let Some(x) = data.x {
        doc.set_style(arrow, "left", px(x));
    }
    if let Some(y) = data.y {
        doc.set_style(arrow, "top", px(y));
    }
    doc.set_style(arrow, static_side.as_str(), px(-inset));

    // Page-space box: cross axis from the middleware, main axis poking out by `inset`.
    let host = doc.bounds(content);
    let size = doc.bounds(arrow).size();
    let origin = match static_side {
        Side::Top => Point::new(host.x0 + data.x.unwrap_or(0.0), host.y0 - inset),
        Side::Bottom => Point::new(
            host.x0 + data.x.unwrap_or(0.0),
            host.y1 + inset - size.height,
        ),
        Side::Left => Point::new(host.x0 - inset, host.y0 + data.y.unwrap_or(0.0)),
        Side::Right => Point::new(
            host.x1 + inset - size.width,
            host.y0 + data.y.unwrap_or(0.0),
        ),
    };
    doc.move_to(arrow, origin);

    if let Some(background) = doc.style(content, "background-color").map(str::to_owned) {
        doc.set_style(arrow, "background-color", background);
    }
    let border = doc
        .style(content, "border-color")
        .unwrap_or("currentcolor")
        .to_owned();
    let transparent = match static_side {
        Side::Top => ["bottom", "right"],
        Side::Bottom => ["top", "left"],
        Side::Left => ["top", "right"],
        Side::Right => ["bottom", "left"],
    };
    for edge in ["top", "right", "bottom", "left"] {
        let color = if transparent.contains(&edge) {
            "transparent"
        } else {
            border.as_str()
        };
        doc.set_style(arrow, &format!("border-{edge}-color"), color);
    }
}

fn px(v: f64) -> String {
    format!("{v}px")
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Rect;
    use perch_dom::ElementData;
    use perch_position::Floating;

    fn page() -> Document {
        Document::new(Rect::new(0.0, 0.0, 800.0, 600.0))
    }

    #[test]
    fn largest_child_is_the_reference() {
        let mut doc = page();
        let body = doc.body();
        let wrapper = doc.insert(Some(body), ElementData::default());
        let _icon = doc.insert(
            Some(wrapper),
            ElementData::default().with_bounds(Rect::new(0.0, 0.0, 10.0, 10.0)),
        );
        let button = doc.insert(
            Some(wrapper),
            ElementData::default().with_bounds(Rect::new(0.0, 0.0, 80.0, 30.0)),
        );
        assert_eq!(reference_element(&doc, wrapper), button);

        let empty = doc.insert(Some(body), ElementData::default());
        let _zero = doc.insert(Some(empty), ElementData::default());
        assert_eq!(reference_element(&doc, empty), empty, "zero-area children are ignored");
    }

    #[test]
    fn places_below_with_default_offset_and_width() {
        let mut doc = page();
        let body = doc.body();
        let trigger = doc.insert(
            Some(body),
            ElementData::new("button").with_bounds(Rect::new(100.0, 100.0, 200.0, 130.0)),
        );
        let content = doc.insert(
            Some(body),
            ElementData::default().with_bounds(Rect::new(0.0, 0.0, 80.0, 40.0)),
        );
        let config = PopoverConfig {
            match_width: true,
            ..PopoverConfig::default()
        };
        let computed = place(
            &mut doc,
            &Floating,
            trigger,
            content,
            &config,
            &EngineOptions::default(),
        )
        .unwrap();
        assert_eq!(computed.origin(), Point::new(110.0, 134.0));
        assert_eq!(doc.bounds(content).origin(), Point::new(110.0, 134.0));
        assert_eq!(doc.style(content, "top"), Some("134px"));
        assert_eq!(doc.style(content, attrs::WIDTH_PROPERTY), Some("100px"));
    }

    #[test]
    fn arrow_fuses_with_content() {
        let mut doc = page();
        let body = doc.body();
        let trigger = doc.insert(
            Some(body),
            ElementData::new("button").with_bounds(Rect::new(100.0, 100.0, 200.0, 130.0)),
        );
        let content = doc.insert(
            Some(body),
            ElementData::default().with_bounds(Rect::new(0.0, 0.0, 80.0, 40.0)),
        );
        doc.set_style(content, "background-color", "white");
        doc.set_style(content, "border-color", "gray");
        let arrow = doc.insert(
            Some(content),
            ElementData::default().with_bounds(Rect::new(0.0, 0.0, 10.0, 10.0)),
        );
        doc.set_attribute(arrow, attrs::ARROW, "");

        let computed = place(
            &mut doc,
            &Floating,
            trigger,
            content,
            &PopoverConfig::default(),
            &EngineOptions::default(),
        )
        .unwrap();
        assert_eq!(computed.y, 138.0, "arrow uses the larger default offset");
        assert_eq!(doc.style(arrow, "top"), Some("-5px"));
        assert_eq!(doc.style(arrow, "background-color"), Some("white"));
        assert_eq!(doc.style(arrow, "border-top-color"), Some("gray"));
        assert_eq!(doc.style(arrow, "border-left-color"), Some("gray"));
        assert_eq!(doc.style(arrow, "border-bottom-color"), Some("transparent"));
        assert_eq!(doc.style(arrow, "border-right-color"), Some("transparent"));
        assert_eq!(doc.bounds(arrow).y0, 133.0);
    }

    #[test]
    fn arrow_on_the_left_edge_for_right_placement() {
        let mut doc = page();
        let body = doc.body();
        let trigger = doc.insert(
            Some(body),
            ElementData::new("button").with_bounds(Rect::new(100.0, 100.0, 200.0, 130.0)),
        );
        let content = doc.insert(
            Some(body),
            ElementData::default().with_bounds(Rect::new(0.0, 0.0, 80.0, 40.0)),
        );
        doc.set_style(content, "border-color", "gray");
        let arrow = doc.insert(
            Some(content),
            ElementData::default().with_bounds(Rect::new(0.0, 0.0, 10.0, 10.0)),
        );
        doc.set_attribute(arrow, attrs::ARROW, "");

        let config = PopoverConfig {
            placement: "right".parse().unwrap(),
            ..PopoverConfig::default()
        };
        let computed = place(
            &mut doc,
            &Floating,
            trigger,
            content,
            &config,
            &EngineOptions::default(),
        )
        .unwrap();
        assert_eq!(computed.placement.side, Side::Right);
        assert_eq!(doc.style(arrow, "left"), Some("-5px"));
        assert_eq!(doc.style(arrow, "top"), Some("15px"));
        assert_eq!(doc.style(arrow, "border-top-color"), Some("transparent"));
        assert_eq!(doc.style(arrow, "border-right-color"), Some("transparent"));
        assert_eq!(doc.style(arrow, "border-bottom-color"), Some("gray"));
        assert_eq!(doc.style(arrow, "border-left-color"), Some("gray"));
    }

    #[test]
    fn empty_reference_is_an_error() {
        let mut doc = page();
        let body = doc.body();
        let trigger = doc.insert(Some(body), ElementData::default());
        let content = doc.insert(
            Some(body),
            ElementData::default().with_bounds(Rect::new(0.0, 0.0, 80.0, 40.0)),
        );
        let err = place(
            &mut doc,
            &Floating,
            trigger,
            content,
            &PopoverConfig::default(),
            &EngineOptions::default(),
        );
        assert_eq!(err, Err(PositionError::EmptyReference));
        assert_eq!(doc.style(content, "top"), None);
    }
}
