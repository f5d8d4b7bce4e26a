// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Progress bars: size the indicator from `aria-valuenow` / `aria-valuemax`.

use perch_dom::{Document, ElementId};

/// Attribute names used by progress bars.
pub mod attrs {
    /// Must equal [`PROGRESSBAR`] on the bar.
    pub const ROLE: &str = "role";
    /// Role value marking a progress bar.
    pub const PROGRESSBAR: &str = "progressbar";
    /// Current value.
    pub const VALUE_NOW: &str = "aria-valuenow";
    /// Maximum value; non-positive or missing means 100.
    pub const VALUE_MAX: &str = "aria-valuemax";
    /// On the child whose width shows the progress.
    pub const INDICATOR: &str = "data-progress-indicator";
    /// Set once the bar has been sized.
    pub const INITIALIZED: &str = "data-progress-initialized";
}

/// Fill percentage for `value` out of `max`, in `0..=100`.
///
/// A non-positive `max` counts as 100; `value` is clamped into `0..=max`.
///
/// ```
/// use perch_widgets::progress::percentage;
///
/// assert_eq!(percentage(30.0, 60.0), 50.0);
/// assert_eq!(percentage(150.0, 0.0), 100.0);
/// assert_eq!(percentage(-5.0, 10.0), 0.0);
/// ```
pub fn percentage(value: f64, max: f64) -> f64 {
    let max = if max > 0.0 { max } else { 100.0 };
    let value = if value.is_nan() { 0.0 } else { value.clamp(0.0, max) };
    value / max * 100.0
}

/// Size every progress bar under `root` (inclusive) not yet initialised.
/// Returns how many were sized.
pub fn init(doc: &mut Document, root: ElementId) -> usize {
    let bars = doc.query(root, |d, e| {
        d.attribute(e, attrs::ROLE) == Some(attrs::PROGRESSBAR) && !d.has_attribute(e, attrs::INITIALIZED)
    });
    let mut sized = 0;
    for bar in bars {
        doc.set_attribute(bar, attrs::INITIALIZED, "true");
        let Some(indicator) = crate::markup::find_attr(doc, bar, attrs::INDICATOR) else {
            continue;
        };
        let number = |name: &str, default: f64| {
            doc.attribute(bar, name)
                .and_then(|v| v.trim().parse::<f64>().ok())
                .unwrap_or(default)
        };
        let p = percentage(number(attrs::VALUE_NOW, 0.0), number(attrs::VALUE_MAX, 100.0));
        doc.set_style(indicator, "width", format!("{p}%"));
        sized += 1;
    }
    sized
}

#[cfg(test)]
mod tests {
    use kurbo::Rect;
    use perch_dom::ElementData;

    use super::*;

    fn bar(doc: &mut Document, now: &str, max: Option<&str>) -> ElementId {
        let body = doc.body();
        let bar = doc.insert(Some(body), ElementData::default());
        doc.set_attribute(bar, attrs::ROLE, attrs::PROGRESSBAR);
        doc.set_attribute(bar, attrs::VALUE_NOW, now);
        if let Some(max) = max {
            doc.set_attribute(bar, attrs::VALUE_MAX, max);
        }
        let indicator = doc.insert(Some(bar), ElementData::default());
        doc.set_attribute(indicator, attrs::INDICATOR, "");
        indicator
    }

    #[test]
    fn widths_follow_value_and_max() {
        let mut doc = Document::new(Rect::new(0.0, 0.0, 400.0, 300.0));
        let a = bar(&mut doc, "25", None);
        let b = bar(&mut doc, "3", Some("4"));
        let c = bar(&mut doc, "80", Some("-1"));
        let d = bar(&mut doc, "junk", Some("10"));
        let body = doc.body();
        assert_eq!(init(&mut doc, body), 4);
        assert_eq!(doc.style(a, "width"), Some("25%"));
        assert_eq!(doc.style(b, "width"), Some("75%"));
        assert_eq!(doc.style(c, "width"), Some("80%"));
        assert_eq!(doc.style(d, "width"), Some("0%"));
    }

    #[test]
    fn init_runs_once_per_bar() {
        let mut doc = Document::new(Rect::new(0.0, 0.0, 400.0, 300.0));
        let indicator = bar(&mut doc, "10", None);
        let body = doc.body();
        assert_eq!(init(&mut doc, body), 1);
        doc.set_style(indicator, "width", "1%");
        assert_eq!(init(&mut doc, body), 0);
        assert_eq!(doc.style(indicator, "width"), Some("1%"));
    }
}
