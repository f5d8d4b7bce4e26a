// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typed configuration: the markup attribute contract and engine-wide options.

use core::str::FromStr;
use std::time::Duration;

use perch_dom::{Document, ElementId};
use perch_position::Placement;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PopoverError;

/// Attribute names read from and written to markup.
pub mod attrs {
    /// On a trigger: identifier of the content element it controls.
    pub const TRIGGER: &str = "data-popover-trigger";
    /// On a trigger: `click` (default) or `hover`.
    pub const TYPE: &str = "data-popover-type";
    /// On content: placement such as `bottom` or `top-start`.
    pub const PLACEMENT: &str = "data-popover-placement";
    /// On content: distance from the reference in pixels.
    pub const OFFSET: &str = "data-popover-offset";
    /// On content: `true` to expose the reference width as [`WIDTH_PROPERTY`].
    pub const MATCH_WIDTH: &str = "data-popover-match-width";
    /// On content: hover open delay in milliseconds.
    pub const HOVER_DELAY: &str = "data-popover-hover-delay";
    /// On content: hover close delay in milliseconds.
    pub const HOVER_OUT_DELAY: &str = "data-popover-hover-out-delay";
    /// On content: `true` to keep the popover open on outside clicks.
    pub const DISABLE_CLICKAWAY: &str = "data-popover-disable-clickaway";
    /// On content: `true` to keep the popover open on Escape.
    pub const DISABLE_ESC: &str = "data-popover-disable-esc";
    /// Inside content: the arrow element.
    pub const ARROW: &str = "data-popover-arrow";
    /// Written to content and triggers: `"true"` or `"false"`.
    pub const OPEN: &str = "data-popover-open";
    /// Written to bound triggers.
    pub const BOUND: &str = "data-popover-bound";
    /// On the overlay root that content is moved into.
    pub const PORTAL: &str = "data-popover-portal-container";
    /// Custom style property carrying the reference width.
    pub const WIDTH_PROPERTY: &str = "--popover-trigger-width";
}

/// Animation class names applied to content.
pub mod classes {
    /// Present while the enter animation runs.
    pub const ANIMATE_IN: &str = "popover-animate-in";
    /// Present while the exit animation runs.
    pub const ANIMATE_OUT: &str = "popover-animate-out";
}

/// How a trigger opens its popover.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum TriggerMode {
    /// A click toggles the popover.
    #[default]
    Click,
    /// Hover intent opens and closes the popover.
    Hover,
}

impl FromStr for TriggerMode {
    type Err = PopoverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "click" => Ok(Self::Click),
            "hover" => Ok(Self::Hover),
            other => Err(PopoverError::UnknownTriggerMode(other.to_owned())),
        }
    }
}

/// Per-popover configuration, parsed once when a trigger is bound.
#[derive(Clone, Debug, PartialEq)]
pub struct PopoverConfig {
    /// Requested placement.
    pub placement: Placement,
    /// Explicit offset; `None` uses the engine default for the arrow/no-arrow case.
    pub offset: Option<f64>,
    /// Publish the reference width on the content.
    pub match_width: bool,
    /// Delay before a hover opens the popover.
    pub hover_delay: Duration,
    /// Delay before leaving the trigger or content closes the popover.
    pub hover_out_delay: Duration,
    /// Close on clicks outside trigger and content.
    pub dismiss_on_click_away: bool,
    /// Close on Escape.
    pub dismiss_on_escape: bool,
}

impl Default for PopoverConfig {
    fn default() -> Self {
        Self {
            placement: Placement::default(),
            offset: None,
            match_width: false,
            hover_delay: Duration::from_millis(100),
            hover_out_delay: Duration::from_millis(200),
            dismiss_on_click_away: true,
            dismiss_on_escape: true,
        }
    }
}

impl PopoverConfig {
    /// Read the configuration declared on a content element.
    ///
    /// Unparseable values fall back to their defaults.
    pub fn from_content(doc: &Document, content: ElementId) -> Self {
        let defaults = Self::default();
        let attr = |name: &str| doc.attribute(content, name);
        let placement = match attr(attrs::PLACEMENT).map(str::parse::<Placement>) {
            Some(Ok(p)) => p,
            Some(Err(err)) => {
                debug!(%err, "falling back to default popover placement");
                defaults.placement
            }
            None => defaults.placement,
        };
        Self {
            placement,
            offset: attr(attrs::OFFSET)
                .and_then(|v| v.trim().trim_end_matches("px").parse::<f64>().ok())
                .filter(|v| v.is_finite()),
            match_width: attr(attrs::MATCH_WIDTH) == Some("true"),
            hover_delay: parse_millis(attr(attrs::HOVER_DELAY)).unwrap_or(defaults.hover_delay),
            hover_out_delay: parse_millis(attr(attrs::HOVER_OUT_DELAY))
                .unwrap_or(defaults.hover_out_delay),
            dismiss_on_click_away: attr(attrs::DISABLE_CLICKAWAY) != Some("true"),
            dismiss_on_escape: attr(attrs::DISABLE_ESC) != Some("true"),
        }
    }
}

fn parse_millis(value: Option<&str>) -> Option<Duration> {
    value?.trim().parse::<u64>().ok().map(Duration::from_millis)
}

/// Engine-wide options.
///
/// Every field has a default, so partial documents deserialize:
///
/// ```
/// use perch_popover::EngineOptions;
///
/// let opts = EngineOptions::default();
/// assert_eq!(opts.exit_animation_ms, 150);
/// assert_eq!(opts.max_poll_attempts, 40);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Length of the enter animation in milliseconds.
    pub enter_animation_ms: u64,
    /// Length of the exit animation; content is hidden once it elapses.
    pub exit_animation_ms: u64,
    /// Interval between positioning-engine readiness polls.
    pub poll_interval_ms: u64,
    /// Number of readiness polls before giving up.
    pub max_poll_attempts: u32,
    /// Viewport padding for the flip and shift steps.
    pub collision_padding: f64,
    /// Minimum distance between the arrow and the content corners.
    pub arrow_padding: f64,
    /// How far the arrow pokes out of the content edge it is attached to.
    pub arrow_inset: f64,
    /// Default offset without an arrow.
    pub offset: f64,
    /// Default offset when the content has an arrow.
    pub arrow_offset: f64,
    /// Z-index of the portal container.
    pub portal_z_index: i32,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            enter_animation_ms: 150,
            exit_animation_ms: 150,
            poll_interval_ms: 50,
            max_poll_attempts: 40,
            collision_padding: 10.0,
            arrow_padding: 5.0,
            arrow_inset: 5.0,
            offset: 4.0,
            arrow_offset: 8.0,
            portal_z_index: 9999,
        }
    }
}

impl EngineOptions {
    pub(crate) fn enter_animation(&self) -> Duration {
        Duration::from_millis(self.enter_animation_ms)
    }

    pub(crate) fn exit_animation(&self) -> Duration {
        Duration::from_millis(self.exit_animation_ms)
    }

    pub(crate) fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Rect;
    use perch_dom::ElementData;
    use perch_position::Side;

    fn content_with(attributes: &[(&str, &str)]) -> (Document, ElementId) {
        let mut doc = Document::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        let body = doc.body();
        let content = doc.insert(Some(body), ElementData::default());
        for (k, v) in attributes {
            doc.set_attribute(content, k, *v);
        }
        (doc, content)
    }

    #[test]
    fn defaults_when_nothing_declared() {
        let (doc, content) = content_with(&[]);
        assert_eq!(PopoverConfig::from_content(&doc, content), PopoverConfig::default());
    }

    #[test]
    fn reads_declared_values() {
        let (doc, content) = content_with(&[
            (attrs::PLACEMENT, "right-start"),
            (attrs::OFFSET, "12"),
            (attrs::MATCH_WIDTH, "true"),
            (attrs::HOVER_DELAY, "0"),
            (attrs::HOVER_OUT_DELAY, "350"),
            (attrs::DISABLE_CLICKAWAY, "true"),
            (attrs::DISABLE_ESC, "false"),
        ]);
        let cfg = PopoverConfig::from_content(&doc, content);
        assert_eq!(cfg.placement.side, Side::Right);
        assert_eq!(cfg.offset, Some(12.0));
        assert!(cfg.match_width);
        assert_eq!(cfg.hover_delay, Duration::ZERO, "explicit zero is honoured");
        assert_eq!(cfg.hover_out_delay, Duration::from_millis(350));
        assert!(!cfg.dismiss_on_click_away);
        assert!(cfg.dismiss_on_escape);
    }

    #[test]
    fn garbage_falls_back() {
        let (doc, content) = content_with(&[
            (attrs::PLACEMENT, "sideways"),
            (attrs::OFFSET, "near"),
            (attrs::HOVER_DELAY, "soon"),
        ]);
        let cfg = PopoverConfig::from_content(&doc, content);
        assert_eq!(cfg.placement, Placement::default());
        assert_eq!(cfg.offset, None);
        assert_eq!(cfg.hover_delay, Duration::from_millis(100));
    }

    #[test]
    fn negative_offset_pulls_content_in() {
        let (doc, content) = content_with(&[(attrs::OFFSET, "-3")]);
        assert_eq!(PopoverConfig::from_content(&doc, content).offset, Some(-3.0));
    }

    #[test]
    fn trigger_mode_parsing() {
        assert_eq!("click".parse::<TriggerMode>().unwrap(), TriggerMode::Click);
        assert_eq!(" hover ".parse::<TriggerMode>().unwrap(), TriggerMode::Hover);
        assert!(matches!(
            "focus".parse::<TriggerMode>(),
            Err(PopoverError::UnknownTriggerMode(m)) if m == "focus"
        ));
    }

    #[test]
    fn options_deserialize_partially() {
        let opts: EngineOptions =
            serde_json::from_str(r#"{ "exit_animation_ms": 90, "max_poll_attempts": 3 }"#).unwrap();
        assert_eq!(opts.exit_animation(), Duration::from_millis(90));
        assert_eq!(opts.max_poll_attempts, 3);
        assert_eq!(opts.poll_interval_ms, 50);
    }
}
