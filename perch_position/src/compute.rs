// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Position computation: the engine contract and the bundled middleware pipeline.

use kurbo::{Point, Rect, Size, Vec2};

use crate::error::PositionError;
use crate::placement::{Alignment, Placement, Side};

/// One step of the positioning pipeline. Steps run in slice order.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Middleware {
    /// Push the floating box away from the reference along the main axis.
    Offset(f64),
    /// Move to the opposite side when the current side overflows the padded viewport.
    Flip {
        /// Inset applied to the viewport before measuring overflow.
        padding: f64,
    },
    /// Slide along the cross axis to stay inside the padded viewport.
    Shift {
        /// Inset applied to the viewport before clamping.
        padding: f64,
    },
    /// Compute where an arrow of `size` should sit so its tip points at the reference.
    Arrow {
        /// Arrow element size.
        size: Size,
        /// Minimum distance kept between the arrow and the floating box corners.
        padding: f64,
    },
}

/// Input to [`PositioningEngine::compute`].
#[derive(Clone, Debug)]
pub struct ComputeRequest<'a> {
    /// Page-space rectangle the floating box is anchored to.
    pub reference: Rect,
    /// Measured size of the floating box.
    pub floating: Size,
    /// Visible page area for collision handling.
    pub viewport: Rect,
    /// Requested placement.
    pub placement: Placement,
    /// Middleware, applied in order.
    pub middleware: &'a [Middleware],
}

/// Arrow offsets relative to the floating box. Only the cross-axis coordinate is set.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ArrowData {
    /// Left offset, for `top`/`bottom` placements.
    pub x: Option<f64>,
    /// Top offset, for `left`/`right` placements.
    pub y: Option<f64>,
    /// How far the clamped arrow is from the reference center.
    pub center_offset: f64,
}

/// Side results reported by middleware.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct MiddlewareData {
    /// Arrow offsets, when an [`Middleware::Arrow`] step ran.
    pub arrow: Option<ArrowData>,
    /// Total displacement applied by [`Middleware::Shift`].
    pub shift: Vec2,
    /// Whether [`Middleware::Flip`] switched sides.
    pub flipped: bool,
}

/// Output of [`PositioningEngine::compute`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Computed {
    /// Left edge of the floating box.
    pub x: f64,
    /// Top edge of the floating box.
    pub y: f64,
    /// Resolved placement (may differ from the request after a flip).
    pub placement: Placement,
    /// Per-middleware results.
    pub data: MiddlewareData,
}

impl Computed {
    /// Top-left corner of the floating box.
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// The calculation contract a positioning backend exposes.
pub trait PositioningEngine {
    /// Compute an anchored position for a floating box.
    fn compute(&self, request: &ComputeRequest<'_>) -> Result<Computed, PositionError>;
}

/// The bundled positioning backend.
#[derive(Copy, Clone, Debug, Default)]
pub struct Floating;

impl PositioningEngine for Floating {
    fn compute(&self, req: &ComputeRequest<'_>) -> Result<Computed, PositionError> {
        validate(req)?;
        let reference = req.reference;
        let size = req.floating;
        let mut placement = req.placement;
        let mut main_offset = 0.0;
        let mut origin = anchor(reference, size, placement);
        let mut data = MiddlewareData::default();

        for step in req.middleware {
            match *step {
                Middleware::Offset(distance) => {
                    main_offset += distance;
                    origin += main_axis(placement.side, distance);
                }
                Middleware::Flip { padding } => {
                    let current = overflow(origin, size, req.viewport, padding, placement.side);
                    if current > 0.0 {
                        let alt = placement.flipped();
                        let alt_origin =
                            anchor(reference, size, alt) + main_axis(alt.side, main_offset);
                        let alt_overflow =
                            overflow(alt_origin, size, req.viewport, padding, alt.side);
                        if alt_overflow < current {
                            placement = alt;
                            origin = alt_origin;
                            data.flipped = true;
                        }
                    }
                }
                Middleware::Shift { padding } => {
                    let before = origin;
                    if placement.side.is_vertical() {
                        origin.x = clamp_span(
                            origin.x,
                            size.width,
                            req.viewport.x0 + padding,
                            req.viewport.x1 - padding,
                        );
                    } else {
                        origin.y = clamp_span(
                            origin.y,
                            size.height,
                            req.viewport.y0 + padding,
                            req.viewport.y1 - padding,
                        );
                    }
                    data.shift += origin - before;
                }
                Middleware::Arrow {
                    size: arrow,
                    padding,
                } => {
                    let center = reference.center();
                    data.arrow = Some(if placement.side.is_vertical() {
                        let ideal = center.x - arrow.width / 2.0 - origin.x;
                        let clamped = clamp_inside(ideal, padding, size.width - arrow.width - padding);
                        ArrowData {
                            x: Some(clamped),
                            y: None,
                            center_offset: ideal - clamped,
                        }
                    } else {
                        let ideal = center.y - arrow.height / 2.0 - origin.y;
                        let clamped =
                            clamp_inside(ideal, padding, size.height - arrow.height - padding);
                        ArrowData {
                            x: None,
                            y: Some(clamped),
                            center_offset: ideal - clamped,
                        }
                    });
                }
            }
        }

        Ok(Computed {
            x: origin.x,
            y: origin.y,
            placement,
            data,
        })
    }
}

fn validate(req: &ComputeRequest<'_>) -> Result<(), PositionError> {
    let r = req.reference;
    let v = req.viewport;
    let finite = [
        r.x0,
        r.y0,
        r.x1,
        r.y1,
        v.x0,
        v.y0,
        v.x1,
        v.y1,
        req.floating.width,
        req.floating.height,
    ]
    .iter()
    .all(|c| c.is_finite());
    if !finite {
        return Err(PositionError::NonFinite);
    }
    if r.width() == 0.0 && r.height() == 0.0 {
        return Err(PositionError::EmptyReference);
    }
    Ok(())
}

/// Unadjusted top-left corner for `placement` around `reference`.
fn anchor(reference: Rect, size: Size, placement: Placement) -> Point {
    let center = reference.center();
    let cx = center.x - size.width / 2.0;
    let cy = center.y - size.height / 2.0;
    let mut p = match placement.side {
        Side::Top => Point::new(cx, reference.y0 - size.height),
        Side::Bottom => Point::new(cx, reference.y1),
        Side::Left => Point::new(reference.x0 - size.width, cy),
        Side::Right => Point::new(reference.x1, cy),
    };
    match (placement.side.is_vertical(), placement.alignment) {
        (_, None) => {}
        (true, Some(Alignment::Start)) => p.x = reference.x0,
        (true, Some(Alignment::End)) => p.x = reference.x1 - size.width,
        (false, Some(Alignment::Start)) => p.y = reference.y0,
        (false, Some(Alignment::End)) => p.y = reference.y1 - size.height,
    }
    p
}

fn main_axis(side: Side, distance: f64) -> Vec2 {
    match side {
        Side::Top => Vec2::new(0.0, -distance),
        Side::Bottom => Vec2::new(0.0, distance),
        Side::Left => Vec2::new(-distance, 0.0),
        Side::Right => Vec2::new(distance, 0.0),
    }
}

/// How far the box sticks out of the padded viewport on `side`; negative means it fits.
fn overflow(origin: Point, size: Size, viewport: Rect, padding: f64, side: Side) -> f64 {
    let rect = Rect::from_origin_size(origin, size);
    match side {
        Side::Top => viewport.y0 + padding - rect.y0,
        Side::Bottom => rect.y1 - (viewport.y1 - padding),
        Side::Left => viewport.x0 + padding - rect.x0,
        Side::Right => rect.x1 - (viewport.x1 - padding),
    }
}

/// Clamp a span starting at `start` with `len` into `[lo, hi]`, preferring `lo` when it cannot fit.
fn clamp_span(start: f64, len: f64, lo: f64, hi: f64) -> f64 {
    start.min(hi - len).max(lo)
}

fn clamp_inside(value: f64, lo: f64, hi: f64) -> f64 {
    value.min(hi).max(lo)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Rect = Rect::new(0.0, 0.0, 400.0, 300.0);

    fn compute(reference: Rect, placement: &str, middleware: &[Middleware]) -> Computed {
        Floating
            .compute(&ComputeRequest {
                reference,
                floating: Size::new(100.0, 50.0),
                viewport: VIEWPORT,
                placement: placement.parse().unwrap(),
                middleware,
            })
            .unwrap()
    }

    #[test]
    fn bottom_is_centered_and_offset() {
        let c = compute(
            Rect::new(150.0, 100.0, 250.0, 120.0),
            "bottom",
            &[Middleware::Offset(4.0)],
        );
        assert_eq!(c.origin(), Point::new(150.0, 124.0));
        assert_eq!(c.placement.to_string(), "bottom");
    }

    #[test]
    fn alignment_snaps_cross_axis_edges() {
        let r = Rect::new(150.0, 100.0, 250.0, 120.0);
        assert_eq!(compute(r, "top-start", &[]).origin(), Point::new(150.0, 50.0));
        assert_eq!(compute(r, "top-end", &[]).origin(), Point::new(150.0, 50.0));
        assert_eq!(compute(r, "right-end", &[]).origin(), Point::new(250.0, 70.0));
    }

    #[test]
    fn flip_moves_to_roomier_side() {
        // Reference near the bottom edge: bottom overflows, top fits.
        let mw = [Middleware::Offset(8.0), Middleware::Flip { padding: 10.0 }];
        let c = compute(Rect::new(150.0, 260.0, 250.0, 280.0), "bottom", &mw);
        assert!(c.data.flipped);
        assert_eq!(c.placement.side, Side::Top);
        assert_eq!(c.y, 260.0 - 50.0 - 8.0, "offset survives the flip");
    }

    #[test]
    fn flip_keeps_side_when_alternative_is_worse() {
        let tall = Floating
            .compute(&ComputeRequest {
                reference: Rect::new(0.0, 20.0, 50.0, 40.0),
                floating: Size::new(50.0, 290.0),
                viewport: VIEWPORT,
                placement: Placement::default(),
                middleware: &[Middleware::Flip { padding: 10.0 }],
            })
            .unwrap();
        assert!(!tall.data.flipped);
    }

    #[test]
    fn shift_clamps_into_padded_viewport() {
        let c = compute(
            Rect::new(0.0, 100.0, 20.0, 120.0),
            "bottom",
            &[Middleware::Shift { padding: 10.0 }],
        );
        assert_eq!(c.x, 10.0);
        assert_eq!(c.data.shift, Vec2::new(50.0, 0.0));
    }

    #[test]
    fn arrow_points_at_reference_after_shift() {
        let c = compute(
            Rect::new(0.0, 100.0, 20.0, 120.0),
            "bottom",
            &[
                Middleware::Shift { padding: 10.0 },
                Middleware::Arrow {
                    size: Size::new(10.0, 10.0),
                    padding: 5.0,
                },
            ],
        );
        let arrow = c.data.arrow.unwrap();
        assert_eq!(arrow.y, None);
        // Reference center x = 10, box x = 10 → ideal 10 - 5 - 10 = -5, clamped to padding.
        assert_eq!(arrow.x, Some(5.0));
        assert_eq!(arrow.center_offset, -10.0);
    }

    #[test]
    fn rejects_degenerate_input() {
        let err = Floating
            .compute(&ComputeRequest {
                reference: Rect::new(5.0, 5.0, 5.0, 5.0),
                floating: Size::new(10.0, 10.0),
                viewport: VIEWPORT,
                placement: Placement::default(),
                middleware: &[],
            })
            .unwrap_err();
        assert_eq!(err, PositionError::EmptyReference);

        let err = Floating
            .compute(&ComputeRequest {
                reference: Rect::new(0.0, 0.0, 10.0, 10.0),
                floating: Size::new(f64::NAN, 10.0),
                viewport: VIEWPORT,
                placement: Placement::default(),
                middleware: &[],
            })
            .unwrap_err();
        assert_eq!(err, PositionError::NonFinite);
    }
}
