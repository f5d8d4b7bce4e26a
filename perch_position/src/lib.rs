// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Perch Position: anchored placement for floating elements.
//!
//! ## Overview
//!
//! Given a reference rectangle, the size of a floating box, and the viewport,
//! a [`PositioningEngine`] returns the box's top-left corner and the placement
//! it ended up on. The bundled [`Floating`] engine runs a [`Middleware`]
//! pipeline in the order supplied:
//!
//! - [`Middleware::Offset`]: distance from the reference along the main axis.
//! - [`Middleware::Flip`]: switch to the opposite side on overflow.
//! - [`Middleware::Shift`]: slide along the cross axis to stay in view.
//! - [`Middleware::Arrow`]: arrow offset so the tip points at the reference.
//!
//! [`AutoUpdate`] tracks continuous-update subscriptions and hands out
//! cancellation handles; the host drives the actual recomputation.
//!
//! ## Example
//!
//! ```
//! use kurbo::{Rect, Size};
//! use perch_position::{ComputeRequest, Floating, Middleware, PositioningEngine};
//!
//! let computed = Floating
//!     .compute(&ComputeRequest {
//!         reference: Rect::new(100.0, 100.0, 200.0, 130.0),
//!         floating: Size::new(80.0, 40.0),
//!         viewport: Rect::new(0.0, 0.0, 800.0, 600.0),
//!         placement: "bottom".parse().unwrap(),
//!         middleware: &[
//!             Middleware::Offset(4.0),
//!             Middleware::Flip { padding: 10.0 },
//!             Middleware::Shift { padding: 10.0 },
//!         ],
//!     })
//!     .unwrap();
//! assert_eq!((computed.x, computed.y), (110.0, 134.0));
//! ```

mod auto_update;
mod compute;
mod error;
mod placement;

pub use auto_update::{AutoUpdate, UpdateHandle};
pub use compute::{
    ArrowData, ComputeRequest, Computed, Floating, Middleware, MiddlewareData, PositioningEngine,
};
pub use error::PositionError;
pub use placement::{Alignment, Placement, Side};
