// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Perch Widgets: attribute-driven form widgets over a headless document.
//!
//! Each widget binds to server-rendered markup through `data-*` attributes and
//! keeps its state in that markup, so the document stays the source of truth:
//!
//! - [`selectbox`]: a single or multiple choice list hosted in a popover,
//! - [`modal`]: dialogs with one open at a time and an animated close,
//! - [`progress`]: indicator width from `aria-valuenow` / `aria-valuemax`,
//! - [`tagsinput`]: free text turned into removable chips,
//! - [`datepicker`]: a label kept in sync with an ISO date.
//!
//! Widgets that live inside a popover close it through
//! [`Popovers::close`](perch_popover::Popovers::close), so they share its
//! single-open-popover rule.
//!
//! ## Example
//!
//! ```
//! use kurbo::Rect;
//! use perch_dom::{Document, ElementData};
//! use perch_widgets::progress;
//!
//! let mut doc = Document::new(Rect::new(0.0, 0.0, 400.0, 300.0));
//! let body = doc.body();
//! let bar = doc.insert(Some(body), ElementData::default());
//! doc.set_attribute(bar, "role", "progressbar");
//! doc.set_attribute(bar, "aria-valuenow", "40");
//! let indicator = doc.insert(Some(bar), ElementData::default());
//! doc.set_attribute(indicator, progress::attrs::INDICATOR, "");
//!
//! assert_eq!(progress::init(&mut doc, body), 1);
//! assert_eq!(doc.style(indicator, "width"), Some("40%"));
//! ```

pub mod datepicker;
pub mod modal;
pub mod progress;
pub mod selectbox;
pub mod tagsinput;

mod error;
mod markup;

pub use datepicker::{DatePicker, DisplayFormat};
pub use error::{Result, WidgetError};
pub use modal::Modals;
pub use selectbox::SelectBox;
pub use tagsinput::TagsInput;
