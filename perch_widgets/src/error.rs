// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for widget binding.

/// Errors raised while binding a widget to its markup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WidgetError {
    /// A required part of the widget's markup is missing.
    #[error("{widget}: missing {part}")]
    MissingElement {
        /// Widget kind, e.g. `"selectbox"`.
        widget: &'static str,
        /// The part that could not be found.
        part: &'static str,
    },

    /// A date string is not a valid calendar date in `YYYY-MM-DD` form.
    #[error("invalid date {0:?}")]
    InvalidDate(String),
}

/// A specialized Result type for widget operations.
pub type Result<T> = std::result::Result<T, WidgetError>;
