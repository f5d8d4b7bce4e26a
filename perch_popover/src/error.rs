// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for popover binding and lifecycle steps.
//!
//! None of these reach the caller of a public [`Popovers`](crate::Popovers)
//! entry point; they are logged and the entry point degrades to a no-op.

use perch_position::PositionError;

/// Errors that can occur while binding or positioning a popover.
#[derive(Debug, thiserror::Error)]
pub enum PopoverError {
    /// The trigger has an empty or missing content identifier.
    #[error("trigger has no popover identifier")]
    MissingTriggerId,

    /// No connected element carries the identifier the trigger points at.
    #[error("popover content {0:?} not found")]
    ContentNotFound(String),

    /// The trigger declares a mode other than `click` or `hover`.
    #[error("unknown popover trigger mode {0:?}")]
    UnknownTriggerMode(String),

    /// The positioning engine has not become available yet.
    #[error("positioning engine is not ready")]
    EngineNotReady,

    /// The positioning engine never became available.
    #[error("positioning engine unavailable after {attempts} attempts")]
    EngineUnavailable {
        /// Number of polls performed.
        attempts: u32,
    },

    /// Position computation failed for one popover.
    #[error("failed to position popover {popover:?}")]
    Position {
        /// The popover identifier.
        popover: String,
        /// The underlying engine error.
        #[source]
        source: PositionError,
    },
}

/// A specialized Result type for popover operations.
pub type Result<T> = std::result::Result<T, PopoverError>;
