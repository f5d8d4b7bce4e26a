// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors reported by position computation.

/// Errors that can occur while computing a position.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PositionError {
    /// Placement text did not match `side` or `side-start|end`.
    #[error("invalid placement: {0:?}")]
    InvalidPlacement(String),

    /// An input rectangle or size contained NaN or infinity.
    #[error("non-finite geometry in position request")]
    NonFinite,

    /// The reference has no area, which usually means it is detached or hidden.
    #[error("reference rectangle is empty")]
    EmptyReference,
}
