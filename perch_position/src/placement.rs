// Copyright 2025 the Perch Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Placement vocabulary: sides, alignments, and their textual form.

use core::fmt;
use core::str::FromStr;

use crate::error::PositionError;

/// Side of the reference the floating element is placed against.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// Above the reference.
    Top,
    /// Right of the reference.
    Right,
    /// Below the reference.
    Bottom,
    /// Left of the reference.
    Left,
}

impl Side {
    /// The side across the reference.
    pub fn opposite(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Right => Self::Left,
            Self::Bottom => Self::Top,
            Self::Left => Self::Right,
        }
    }

    /// Whether the main axis is vertical (`Top`/`Bottom`).
    pub fn is_vertical(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }

    /// Lowercase name, as used in markup.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Right => "right",
            Self::Bottom => "bottom",
            Self::Left => "left",
        }
    }
}

/// Cross-axis alignment relative to the reference.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Alignment {
    /// Align leading edges.
    Start,
    /// Align trailing edges.
    End,
}

/// A side plus optional alignment; `None` alignment centers on the cross axis.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Placement {
    /// Main-axis side.
    pub side: Side,
    /// Cross-axis alignment.
    pub alignment: Option<Alignment>,
}

impl Placement {
    /// Centered placement on `side`.
    pub const fn new(side: Side) -> Self {
        Self {
            side,
            alignment: None,
        }
    }

    /// Same alignment on the opposite side.
    pub fn flipped(self) -> Self {
        Self {
            side: self.side.opposite(),
            alignment: self.alignment,
        }
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self::new(Side::Bottom)
    }
}

impl FromStr for Placement {
    type Err = PositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (side, align) = match s.trim().split_once('-') {
            Some((side, align)) => (side, Some(align)),
            None => (s.trim(), None),
        };
        let side = match side {
            "top" => Side::Top,
            "right" => Side::Right,
            "bottom" => Side::Bottom,
            "left" => Side::Left,
            _ => return Err(PositionError::InvalidPlacement(s.to_owned())),
        };
        let alignment = match align {
            None => None,
            Some("start") => Some(Alignment::Start),
            Some("end") => Some(Alignment::End),
            Some(_) => return Err(PositionError::InvalidPlacement(s.to_owned())),
        };
        Ok(Self { side, alignment })
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.side.as_str())?;
        match self.alignment {
            Some(Alignment::Start) => f.write_str("-start"),
            Some(Alignment::End) => f.write_str("-end"),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sides_and_alignments() {
        assert_eq!("bottom".parse::<Placement>().unwrap(), Placement::default());
        let p: Placement = "left-end".parse().unwrap();
        assert_eq!(p.side, Side::Left);
        assert_eq!(p.alignment, Some(Alignment::End));
        assert_eq!(p.to_string(), "left-end");
        assert_eq!(p.flipped().to_string(), "right-end");
    }

    #[test]
    fn rejects_garbage() {
        assert!("middle".parse::<Placement>().is_err());
        assert!("top-center".parse::<Placement>().is_err());
    }
}
