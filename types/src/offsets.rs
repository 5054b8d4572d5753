//! Pixel to arcsecond offsets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Position on the detector in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelPosition {
    pub x: f64,
    pub y: f64,
}

impl PixelPosition {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid pixel position '{raw}'; expected 'X,Y'")]
pub struct PositionParseError {
    raw: String,
}

/// Parses `"X,Y"`, tolerating whitespace around either coordinate.
impl FromStr for PixelPosition {
    type Err = PositionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PositionParseError { raw: s.to_string() };
        let (x, y) = s.split_once(',').ok_or_else(invalid)?;
        let x: f64 = x.trim().parse().map_err(|_| invalid())?;
        let y: f64 = y.trim().parse().map_err(|_| invalid())?;
        if !x.is_finite() || !y.is_finite() {
            return Err(invalid());
        }
        Ok(Self { x, y })
    }
}

impl fmt::Display for PixelPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// Offset on the sky in arcseconds.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ArcsecOffset {
    pub dx: f64,
    pub dy: f64,
}

impl fmt::Display for ArcsecOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dx={:.3}\" dy={:.3}\"", self.dx, self.dy)
    }
}

/// Offset that moves a source from `current` to `target`.
///
/// `pixel_scale` is in arcseconds per pixel; see
/// [`Instrument::pixel_scale`](crate::Instrument::pixel_scale).
#[must_use]
pub fn calculate_xy_offsets(
    target: PixelPosition,
    current: PixelPosition,
    pixel_scale: f64,
) -> ArcsecOffset {
    ArcsecOffset {
        dx: pixel_scale * (target.x - current.x),
        dy: pixel_scale * (target.y - current.y),
    }
}
