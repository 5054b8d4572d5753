//! Instrument enumeration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Plate scale of the LATISS detector in arcseconds per pixel.
pub const LATISS_PIXEL_SCALE: f64 = 0.1;

const INSTRUMENT_PARSE_VALUES: &[&str] = &["LATISS"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Instrument {
    /// Auxiliary Telescope imaging spectrograph.
    #[default]
    #[serde(rename = "LATISS")]
    Latiss,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid instrument '{raw}'; expected one of: {expected:?}")]
pub struct InstrumentParseError {
    raw: String,
    expected: &'static [&'static str],
}

impl InstrumentParseError {
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

impl Instrument {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Instrument::Latiss => "LATISS",
        }
    }

    /// Two-letter source code that prefixes archiver observation ids.
    #[must_use]
    pub const fn obs_id_prefix(self) -> &'static str {
        match self {
            Instrument::Latiss => "AT",
        }
    }

    #[must_use]
    pub const fn pixel_scale(self) -> f64 {
        match self {
            Instrument::Latiss => LATISS_PIXEL_SCALE,
        }
    }

    /// Detector read out when an identifier does not name one.
    #[must_use]
    pub const fn default_detector(self) -> u32 {
        match self {
            Instrument::Latiss => 0,
        }
    }

    #[must_use]
    pub const fn all() -> &'static [Instrument] {
        &[Instrument::Latiss]
    }
}

impl FromStr for Instrument {
    type Err = InstrumentParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Instrument::all()
            .iter()
            .copied()
            .find(|instrument| instrument.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| InstrumentParseError {
                raw: s.to_string(),
                expected: INSTRUMENT_PARSE_VALUES,
            })
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
