//! Observation and visit identifiers.
//!
//! Two identifier formats reach the control software:
//!
//! - the archiver's observation id, `AT_O_20200219_000212`
//!   (`source_controller_dayobs_seqnum`);
//! - the camera's visit id, `2021032300308` (`dayobs`, one separator digit,
//!   then the sequence number).
//!
//! Both decode into a [`DataId`], the key a repository uses to locate an image.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::instrument::Instrument;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdParseError {
    #[error("observation id '{raw}' must have 4 '_'-separated fields (found {found})")]
    FieldCount { raw: String, found: usize },
    #[error("invalid observing day '{raw}'; expected YYYYMMDD")]
    DayObs { raw: String },
    #[error("invalid sequence number '{raw}'")]
    SeqNum { raw: String },
    /// Shorter than 10 characters, or not all digits.
    #[error("invalid visit id '{raw}'; expected at least 10 digits")]
    VisitId { raw: String },
}

/// Observing day, rendered `YYYYMMDD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct DayObs(NaiveDate);

impl DayObs {
    /// Build from the packed `YYYYMMDD` integer form.
    pub fn new(value: u32) -> Result<Self, IdParseError> {
        let year = (value / 10_000) as i32;
        let month = (value / 100) % 100;
        let day = value % 100;
        NaiveDate::from_ymd_opt(year, month, day)
            .filter(|_| value >= 10_000_000)
            .map(Self)
            .ok_or_else(|| IdParseError::DayObs {
                raw: value.to_string(),
            })
    }

    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    #[must_use]
    pub fn value(self) -> u32 {
        self.0.year() as u32 * 10_000 + self.0.month() * 100 + self.0.day()
    }

    #[must_use]
    pub fn date(self) -> NaiveDate {
        self.0
    }
}

impl TryFrom<u32> for DayObs {
    type Error = IdParseError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DayObs> for u32 {
    fn from(day_obs: DayObs) -> Self {
        day_obs.value()
    }
}

impl FromStr for DayObs {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || IdParseError::DayObs { raw: s.to_string() };
        if s.len() != 8 || !is_digits(s) {
            return Err(invalid());
        }
        let value: u32 = s.parse().map_err(|_| invalid())?;
        Self::new(value).map_err(|_| invalid())
    }
}

impl fmt::Display for DayObs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08}", self.value())
    }
}

/// Key addressing a single detector image in a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataId {
    pub day_obs: DayObs,
    pub seq_num: u32,
    pub detector: u32,
    pub instrument: Instrument,
}

impl DataId {
    /// A data id for the instrument's default detector.
    #[must_use]
    pub fn new(instrument: Instrument, day_obs: DayObs, seq_num: u32) -> Self {
        Self {
            day_obs,
            seq_num,
            detector: instrument.default_detector(),
            instrument,
        }
    }

    #[must_use]
    pub fn with_detector(mut self, detector: u32) -> Self {
        self.detector = detector;
        self
    }

    /// The archiver observation id this data id corresponds to.
    #[must_use]
    pub fn obs_id(&self) -> ObsId {
        ObsId {
            source: self.instrument.obs_id_prefix().to_string(),
            controller: "O".to_string(),
            day_obs: self.day_obs,
            seq_num: self.seq_num,
        }
    }
}

impl fmt::Display for DataId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{:06}/det{:03}",
            self.instrument, self.day_obs, self.seq_num, self.detector
        )
    }
}

/// Archiver observation id, e.g. `AT_O_20200219_000212`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObsId {
    source: String,
    controller: String,
    day_obs: DayObs,
    seq_num: u32,
}

impl ObsId {
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn controller(&self) -> &str {
        &self.controller
    }

    #[must_use]
    pub fn day_obs(&self) -> DayObs {
        self.day_obs
    }

    #[must_use]
    pub fn seq_num(&self) -> u32 {
        self.seq_num
    }

    /// Source and controller are not part of the repository key.
    #[must_use]
    pub fn to_data_id(&self) -> DataId {
        DataId::new(Instrument::Latiss, self.day_obs, self.seq_num)
    }
}

impl FromStr for ObsId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.trim().split('_').collect();
        let [source, controller, day_obs, seq_num] = fields.as_slice() else {
            return Err(IdParseError::FieldCount {
                raw: s.to_string(),
                found: fields.len(),
            });
        };

        Ok(Self {
            source: (*source).to_string(),
            controller: (*controller).to_string(),
            day_obs: day_obs.parse()?,
            seq_num: parse_seq_num(seq_num)?,
        })
    }
}

impl fmt::Display for ObsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}_{:06}",
            self.source, self.controller, self.day_obs, self.seq_num
        )
    }
}

/// Camera visit id, e.g. `2021032300308`.
///
/// The digit immediately after the day is not part of the sequence number.
/// It is kept so the id renders back with the same separator; the sequence
/// renders zero-padded to four digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VisitId {
    day_obs: DayObs,
    separator: u8,
    seq_num: u32,
}

impl VisitId {
    #[must_use]
    pub fn day_obs(&self) -> DayObs {
        self.day_obs
    }

    #[must_use]
    pub fn seq_num(&self) -> u32 {
        self.seq_num
    }

    /// Digit between the day and the sequence number, `0..=9`.
    #[must_use]
    pub fn separator(&self) -> u8 {
        self.separator
    }

    #[must_use]
    pub fn to_data_id(&self) -> DataId {
        DataId::new(Instrument::Latiss, self.day_obs, self.seq_num)
    }
}

impl FromStr for VisitId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.len() < 10 || !is_digits(trimmed) {
            return Err(IdParseError::VisitId { raw: s.to_string() });
        }

        Ok(Self {
            day_obs: trimmed[..8].parse()?,
            separator: trimmed.as_bytes()[8] - b'0',
            seq_num: parse_seq_num(&trimmed[9..])?,
        })
    }
}

impl fmt::Display for VisitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{:04}", self.day_obs, self.separator, self.seq_num)
    }
}

/// Decode an archiver observation id into a repository data id.
///
/// `AT_O_20200219_000212` becomes day 20200219, sequence 212, detector 0 of
/// LATISS.
pub fn parse_obs_id(obs_id: &str) -> Result<DataId, IdParseError> {
    obs_id.parse::<ObsId>().map(|id| id.to_data_id())
}

/// Decode a camera visit id (integer or string) into a repository data id.
///
/// `2021032300308` becomes day 20210323, sequence 308, detector 0 of LATISS.
pub fn parse_visit_id(visit_id: impl fmt::Display) -> Result<DataId, IdParseError> {
    visit_id
        .to_string()
        .parse::<VisitId>()
        .map(|id| id.to_data_id())
}

fn parse_seq_num(raw: &str) -> Result<u32, IdParseError> {
    let invalid = || IdParseError::SeqNum {
        raw: raw.to_string(),
    };
    if raw.is_empty() || !is_digits(raw) {
        return Err(invalid());
    }
    raw.parse().map_err(|_| invalid())
}

fn is_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}
