//! Core domain types for the observing utilities.
//!
//! This crate is intentionally IO-free. It holds the identifiers that address
//! an image in a repository and the small amount of arithmetic performed on
//! them:
//!
//! - **`ids`**: `DataId`, `ObsId`, `VisitId` and their string parsers
//! - **`instrument`**: the `Instrument` enumeration and per-instrument constants
//! - **`offsets`**: pixel to arcsecond offset conversion

pub mod ids;
pub mod instrument;
pub mod offsets;

pub use ids::{DataId, DayObs, IdParseError, ObsId, VisitId, parse_obs_id, parse_visit_id};
pub use instrument::{Instrument, InstrumentParseError, LATISS_PIXEL_SCALE};
pub use offsets::{ArcsecOffset, PixelPosition, PositionParseError, calculate_xy_offsets};
