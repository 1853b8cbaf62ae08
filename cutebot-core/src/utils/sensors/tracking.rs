//! Line-tracking sensor pair.
//!
//! The status code is recomputed from the two sensor levels on every read.
//! Two board firmware revisions report it differently, so the encoding is a
//! [`TrackingCodec`] chosen in the configuration:
//!
//! | left | right | `Numeric` | `Digits` |
//! |------|-------|-----------|----------|
//! | high | high  | `11`      | `"00"`   |
//! | low  | high  | `10`      | `"10"`   |
//! | high | low   | `1`       | `"01"`   |
//! | low  | low   | `0`       | `"11"`   |

use core::fmt;

use embedded_hal::digital::InputPin;
use serde::Serialize;

use crate::utils::error::{DriverError, Result};

/// Encoding of the line-tracking status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackingCodec {
    /// Integer codes, a set digit per high sensor.
    #[default]
    Numeric,
    /// Two-character codes with the sensor sense inverted.
    Digits,
}

/// Encoded line-tracking status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TrackingCode {
    Numeric(u8),
    Digits(&'static str),
}

impl fmt::Display for TrackingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackingCode::Numeric(n) => write!(f, "{}", n),
            TrackingCode::Digits(s) => f.write_str(s),
        }
    }
}

impl TrackingCodec {
    pub fn encode(
        self,
        left: bool,
        right: bool,
    ) -> TrackingCode {
        match self {
            TrackingCodec::Numeric => TrackingCode::Numeric(match (left, right) {
                (true, true) => 11,
                (false, true) => 10,
                (true, false) => 1,
                (false, false) => 0,
            }),
            TrackingCodec::Digits => TrackingCode::Digits(match (left, right) {
                (true, true) => "00",
                (false, true) => "10",
                (true, false) => "01",
                (false, false) => "11",
            }),
        }
    }
}

/// The two line-tracking inputs.
pub struct LineTracker<L, R> {
    left: L,
    right: R,
}

impl<L, R> LineTracker<L, R>
where
    L: InputPin,
    R: InputPin,
{
    pub fn new(
        left: L,
        right: R,
    ) -> Self {
        Self { left, right }
    }

    /// Sample both sensors and encode the pair.
    pub fn read(
        &mut self,
        codec: TrackingCodec,
    ) -> Result<TrackingCode> {
        let left = self.left.is_high().map_err(DriverError::pin)?;
        let right = self.right.is_high().map_err(DriverError::pin)?;
        Ok(codec.encode(left, right))
    }
}
