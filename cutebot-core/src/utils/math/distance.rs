//! Time-of-flight conversion for the ultrasonic ranger.
//!
//! Echo widths arrive in capture ticks (≈µs). Sound covers 0.034 cm/µs, the echo
//! travels out and back, and the sensor housing adds a fixed 7 cm offset:
//!
//! ```rust
//! use cutebot_core::utils::math::distance::{ticks_to_cm, Unit};
//! let cm = ticks_to_cm(1000);
//! assert!((cm - 24.0).abs() < 1e-4);
//! assert!((Unit::Inch.from_cm(cm) - cm / 2.54).abs() < 1e-6);
//! ```

use serde::{Deserialize, Serialize};

use crate::utils::error::DriverError;

/// Readings at or beyond this many centimetres mean the echo was lost.
pub const MAX_RANGE_CM: f32 = 1121.0;

/// Calibration offset of the sensor, in centimetres.
const OFFSET_CM: f32 = 7.0;

/// Length unit of a distance reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Unit {
    Cm = 1,
    Inch = 2,
}

impl Unit {
    /// Express a centimetre reading in this unit.
    pub fn from_cm(self, cm: f32) -> f32 {
        match self {
            Unit::Cm => cm,
            Unit::Inch => cm / 2.54,
        }
    }
}

impl TryFrom<u8> for Unit {
    type Error = DriverError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Unit::Cm),
            2 => Ok(Unit::Inch),
            _ => Err(DriverError::InvalidArgument("unit must be 1 (cm) or 2 (inch)")),
        }
    }
}

impl From<Unit> for u8 {
    fn from(unit: Unit) -> u8 {
        unit as u8
    }
}

/// Convert an echo width in ticks to centimetres.
///
/// Computed in `f32`: a u16 tick count keeps every result below 1122 cm, where
/// single precision still resolves better than 0.1 mm.
pub fn ticks_to_cm(ticks: u16) -> f32 {
    ticks as f32 * 34.0 / 2.0 / 1000.0 + OFFSET_CM
}

/// Whether a centimetre reading is inside the sensor's range.
pub fn in_range(cm: f32) -> bool {
    cm < MAX_RANGE_CM
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticks_to_cm_offset() {
        assert!((ticks_to_cm(0) - 7.0).abs() < 1e-6);
        assert!((ticks_to_cm(100) - 8.7).abs() < 1e-5);
    }

    #[test]
    fn test_range_edge() {
        // 65480 ticks -> 1120.16 cm, 65535 -> 1121.095 cm
        assert!(in_range(ticks_to_cm(65480)));
        assert!(!in_range(ticks_to_cm(65535)));
        assert!(!in_range(MAX_RANGE_CM));
    }

    #[test]
    fn test_inch_is_cm_over_2_54() {
        for ticks in [0u16, 100, 1000, 30000, 65480] {
            let cm = ticks_to_cm(ticks);
            assert_eq!(Unit::Inch.from_cm(cm), cm / 2.54);
            assert_eq!(Unit::Cm.from_cm(cm), cm);
        }
    }

    #[test]
    fn test_unit_codes() {
        assert_eq!(Unit::try_from(1), Ok(Unit::Cm));
        assert_eq!(Unit::try_from(2), Ok(Unit::Inch));
        assert!(matches!(Unit::try_from(3), Err(DriverError::InvalidArgument(_))));
    }
}
