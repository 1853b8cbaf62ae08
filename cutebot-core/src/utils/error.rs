//! Driver error types
//!
//! HAL-specific errors are mapped onto these variants so the driver exposes a
//! single, copyable error type regardless of the bus or pin implementation.

use core::fmt;

use embedded_hal::{digital, i2c};

/// Result type for driver operations
pub type Result<T> = core::result::Result<T, DriverError>;

/// Errors surfaced by the Cutebot driver.
///
/// Sensor timeouts and decode failures are absorbed by the retry loops and only
/// appear here as `RetriesExhausted` once the configured budget is spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverError {
    /// Out-of-range speed, colour, angle, unit or selector. Nothing was written.
    InvalidArgument(&'static str),
    /// The LED strip was used before `init_pixels`.
    NotInitialized,
    /// The shared bus was already borrowed and the policy is `BusPolicy::Fail`.
    BusBusy,
    /// The I2C write itself failed.
    Bus(i2c::ErrorKind),
    /// A digital pin operation failed.
    Pin(digital::ErrorKind),
    /// The LED driver rejected a write.
    Led,
    /// Every measurement or decode attempt timed out or was rejected.
    RetriesExhausted,
    /// A `CancelToken` was raised while waiting on a capture channel.
    Cancelled,
}

impl DriverError {
    pub(crate) fn bus<E: i2c::Error>(e: E) -> Self {
        DriverError::Bus(e.kind())
    }

    pub(crate) fn pin<E: digital::Error>(e: E) -> Self {
        DriverError::Pin(e.kind())
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::InvalidArgument(what) => write!(f, "invalid argument: {}", what),
            DriverError::NotInitialized => write!(f, "LED strip not initialized"),
            DriverError::BusBusy => write!(f, "I2C bus busy"),
            DriverError::Bus(kind) => write!(f, "I2C error: {:?}", kind),
            DriverError::Pin(kind) => write!(f, "pin error: {:?}", kind),
            DriverError::Led => write!(f, "LED driver write failed"),
            DriverError::RetriesExhausted => write!(f, "retries exhausted"),
            DriverError::Cancelled => write!(f, "cancelled"),
        }
    }
}
