//! Driver configuration and board pin map.
//!
//! The Cutebot sits on the Pico:ed edge connector:
//!
//! - **Ultrasonic trigger**: P8
//! - **Ultrasonic echo**: P12
//! - **Line tracking**: P13 (left), P14 (right)
//! - **Neopixel strip**: P15 (2 pixels)
//! - **IR receiver**: P16
//!
//! Motors, RGB headlights and servos are driven by the board MCU at I2C address `0x10`.

use embassy_time::Duration;

use crate::utils::sensors::{ir::IrCodeTable, tracking::TrackingCodec};

/// I2C address of the Cutebot board controller
pub const BOARD_ADDRESS: u8 = 0x10;

/// Edge connector pin driving the ultrasonic trigger
pub const TRIGGER_PIN: u8 = 8;

/// Edge connector pin carrying the ultrasonic echo
pub const ECHO_PIN: u8 = 12;

/// Edge connector pin of the left line-tracking sensor
pub const TRACK_LEFT_PIN: u8 = 13;

/// Edge connector pin of the right line-tracking sensor
pub const TRACK_RIGHT_PIN: u8 = 14;

/// Edge connector pin of the neopixel data line
pub const PIXEL_PIN: u8 = 15;

/// Edge connector pin of the IR receiver
pub const IR_PIN: u8 = 16;

/// What a command write does when the shared bus is already borrowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BusPolicy {
    /// Return `DriverError::BusBusy`.
    #[default]
    Fail,
    /// Drop the command and return `Ok(())`, logging a warning.
    Skip,
}

/// Runtime configuration for a [`Cutebot`](crate::utils::Cutebot).
#[derive(Debug, Clone, Copy)]
pub struct CutebotConfig {
    pub address: u8,
    pub bus_policy: BusPolicy,
    pub tracking_codec: TrackingCodec,
    pub ir_table: IrCodeTable,
    /// How long the trigger pin is held high.
    pub trigger_pulse: Duration,
    /// Poll iterations to wait for an echo before retrying.
    pub echo_poll_limit: u32,
    pub echo_poll_interval: Duration,
    /// Whole measurements attempted before giving up.
    pub distance_attempts: u8,
    /// Poll iterations to wait for a full IR frame before retrying.
    pub ir_poll_limit: u32,
    pub ir_poll_interval: Duration,
    pub ir_attempts: u8,
}

impl CutebotConfig {
    pub const fn new() -> Self {
        Self {
            address: BOARD_ADDRESS,
            bus_policy: BusPolicy::Fail,
            tracking_codec: TrackingCodec::Numeric,
            ir_table: IrCodeTable::TableA,
            trigger_pulse: Duration::from_micros(10),
            echo_poll_limit: 5000,
            echo_poll_interval: Duration::from_micros(10),
            distance_attempts: 8,
            ir_poll_limit: 20_000,
            ir_poll_interval: Duration::from_micros(10),
            ir_attempts: 8,
        }
    }

    pub const fn with_bus_policy(mut self, policy: BusPolicy) -> Self {
        self.bus_policy = policy;
        self
    }

    pub const fn with_tracking_codec(mut self, codec: TrackingCodec) -> Self {
        self.tracking_codec = codec;
        self
    }

    pub const fn with_ir_table(mut self, table: IrCodeTable) -> Self {
        self.ir_table = table;
        self
    }
}

impl Default for CutebotConfig {
    fn default() -> Self {
        Self::new()
    }
}
