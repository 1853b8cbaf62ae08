//! Utility re-exports for the Cutebot driver.
//!
//! - `board`: associated-type bundle of the peripherals the driver consumes
//! - `config`: driver configuration and board pin map
//! - `controllers`: command encoder, LED strip and the `Cutebot` driver object
//! - `error`: driver error taxonomy
//! - `math`: time-of-flight distance conversion
//! - `sensors`: ultrasonic, line-tracking and infrared readers

pub mod board;
pub mod config;
pub mod controllers;
pub mod error;
pub mod math;
pub mod sensors;

pub use board::{Board, BoardPeripherals};
pub use config::{BusPolicy, CutebotConfig};
pub use controllers::{Cutebot, Reading, SystemCommand, COMMAND_CHANNEL};
pub use error::DriverError;
pub use sensors::capture::{CancelToken, PulseCapture};
