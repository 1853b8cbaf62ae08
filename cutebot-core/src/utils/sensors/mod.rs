//! Sensor readers for the Cutebot.
//!
//! - `capture`: pulse-capture abstraction, cancellation and bounded retries
//! - `ir`: infrared remote decoder
//! - `tracking`: two-channel line-tracking sensor
//! - `ultrasonic`: trigger/echo distance ranger

pub mod capture;
pub mod ir;
pub mod tracking;
pub mod ultrasonic;
