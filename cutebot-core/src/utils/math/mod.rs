//! Math utilities for the Cutebot.
//!
//! - `distance`: ultrasonic time-of-flight conversion and length units

pub mod distance;
