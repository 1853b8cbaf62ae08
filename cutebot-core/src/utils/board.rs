//! Peripheral bundle consumed by the driver.
//!
//! A `Board` names the concrete pin, capture, delay and LED types of one
//! platform so `Cutebot` needs a single type parameter for all of them.
//!
//! ```ignore
//! struct PicoEd;
//!
//! impl Board for PicoEd {
//!     type TrackLeft = Input<'static>;
//!     type TrackRight = Input<'static>;
//!     type Trigger = Output<'static>;
//!     type Echo = PioPulseIn<'static>;
//!     type Ir = PioPulseIn<'static>;
//!     type Delay = Delay;
//!     type Pixels = Ws2812<'static>;
//! }
//! ```

use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
};
use smart_leds_trait::{SmartLedsWrite, RGB8};

use crate::utils::sensors::capture::PulseCapture;

/// Associated peripheral types of a platform hosting the Cutebot.
pub trait Board {
    /// Left line-tracking sensor
    type TrackLeft: InputPin;
    /// Right line-tracking sensor
    type TrackRight: InputPin;
    /// Ultrasonic trigger output
    type Trigger: OutputPin;
    /// Pulse capture on the ultrasonic echo line
    type Echo: PulseCapture;
    /// Pulse capture on the IR receiver, idle high
    type Ir: PulseCapture;
    type Delay: DelayNs;
    /// Addressable LED driver, handed over in `Cutebot::init_pixels`
    type Pixels: SmartLedsWrite<Color = RGB8>;
}

/// Owned peripheral instances for a [`Board`].
pub struct BoardPeripherals<B: Board> {
    pub track_left: B::TrackLeft,
    pub track_right: B::TrackRight,
    pub trigger: B::Trigger,
    pub echo: B::Echo,
    pub ir: B::Ir,
    pub delay: B::Delay,
}
