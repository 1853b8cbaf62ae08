//! Neopixel strip of the Cutebot.
//!
//! Wraps the two addressable LEDs on the chassis in a pixel buffer with a
//! global brightness and an optional auto-write mode, and dispatches
//! `LEDCommand`s.

use serde::{Deserialize, Serialize};
use smart_leds_trait::{SmartLedsWrite, RGB8};

use crate::utils::error::{DriverError, Result};

/// Number of LEDs in the attached chain.
pub const LED_COUNT: usize = 2;

const BLACK: RGB8 = RGB8 { r: 0, g: 0, b: 0 };

/// LED command variants for setting pixels, brightness and flushing.
///
/// Serialized as JSON with tag `"lc"`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
#[serde(tag = "lc", rename_all = "snake_case")]
pub enum LEDCommand {
    /// Set one pixel.
    Set { i: u8, r: u8, g: u8, b: u8 },
    /// Set every pixel to one colour.
    Fill { r: u8, g: u8, b: u8 },
    /// Change the global brightness, 0.0..=1.0.
    Brightness { v: f32 },
    /// Push the buffer to the strip.
    Show,
    /// Blank the strip.
    Off,
}

/// High-level LED controller that drives the Cutebot pixels.
pub struct LedModule<Driver> {
    driver: Driver,
    pixels: [RGB8; LED_COUNT],
    brightness: f32,
    auto_write: bool,
}

impl<Driver> LedModule<Driver>
where
    Driver: SmartLedsWrite<Color = RGB8>,
    Driver::Error: core::fmt::Debug,
{
    /// Create a strip over the given LED driver, all pixels black.
    pub fn new(
        driver: Driver,
        brightness: f32,
        auto_write: bool,
    ) -> Result<Self> {
        check_brightness(brightness)?;
        Ok(Self {
            driver,
            pixels: [BLACK; LED_COUNT],
            brightness,
            auto_write,
        })
    }

    pub fn brightness(&self) -> f32 {
        self.brightness
    }

    pub fn auto_write(&self) -> bool {
        self.auto_write
    }

    pub fn pixel(
        &self,
        index: usize,
    ) -> Option<RGB8> {
        self.pixels.get(index).copied()
    }

    pub fn set_pixel(
        &mut self,
        index: usize,
        color: RGB8,
    ) -> Result<()> {
        let slot = self
            .pixels
            .get_mut(index)
            .ok_or(DriverError::InvalidArgument("pixel index out of range"))?;
        *slot = color;
        self.flush_if_auto()
    }

    pub fn fill(
        &mut self,
        color: RGB8,
    ) -> Result<()> {
        self.pixels = [color; LED_COUNT];
        self.flush_if_auto()
    }

    pub fn set_brightness(
        &mut self,
        brightness: f32,
    ) -> Result<()> {
        check_brightness(brightness)?;
        self.brightness = brightness;
        self.flush_if_auto()
    }

    /// Write the buffer, scaled by brightness, to the strip.
    pub fn show(&mut self) -> Result<()> {
        let b = self.brightness;
        let data = self.pixels.iter().map(|c| RGB8 {
            r: scale(c.r, b),
            g: scale(c.g, b),
            b: scale(c.b, b),
        });
        self.driver.write(data).map_err(|e| {
            tracing::error!("LED write failed: {:?}", e);
            DriverError::Led
        })
    }

    /// Execute an incoming `LEDCommand`.
    ///
    /// `Off` blanks the strip immediately regardless of auto-write.
    pub fn ex_command(
        &mut self,
        cmd: LEDCommand,
    ) -> Result<()> {
        match cmd {
            LEDCommand::Set { i, r, g, b } => self.set_pixel(i as usize, RGB8 { r, g, b }),
            LEDCommand::Fill { r, g, b } => self.fill(RGB8 { r, g, b }),
            LEDCommand::Brightness { v } => self.set_brightness(v),
            LEDCommand::Show => self.show(),
            LEDCommand::Off => {
                self.pixels = [BLACK; LED_COUNT];
                self.show()
            }
        }
    }

    fn flush_if_auto(&mut self) -> Result<()> {
        if self.auto_write {
            self.show()
        } else {
            Ok(())
        }
    }
}

fn check_brightness(brightness: f32) -> Result<()> {
    if (0.0..=1.0).contains(&brightness) {
        Ok(())
    } else {
        Err(DriverError::InvalidArgument("brightness must be within 0.0..=1.0"))
    }
}

fn scale(
    channel: u8,
    brightness: f32,
) -> u8 {
    (channel as f32 * brightness) as u8
}
