//! Module Exports
//!
//! - `i2c`: command encoder for motors, headlights and servos on the shared bus
//! - `leds`: neopixel strip
//!
//! This file also defines the `Cutebot` driver object that owns every
//! peripheral and the `SystemCommand` surface used to drive it remotely.

pub mod i2c;
pub mod leds;

use core::cell::RefCell;

use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel::Channel};
use embedded_hal::i2c::I2c;
use serde::{Deserialize, Serialize};

pub use i2c::{BoardCommand, CommandBus, LightSide, ServoId};
pub use leds::{LEDCommand, LedModule};

use crate::utils::{
    board::{Board, BoardPeripherals},
    config::CutebotConfig,
    error::{DriverError, Result},
    math::distance::Unit,
    sensors::{
        capture::CancelToken,
        ir::IrReceiver,
        tracking::{LineTracker, TrackingCode},
        ultrasonic::Ultrasonic,
    },
};

/// Channel used to receive `SystemCommand` messages.
pub static COMMAND_CHANNEL: Channel<CriticalSectionRawMutex, SystemCommand, 16> = Channel::new();

/// Sensor read variants.
///
/// Serialized as JSON with tag `"sc"`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
#[serde(tag = "sc", rename_all = "snake_case")]
pub enum SensorCommand {
    Distance { unit: Unit },
    Tracking,
    Ir,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
#[serde(tag = "ct", rename_all = "snake_case")] // ct = command type
pub enum SystemCommand {
    B(BoardCommand),
    S(SensorCommand),
    L(LEDCommand),
}

/// Value produced by a sensor command.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reading {
    Distance(f32),
    Tracking(TrackingCode),
    Key(u8),
}

/// Driver for the Cutebot extension board.
pub struct Cutebot<'a, I2C, B: Board> {
    bus: CommandBus<'a, I2C>,
    tracker: LineTracker<B::TrackLeft, B::TrackRight>,
    sonar: Ultrasonic<B::Trigger, B::Echo>,
    ir: IrReceiver<B::Ir>,
    delay: B::Delay,
    pixels: Option<LedModule<B::Pixels>>,
    config: CutebotConfig,
}

impl<'a, I2C, B> Cutebot<'a, I2C, B>
where
    I2C: I2c,
    B: Board,
    <B::Pixels as smart_leds_trait::SmartLedsWrite>::Error: core::fmt::Debug,
{
    /// Take ownership of the peripherals and reset the board: wheels stopped,
    /// both headlights off.
    pub fn new(
        i2c_bus: &'a RefCell<I2C>,
        peripherals: BoardPeripherals<B>,
        config: CutebotConfig,
    ) -> Result<Self> {
        let BoardPeripherals {
            track_left,
            track_right,
            trigger,
            echo,
            ir,
            delay,
        } = peripherals;

        let mut bot = Cutebot {
            bus: CommandBus::new(i2c_bus, config.address, config.bus_policy),
            tracker: LineTracker::new(track_left, track_right),
            sonar: Ultrasonic::new(trigger, echo),
            ir: IrReceiver::new(ir),
            delay,
            pixels: None,
            config,
        };
        bot.stop()?;
        bot.lights_off()?;
        tracing::info!("Cutebot ready at 0x{:02X}", config.address);
        Ok(bot)
    }

    pub fn config(&self) -> &CutebotConfig {
        &self.config
    }

    /// Set both wheel speeds, -100..=100. Positive drives forward.
    pub fn set_speed(
        &mut self,
        left: i16,
        right: i16,
    ) -> Result<()> {
        self.bus.set_speed(left, right)
    }

    pub fn stop(&mut self) -> Result<()> {
        self.bus.set_speed(0, 0)
    }

    /// Set one RGB headlight, 0..=255 per channel.
    pub fn set_light(
        &mut self,
        side: LightSide,
        r: i16,
        g: i16,
        b: i16,
    ) -> Result<()> {
        self.bus.set_light(side, r, g, b)
    }

    pub fn lights_off(&mut self) -> Result<()> {
        self.bus.set_light(LightSide::Left, 0, 0, 0)?;
        self.bus.set_light(LightSide::Right, 0, 0, 0)
    }

    /// Set a servo angle, 0..=180.
    pub fn set_servo(
        &mut self,
        id: ServoId,
        angle: i16,
    ) -> Result<()> {
        self.bus.set_servo(id, angle)
    }

    /// Distance ahead in `unit`.
    pub fn get_distance(
        &mut self,
        unit: Unit,
    ) -> Result<f32> {
        self.sonar.measure(unit, &self.config, &mut self.delay, None)
    }

    /// Distance ahead in `unit`, giving up with `Cancelled` once `cancel` is raised.
    pub fn get_distance_with(
        &mut self,
        unit: Unit,
        cancel: &CancelToken,
    ) -> Result<f32> {
        self.sonar
            .measure(unit, &self.config, &mut self.delay, Some(cancel))
    }

    /// Last accepted distance in centimetres.
    pub fn last_distance(&self) -> Option<f32> {
        self.sonar.last_cm()
    }

    pub fn get_tracking(&mut self) -> Result<TrackingCode> {
        self.tracker.read(self.config.tracking_codec)
    }

    /// Block until a mapped remote button is decoded.
    pub fn get_ir_value(&mut self) -> Result<u8> {
        self.ir
            .read_key(self.config.ir_table, &self.config, &mut self.delay, None)
    }

    pub fn get_ir_value_with(
        &mut self,
        cancel: &CancelToken,
    ) -> Result<u8> {
        self.ir
            .read_key(self.config.ir_table, &self.config, &mut self.delay, Some(cancel))
    }

    /// Attach the neopixel driver.
    pub fn init_pixels(
        &mut self,
        driver: B::Pixels,
        brightness: f32,
        auto_write: bool,
    ) -> Result<()> {
        self.pixels = Some(LedModule::new(driver, brightness, auto_write)?);
        Ok(())
    }

    /// The neopixel strip, once `init_pixels` has run.
    pub fn pixels(&mut self) -> Result<&mut LedModule<B::Pixels>> {
        self.pixels.as_mut().ok_or(DriverError::NotInitialized)
    }

    /// Execute a `SystemCommand`, returning the reading for sensor commands.
    pub fn execute(
        &mut self,
        command: SystemCommand,
    ) -> Result<Option<Reading>> {
        match command {
            SystemCommand::B(cmd) => {
                self.bus.execute_command(cmd)?;
                Ok(None)
            }
            SystemCommand::S(SensorCommand::Distance { unit }) => {
                Ok(Some(Reading::Distance(self.get_distance(unit)?)))
            }
            SystemCommand::S(SensorCommand::Tracking) => {
                Ok(Some(Reading::Tracking(self.get_tracking()?)))
            }
            SystemCommand::S(SensorCommand::Ir) => Ok(Some(Reading::Key(self.get_ir_value()?))),
            SystemCommand::L(cmd) => {
                self.pixels()?.ex_command(cmd)?;
                Ok(None)
            }
        }
    }

    /// Receive one command from `COMMAND_CHANNEL` and execute it.
    pub async fn handle_next(&mut self) -> Result<Option<Reading>> {
        let command = COMMAND_CHANNEL.receiver().receive().await;
        tracing::info!("Received Command: {:?}", command);
        self.execute(command)
    }

    pub async fn run(&mut self) -> ! {
        loop {
            match self.handle_next().await {
                Ok(Some(reading)) => tracing::info!(?reading, "Sensor read"),
                Ok(None) => tracing::info!("Command executed successfully"),
                Err(e) => tracing::error!("Command failed: {}", e),
            }
        }
    }
}
