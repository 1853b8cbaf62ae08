//! Command encoder for the Cutebot board controller.
//!
//! Motors, RGB headlights and servos are set by writing fixed 4-byte frames to
//! the board at `0x10` over the shared I2C bus:
//!
//! | Byte | Meaning |
//! |------|---------|
//! | 0 | selector: `0x01`/`0x02` wheel, `0x04`/`0x08` headlight, `0x05`/`0x06` servo |
//! | 1 | direction (`0x01` reverse, `0x02` forward), red, or servo angle |
//! | 2 | speed magnitude or green |
//! | 3 | reserved `0` or blue |
//!
//! Every parameter is validated before the bus is touched.

use core::cell::RefCell;

use embedded_hal::i2c::I2c;
use serde::{Deserialize, Serialize};

use crate::utils::{
    config::BusPolicy,
    error::{DriverError, Result},
};

/// One command written to the board.
pub type Frame = [u8; 4];

const LEFT_WHEEL: u8 = 0x01;
const RIGHT_WHEEL: u8 = 0x02;
const REVERSE: u8 = 0x01;
const FORWARD: u8 = 0x02;

/// Wheel selected by a speed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wheel {
    Left,
    Right,
}

/// RGB headlight selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum LightSide {
    Left = 0x04,
    Right = 0x08,
}

impl TryFrom<u8> for LightSide {
    type Error = DriverError;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            0x04 => Ok(LightSide::Left),
            0x08 => Ok(LightSide::Right),
            _ => Err(DriverError::InvalidArgument("light must be left (4) or right (8)")),
        }
    }
}

impl From<LightSide> for u8 {
    fn from(side: LightSide) -> u8 {
        side as u8
    }
}

/// Servo header selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ServoId {
    S1,
    S2,
}

impl ServoId {
    fn selector(self) -> u8 {
        match self {
            ServoId::S1 => 0x05,
            ServoId::S2 => 0x06,
        }
    }
}

impl TryFrom<u8> for ServoId {
    type Error = DriverError;

    fn try_from(id: u8) -> Result<Self> {
        match id {
            1 => Ok(ServoId::S1),
            2 => Ok(ServoId::S2),
            _ => Err(DriverError::InvalidArgument("servo must be 1 or 2")),
        }
    }
}

impl From<ServoId> for u8 {
    fn from(id: ServoId) -> u8 {
        match id {
            ServoId::S1 => 1,
            ServoId::S2 => 2,
        }
    }
}

/// Board command variants.
///
/// Serialized as JSON with tag `"bc"`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
#[serde(tag = "bc", rename_all = "snake_case")]
pub enum BoardCommand {
    /// Wheel speeds, -100..=100 each.
    Speed { l: i16, r: i16 },
    /// One headlight colour, 0..=255 per channel.
    Light { side: LightSide, r: i16, g: i16, b: i16 },
    /// Servo angle, 0..=180.
    Servo { id: ServoId, angle: i16 },
    /// Both wheels to zero.
    Stop,
}

/// Encode a wheel speed. Zero encodes as reverse at magnitude 0.
pub fn encode_speed(
    wheel: Wheel,
    speed: i16,
) -> Result<Frame> {
    if !(-100..=100).contains(&speed) {
        return Err(DriverError::InvalidArgument("speed must be within -100..=100"));
    }
    let id = match wheel {
        Wheel::Left => LEFT_WHEEL,
        Wheel::Right => RIGHT_WHEEL,
    };
    let direction = if speed > 0 { FORWARD } else { REVERSE };
    Ok([id, direction, speed.unsigned_abs() as u8, 0])
}

/// Encode a headlight colour.
pub fn encode_light(
    side: LightSide,
    r: i16,
    g: i16,
    b: i16,
) -> Result<Frame> {
    let channel = |v: i16| {
        u8::try_from(v).map_err(|_| DriverError::InvalidArgument("RGB channel must be within 0..=255"))
    };
    Ok([side as u8, channel(r)?, channel(g)?, channel(b)?])
}

/// Encode a servo angle.
pub fn encode_servo(
    id: ServoId,
    angle: i16,
) -> Result<Frame> {
    if !(0..=180).contains(&angle) {
        return Err(DriverError::InvalidArgument("angle must be within 0..=180"));
    }
    Ok([id.selector(), angle as u8, 0, 0])
}

/// Writer of command frames to the board over a shared bus.
///
/// The bus is borrowed only for the duration of one call and released on every
/// path, including write errors.
pub struct CommandBus<'a, I2C> {
    i2c: &'a RefCell<I2C>,
    address: u8,
    policy: BusPolicy,
}

impl<'a, I2C> CommandBus<'a, I2C>
where
    I2C: I2c,
{
    pub fn new(
        i2c: &'a RefCell<I2C>,
        address: u8,
        policy: BusPolicy,
    ) -> Self {
        Self {
            i2c,
            address,
            policy,
        }
    }

    /// Write `frames` in order under a single bus borrow.
    pub fn write_frames(
        &self,
        frames: &[Frame],
    ) -> Result<()> {
        let Ok(mut bus) = self.i2c.try_borrow_mut() else {
            return match self.policy {
                BusPolicy::Fail => Err(DriverError::BusBusy),
                BusPolicy::Skip => {
                    tracing::warn!("I2C bus busy, dropped {} frame(s)", frames.len());
                    Ok(())
                }
            };
        };
        for frame in frames {
            bus.write(self.address, frame).map_err(DriverError::bus)?;
        }
        Ok(())
    }

    pub fn set_speed(
        &self,
        left: i16,
        right: i16,
    ) -> Result<()> {
        let l = encode_speed(Wheel::Left, left)?;
        let r = encode_speed(Wheel::Right, right)?;
        self.write_frames(&[l, r])
    }

    pub fn set_light(
        &self,
        side: LightSide,
        r: i16,
        g: i16,
        b: i16,
    ) -> Result<()> {
        self.write_frames(&[encode_light(side, r, g, b)?])
    }

    pub fn set_servo(
        &self,
        id: ServoId,
        angle: i16,
    ) -> Result<()> {
        self.write_frames(&[encode_servo(id, angle)?])
    }

    /// Execute a `BoardCommand`.
    pub fn execute_command(
        &self,
        command: BoardCommand,
    ) -> Result<()> {
        match command {
            BoardCommand::Speed { l, r } => self.set_speed(l, r),
            BoardCommand::Light { side, r, g, b } => self.set_light(side, r, g, b),
            BoardCommand::Servo { id, angle } => self.set_servo(id, angle),
            BoardCommand::Stop => self.set_speed(0, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_direction() {
        assert_eq!(encode_speed(Wheel::Left, 42), Ok([0x01, 0x02, 42, 0]));
        assert_eq!(encode_speed(Wheel::Right, -100), Ok([0x02, 0x01, 100, 0]));
        assert_eq!(encode_speed(Wheel::Left, 0), Ok([0x01, 0x01, 0, 0]));
    }

    #[test]
    fn test_speed_range() {
        for s in -100..=100 {
            let f = encode_speed(Wheel::Left, s).unwrap();
            assert_eq!(f[1] == FORWARD, s > 0);
            assert_eq!(f[2] as i16, s.abs());
        }
        assert!(encode_speed(Wheel::Left, 101).is_err());
        assert!(encode_speed(Wheel::Right, -101).is_err());
    }

    #[test]
    fn test_light_channels() {
        assert_eq!(encode_light(LightSide::Right, 1, 2, 255), Ok([0x08, 1, 2, 255]));
        assert!(encode_light(LightSide::Left, 256, 0, 0).is_err());
        assert!(encode_light(LightSide::Left, 0, -1, 0).is_err());
        assert!(encode_light(LightSide::Left, 0, 0, 300).is_err());
    }

    #[test]
    fn test_servo() {
        assert_eq!(encode_servo(ServoId::S2, 180), Ok([0x06, 180, 0, 0]));
        assert!(encode_servo(ServoId::S1, 181).is_err());
        assert!(encode_servo(ServoId::S1, -1).is_err());
        assert!(ServoId::try_from(3).is_err());
        assert!(LightSide::try_from(5).is_err());
    }
}
