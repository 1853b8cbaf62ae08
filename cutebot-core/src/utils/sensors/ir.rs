//! Infrared remote decoder.
//!
//! The receiver idles high; each press produces an NEC-style pulse train:
//!
//! ```text
//! [Header mark][Header space][32 x (mark, space)][Stop mark]
//!    ~9000        ~4500        560 + 560 | 1690     560
//! ```
//!
//! Widths are capture ticks (≈µs). A space longer than 1200 ticks is a `1`;
//! bits are packed MSB first into four bytes
//! `[vendor, marker, address, data]`. A frame is accepted when the vendor byte
//! is 255 and the marker matches the remote's [`IrCodeTable`], whose table then
//! maps the data byte to a key identifier (digits 0-9, buttons 11-20, and on
//! the second remote 100/200).

use embedded_hal::delay::DelayNs;
use heapless::Vec;

use crate::utils::{
    config::CutebotConfig,
    error::Result,
    sensors::capture::{retry, Attempt, CancelToken, CaptureSession, PollBudget, PulseCapture},
};

/// Most pulses kept from one capture.
pub const MAX_PULSES: usize = 120;

/// Header mark, header space and 32 bit cells.
pub const FRAME_PULSES: usize = 2 + 64;

const VENDOR_ID: u8 = 255;

/// Button table of the bundled remote, marker byte 2.
const TABLE_A: [(u8, u8); 20] = [
    (0, 11),
    (128, 12),
    (64, 13),
    (32, 14),
    (160, 15),
    (96, 16),
    (16, 17),
    (144, 18),
    (80, 19),
    (48, 20),
    (112, 0),
    (8, 1),
    (136, 2),
    (72, 3),
    (40, 4),
    (168, 5),
    (104, 6),
    (24, 7),
    (152, 8),
    (88, 9),
];

/// Button table of the 22-key remote, marker byte 0.
const TABLE_B: [(u8, u8); 22] = [
    (0x16, 0),
    (0x0C, 1),
    (0x18, 2),
    (0x5E, 3),
    (0x08, 4),
    (0x1C, 5),
    (0x5A, 6),
    (0x42, 7),
    (0x52, 8),
    (0x4A, 9),
    (0x45, 11),
    (0x46, 12),
    (0x47, 13),
    (0x44, 14),
    (0x40, 15),
    (0x43, 16),
    (0x07, 17),
    (0x15, 18),
    (0x09, 19),
    (0x19, 20),
    (0x0D, 100),
    (0x4D, 200),
];

/// Which remote control's button table to decode against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IrCodeTable {
    #[default]
    TableA,
    TableB,
}

impl IrCodeTable {
    /// Marker byte the remote sends in position 1.
    pub const fn marker(self) -> u8 {
        match self {
            IrCodeTable::TableA => 2,
            IrCodeTable::TableB => 0,
        }
    }

    fn entries(self) -> &'static [(u8, u8)] {
        match self {
            IrCodeTable::TableA => &TABLE_A,
            IrCodeTable::TableB => &TABLE_B,
        }
    }

    /// Key identifier for a decoded frame, or `None` if the frame is foreign
    /// or the data byte is unmapped.
    pub fn key_for(
        self,
        frame: [u8; 4],
    ) -> Option<u8> {
        let [vendor, marker, _address, data] = frame;
        if vendor != VENDOR_ID || marker != self.marker() {
            return None;
        }
        self.entries()
            .iter()
            .find(|&&(code, _)| code == data)
            .map(|&(_, key)| key)
    }

    /// Data byte that produces `key`, for building test frames.
    pub fn code_for(
        self,
        key: u8,
    ) -> Option<u8> {
        self.entries()
            .iter()
            .find(|&&(_, k)| k == key)
            .map(|&(code, _)| code)
    }
}

/// Decode a captured pulse train into its four frame bytes.
pub fn decode_pulses(pulses: &[u16]) -> Option<[u8; 4]> {
    if pulses.len() < FRAME_PULSES {
        return None;
    }
    if !(8000..=10000).contains(&pulses[0]) || !(3500..=5000).contains(&pulses[1]) {
        return None;
    }

    let mut frame = [0u8; 4];
    for (i, cell) in pulses[2..FRAME_PULSES].chunks_exact(2).enumerate() {
        let space = cell[1];
        if space < 200 || space > 2500 {
            return None;
        }
        if space > 1200 {
            frame[i / 8] |= 0x80 >> (i % 8);
        }
    }
    Some(frame)
}

/// Capture channel on the IR receiver.
pub struct IrReceiver<C> {
    capture: C,
}

impl<C: PulseCapture> IrReceiver<C> {
    pub fn new(capture: C) -> Self {
        Self { capture }
    }

    /// Wait for a button press and return its key identifier.
    ///
    /// Malformed, foreign and unmapped frames are retried up to
    /// `config.ir_attempts` captures.
    pub fn read_key<D: DelayNs>(
        &mut self,
        table: IrCodeTable,
        config: &CutebotConfig,
        delay: &mut D,
        cancel: Option<&CancelToken>,
    ) -> Result<u8> {
        let budget = PollBudget {
            limit: config.ir_poll_limit,
            interval: config.ir_poll_interval,
        };

        retry::<u8>("ir", config.ir_attempts, |_| {
            let mut pulses: Vec<u16, MAX_PULSES> = Vec::new();
            {
                let mut session = CaptureSession::start(&mut self.capture);
                if let Err(e) = session.wait_for(FRAME_PULSES, budget, delay, cancel) {
                    return Attempt::from(e);
                }
                while let Some(p) = session.pop_front() {
                    if pulses.push(p).is_err() {
                        break;
                    }
                }
            }

            let Some(frame) = decode_pulses(&pulses) else {
                tracing::debug!("ir: malformed pulse train ({} pulses)", pulses.len());
                return Attempt::Retry;
            };
            match table.key_for(frame) {
                Some(key) => Attempt::Done(key),
                None => {
                    tracing::debug!("ir: unmapped frame {:?}", frame);
                    Attempt::Retry
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn train(frame: [u8; 4]) -> [u16; FRAME_PULSES + 1] {
        let mut out = [560u16; FRAME_PULSES + 1];
        out[0] = 9000;
        out[1] = 4500;
        for i in 0..32 {
            let bit = frame[i / 8] & (0x80 >> (i % 8)) != 0;
            out[3 + 2 * i] = if bit { 1690 } else { 560 };
        }
        out
    }

    #[test]
    fn test_decode_train() {
        let frame = [255, 2, 0x5A, 112];
        assert_eq!(decode_pulses(&train(frame)), Some(frame));
    }

    #[test]
    fn test_decode_rejects_bad_header() {
        let mut t = train([255, 2, 0, 0]);
        t[0] = 2000;
        assert_eq!(decode_pulses(&t), None);
        assert_eq!(decode_pulses(&t[..10]), None);
    }

    #[test]
    fn test_table_a_keys() {
        assert_eq!(IrCodeTable::TableA.key_for([255, 2, 7, 0]), Some(11));
        assert_eq!(IrCodeTable::TableA.key_for([255, 2, 7, 112]), Some(0));
        assert_eq!(IrCodeTable::TableA.key_for([255, 0, 7, 112]), None);
        assert_eq!(IrCodeTable::TableA.key_for([254, 2, 7, 112]), None);
        assert_eq!(IrCodeTable::TableA.key_for([255, 2, 7, 1]), None);
    }

    #[test]
    fn test_table_b_special_keys() {
        assert_eq!(IrCodeTable::TableB.key_for([255, 0, 0, 0x0D]), Some(100));
        assert_eq!(IrCodeTable::TableB.key_for([255, 0, 0, 0x4D]), Some(200));
        assert_eq!(IrCodeTable::TableB.key_for([255, 2, 0, 0x4D]), None);
    }

    #[test]
    fn test_tables_are_bijective() {
        for table in [IrCodeTable::TableA, IrCodeTable::TableB] {
            for &(code, key) in table.entries() {
                assert_eq!(table.code_for(key), Some(code));
                assert_eq!(table.key_for([255, table.marker(), 0, code]), Some(key));
            }
        }
    }
}
