//! Waveform tables for the two refresh modes
//!
//! The UC8176 takes five register-based LUTs: one for VCOM and one per pixel
//! transition (white→white, black→white, white→black, black→black). Each group of
//! six bytes describes one phase: a level-select byte, four frame counts and a
//! repeat count. Unused phases are zero.
//!
//! - [`LUT_FULL`]: three phases with alternating drive, cleans ghosting, flickers.
//! - [`LUT_PARTIAL`]: a single short phase that only drives changed pixels.

use crate::command::{LUT_BB, LUT_BW, LUT_VCOM, LUT_WB, LUT_WW};

/// Length of the VCOM LUT in bytes
pub const VCOM_LUT_LEN: usize = 44;

/// Length of each transition LUT in bytes
pub const TRANSITION_LUT_LEN: usize = 42;

/// Complete waveform set for one refresh mode
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaveformTable {
    /// VCOM waveform
    pub vcom: [u8; VCOM_LUT_LEN],
    /// White-to-white transition
    pub ww: [u8; TRANSITION_LUT_LEN],
    /// Black-to-white transition
    pub bw: [u8; TRANSITION_LUT_LEN],
    /// White-to-black transition
    pub wb: [u8; TRANSITION_LUT_LEN],
    /// Black-to-black transition
    pub bb: [u8; TRANSITION_LUT_LEN],
}

impl WaveformTable {
    /// Register/payload pairs in the order they are programmed
    pub fn registers(&self) -> [(u8, &[u8]); 5] {
        [
            (LUT_VCOM, &self.vcom),
            (LUT_WW, &self.ww),
            (LUT_BW, &self.bw),
            (LUT_WB, &self.wb),
            (LUT_BB, &self.bb),
        ]
    }
}

/// Pads a phase prefix with zeros up to the register length.
const fn padded<const N: usize>(prefix: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    let mut i = 0;
    while i < prefix.len() {
        out[i] = prefix[i];
        i += 1;
    }
    out
}

/// Waveforms for a full (flashing) refresh
pub const LUT_FULL: WaveformTable = WaveformTable {
    vcom: padded(&[
        0x00, 0x08, 0x08, 0x00, 0x00, 0x02, //
        0x00, 0x0F, 0x0F, 0x00, 0x00, 0x01, //
        0x00, 0x08, 0x08, 0x00, 0x00, 0x02,
    ]),
    ww: padded(&[
        0x50, 0x08, 0x08, 0x00, 0x00, 0x02, //
        0x90, 0x0F, 0x0F, 0x00, 0x00, 0x01, //
        0xA0, 0x08, 0x08, 0x00, 0x00, 0x02,
    ]),
    bw: padded(&[
        0x50, 0x08, 0x08, 0x00, 0x00, 0x02, //
        0x90, 0x0F, 0x0F, 0x00, 0x00, 0x01, //
        0xA0, 0x08, 0x08, 0x00, 0x00, 0x02,
    ]),
    wb: padded(&[
        0xA0, 0x08, 0x08, 0x00, 0x00, 0x02, //
        0x90, 0x0F, 0x0F, 0x00, 0x00, 0x01, //
        0x50, 0x08, 0x08, 0x00, 0x00, 0x02,
    ]),
    bb: padded(&[
        0x20, 0x08, 0x08, 0x00, 0x00, 0x02, //
        0x90, 0x0F, 0x0F, 0x00, 0x00, 0x01, //
        0x10, 0x08, 0x08, 0x00, 0x00, 0x02,
    ]),
};

/// Waveforms for a partial (differential) refresh
pub const LUT_PARTIAL: WaveformTable = WaveformTable {
    vcom: padded(&[0x00, 0x01, 0x20, 0x01, 0x00, 0x01]),
    ww: padded(&[0x00, 0x01, 0x20, 0x01, 0x00, 0x01]),
    bw: padded(&[0x20, 0x01, 0x20, 0x01, 0x00, 0x01]),
    wb: padded(&[0x10, 0x01, 0x20, 0x01, 0x00, 0x01]),
    bb: padded(&[0x00, 0x01, 0x20, 0x01, 0x00, 0x01]),
};
