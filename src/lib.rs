//!
//! This crate expands envelope-modulated 8-bit audio to 16-bit linear stereo PCM. It contains:
//!  - the 64-entry non-linear gain table (compander curve)
//!  - the 8-bit to 16-bit scale table and delta integration
//!  - hybrid delta/linear sample coding (1 linear sample followed by 15 delta samples)
//!  - the envelope-modulated stereo expander
//!  - the mixer's per-volume-level expansion tables
//!  - a byte distribution histogram for offline analysis of the coded streams
//!

#![no_std]

#![forbid(
    unsafe_code,
    clippy::panic,
    clippy::exit,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::unimplemented,
    clippy::todo,
    clippy::unreachable,
)]
#![deny(
    clippy::cast_ptr_alignment,
    clippy::char_lit_as_u8,
    clippy::unnecessary_cast,
    clippy::cast_lossless,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::checked_conversions,
)]
#![allow(clippy::manual_range_contains)]

#[cfg(test)]
extern crate std;

use core::fmt;

use thiserror::Error;

mod gain;
pub use gain::{GainTable, Regime, DEFAULT_SHIFT_SEED, GAIN_TABLE_LEN, MAX_SHIFT_SEED};

mod scale;
pub use scale::{DeltaIntegrator, ScaleTable, DEFAULT_SCALE_FACTOR, MAX_SCALE_FACTOR};

mod hybrid;
pub use hybrid::HybridState;
pub use hybrid::{decode_hybrid, decode_hybrid_sample, decode_hybrid_scaled};
pub use hybrid::{encode_hybrid, encode_hybrid_sample, is_linear_index};

mod compand;
pub use compand::{ChannelState, StereoInput};
pub use compand::{expand_channel, expand_stereo, expanded_len, required_volume_len};

mod volume;
pub use volume::{VolumeTables, DEFAULT_MASTER_VOLUME, MAX_MASTER_VOLUME, VOLUME_LEVELS};

mod histogram;
pub use histogram::{ByteHistogram, Tabulation, HISTOGRAM_ROWS, HISTOGRAM_ROW_WIDTH};

/// Number of samples in one block. Envelope factors and hybrid linear samples
/// occur once per block.
pub const BLOCK_SIZE: usize = 16;

#[cfg(feature = "internal-no-panic")]
use no_panic::no_panic;

/// Names one of the input streams of a decode run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    LeftChannel,
    LeftVolume,
    RightChannel,
    RightVolume,
    /// A single sample stream (hybrid coding, single channel expansion).
    Samples,
    /// A single envelope stream (single channel expansion).
    Volume,
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stream::LeftChannel => "left channel",
            Stream::LeftVolume => "left volume",
            Stream::RightChannel => "right channel",
            Stream::RightVolume => "right volume",
            Stream::Samples => "sample stream",
            Stream::Volume => "volume stream",
        };
        f.write_str(name)
    }
}

/// Error values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// An input stream doesn't contain enough bytes for the requested sample count.
    #[error("{stream} has {available} bytes, {required} bytes required")]
    InputTooShort {
        stream: Stream,
        required: usize,
        available: usize,
    },

    /// Scale factor would overflow a 16-bit scale table entry.
    #[error("scale factor {0} is outside -{max}..={max}", max = MAX_SCALE_FACTOR)]
    InvalidScaleFactor(i16),

    /// Gain table requested with a size other than 64 entries.
    #[error("gain table size {0} requested, only {len} entries are defined", len = GAIN_TABLE_LEN)]
    DomainMismatch(usize),

    /// Gain table shift seed would produce shift amounts wider than a 16-bit word.
    #[error("shift seed {0} is larger than {max}", max = MAX_SHIFT_SEED)]
    InvalidShiftSeed(u8),

    /// Master volume would overflow a 16-bit volume table entry.
    #[error("master volume {0} is larger than {max}", max = MAX_MASTER_VOLUME)]
    InvalidMasterVolume(u16),

    /// Output byte length for the requested sample count doesn't fit in `usize`.
    #[error("sample count {0} is too large for the output buffer")]
    SampleCountTooLarge(usize),

    /// Output buffer has an invalid size.
    #[error("output buffer has {available} elements, {required} required")]
    InvalidBufferSize {
        required: usize,
        available: usize,
    },
}

/// Converts an unsigned byte to a signed 8-bit sample value (values 128..=255 become -128..=-1).
#[cfg_attr(feature = "internal-no-panic", no_panic)]
#[inline(always)]
pub fn sign_extend(byte: u8) -> i8 {
    i8::from_ne_bytes([byte])
}

/// Returns the byte of a signed 8-bit sample value as it is stored in a raw stream.
#[cfg_attr(feature = "internal-no-panic", no_panic)]
#[inline(always)]
pub fn to_byte(sample: i8) -> u8 {
    sample.to_ne_bytes()[0]
}
