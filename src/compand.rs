use log::{debug, trace};

#[cfg(feature = "internal-no-panic")]
use no_panic::no_panic;

use crate::{sign_extend, Error, Stream, BLOCK_SIZE};

// envelope byte = 1 + (index >> 3): high byte of the little-endian volume word,
// one word per 8 samples
const ENVELOPE_SHIFT: u32 = 3;

// envelope bytes are 6-bit volumes placed in the high byte, 4 * byte restores the full range
const ENVELOPE_GAIN: i32 = 4;

/// Gain state of one channel.
///
/// The factor is taken from the channel's envelope at the start of each 16-sample block
/// and held for the rest of the block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelState {
    last_factor: i32,
}

impl ChannelState {
    /// Creates a new ChannelState with a zero factor.
    pub fn new() -> ChannelState {
        ChannelState { last_factor: 0 }
    }

    /// Current gain factor.
    pub fn factor(&self) -> i32 {
        self.last_factor
    }

    /// Loads the factor for a new block from the high byte of its envelope word.
    #[cfg_attr(feature = "internal-no-panic", no_panic)]
    #[inline(always)]
    pub fn begin_block(&mut self, envelope: u8) {
        self.last_factor = ENVELOPE_GAIN * i32::from(envelope);
    }

    /// Expands one raw 8-bit sample with the current factor.
    ///
    /// The product is truncated to its low 16 bits. Large products wrap around, they are
    /// not clamped.
    #[cfg_attr(feature = "internal-no-panic", no_panic)]
    #[inline(always)]
    pub fn expand(&self, sample: u8) -> u16 {
        let product = i32::from(sign_extend(sample)) * self.last_factor;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // 16-bit wrap
        let word = (product & 0xffff) as u16;
        word
    }
}

/// Input streams of a stereo expansion.
///
/// Channel streams hold one byte per sample. Volume streams hold 16-bit little-endian words,
/// one per 8 samples.
#[derive(Debug, Clone, Copy)]
pub struct StereoInput<'a> {
    pub left: &'a [u8],
    pub left_volume: &'a [u8],
    pub right: &'a [u8],
    pub right_volume: &'a [u8],
}

/// Returns the number of output bytes for `sample_count` stereo frames,
/// or `None` if it overflows.
pub fn expanded_len(sample_count: usize) -> Option<usize> {
    sample_count.checked_mul(4)
}

/// Returns the number of volume stream bytes needed to expand `sample_count` samples.
///
/// Only the envelope bytes at block starts are read, so the last block decides the length.
pub fn required_volume_len(sample_count: usize) -> usize {
    if sample_count == 0 {
        return 0;
    }
    let last_block_start = (sample_count - 1) & !(BLOCK_SIZE - 1);
    envelope_index(last_block_start) + 1
}

#[inline(always)]
fn envelope_index(index: usize) -> usize {
    1 + (index >> ENVELOPE_SHIFT)
}

fn check_input(stream: Stream, buf: &[u8], required: usize) -> Result<(), Error> {
    if buf.len() < required {
        return Err(Error::InputTooShort { stream, required, available: buf.len() });
    }
    Ok(())
}

/// Expands two channels of 8-bit samples modulated by their volume envelopes to
/// interleaved 16-bit little-endian stereo frames.
///
/// `sample_count` samples are read from each channel. `out_buf` length must be
/// `4 * sample_count`. Each frame is the left word followed by the right word.
///
/// All streams are checked before anything is written. An error is returned if a stream is
/// too short or if the `out_buf` length isn't correct, and `out_buf` is left unmodified.
pub fn expand_stereo(input: &StereoInput<'_>, sample_count: usize, out_buf: &mut [u8])
    -> Result<(), Error> {
    let Some(required) = expanded_len(sample_count) else {
        return Err(Error::SampleCountTooLarge(sample_count));
    };
    let volume_len = required_volume_len(sample_count);
    check_input(Stream::LeftChannel, input.left, sample_count)?;
    check_input(Stream::LeftVolume, input.left_volume, volume_len)?;
    check_input(Stream::RightChannel, input.right, sample_count)?;
    check_input(Stream::RightVolume, input.right_volume, volume_len)?;
    if out_buf.len() != required {
        return Err(Error::InvalidBufferSize { required, available: out_buf.len() });
    }
    debug!("expanding {} stereo samples", sample_count);

    let mut left = ChannelState::new();
    let mut right = ChannelState::new();
    let samples = input.left[..sample_count].iter().zip(input.right[..sample_count].iter());
    for (index, ((l, r), frame)) in samples.zip(out_buf.chunks_exact_mut(4)).enumerate() {
        if index & (BLOCK_SIZE - 1) == 0 {
            let e = envelope_index(index);
            left.begin_block(input.left_volume[e]);
            right.begin_block(input.right_volume[e]);
            trace!("block {}: factors {} {}", index / BLOCK_SIZE, left.factor(), right.factor());
        }
        frame[..2].copy_from_slice(&left.expand(*l).to_le_bytes());
        frame[2..].copy_from_slice(&right.expand(*r).to_le_bytes());
    }
    Ok(())
}

/// Expands one channel of 8-bit samples modulated by its volume envelope to 16-bit words.
///
/// `out_samples.len()` samples are read. The words are the same values [`expand_stereo`]
/// writes for the channel, so channels can be expanded independently.
///
/// An error is returned if a stream is too short, and `out_samples` is left unmodified.
pub fn expand_channel(samples: &[u8], volume: &[u8], out_samples: &mut [u16])
    -> Result<(), Error> {
    let sample_count = out_samples.len();
    check_input(Stream::Samples, samples, sample_count)?;
    check_input(Stream::Volume, volume, required_volume_len(sample_count))?;

    let mut state = ChannelState::new();
    for (index, (sample, out)) in samples.iter().zip(out_samples.iter_mut()).enumerate() {
        if index & (BLOCK_SIZE - 1) == 0 {
            state.begin_block(volume[envelope_index(index)]);
        }
        *out = state.expand(*sample);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec;
    use std::vec::Vec;

    fn words(buf: &[u8]) -> Vec<u16> {
        buf.chunks_exact(2).map(|b| u16::from_le_bytes([b[0], b[1]])).collect()
    }

    #[test]
    fn test_channel_state() {
        let mut state = ChannelState::new();
        assert_eq!(state.expand(100), 0);
        state.begin_block(100);
        assert_eq!(state.factor(), 400);
        assert_eq!(state.expand(10), 4000);
        // -56 * 400 = -22400, low 16 bits 43136
        assert_eq!(i32::from(state.expand(200)), -22400 & 0xffff);
        assert_eq!(state.expand(200), 43136);
        // 127 * 1020 = 129540, low 16 bits 64004
        state.begin_block(255);
        assert_eq!(state.expand(127), 64004);
        // -128 * 1020 = -130560, low 16 bits 0x0200
        assert_eq!(state.expand(128), 0x0200);
    }

    #[test]
    fn test_expand_scenario() {
        let input = StereoInput {
            left: &[10, 20, 200],
            left_volume: &[0, 100],
            right: &[1, 255, 0],
            right_volume: &[0x34, 2],
        };
        let mut out = [0u8; 12];
        assert_eq!(expand_stereo(&input, 3, &mut out), Ok(()));
        assert_eq!(words(&out), [4000, 8, 8000, 0xfff8, 43136, 0]);
        assert_eq!(&out[..4], &[0xa0, 0x0f, 0x08, 0x00]);
    }

    #[test]
    fn test_envelope_boundary() {
        let count = 40;
        let left = vec![1u8; count];
        let right = vec![2u8; count];
        let mut volume = vec![50u8; required_volume_len(count)];
        // envelope for samples 16..32
        volume[3] = 60;
        // envelope words in the middle of a block are never read
        volume[2] = 99;
        let input = StereoInput {
            left: &left,
            left_volume: &volume,
            right: &right,
            right_volume: &volume,
        };
        let mut out = vec![0u8; 4 * count];
        assert_eq!(expand_stereo(&input, count, &mut out), Ok(()));
        let words = words(&out);
        for i in 0..count {
            let (l, r) = (words[2 * i], words[2 * i + 1]);
            if i < 16 || i >= 32 {
                assert_eq!((l, r), (200, 400), "sample {}", i);
            } else {
                assert_eq!((l, r), (240, 480), "sample {}", i);
            }
        }
        assert_eq!(words[2 * 15], 200);
        assert_eq!(words[2 * 16], 240);
        assert_eq!(words[2 * 17], 240);
    }

    #[test]
    fn test_required_volume_len() {
        assert_eq!(required_volume_len(0), 0);
        assert_eq!(required_volume_len(1), 2);
        assert_eq!(required_volume_len(16), 2);
        assert_eq!(required_volume_len(17), 4);
        assert_eq!(required_volume_len(32), 4);
        assert_eq!(required_volume_len(33), 6);
        assert_eq!(expanded_len(3), Some(12));
        assert_eq!(expanded_len(usize::MAX), None);
    }

    #[test]
    fn test_expand_input_too_short() {
        let samples = [0u8; 17];
        let volume = [0u8; 4];
        let mut out = [0x55u8; 68];
        let input = StereoInput { left: &samples, left_volume: &volume,
            right: &samples[..16], right_volume: &volume };
        assert_eq!(expand_stereo(&input, 17, &mut out),
            Err(Error::InputTooShort { stream: Stream::RightChannel, required: 17, available: 16 }));
        let input = StereoInput { left: &samples, left_volume: &volume[..3],
            right: &samples, right_volume: &volume };
        assert_eq!(expand_stereo(&input, 17, &mut out),
            Err(Error::InputTooShort { stream: Stream::LeftVolume, required: 4, available: 3 }));
        let input = StereoInput { left: &samples, left_volume: &volume,
            right: &samples, right_volume: &volume[..2] };
        assert_eq!(expand_stereo(&input, 17, &mut out),
            Err(Error::InputTooShort { stream: Stream::RightVolume, required: 4, available: 2 }));
        assert!(out.iter().all(|b| *b == 0x55));
    }

    #[test]
    fn test_expand_buffer_size() {
        let samples = [0u8; 4];
        let volume = [0u8; 2];
        let input = StereoInput { left: &samples, left_volume: &volume,
            right: &samples, right_volume: &volume };
        let mut out = [0u8; 15];
        assert_eq!(expand_stereo(&input, 4, &mut out),
            Err(Error::InvalidBufferSize { required: 16, available: 15 }));
        // output length of 4 * usize::MAX samples isn't representable
        let mut out = [0x55u8; 4];
        let empty = StereoInput { left: &[], left_volume: &[], right: &[], right_volume: &[] };
        assert_eq!(expand_stereo(&empty, usize::MAX, &mut out),
            Err(Error::SampleCountTooLarge(usize::MAX)));
        assert_eq!(expand_stereo(&empty, usize::MAX / 4 + 1, &mut out),
            Err(Error::SampleCountTooLarge(usize::MAX / 4 + 1)));
        assert_eq!(out, [0x55; 4]);
        // empty run needs no envelope at all
        let input = StereoInput { left: &[], left_volume: &[], right: &[], right_volume: &[] };
        assert_eq!(expand_stereo(&input, 0, &mut []), Ok(()));
    }

    #[test]
    fn test_expand_channel_matches_stereo() {
        let count = 100;
        let left: Vec<u8> = (0..count).map(|i| u8::try_from(i * 13 % 256).unwrap_or(0)).collect();
        let right: Vec<u8> = (0..count).map(|i| u8::try_from(i * 31 % 256).unwrap_or(0)).collect();
        let volume: Vec<u8> = (0..required_volume_len(count))
            .map(|i| u8::try_from(i * 5 % 64).unwrap_or(0)).collect();
        let input = StereoInput { left: &left, left_volume: &volume,
            right: &right, right_volume: &volume };
        let mut out = vec![0u8; 4 * count];
        assert_eq!(expand_stereo(&input, count, &mut out), Ok(()));

        let mut left_words = vec![0u16; count];
        let mut right_words = vec![0u16; count];
        assert_eq!(expand_channel(&left, &volume, &mut left_words), Ok(()));
        assert_eq!(expand_channel(&right, &volume, &mut right_words), Ok(()));
        let interleaved: Vec<u16> = left_words.iter().zip(right_words.iter())
            .flat_map(|(l, r)| [*l, *r]).collect();
        assert_eq!(words(&out), interleaved);

        let mut short = vec![0u16; count + 1];
        assert_eq!(expand_channel(&left, &volume, &mut short),
            Err(Error::InputTooShort { stream: Stream::Samples, required: 101, available: 100 }));
    }
}
