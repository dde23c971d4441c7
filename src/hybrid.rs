#[cfg(feature = "internal-no-panic")]
use no_panic::no_panic;

use crate::{sign_extend, to_byte, DeltaIntegrator, Error, ScaleTable, BLOCK_SIZE};

/// State values for the hybrid delta/linear encoder and decoder.
///
/// `last` is the previous absolute 8-bit sample. It should be zero at the start of a stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HybridState {
    pub last: i8,
}

impl HybridState {
    /// Creates a new HybridState with a zero sample.
    pub fn new() -> HybridState {
        HybridState { last: 0 }
    }
}

/// Returns `true` if the sample at `index` is stored as a linear value.
///
/// The first sample of every 16-sample block is linear, the other 15 are deltas.
#[cfg_attr(feature = "internal-no-panic", no_panic)]
#[inline(always)]
pub fn is_linear_index(index: usize) -> bool {
    index & (BLOCK_SIZE - 1) == 0
}

/// Encodes the raw sample byte at stream position `index` to a hybrid coded value.
///
/// Linear positions return the sample itself, other positions return the difference
/// to the previous sample, wrapped to 8 bits. `state.last` is updated to the absolute sample.
#[cfg_attr(feature = "internal-no-panic", no_panic)]
#[inline(always)]
pub fn encode_hybrid_sample(sample: u8, index: usize, state: &mut HybridState) -> i8 {
    let sample = sign_extend(sample);
    let coded = if is_linear_index(index) {
        sample
    } else {
        sample.wrapping_sub(state.last)
    };
    state.last = sample;
    coded
}

/// Decodes the hybrid coded byte at stream position `index` to an absolute 8-bit sample.
///
/// Subsequent calls should pass in the state from the previous call.
#[cfg_attr(feature = "internal-no-panic", no_panic)]
#[inline(always)]
pub fn decode_hybrid_sample(coded: u8, index: usize, state: &mut HybridState) -> i8 {
    let value = sign_extend(coded);
    let sample = if is_linear_index(index) {
        value
    } else {
        state.last.wrapping_add(value)
    };
    state.last = sample;
    sample
}

/// Encodes a raw 8-bit sample stream to a hybrid coded stream.
///
/// `out_buf` must have the same length as `samples`. An error is returned if it doesn't
/// and `out_buf` is left unmodified.
pub fn encode_hybrid(samples: &[u8], out_buf: &mut [u8]) -> Result<(), Error> {
    check_output_len(samples.len(), out_buf.len())?;
    let mut state = HybridState::new();
    for (index, (sample, out)) in samples.iter().zip(out_buf.iter_mut()).enumerate() {
        *out = to_byte(encode_hybrid_sample(*sample, index, &mut state));
    }
    Ok(())
}

/// Decodes a hybrid coded stream to raw 8-bit samples.
///
/// `out_samples` must have the same length as `coded`. An error is returned if it doesn't
/// and `out_samples` is left unmodified.
pub fn decode_hybrid(coded: &[u8], out_samples: &mut [u8]) -> Result<(), Error> {
    check_output_len(coded.len(), out_samples.len())?;
    let mut state = HybridState::new();
    for (index, (value, out)) in coded.iter().zip(out_samples.iter_mut()).enumerate() {
        *out = to_byte(decode_hybrid_sample(*value, index, &mut state));
    }
    Ok(())
}

/// Decodes a hybrid coded stream to 16-bit samples using `table`.
///
/// Each output sample is the sum of the scaled differences of all samples up to it,
/// which equals `table.scale(sample)`.
///
/// `out_samples` must have the same length as `coded`. An error is returned if it doesn't
/// and `out_samples` is left unmodified.
pub fn decode_hybrid_scaled(coded: &[u8], table: &ScaleTable, out_samples: &mut [i16])
    -> Result<(), Error> {
    check_output_len(coded.len(), out_samples.len())?;
    let mut state = HybridState::new();
    let mut integrator = DeltaIntegrator::new();
    for (index, (value, out)) in coded.iter().zip(out_samples.iter_mut()).enumerate() {
        let sample = decode_hybrid_sample(*value, index, &mut state);
        #[allow(clippy::cast_possible_truncation)] // integrated value equals a 16-bit table entry
        {
        *out = integrator.push(table, sample) as i16;
        }
    }
    Ok(())
}

fn check_output_len(required: usize, available: usize) -> Result<(), Error> {
    if required != available {
        return Err(Error::InvalidBufferSize { required, available });
    }
    Ok(())
}
