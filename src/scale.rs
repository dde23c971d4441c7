use log::debug;

#[cfg(feature = "internal-no-panic")]
use no_panic::no_panic;

use crate::Error;

/// Default number of 16-bit steps per 8-bit level.
pub const DEFAULT_SCALE_FACTOR: i16 = 61;

/// Largest scale factor magnitude whose table entries all fit in 16 bits (256 * 127 = 32512).
pub const MAX_SCALE_FACTOR: i16 = 127;

// table covers every difference of two 8-bit samples, not just the samples themselves
const DOMAIN_MIN: i16 = -256;
const DOMAIN_MAX: i16 = 255;
const DOMAIN_LEN: usize = 512;

/// Linear 8-bit to 16-bit expansion table, `table[v] == v * factor` for `v` in `-256..=255`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaleTable {
    factor: i16,
    values: [i16; DOMAIN_LEN],
}

impl ScaleTable {
    /// Creates a scale table for `factor`.
    ///
    /// Zero and negative factors are accepted, they give a silent or inverted table.
    /// An error is returned if `factor` isn't in the range `-127..=127`.
    pub fn new(factor: i16) -> Result<ScaleTable, Error> {
        if factor < -MAX_SCALE_FACTOR || factor > MAX_SCALE_FACTOR {
            return Err(Error::InvalidScaleFactor(factor));
        }
        debug!("scale table built, factor {}", factor);
        Ok(ScaleTable { factor, values: build_values(factor) })
    }

    pub fn factor(&self) -> i16 {
        self.factor
    }

    /// Returns `value * factor`, or `None` if `value` is outside `-256..=255`.
    #[inline(always)]
    pub fn lookup(&self, value: i16) -> Option<i16> {
        let index = usize::try_from(i32::from(value) - i32::from(DOMAIN_MIN)).ok()?;
        self.values.get(index).copied()
    }

    /// Scales an 8-bit sample. Every 8-bit value is inside the table domain.
    #[cfg_attr(feature = "internal-no-panic", no_panic)]
    #[inline(always)]
    pub fn scale(&self, sample: i8) -> i16 {
        self.values[usize::from(offset_binary(sample)) + 128]
    }

    /// Scales the difference `to - from` of two 8-bit samples.
    #[cfg_attr(feature = "internal-no-panic", no_panic)]
    #[inline(always)]
    pub fn scale_difference(&self, from: i8, to: i8) -> i16 {
        // to - from + 256, always in 1..=511
        let index = usize::from(offset_binary(to)) + 256 - usize::from(offset_binary(from));
        self.values[index]
    }
}

// maps -128..=127 to 0..=255
#[inline(always)]
fn offset_binary(sample: i8) -> u8 {
    sample.to_ne_bytes()[0] ^ 0x80
}

fn build_values(factor: i16) -> [i16; DOMAIN_LEN] {
    let mut values = [0i16; DOMAIN_LEN];
    for (value, v) in values.iter_mut().zip(DOMAIN_MIN..=DOMAIN_MAX) {
        // |v| <= 256 and |factor| <= 127, so the product fits in i16
        *value = v * factor;
    }
    values
}

impl Default for ScaleTable {
    fn default() -> Self {
        ScaleTable { factor: DEFAULT_SCALE_FACTOR, values: build_values(DEFAULT_SCALE_FACTOR) }
    }
}

/// Reconstructs scaled samples by summing scaled sample differences.
///
/// Each pushed 8-bit sample contributes `table[sample - last_sample]` to a running sum.
/// The difference of two 8-bit samples is within `-255..=255`, so the sum equals
/// `table[sample]` after every push for any scale table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeltaIntegrator {
    last_sample: i8,
    integrated: i32,
    min_delta: i16,
    max_delta: i16,
}

impl DeltaIntegrator {
    /// Creates an integrator starting from a zero sample.
    pub fn new() -> DeltaIntegrator {
        DeltaIntegrator {
            last_sample: 0,
            integrated: 0,
            min_delta: i16::MAX,
            max_delta: i16::MIN,
        }
    }

    /// Adds the scaled difference between `sample` and the previous sample and
    /// returns the integrated value.
    #[inline(always)]
    pub fn push(&mut self, table: &ScaleTable, sample: i8) -> i32 {
        let delta = i16::from(sample) - i16::from(self.last_sample);
        self.min_delta = self.min_delta.min(delta);
        self.max_delta = self.max_delta.max(delta);
        self.integrated += i32::from(table.scale_difference(self.last_sample, sample));
        self.last_sample = sample;
        self.integrated
    }

    pub fn integrated(&self) -> i32 {
        self.integrated
    }

    /// Returns the smallest and the largest 8-bit sample difference seen so far,
    /// or `None` if nothing has been pushed.
    pub fn delta_range(&self) -> Option<(i16, i16)> {
        if self.min_delta > self.max_delta {
            None
        } else {
            Some((self.min_delta, self.max_delta))
        }
    }
}

impl Default for DeltaIntegrator {
    fn default() -> Self {
        Self::new()
    }
}
