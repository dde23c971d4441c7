use log::debug;

use crate::Error;

/// Number of entries in the gain table.
pub const GAIN_TABLE_LEN: usize = 64;

/// First shift amount, used at index 0.
pub const DEFAULT_SHIFT_SEED: u8 = 2;

/// Largest accepted seed. The table has seven shift entries, so the last one is `seed + 6`,
/// which must stay a valid shift for a 16-bit word.
pub const MAX_SHIFT_SEED: u8 = 9;

// 256.0 * 64.0: reciprocal entries are 6.8 fixed point multipliers for a normalisation
// target of 64 / (index + 1)
const RECIPROCAL_NUMERATOR: usize = 16384;

/// One entry of the gain table.
///
/// The gain table approximates `16384 / (index + 1)`. Where `index + 1` is a power of two,
/// the entry is instead a right shift amount which scales a 16-bit value directly to the
/// target range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    /// Multiplier, `floor(16384 / (index + 1))`.
    Reciprocal(i16),
    /// Right shift amount.
    Shift(u8),
}

impl Regime {
    /// Returns the entry as it is stored in a flat table of words.
    pub fn raw(self) -> i16 {
        match self {
            Regime::Reciprocal(value) => value,
            Regime::Shift(amount) => i16::from(amount),
        }
    }
}

/// The 64-entry non-linear gain table.
///
/// The regime of each entry is decided once when the table is built, lookups don't test
/// the index again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GainTable {
    entries: [Regime; GAIN_TABLE_LEN],
}

impl GainTable {
    /// Creates the gain table with the default shift seed.
    pub fn new() -> GainTable {
        GainTable { entries: build_entries(DEFAULT_SHIFT_SEED) }
    }

    /// Creates a gain table whose first shift amount is `seed`.
    ///
    /// An error is returned if `seed` is larger than [`MAX_SHIFT_SEED`].
    pub fn with_seed(seed: u8) -> Result<GainTable, Error> {
        GainTable::generate(GAIN_TABLE_LEN, seed)
    }

    /// Creates a gain table of `len` entries with the shift seed `seed`.
    ///
    /// The shift and reciprocal regimes are only defined for 64 entries, any other `len`
    /// returns [`Error::DomainMismatch`].
    pub fn generate(len: usize, seed: u8) -> Result<GainTable, Error> {
        if len != GAIN_TABLE_LEN {
            return Err(Error::DomainMismatch(len));
        }
        if seed > MAX_SHIFT_SEED {
            return Err(Error::InvalidShiftSeed(seed));
        }
        Ok(GainTable { entries: build_entries(seed) })
    }

    /// Returns the entry at `index`, or `None` if `index` is 64 or larger.
    #[inline(always)]
    pub fn get(&self, index: usize) -> Option<Regime> {
        self.entries.get(index).copied()
    }

    pub fn entries(&self) -> &[Regime; GAIN_TABLE_LEN] {
        &self.entries
    }

    /// Returns the table as a flat array of words, shift amounts and multipliers mixed.
    pub fn to_raw(&self) -> [i16; GAIN_TABLE_LEN] {
        let mut raw = [0i16; GAIN_TABLE_LEN];
        for (r, entry) in raw.iter_mut().zip(self.entries.iter()) {
            *r = entry.raw();
        }
        raw
    }
}

impl Default for GainTable {
    fn default() -> Self {
        Self::new()
    }
}

fn build_entries(seed: u8) -> [Regime; GAIN_TABLE_LEN] {
    let mut entries = [Regime::Shift(0); GAIN_TABLE_LEN];
    let mut shift = seed;
    for (index, entry) in entries.iter_mut().enumerate() {
        let divisor = index + 1;
        *entry = if divisor & index != 0 {
            // divisor is at least 3 here, so the quotient is at most 5461
            #[allow(clippy::cast_possible_truncation)]
            let value = (RECIPROCAL_NUMERATOR / divisor) as i16;
            Regime::Reciprocal(value)
        } else {
            let amount = shift;
            shift += 1;
            Regime::Shift(amount)
        };
    }
    debug!("gain table built, shift amounts {}..{}", seed, shift);
    entries
}
