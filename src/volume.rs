use log::debug;

use crate::Error;

/// Number of volume levels, including the silent level 0.
pub const VOLUME_LEVELS: usize = 16;

/// Master volume used when none is given.
pub const DEFAULT_MASTER_VOLUME: u16 = 8192;

/// Largest master volume whose tables fit in 16-bit entries.
pub const MAX_MASTER_VOLUME: u16 = 32767;

/// 8-bit to 16-bit expansion tables for the volume levels 1..=15.
///
/// Each table has 256 entries indexed by the raw (unsigned) sample byte. Table `n` spans
/// `-max..=127 * max / 128` with `max = n * (master_volume / 16)`, in equal steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeTables {
    master_volume: u16,
    tables: [[i16; 256]; VOLUME_LEVELS - 1],
}

impl VolumeTables {
    /// Creates the tables for `master_volume`.
    ///
    /// An error is returned if `master_volume` is larger than [`MAX_MASTER_VOLUME`].
    pub fn new(master_volume: u16) -> Result<VolumeTables, Error> {
        if master_volume > MAX_MASTER_VOLUME {
            return Err(Error::InvalidMasterVolume(master_volume));
        }
        debug!("volume tables built, master volume {}", master_volume);
        Ok(VolumeTables { master_volume, tables: build_tables(master_volume) })
    }

    pub fn master_volume(&self) -> u16 {
        self.master_volume
    }

    /// Returns the table for `level`, or `None` for the silent level 0 and levels above 15.
    pub fn table(&self, level: u8) -> Option<&[i16; 256]> {
        let index = usize::from(level).checked_sub(1)?;
        self.tables.get(index)
    }

    /// Expands a raw sample byte at `level`. Level 0 is silent.
    ///
    /// Returns `None` if `level` is above 15.
    #[inline(always)]
    pub fn lookup(&self, level: u8, sample: u8) -> Option<i16> {
        if level == 0 {
            return Some(0);
        }
        self.table(level).map(|table| table[usize::from(sample)])
    }
}

impl Default for VolumeTables {
    fn default() -> Self {
        VolumeTables {
            master_volume: DEFAULT_MASTER_VOLUME,
            tables: build_tables(DEFAULT_MASTER_VOLUME),
        }
    }
}

// master_volume must be at most MAX_MASTER_VOLUME
fn build_tables(master_volume: u16) -> [[i16; 256]; VOLUME_LEVELS - 1] {
    // step <= 2047, so 15 * step fits in i16
    #[allow(clippy::cast_possible_wrap)]
    let step = (master_volume / 16) as i16;
    let mut tables = [[0i16; 256]; VOLUME_LEVELS - 1];
    let mut table_max = step;
    for table in tables.iter_mut() {
        let level_step = table_max / 128;
        let mut level = level_step;
        table[0] = 0;
        table[0x80] = -table_max;
        for i in 1..128 {
            table[i] = level;
            table[256 - i] = -level;
            level += level_step;
        }
        table_max += step;
    }
    tables
}
