use crate::{encode_hybrid_sample, to_byte, HybridState};

/// Number of rows in a tabulation.
pub const HISTOGRAM_ROWS: usize = 32;

/// Number of consecutive byte values summed into one row.
pub const HISTOGRAM_ROW_WIDTH: usize = 8;

/// Representation of a raw sample stream to tabulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tabulation {
    /// The sample bytes as stored.
    Linear,
    /// Difference to the previous byte, wrapped to 8 bits.
    Delta,
    /// The hybrid coded stream: 1 linear sample followed by 15 deltas.
    Hybrid,
}

/// Occurrence counts of the 256 byte values of a stream.
///
/// Used to compare how the linear, delta and hybrid representations of the same samples
/// are distributed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteHistogram {
    counts: [u64; 256],
    total: u64,
}

impl ByteHistogram {
    /// Creates an empty histogram.
    pub fn new() -> ByteHistogram {
        ByteHistogram { counts: [0; 256], total: 0 }
    }

    /// Counts the bytes of `samples` in the representation `mode`.
    pub fn tabulate(samples: &[u8], mode: Tabulation) -> ByteHistogram {
        let mut histogram = ByteHistogram::new();
        match mode {
            Tabulation::Linear => {
                for sample in samples {
                    histogram.add(*sample);
                }
            },
            Tabulation::Delta => {
                let mut last = 0u8;
                for sample in samples {
                    histogram.add(sample.wrapping_sub(last));
                    last = *sample;
                }
            },
            Tabulation::Hybrid => {
                let mut state = HybridState::new();
                for (index, sample) in samples.iter().enumerate() {
                    histogram.add(to_byte(encode_hybrid_sample(*sample, index, &mut state)));
                }
            },
        }
        histogram
    }

    /// Counts one byte value.
    #[inline(always)]
    pub fn add(&mut self, value: u8) {
        self.counts[usize::from(value)] += 1;
        self.total += 1;
    }

    pub fn count(&self, value: u8) -> u64 {
        self.counts[usize::from(value)]
    }

    /// Number of counted bytes.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Returns the counts summed over rows of 8 consecutive byte values.
    pub fn rows(&self) -> [u64; HISTOGRAM_ROWS] {
        let mut rows = [0u64; HISTOGRAM_ROWS];
        for (row, chunk) in rows.iter_mut().zip(self.counts.chunks_exact(HISTOGRAM_ROW_WIDTH)) {
            *row = chunk.iter().sum();
        }
        rows
    }

    /// Returns the share of row `row` in the total as a percentage,
    /// or `None` if `row` is out of range. An empty histogram gives 0 for every row.
    #[allow(clippy::cast_precision_loss)]
    pub fn row_percent(&self, row: usize) -> Option<f64> {
        let count = *self.rows().get(row)?;
        if self.total == 0 {
            return Some(0.0);
        }
        Some(100.0 * count as f64 / self.total as f64)
    }
}

impl Default for ByteHistogram {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    #[test]
    fn test_linear_tabulation() {
        let samples: Vec<u8> = (0..=255u8).chain(0..8).collect();
        let histogram = ByteHistogram::tabulate(&samples, Tabulation::Linear);
        assert_eq!(histogram.total(), 264);
        assert_eq!(histogram.count(0), 2);
        assert_eq!(histogram.count(8), 1);
        let rows = histogram.rows();
        assert_eq!(rows[0], 16);
        assert_eq!(rows[1], 8);
        assert_eq!(rows[31], 8);
        assert_eq!(rows.iter().sum::<u64>(), histogram.total());
    }

    #[test]
    fn test_delta_tabulation() {
        // constant stream: first delta is the value itself, the rest are zero
        let samples = [100u8; 50];
        let histogram = ByteHistogram::tabulate(&samples, Tabulation::Delta);
        assert_eq!(histogram.count(100), 1);
        assert_eq!(histogram.count(0), 49);
        assert_eq!(histogram.rows()[0], 49);
        assert_eq!(histogram.rows()[12], 1);
        // descending stream: deltas of -1 wrap to 255
        let samples = [5u8, 4, 3, 2];
        let histogram = ByteHistogram::tabulate(&samples, Tabulation::Delta);
        assert_eq!(histogram.count(255), 3);
    }

    #[test]
    fn test_hybrid_tabulation() {
        let samples = [100u8; 40];
        let histogram = ByteHistogram::tabulate(&samples, Tabulation::Hybrid);
        // linear samples at 0, 16 and 32
        assert_eq!(histogram.count(100), 3);
        assert_eq!(histogram.count(0), 37);
        assert_eq!(histogram.total(), 40);
    }

    #[test]
    fn test_row_percent() {
        let samples = [0u8, 1, 2, 200];
        let histogram = ByteHistogram::tabulate(&samples, Tabulation::Linear);
        assert_eq!(histogram.row_percent(0), Some(75.0));
        assert_eq!(histogram.row_percent(25), Some(25.0));
        assert_eq!(histogram.row_percent(1), Some(0.0));
        assert_eq!(histogram.row_percent(32), None);
        assert_eq!(ByteHistogram::new().row_percent(0), Some(0.0));
    }
}
