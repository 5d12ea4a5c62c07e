//! Joint intensity histograms for mutual information.
//!
//! Binning is hard (each sample lands in exactly one bin) and counts are
//! integers, so the histogram of a sample set does not depend on the order
//! in which chunks are accumulated.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Samples per rayon work item.
const CHUNK_SIZE: usize = 4096;

/// Half-open intensity interval `[lower, upper)` mapped onto histogram bins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntensityBounds {
    pub lower: f64,
    pub upper: f64,
}

impl IntensityBounds {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// Bounds covering `[min, max]`, with the upper bound raised by
    /// `increase_factor * (max - min)` so that `max` falls inside the last bin.
    pub fn from_range(min: f64, max: f64, increase_factor: f64) -> Self {
        let upper = max + increase_factor * (max - min);
        Self { lower: min, upper }
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// Bin of `value` among `bins`; values outside the bounds clamp to the end bins.
    pub fn bin(&self, value: f64, bins: usize) -> usize {
        let width = self.width();
        if width <= 0.0 || bins <= 1 {
            return 0;
        }
        let position = ((value - self.lower) / width * bins as f64).floor();
        if position <= 0.0 {
            0
        } else {
            (position as usize).min(bins - 1)
        }
    }
}

/// Bounds for both histogram axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBounds {
    pub fixed: IntensityBounds,
    pub moving: IntensityBounds,
}

/// Joint histogram of fixed and moving intensities.
///
/// Counts are stored fixed-major: entry `(f, m)` lives at `f * moving_bins + m`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointHistogram {
    fixed_bins: usize,
    moving_bins: usize,
    counts: Vec<u64>,
    total: u64,
}

impl JointHistogram {
    /// Empty histogram.
    pub fn new(fixed_bins: usize, moving_bins: usize) -> Self {
        Self {
            fixed_bins,
            moving_bins,
            counts: vec![0; fixed_bins * moving_bins],
            total: 0,
        }
    }

    /// Histogram of paired samples.
    ///
    /// `fixed` and `moving` are paired by position; the shorter slice
    /// limits the number of samples.
    pub fn from_samples(
        fixed: &[f32],
        moving: &[f32],
        bounds: &HistogramBounds,
        fixed_bins: usize,
        moving_bins: usize,
    ) -> Self {
        let cells = fixed_bins * moving_bins;
        let counts = fixed
            .par_chunks(CHUNK_SIZE)
            .zip(moving.par_chunks(CHUNK_SIZE))
            .map(|(fixed_chunk, moving_chunk)| {
                let mut partial = vec![0u64; cells];
                for (&f, &m) in fixed_chunk.iter().zip(moving_chunk) {
                    let fb = bounds.fixed.bin(f as f64, fixed_bins);
                    let mb = bounds.moving.bin(m as f64, moving_bins);
                    partial[fb * moving_bins + mb] += 1;
                }
                partial
            })
            .reduce(
                || vec![0u64; cells],
                |mut acc, partial| {
                    acc.iter_mut().zip(partial).for_each(|(a, p)| *a += p);
                    acc
                },
            );
        let total = counts.iter().sum();
        Self {
            fixed_bins,
            moving_bins,
            counts,
            total,
        }
    }

    /// Add one sample to bin `(fixed_bin, moving_bin)`.
    pub fn increment(&mut self, fixed_bin: usize, moving_bin: usize) {
        self.counts[fixed_bin * self.moving_bins + moving_bin] += 1;
        self.total += 1;
    }

    pub fn size(&self) -> [usize; 2] {
        [self.fixed_bins, self.moving_bins]
    }

    pub fn count(&self, fixed_bin: usize, moving_bin: usize) -> u64 {
        self.counts[fixed_bin * self.moving_bins + moving_bin]
    }

    pub fn total_frequency(&self) -> u64 {
        self.total
    }

    /// Counts summed over the moving axis.
    pub fn marginal_fixed(&self) -> Vec<u64> {
        self.counts
            .chunks(self.moving_bins.max(1))
            .map(|row| row.iter().sum())
            .collect()
    }

    /// Counts summed over the fixed axis.
    pub fn marginal_moving(&self) -> Vec<u64> {
        let mut marginal = vec![0u64; self.moving_bins];
        for row in self.counts.chunks(self.moving_bins.max(1)) {
            marginal.iter_mut().zip(row).for_each(|(m, c)| *m += c);
        }
        marginal
    }

    fn entropy_of(counts: impl Iterator<Item = u64>, total: u64) -> f64 {
        if total == 0 {
            return 0.0;
        }
        let total = total as f64;
        -counts
            .filter(|&c| c > 0)
            .map(|c| {
                let p = c as f64 / total;
                p * p.ln()
            })
            .sum::<f64>()
    }

    /// Entropy of the fixed marginal (natural log).
    pub fn entropy_fixed(&self) -> f64 {
        Self::entropy_of(self.marginal_fixed().into_iter(), self.total)
    }

    /// Entropy of the moving marginal (natural log).
    pub fn entropy_moving(&self) -> f64 {
        Self::entropy_of(self.marginal_moving().into_iter(), self.total)
    }

    /// Joint entropy (natural log).
    pub fn joint_entropy(&self) -> f64 {
        Self::entropy_of(self.counts.iter().copied(), self.total)
    }

    /// `sum p(f, m) ln(p(f, m) / (p(f) p(m)))` over non-empty joint bins.
    ///
    /// Zero for an empty histogram.
    pub fn mutual_information(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let total = self.total as f64;
        let fixed = self.marginal_fixed();
        let moving = self.marginal_moving();

        let mut mi = 0.0;
        for (f, row) in self.counts.chunks(self.moving_bins.max(1)).enumerate() {
            for (m, &count) in row.iter().enumerate() {
                if count == 0 {
                    continue;
                }
                // p / (pf pm) = count * total / (cf * cm)
                let p = count as f64 / total;
                let ratio = count as f64 * total / (fixed[f] as f64 * moving[m] as f64);
                mi += p * ratio.ln();
            }
        }
        mi
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_bounds() -> HistogramBounds {
        HistogramBounds {
            fixed: IntensityBounds::from_range(0.0, 1.0, 0.001),
            moving: IntensityBounds::from_range(0.0, 1.0, 0.001),
        }
    }

    #[test]
    fn test_bin_edges() {
        let bounds = IntensityBounds::from_range(0.0, 255.0, 0.001);
        assert_eq!(bounds.bin(0.0, 256), 0);
        assert_eq!(bounds.bin(255.0, 256), 255);
        assert_eq!(bounds.bin(-3.0, 256), 0);
        assert_eq!(bounds.bin(1e9, 256), 255);
        assert_eq!(IntensityBounds::new(4.0, 4.0).bin(4.0, 16), 0);
    }

    #[test]
    fn test_identical_samples_give_marginal_entropy() {
        let values: Vec<f32> = (0..1000).map(|i| (i % 4) as f32 / 3.0).collect();
        let hist = JointHistogram::from_samples(&values, &values, &unit_bounds(), 4, 4);

        assert_eq!(hist.total_frequency(), 1000);
        assert_eq!(hist.marginal_fixed(), vec![250, 250, 250, 250]);
        let expected = 4.0f64.ln();
        assert!((hist.entropy_fixed() - expected).abs() < 1e-12);
        assert!((hist.joint_entropy() - expected).abs() < 1e-12);
        assert!((hist.mutual_information() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_independent_samples_have_zero_information() {
        let mut hist = JointHistogram::new(2, 2);
        for f in 0..2 {
            for m in 0..2 {
                hist.increment(f, m);
            }
        }
        assert!(hist.mutual_information().abs() < 1e-12);
        let identity = hist.entropy_fixed() + hist.entropy_moving() - hist.joint_entropy();
        assert!(identity.abs() < 1e-12);
    }

    #[test]
    fn test_chunked_accumulation_matches_sequential() {
        let fixed: Vec<f32> = (0..10_000).map(|i| ((i * 37) % 101) as f32 / 100.0).collect();
        let moving: Vec<f32> = (0..10_000).map(|i| ((i * 53) % 97) as f32 / 96.0).collect();
        let bounds = unit_bounds();
        let parallel = JointHistogram::from_samples(&fixed, &moving, &bounds, 16, 8);

        let mut sequential = JointHistogram::new(16, 8);
        for (&f, &m) in fixed.iter().zip(&moving) {
            sequential.increment(bounds.fixed.bin(f as f64, 16), bounds.moving.bin(m as f64, 8));
        }
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_empty_histogram() {
        let hist = JointHistogram::new(8, 8);
        assert_eq!(hist.mutual_information(), 0.0);
        assert_eq!(hist.joint_entropy(), 0.0);
    }
}
