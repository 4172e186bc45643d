use loadkit_common::{LoadKitError, PercentilePolicy, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// The fixed set of percentiles every report carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Percentile {
    P50,
    P90,
    P95,
    P99,
}

impl Percentile {
    /// All percentiles in ascending order.
    pub const ALL: [Percentile; 4] =
        [Percentile::P50, Percentile::P90, Percentile::P95, Percentile::P99];

    /// Numeric key, e.g. `90` for [`Percentile::P90`].
    pub fn key(self) -> u32 {
        match self {
            Percentile::P50 => 50,
            Percentile::P90 => 90,
            Percentile::P95 => 95,
            Percentile::P99 => 99,
        }
    }

    pub fn from_key(key: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.key() == key)
    }

    fn fraction(self) -> f64 {
        match self {
            Percentile::P50 => 0.50,
            Percentile::P90 => 0.90,
            Percentile::P95 => 0.95,
            Percentile::P99 => 0.99,
        }
    }

    /// Index into a sorted slice of `len` samples, before any range check.
    ///
    /// p50 reads `floor(len * 0.50)`; the others read `floor(len * q) - 1`.
    /// The asymmetry is kept so reports stay comparable with older runs.
    pub fn raw_index(self, len: usize) -> i64 {
        let base = (len as f64 * self.fraction()).floor() as i64;
        match self {
            Percentile::P50 => base,
            _ => base - 1,
        }
    }
}

/// Latency cut points for p50, p90, p95 and p99, in the unit of the samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PercentileReport {
    pub p50: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
}

impl PercentileReport {
    pub fn get(&self, percentile: Percentile) -> f64 {
        match percentile {
            Percentile::P50 => self.p50,
            Percentile::P90 => self.p90,
            Percentile::P95 => self.p95,
            Percentile::P99 => self.p99,
        }
    }

    /// `(percentile, value)` pairs in ascending percentile order.
    pub fn iter(&self) -> impl Iterator<Item = (Percentile, f64)> + '_ {
        Percentile::ALL.into_iter().map(move |p| (p, self.get(p)))
    }

    fn set(&mut self, percentile: Percentile, value: f64) {
        match percentile {
            Percentile::P50 => self.p50 = value,
            Percentile::P90 => self.p90 = value,
            Percentile::P95 => self.p95 = value,
            Percentile::P99 => self.p99 = value,
        }
    }

    /// Build a report from an already sorted slice, clamping indices into range.
    /// Returns the all-zero report for an empty slice.
    pub fn from_sorted(sorted: &[f64]) -> Self {
        let mut report = Self::default();
        if sorted.is_empty() {
            return report;
        }
        let last = sorted.len() - 1;
        for p in Percentile::ALL {
            let raw = p.raw_index(sorted.len());
            let idx = raw.clamp(0, last as i64) as usize;
            if idx as i64 != raw {
                warn!(
                    percentile = p.key(),
                    raw_index = raw,
                    len = sorted.len(),
                    "percentile index clamped"
                );
            }
            report.set(p, sorted[idx]);
        }
        report
    }

    /// Build a report from an already sorted slice, failing on the first
    /// index that falls outside the slice.
    pub fn from_sorted_strict(sorted: &[f64]) -> Result<Self> {
        let mut report = Self::default();
        if sorted.is_empty() {
            return Ok(report);
        }
        for p in Percentile::ALL {
            let raw = p.raw_index(sorted.len());
            let value = usize::try_from(raw)
                .ok()
                .and_then(|idx| sorted.get(idx))
                .ok_or_else(|| LoadKitError::IndexOutOfRange {
                    percentile: p.key(),
                    index: raw,
                    len: sorted.len(),
                })?;
            report.set(p, *value);
        }
        Ok(report)
    }
}

/// Sort ascending in place using the IEEE 754 total order, so NaN never panics.
pub fn sort_samples(samples: &mut [f64]) {
    samples.sort_unstable_by(|a, b| a.total_cmp(b));
}

/// Sort `samples` ascending in place and read p50/p90/p95/p99 by direct index.
/// Out-of-range indices are clamped. Returns the all-zero report for an empty slice.
pub fn compute_percentiles(samples: &mut [f64]) -> PercentileReport {
    if samples.is_empty() {
        return PercentileReport::default();
    }
    sort_samples(samples);
    PercentileReport::from_sorted(samples)
}

/// Like [`compute_percentiles`], with an explicit policy for out-of-range indices.
pub fn compute_percentiles_with(
    samples: &mut [f64],
    policy: PercentilePolicy,
) -> Result<PercentileReport> {
    match policy {
        PercentilePolicy::Clamp => Ok(compute_percentiles(samples)),
        PercentilePolicy::Strict => {
            if samples.is_empty() {
                return Ok(PercentileReport::default());
            }
            sort_samples(samples);
            PercentileReport::from_sorted_strict(samples)
        }
    }
}
