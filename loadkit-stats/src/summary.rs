use loadkit_common::{PercentilePolicy, Result};
use serde::{Deserialize, Serialize};

use crate::deviation::{compute_std_dev, mean};
use crate::percentiles::{sort_samples, PercentileReport};

/// Everything a latency report prints about one sample set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LatencySummary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
    pub percentiles: PercentileReport,
}

impl LatencySummary {
    /// Summarize `samples` without reordering them. Returns all zeros for an empty slice.
    pub fn from_samples(samples: &[f64], policy: PercentilePolicy) -> Result<Self> {
        if samples.is_empty() {
            return Ok(Self::default());
        }
        let mut sorted = samples.to_vec();
        sort_samples(&mut sorted);

        let percentiles = match policy {
            PercentilePolicy::Clamp => PercentileReport::from_sorted(&sorted),
            PercentilePolicy::Strict => PercentileReport::from_sorted_strict(&sorted)?,
        };

        Ok(Self {
            count: sorted.len(),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            mean: mean(&sorted),
            std_dev: compute_std_dev(&sorted),
            percentiles,
        })
    }
}
