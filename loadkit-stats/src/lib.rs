pub mod deviation;
pub mod percentiles;
pub mod summary;

pub use deviation::{compute_std_dev, mean};
pub use loadkit_common::PercentilePolicy;
pub use percentiles::{compute_percentiles, compute_percentiles_with, Percentile, PercentileReport};
pub use summary::LatencySummary;
