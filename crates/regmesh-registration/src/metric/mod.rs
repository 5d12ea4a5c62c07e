//! Similarity metrics.

pub mod histogram;
pub mod mutual_information;
pub mod trait_;

pub use histogram::{HistogramBounds, IntensityBounds, JointHistogram};
pub use mutual_information::{MutualInformationConfig, MutualInformationHistogramMetric};
pub use trait_::Metric;
