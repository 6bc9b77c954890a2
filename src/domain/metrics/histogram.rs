use crate::domain::metrics::sample::{ExpDecaySample, Sample, SampleSnapshot, UniformSample};
use std::sync::Arc;

/// Reservoir size used by timers and default histograms.
pub const DEFAULT_RESERVOIR_SIZE: usize = 1028;
/// Decay factor used by timers and default histograms.
pub const DEFAULT_ALPHA: f64 = 0.015;

/// Frozen view of a histogram.
pub type HistogramSnapshot = SampleSnapshot;

/// Distribution of integer observations over a reservoir sample.
#[derive(Debug, Clone)]
pub struct Histogram {
    sample: Arc<dyn Sample>,
}

impl Histogram {
    pub fn new(sample: impl Sample + 'static) -> Self {
        Self {
            sample: Arc::new(sample),
        }
    }

    pub fn uniform(reservoir_size: usize) -> Self {
        Self::new(UniformSample::new(reservoir_size))
    }

    pub fn exp_decay(reservoir_size: usize, alpha: f64) -> Self {
        Self::new(ExpDecaySample::new(reservoir_size, alpha))
    }

    pub fn update(&self, value: i64) {
        self.sample.update(value);
    }

    pub fn clear(&self) {
        self.sample.clear();
    }

    pub fn snapshot(&self) -> HistogramSnapshot {
        self.sample.snapshot()
    }
}

impl Default for Histogram {
    fn default() -> Self {
        Self::exp_decay(DEFAULT_RESERVOIR_SIZE, DEFAULT_ALPHA)
    }
}
