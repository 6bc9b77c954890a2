//! In-process metric types.
//!
//! Counters and gauges are lock-free atomics. Histograms, meters and timers
//! are stateful aggregators exposing a `snapshot()` that freezes every
//! derived statistic at once.

pub mod counter;
pub mod ewma;
pub mod gauge;
pub mod histogram;
pub mod meter;
pub mod sample;
pub mod timer;

pub use counter::Counter;
pub use ewma::Ewma;
pub use gauge::{Gauge, GaugeFloat};
pub use histogram::{Histogram, HistogramSnapshot};
pub use meter::{Meter, MeterSnapshot};
pub use sample::{ExpDecaySample, Sample, SampleSnapshot, UniformSample};
pub use timer::{Timer, TimerSnapshot};

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Distribution statistics read from a frozen histogram.
pub trait HistogramStats {
    /// Total number of observations, including those evicted from the reservoir.
    fn count(&self) -> i64;
    fn min(&self) -> i64;
    fn max(&self) -> i64;
    fn mean(&self) -> f64;
    /// Population standard deviation.
    fn std_dev(&self) -> f64;
    /// One value per requested quantile, in request order.
    fn percentiles(&self, ps: &[f64]) -> Vec<f64>;
}

/// Rate statistics read from a frozen meter, in events per second.
pub trait RateStats {
    fn count(&self) -> i64;
    fn rate1(&self) -> f64;
    fn rate5(&self) -> f64;
    fn rate15(&self) -> f64;
    fn rate_mean(&self) -> f64;
}

/// Anything that can be registered under a name.
#[derive(Debug, Clone)]
pub enum Metric {
    Counter(Counter),
    Gauge(Gauge),
    GaugeFloat(GaugeFloat),
    Histogram(Histogram),
    Meter(Meter),
    Timer(Timer),
    /// A value the exporter has no row schema for.
    Other(Arc<dyn Any + Send + Sync>),
}

impl Metric {
    pub fn kind(&self) -> MetricKind {
        match self {
            Metric::Counter(_) => MetricKind::Counter,
            Metric::Gauge(_) => MetricKind::Gauge,
            Metric::GaugeFloat(_) => MetricKind::GaugeFloat,
            Metric::Histogram(_) => MetricKind::Histogram,
            Metric::Meter(_) => MetricKind::Meter,
            Metric::Timer(_) => MetricKind::Timer,
            Metric::Other(_) => MetricKind::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
    GaugeFloat,
    Histogram,
    Meter,
    Timer,
    Other,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::GaugeFloat => "gauge_float",
            MetricKind::Histogram => "histogram",
            MetricKind::Meter => "meter",
            MetricKind::Timer => "timer",
            MetricKind::Other => "other",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! impl_from_metric {
    ($($ty:ident),*) => {
        $(
            impl From<$ty> for Metric {
                fn from(m: $ty) -> Self {
                    Metric::$ty(m)
                }
            }
        )*
    };
}

impl_from_metric!(Counter, Gauge, GaugeFloat, Histogram, Meter, Timer);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_kind_names() {
        assert_eq!(Metric::from(Counter::new()).kind(), MetricKind::Counter);
        assert_eq!(Metric::from(Timer::new()).kind().to_string(), "timer");
        assert_eq!(
            Metric::Other(Arc::new("healthcheck")).kind(),
            MetricKind::Other
        );
    }
}
