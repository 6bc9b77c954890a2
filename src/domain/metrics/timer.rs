use crate::domain::metrics::histogram::{Histogram, HistogramSnapshot};
use crate::domain::metrics::meter::{Meter, MeterSnapshot};
use crate::domain::metrics::{HistogramStats, RateStats};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Frozen view of a timer: both halves are read under the same lock.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimerSnapshot {
    pub histogram: HistogramSnapshot,
    pub meter: MeterSnapshot,
}

impl HistogramStats for TimerSnapshot {
    fn count(&self) -> i64 {
        self.histogram.count()
    }

    fn min(&self) -> i64 {
        self.histogram.min()
    }

    fn max(&self) -> i64 {
        self.histogram.max()
    }

    fn mean(&self) -> f64 {
        self.histogram.mean()
    }

    fn std_dev(&self) -> f64 {
        self.histogram.std_dev()
    }

    fn percentiles(&self, ps: &[f64]) -> Vec<f64> {
        self.histogram.percentiles(ps)
    }
}

impl RateStats for TimerSnapshot {
    fn count(&self) -> i64 {
        self.meter.count
    }

    fn rate1(&self) -> f64 {
        self.meter.rate1
    }

    fn rate5(&self) -> f64 {
        self.meter.rate5
    }

    fn rate15(&self) -> f64 {
        self.meter.rate15
    }

    fn rate_mean(&self) -> f64 {
        self.meter.rate_mean
    }
}

/// Duration distribution (in nanoseconds) plus the rate of timed events.
#[derive(Debug, Clone)]
pub struct Timer {
    inner: Arc<TimerInner>,
}

#[derive(Debug)]
struct TimerInner {
    lock: Mutex<()>,
    histogram: Histogram,
    meter: Meter,
}

impl Timer {
    pub fn new() -> Self {
        Self::with_parts(Histogram::default(), Meter::new())
    }

    pub fn with_parts(histogram: Histogram, meter: Meter) -> Self {
        Self {
            inner: Arc::new(TimerInner {
                lock: Mutex::new(()),
                histogram,
                meter,
            }),
        }
    }

    /// Record one event lasting `elapsed`.
    pub fn update(&self, elapsed: Duration) {
        let nanos = i64::try_from(elapsed.as_nanos()).unwrap_or(i64::MAX);
        let _guard = self.inner.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.inner.histogram.update(nanos);
        self.inner.meter.mark(1);
    }

    pub fn update_since(&self, start: Instant) {
        self.update(start.elapsed());
    }

    /// Run `f` and record how long it took.
    pub fn time<T>(&self, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let result = f();
        self.update_since(start);
        result
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        let _guard = self.inner.lock.lock().unwrap_or_else(PoisonError::into_inner);
        TimerSnapshot {
            histogram: self.inner.histogram.snapshot(),
            meter: self.inner.meter.snapshot(),
        }
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_records_nanoseconds() {
        let timer = Timer::new();
        timer.update(Duration::from_millis(2));
        timer.update(Duration::from_millis(4));

        let snapshot = timer.snapshot();
        assert_eq!(HistogramStats::count(&snapshot), 2);
        assert_eq!(RateStats::count(&snapshot), 2);
        assert_eq!(snapshot.min(), 2_000_000);
        assert_eq!(snapshot.max(), 4_000_000);
        assert!((snapshot.mean() - 3_000_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_timer_time_returns_closure_result() {
        let timer = Timer::new();
        let value = timer.time(|| 7);
        assert_eq!(value, 7);
        assert_eq!(timer.snapshot().meter.count, 1);
    }

    #[test]
    fn test_snapshot_ignores_later_updates() {
        let timer = Timer::new();
        timer.update(Duration::from_micros(10));
        let snapshot = timer.snapshot();

        timer.update(Duration::from_secs(1));

        assert_eq!(HistogramStats::count(&snapshot), 1);
        assert_eq!(snapshot.max(), 10_000);
        assert_eq!(snapshot.meter.count, 1);
    }
}
