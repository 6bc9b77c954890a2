use crate::domain::metrics::RateStats;
use crate::domain::metrics::ewma::{Ewma, TICK_INTERVAL};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

/// Frozen view of a meter.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MeterSnapshot {
    pub count: i64,
    pub rate1: f64,
    pub rate5: f64,
    pub rate15: f64,
    pub rate_mean: f64,
}

impl RateStats for MeterSnapshot {
    fn count(&self) -> i64 {
        self.count
    }

    fn rate1(&self) -> f64 {
        self.rate1
    }

    fn rate5(&self) -> f64 {
        self.rate5
    }

    fn rate15(&self) -> f64 {
        self.rate15
    }

    fn rate_mean(&self) -> f64 {
        self.rate_mean
    }
}

/// Event count with 1, 5 and 15 minute moving-average rates.
///
/// Averages tick lazily: marks and snapshots first catch up on every
/// five-second interval elapsed since the previous tick.
#[derive(Debug, Clone)]
pub struct Meter {
    state: Arc<Mutex<MeterState>>,
}

#[derive(Debug)]
struct MeterState {
    count: i64,
    started: Instant,
    last_tick: Instant,
    m1: Ewma,
    m5: Ewma,
    m15: Ewma,
}

impl MeterState {
    fn tick_if_necessary(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_tick);
        let ticks = elapsed.as_secs() / TICK_INTERVAL.as_secs();
        if ticks == 0 {
            return;
        }
        self.last_tick += TICK_INTERVAL * ticks as u32;
        for _ in 0..ticks {
            self.m1.tick();
            self.m5.tick();
            self.m15.tick();
        }
    }
}

impl Meter {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub(crate) fn starting_at(now: Instant) -> Self {
        Self {
            state: Arc::new(Mutex::new(MeterState {
                count: 0,
                started: now,
                last_tick: now,
                m1: Ewma::one_minute(),
                m5: Ewma::five_minute(),
                m15: Ewma::fifteen_minute(),
            })),
        }
    }

    /// Record `n` events.
    pub fn mark(&self, n: i64) {
        self.mark_at(Instant::now(), n);
    }

    pub(crate) fn mark_at(&self, now: Instant, n: i64) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.tick_if_necessary(now);
        state.count += n;
        state.m1.update(n);
        state.m5.update(n);
        state.m15.update(n);
    }

    pub fn snapshot(&self) -> MeterSnapshot {
        self.snapshot_at(Instant::now())
    }

    pub(crate) fn snapshot_at(&self, now: Instant) -> MeterSnapshot {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.tick_if_necessary(now);
        let elapsed = now.saturating_duration_since(state.started).as_secs_f64();
        let rate_mean = if elapsed > 0.0 {
            state.count as f64 / elapsed
        } else {
            0.0
        };
        MeterSnapshot {
            count: state.count,
            rate1: state.m1.rate(),
            rate5: state.m5.rate(),
            rate15: state.m15.rate(),
            rate_mean,
        }
    }
}

impl Default for Meter {
    fn default() -> Self {
        Self::new()
    }
}
