//! Reservoir samples backing histograms and timers.

use crate::domain::metrics::HistogramStats;
use rand::Rng;
use statrs::statistics::Statistics;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Interval after which exponentially-decaying priorities are rescaled.
const RESCALE_THRESHOLD: Duration = Duration::from_secs(60 * 60);

/// A bounded reservoir of observed values.
pub trait Sample: Send + Sync + fmt::Debug {
    fn update(&self, value: i64);
    fn clear(&self);
    fn snapshot(&self) -> SampleSnapshot;
}

/// Frozen copy of a reservoir. Values are kept sorted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleSnapshot {
    count: i64,
    values: Vec<i64>,
}

impl SampleSnapshot {
    /// `count` is the number of updates ever seen, which can exceed `values.len()`.
    pub fn new(count: i64, mut values: Vec<i64>) -> Self {
        values.sort_unstable();
        Self { count, values }
    }

    /// Number of retained values.
    pub fn size(&self) -> usize {
        self.values.len()
    }

    pub fn values(&self) -> &[i64] {
        &self.values
    }

    fn floats(&self) -> Vec<f64> {
        self.values.iter().map(|&v| v as f64).collect()
    }

    fn percentile(&self, p: f64) -> f64 {
        let size = self.values.len();
        if size == 0 {
            return 0.0;
        }
        let pos = p * (size + 1) as f64;
        if pos < 1.0 {
            self.values[0] as f64
        } else if pos >= size as f64 {
            self.values[size - 1] as f64
        } else {
            let lower = self.values[pos as usize - 1] as f64;
            let upper = self.values[pos as usize] as f64;
            lower + (pos - pos.floor()) * (upper - lower)
        }
    }
}

impl HistogramStats for SampleSnapshot {
    fn count(&self) -> i64 {
        self.count
    }

    fn min(&self) -> i64 {
        self.values.first().copied().unwrap_or(0)
    }

    fn max(&self) -> i64 {
        self.values.last().copied().unwrap_or(0)
    }

    fn mean(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.floats().iter().mean()
    }

    fn std_dev(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.floats().iter().population_std_dev()
    }

    fn percentiles(&self, ps: &[f64]) -> Vec<f64> {
        ps.iter().map(|&p| self.percentile(p)).collect()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Uniform reservoir (Vitter's algorithm R).
#[derive(Debug)]
pub struct UniformSample {
    reservoir_size: usize,
    state: Mutex<UniformState>,
}

#[derive(Debug, Default)]
struct UniformState {
    count: i64,
    values: Vec<i64>,
}

impl UniformSample {
    pub fn new(reservoir_size: usize) -> Self {
        Self {
            reservoir_size,
            state: Mutex::new(UniformState {
                count: 0,
                values: Vec::with_capacity(reservoir_size),
            }),
        }
    }
}

impl Sample for UniformSample {
    fn update(&self, value: i64) {
        let mut state = lock(&self.state);
        state.count += 1;
        if state.values.len() < self.reservoir_size {
            state.values.push(value);
            return;
        }
        let r = rand::rng().random_range(0..state.count);
        if (r as usize) < self.reservoir_size {
            state.values[r as usize] = value;
        }
    }

    fn clear(&self) {
        let mut state = lock(&self.state);
        state.count = 0;
        state.values.clear();
    }

    fn snapshot(&self) -> SampleSnapshot {
        let state = lock(&self.state);
        SampleSnapshot::new(state.count, state.values.clone())
    }
}

#[derive(Debug, Clone, Copy)]
struct Weighted {
    priority: f64,
    value: i64,
}

impl PartialEq for Weighted {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Weighted {}

impl PartialOrd for Weighted {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Weighted {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority.total_cmp(&other.priority)
    }
}

/// Forward-decaying priority reservoir biased towards the last five minutes
/// (with the usual alpha of 0.015).
#[derive(Debug)]
pub struct ExpDecaySample {
    alpha: f64,
    reservoir_size: usize,
    state: Mutex<ExpDecayState>,
}

#[derive(Debug)]
struct ExpDecayState {
    count: i64,
    landmark: Instant,
    next_rescale: Instant,
    // Min-heap on priority: the lowest-priority entry is evicted first.
    values: BinaryHeap<Reverse<Weighted>>,
}

impl ExpDecaySample {
    pub fn new(reservoir_size: usize, alpha: f64) -> Self {
        Self::starting_at(reservoir_size, alpha, Instant::now())
    }

    fn starting_at(reservoir_size: usize, alpha: f64, now: Instant) -> Self {
        Self {
            alpha,
            reservoir_size,
            state: Mutex::new(ExpDecayState {
                count: 0,
                landmark: now,
                next_rescale: now + RESCALE_THRESHOLD,
                values: BinaryHeap::with_capacity(reservoir_size),
            }),
        }
    }

    pub(crate) fn update_at(&self, now: Instant, value: i64) {
        let mut state = lock(&self.state);
        state.count += 1;

        let elapsed = now.saturating_duration_since(state.landmark).as_secs_f64();
        // 1 - [0, 1) keeps the divisor strictly positive.
        let u = 1.0 - rand::rng().random::<f64>();
        let entry = Weighted {
            priority: (self.alpha * elapsed).exp() / u,
            value,
        };

        if state.values.len() < self.reservoir_size {
            state.values.push(Reverse(entry));
        } else {
            let evict = matches!(state.values.peek(), Some(Reverse(lowest)) if lowest.priority < entry.priority);
            if evict {
                state.values.pop();
                state.values.push(Reverse(entry));
            }
        }

        if now >= state.next_rescale {
            self.rescale(&mut state, now);
        }
    }

    fn rescale(&self, state: &mut ExpDecayState, now: Instant) {
        let old_landmark = state.landmark;
        state.landmark = now;
        state.next_rescale = now + RESCALE_THRESHOLD;
        let factor = (-self.alpha * now.duration_since(old_landmark).as_secs_f64()).exp();
        let rescaled: BinaryHeap<Reverse<Weighted>> = state
            .values
            .drain()
            .map(|Reverse(w)| {
                Reverse(Weighted {
                    priority: w.priority * factor,
                    value: w.value,
                })
            })
            .collect();
        state.values = rescaled;
    }
}

impl Sample for ExpDecaySample {
    fn update(&self, value: i64) {
        self.update_at(Instant::now(), value);
    }

    fn clear(&self) {
        let mut state = lock(&self.state);
        let now = Instant::now();
        state.count = 0;
        state.landmark = now;
        state.next_rescale = now + RESCALE_THRESHOLD;
        state.values.clear();
    }

    fn snapshot(&self) -> SampleSnapshot {
        let state = lock(&self.state);
        let values = state.values.iter().map(|Reverse(w)| w.value).collect();
        SampleSnapshot::new(state.count, values)
    }
}
