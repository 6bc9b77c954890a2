//! Exponentially-weighted moving averages ticked every five seconds.

use std::time::Duration;

/// Interval between EWMA ticks.
pub const TICK_INTERVAL: Duration = Duration::from_secs(5);

/// Moving average of an event rate, reported in events per second.
#[derive(Debug, Clone)]
pub struct Ewma {
    alpha: f64,
    uncounted: i64,
    rate: f64,
    initialized: bool,
}

impl Ewma {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            uncounted: 0,
            rate: 0.0,
            initialized: false,
        }
    }

    /// Moving average over a window of `minutes`.
    pub fn over_minutes(minutes: f64) -> Self {
        let tick = TICK_INTERVAL.as_secs_f64();
        Self::new(1.0 - (-tick / 60.0 / minutes).exp())
    }

    pub fn one_minute() -> Self {
        Self::over_minutes(1.0)
    }

    pub fn five_minute() -> Self {
        Self::over_minutes(5.0)
    }

    pub fn fifteen_minute() -> Self {
        Self::over_minutes(15.0)
    }

    /// Record `n` events since the last tick.
    pub fn update(&mut self, n: i64) {
        self.uncounted += n;
    }

    /// Fold the events seen during the last interval into the average.
    pub fn tick(&mut self) {
        let instant_rate = self.uncounted as f64 / TICK_INTERVAL.as_secs_f64();
        self.uncounted = 0;
        if self.initialized {
            self.rate += self.alpha * (instant_rate - self.rate);
        } else {
            self.rate = instant_rate;
            self.initialized = true;
        }
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elapse_minute(ewma: &mut Ewma) {
        for _ in 0..12 {
            ewma.tick();
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_one_minute_first_tick_seeds_rate() {
        let mut ewma = Ewma::one_minute();
        ewma.update(3);
        ewma.tick();
        assert_close(ewma.rate(), 0.6);
    }

    #[test]
    fn test_one_minute_decays_by_e_per_minute() {
        let mut ewma = Ewma::one_minute();
        ewma.update(3);
        ewma.tick();
        elapse_minute(&mut ewma);
        assert_close(ewma.rate(), 0.22072766470286553);
    }

    #[test]
    fn test_five_minute_after_one_minute() {
        let mut ewma = Ewma::five_minute();
        ewma.update(3);
        ewma.tick();
        elapse_minute(&mut ewma);
        assert_close(ewma.rate(), 0.6 * (-0.2f64).exp());
    }

    #[test]
    fn test_fifteen_minute_after_one_minute() {
        let mut ewma = Ewma::fifteen_minute();
        ewma.update(3);
        ewma.tick();
        elapse_minute(&mut ewma);
        assert_close(ewma.rate(), 0.6 * (-1.0f64 / 15.0).exp());
    }
}
