//! Maps each metric kind onto its row schema.
//!
//! Column names, their order and the name suffixes form the wire contract
//! with existing dashboards and must not change. Meter and timer rows carry
//! no `time` column; the database stamps them on ingest.

use crate::domain::metrics::{HistogramStats, Metric, RateStats};
use crate::domain::row::{Row, Value};

/// Quantiles reported for histograms and timers, in column order.
pub const PERCENTILES: [f64; 5] = [0.5, 0.75, 0.95, 0.99, 0.999];

pub const COUNTER_COLUMNS: [&str; 2] = ["time", "count"];
pub const GAUGE_COLUMNS: [&str; 2] = ["time", "value"];
pub const HISTOGRAM_COLUMNS: [&str; 11] = [
    "time",
    "count",
    "min",
    "max",
    "mean",
    "std-dev",
    "50-percentile",
    "75-percentile",
    "95-percentile",
    "99-percentile",
    "999-percentile",
];
pub const METER_COLUMNS: [&str; 5] = ["count", "one-minute", "five-minute", "fifteen-minute", "mean"];
pub const TIMER_COLUMNS: [&str; 14] = [
    "count",
    "min",
    "max",
    "mean",
    "std-dev",
    "50-percentile",
    "75-percentile",
    "95-percentile",
    "99-percentile",
    "999-percentile",
    "one-minute",
    "five-minute",
    "fifteen-minute",
    "mean-rate",
];

/// Build the row for one registered metric at `now` (ms since epoch).
///
/// Returns `None` for metrics without a row schema.
pub fn build_row(name: &str, metric: &Metric, now: i64) -> Option<Row> {
    let row = match metric {
        Metric::Counter(counter) => Row::single(
            format!("{name}.count"),
            &COUNTER_COLUMNS,
            vec![Value::Int(now), Value::Int(counter.count())],
        ),
        Metric::Gauge(gauge) => Row::single(
            format!("{name}.value"),
            &GAUGE_COLUMNS,
            vec![Value::Int(now), Value::Int(gauge.value())],
        ),
        Metric::GaugeFloat(gauge) => Row::single(
            format!("{name}.value"),
            &GAUGE_COLUMNS,
            vec![Value::Int(now), Value::Float(gauge.value())],
        ),
        Metric::Histogram(histogram) => histogram_row(name, &histogram.snapshot(), now),
        Metric::Meter(meter) => meter_row(name, &meter.snapshot()),
        Metric::Timer(timer) => timer_row(name, &timer.snapshot()),
        Metric::Other(_) => return None,
    };
    Some(row)
}

fn distribution_values<S: HistogramStats + ?Sized>(stats: &S, out: &mut Vec<Value>) {
    out.extend([
        Value::Int(stats.count()),
        Value::Int(stats.min()),
        Value::Int(stats.max()),
        Value::Float(stats.mean()),
        Value::Float(stats.std_dev()),
    ]);
    out.extend(stats.percentiles(&PERCENTILES).into_iter().map(Value::Float));
}

/// Row for an already-frozen histogram.
pub fn histogram_row<S: HistogramStats + ?Sized>(name: &str, snapshot: &S, now: i64) -> Row {
    let mut values = Vec::with_capacity(HISTOGRAM_COLUMNS.len());
    values.push(Value::Int(now));
    distribution_values(snapshot, &mut values);
    Row::single(format!("{name}.histogram"), &HISTOGRAM_COLUMNS, values)
}

/// Row for an already-frozen meter.
pub fn meter_row<S: RateStats + ?Sized>(name: &str, snapshot: &S) -> Row {
    Row::single(
        format!("{name}.meter"),
        &METER_COLUMNS,
        vec![
            Value::Int(snapshot.count()),
            Value::Float(snapshot.rate1()),
            Value::Float(snapshot.rate5()),
            Value::Float(snapshot.rate15()),
            Value::Float(snapshot.rate_mean()),
        ],
    )
}

/// Row for an already-frozen timer. Distribution and rates come from the same snapshot.
pub fn timer_row<S: HistogramStats + RateStats + ?Sized>(name: &str, snapshot: &S) -> Row {
    let mut values = Vec::with_capacity(TIMER_COLUMNS.len());
    distribution_values(snapshot, &mut values);
    values.extend([
        Value::Float(snapshot.rate1()),
        Value::Float(snapshot.rate5()),
        Value::Float(snapshot.rate15()),
        Value::Float(snapshot.rate_mean()),
    ]);
    Row::single(format!("{name}.timer"), &TIMER_COLUMNS, values)
}
