//! Named metric table shared between instrumented code and the reporter.

use crate::domain::errors::RegistryError;
use crate::domain::metrics::{
    Counter, Gauge, GaugeFloat, Histogram, Meter, Metric, MetricKind, Timer,
};
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Thread-safe map from metric name to metric.
///
/// Iteration walks a point-in-time copy of the table so registrations from
/// other tasks never wait on a slow visitor.
#[derive(Debug, Default)]
pub struct Registry {
    metrics: RwLock<BTreeMap<String, Metric>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, Metric>> {
        self.metrics.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, Metric>> {
        self.metrics.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register `metric` under `name`. Fails if the name is taken.
    pub fn register(
        &self,
        name: impl Into<String>,
        metric: impl Into<Metric>,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        let mut metrics = self.write();
        if metrics.contains_key(&name) {
            return Err(RegistryError::Duplicate { name });
        }
        metrics.insert(name, metric.into());
        Ok(())
    }

    /// Return the metric under `name`, registering `make()` first if absent.
    pub fn get_or_register(&self, name: &str, make: impl FnOnce() -> Metric) -> Metric {
        if let Some(existing) = self.get(name) {
            return existing;
        }
        self.write()
            .entry(name.to_string())
            .or_insert_with(make)
            .clone()
    }

    pub fn get(&self, name: &str) -> Option<Metric> {
        self.read().get(name).cloned()
    }

    pub fn unregister(&self, name: &str) -> Option<Metric> {
        self.write().remove(name)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Visit every registered metric in name order.
    pub fn each(&self, mut f: impl FnMut(&str, &Metric)) {
        let entries: Vec<(String, Metric)> = self
            .read()
            .iter()
            .map(|(name, metric)| (name.clone(), metric.clone()))
            .collect();
        for (name, metric) in &entries {
            f(name, metric);
        }
    }

    fn typed<T>(
        &self,
        name: &str,
        expected: MetricKind,
        make: impl FnOnce() -> Metric,
        extract: impl FnOnce(Metric) -> Result<T, Metric>,
    ) -> Result<T, RegistryError> {
        extract(self.get_or_register(name, make)).map_err(|found| RegistryError::KindMismatch {
            name: name.to_string(),
            expected: expected.as_str(),
            found: found.kind().as_str(),
        })
    }

    pub fn counter(&self, name: &str) -> Result<Counter, RegistryError> {
        self.typed(
            name,
            MetricKind::Counter,
            || Counter::new().into(),
            |m| match m {
                Metric::Counter(c) => Ok(c),
                other => Err(other),
            },
        )
    }

    pub fn gauge(&self, name: &str) -> Result<Gauge, RegistryError> {
        self.typed(
            name,
            MetricKind::Gauge,
            || Gauge::new().into(),
            |m| match m {
                Metric::Gauge(g) => Ok(g),
                other => Err(other),
            },
        )
    }

    pub fn gauge_float(&self, name: &str) -> Result<GaugeFloat, RegistryError> {
        self.typed(
            name,
            MetricKind::GaugeFloat,
            || GaugeFloat::new().into(),
            |m| match m {
                Metric::GaugeFloat(g) => Ok(g),
                other => Err(other),
            },
        )
    }

    /// Get or register a histogram backed by the default exp-decay reservoir.
    pub fn histogram(&self, name: &str) -> Result<Histogram, RegistryError> {
        self.typed(
            name,
            MetricKind::Histogram,
            || Histogram::default().into(),
            |m| match m {
                Metric::Histogram(h) => Ok(h),
                other => Err(other),
            },
        )
    }

    pub fn meter(&self, name: &str) -> Result<Meter, RegistryError> {
        self.typed(
            name,
            MetricKind::Meter,
            || Meter::new().into(),
            |m| match m {
                Metric::Meter(m) => Ok(m),
                other => Err(other),
            },
        )
    }

    pub fn timer(&self, name: &str) -> Result<Timer, RegistryError> {
        self.typed(
            name,
            MetricKind::Timer,
            || Timer::new().into(),
            |m| match m {
                Metric::Timer(t) => Ok(t),
                other => Err(other),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_register_rejects_duplicates() {
        let registry = Registry::new();
        registry.register("requests", Counter::new()).unwrap();

        let err = registry.register("requests", Gauge::new()).unwrap_err();
        assert!(matches!(err, RegistryError::Duplicate { name } if name == "requests"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_typed_getters_share_handles() {
        let registry = Registry::new();
        registry.counter("requests").unwrap().inc(2);
        registry.counter("requests").unwrap().inc(3);
        assert_eq!(registry.counter("requests").unwrap().count(), 5);
    }

    #[test]
    fn test_typed_getter_kind_mismatch() {
        let registry = Registry::new();
        registry.gauge("temp").unwrap();

        let err = registry.counter("temp").unwrap_err();
        match err {
            RegistryError::KindMismatch {
                name,
                expected,
                found,
            } => {
                assert_eq!(name, "temp");
                assert_eq!(expected, "counter");
                assert_eq!(found, "gauge");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_each_visits_in_name_order() {
        let registry = Registry::new();
        registry.register("b", Counter::new()).unwrap();
        registry.register("a", Meter::new()).unwrap();
        registry
            .register("c", Metric::Other(Arc::new(())))
            .unwrap();

        let mut seen = Vec::new();
        registry.each(|name, metric| seen.push((name.to_string(), metric.kind())));
        assert_eq!(
            seen,
            vec![
                ("a".to_string(), MetricKind::Meter),
                ("b".to_string(), MetricKind::Counter),
                ("c".to_string(), MetricKind::Other),
            ]
        );
    }

    #[test]
    fn test_each_tolerates_registration_from_visitor() {
        let registry = Registry::new();
        registry.register("a", Counter::new()).unwrap();

        registry.each(|name, _| {
            registry
                .register(format!("{name}.copy"), Counter::new())
                .unwrap();
        });
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_unregister() {
        let registry = Registry::new();
        registry.register("a", Counter::new()).unwrap();
        assert!(registry.unregister("a").is_some());
        assert!(registry.is_empty());
        assert!(registry.get("a").is_none());
    }
}
