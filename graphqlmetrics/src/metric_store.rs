//! In-process metric storage for the local metrics sink.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc, Mutex,
    },
};

use crate::types::{DimensionPosition, Name};

const ORDERING: Ordering = Ordering::Relaxed;

/// Counter values grouped by metric name, then by dimension position.
pub type CounterSnapshot = HashMap<Name, HashMap<DimensionPosition, u64>>;

/// Where the local metrics sink puts its measurements.
///
/// Implement this to bridge into whatever registry your service already scrapes.
pub trait MetricStore: Send + Sync + 'static {
    /// Add `value` to the counter identified by `metric` and `dimensions`.
    fn add(
        &self,
        metric: &Name,
        value: u64,
        dimensions: DimensionPosition,
    ) -> Result<(), MetricStoreError>;

    /// Called once when the owning sink closes.
    fn close(&self) -> Result<(), MetricStoreError> {
        Ok(())
    }
}

/// Failures of a local metric store. None of these get better by trying again.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetricStoreError {
    /// The metric already tracks as many dimension positions as it is allowed.
    #[error("metric {metric} reached its limit of {limit} dimension positions")]
    CardinalityLimit {
        /// metric that refused the new position
        metric: String,
        /// configured limit
        limit: usize,
    },
    /// The store no longer accepts measurements.
    #[error("metric store is closed")]
    Closed,
}

/// A monotonic counter. Never blocks; internal mutability is achieved via platform atomics.
#[derive(Debug, Default)]
pub struct Counter {
    sum: AtomicU64,
}

impl Counter {
    /// Add to the counter.
    #[inline]
    pub fn add(&self, value: u64) {
        self.sum.fetch_add(value, ORDERING);
    }

    /// Current value, without resetting.
    pub fn value(&self) -> u64 {
        self.sum.load(ORDERING)
    }

    /// Take the value and leave 0 behind. `None` when nothing was counted.
    pub fn reset(&self) -> Option<u64> {
        match self.sum.swap(0, ORDERING) {
            0 => None,
            sum => Some(sum),
        }
    }
}

/// The default [`MetricStore`]: counters registered on first use, bounded per metric.
///
/// It is cheap to clone; clones share the same counters.
#[derive(Clone, Debug)]
pub struct CounterStore {
    inner: Arc<CounterStoreInner>,
}

#[derive(Debug)]
struct CounterStoreInner {
    counters: Mutex<HashMap<Name, HashMap<DimensionPosition, Arc<Counter>>>>,
    max_positions_per_metric: usize,
    closed: AtomicBool,
}

impl Default for CounterStore {
    fn default() -> Self {
        Self::new(10_000)
    }
}

impl CounterStore {
    /// Create a store that tracks at most `max_positions_per_metric` dimension
    /// positions for each metric name.
    pub fn new(max_positions_per_metric: usize) -> Self {
        Self {
            inner: Arc::new(CounterStoreInner {
                counters: Default::default(),
                max_positions_per_metric,
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Get the shared counter for a metric at a dimension position, registering it if needed.
    ///
    /// Registration is governed by a Mutex; cache the counter if you record to it often.
    pub fn counter(
        &self,
        metric: &Name,
        dimensions: DimensionPosition,
    ) -> Result<Arc<Counter>, MetricStoreError> {
        if self.inner.closed.load(ORDERING) {
            return Err(MetricStoreError::Closed);
        }
        let mut counters = self
            .inner
            .counters
            .lock()
            .expect("local mutex should not be poisoned");
        let positions = counters.entry(metric.clone()).or_default();
        if let Some(counter) = positions.get(&dimensions) {
            return Ok(counter.clone());
        }
        if self.inner.max_positions_per_metric <= positions.len() {
            return Err(MetricStoreError::CardinalityLimit {
                metric: metric.to_string(),
                limit: self.inner.max_positions_per_metric,
            });
        }
        let counter = Arc::new(Counter::default());
        positions.insert(dimensions, counter.clone());
        Ok(counter)
    }

    /// Read every counter without resetting.
    pub fn snapshot(&self) -> CounterSnapshot {
        self.collect(|counter| Some(counter.value()).filter(|value| *value != 0))
    }

    /// Read every counter and reset it to 0. Only counters that moved are reported.
    pub fn reset(&self) -> CounterSnapshot {
        self.collect(Counter::reset)
    }

    fn collect(&self, read: impl Fn(&Counter) -> Option<u64>) -> CounterSnapshot {
        self.inner
            .counters
            .lock()
            .expect("local mutex should not be poisoned")
            .iter()
            .filter_map(|(metric, positions)| {
                let values: HashMap<DimensionPosition, u64> = positions
                    .iter()
                    .filter_map(|(position, counter)| {
                        read(counter).map(|value| (position.clone(), value))
                    })
                    .collect();
                if values.is_empty() {
                    None
                } else {
                    Some((metric.clone(), values))
                }
            })
            .collect()
    }
}

impl MetricStore for CounterStore {
    fn add(
        &self,
        metric: &Name,
        value: u64,
        dimensions: DimensionPosition,
    ) -> Result<(), MetricStoreError> {
        self.counter(metric, dimensions)?.add(value);
        Ok(())
    }

    fn close(&self) -> Result<(), MetricStoreError> {
        self.inner.closed.store(true, ORDERING);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::types::{Dimension, DimensionPosition, Name};

    use super::{CounterStore, MetricStore, MetricStoreError};

    fn position(field: &'static str) -> DimensionPosition {
        DimensionPosition::from([(Name::from("field"), Dimension::from(field))])
    }

    #[test_log::test]
    fn counters_accumulate_per_position() {
        let store = CounterStore::default();
        let metric = Name::from("usage");
        store.add(&metric, 2, position("id")).expect("can add");
        store.add(&metric, 3, position("id")).expect("can add");
        store.add(&metric, 1, position("name")).expect("can add");

        let snapshot = store.snapshot();
        let usage = snapshot.get(&metric).expect("metric is present");
        assert_eq!(Some(&5), usage.get(&position("id")));
        assert_eq!(Some(&1), usage.get(&position("name")));

        let reset = store.reset();
        assert_eq!(reset, snapshot);
        assert!(store.snapshot().is_empty(), "reset leaves nothing to report");
    }

    #[test_log::test]
    fn cardinality_is_bounded_per_metric() {
        let store = CounterStore::new(1);
        let metric = Name::from("usage");
        store.add(&metric, 1, position("id")).expect("first position fits");
        store
            .add(&metric, 1, position("id"))
            .expect("existing position is reused");
        assert_eq!(
            Err(MetricStoreError::CardinalityLimit {
                metric: "usage".to_string(),
                limit: 1
            }),
            store.add(&metric, 1, position("name"))
        );
        store
            .add(&Name::from("other"), 1, position("name"))
            .expect("limit is per metric");
    }

    #[test_log::test]
    fn closed_store_rejects_measurements() {
        let store = CounterStore::default();
        store.close().expect("close works");
        assert_eq!(
            Err(MetricStoreError::Closed),
            store.add(&Name::from("usage"), 1, position("id"))
        );
    }
}
