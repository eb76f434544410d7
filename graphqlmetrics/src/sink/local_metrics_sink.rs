use crate::{
    aggregation::{aggregate_field_usage, FieldUsageKey},
    metric_store::MetricStore,
    proto::graphqlmetrics::{OperationType, SchemaUsageInfo},
    types::{Dimension, DimensionPosition, Name},
};

use super::{Sink, SinkError};

/// How the local metrics sink names and splits its measurements.
#[derive(Clone, Debug)]
pub struct LocalMetricsSinkConfig {
    /// Name of the counter that receives field usage
    pub metric_name: Name,
    /// Split counts by operation hash as well as by operation name
    pub include_operation_hash: bool,
}

impl Default for LocalMetricsSinkConfig {
    fn default() -> Self {
        Self {
            metric_name: Name::from("router.graphql.schema_field_usage"),
            include_operation_hash: false,
        }
    }
}

/// Counts field usage per operation into an in-process [`MetricStore`].
#[derive(Debug)]
pub struct LocalMetricsSink<TStore> {
    store: TStore,
    config: LocalMetricsSinkConfig,
}

impl<TStore> LocalMetricsSink<TStore>
where
    TStore: MetricStore,
{
    /// Create a sink writing into `store`.
    pub fn new(store: TStore, config: LocalMetricsSinkConfig) -> Self {
        Self { store, config }
    }

    fn record(&self, batch: &[SchemaUsageInfo]) -> Result<(), SinkError> {
        let counts = aggregate_field_usage(batch, self.config.include_operation_hash);
        let measurements = counts.len();
        // A rejected key must not drop the keys after it; the first failure is reported.
        let mut first_error = None;
        let mut failed = 0;
        for (key, count) in counts {
            if let Err(e) = self
                .store
                .add(&self.config.metric_name, count, dimensions(key))
            {
                failed += 1;
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => {
                log::warn!(
                    "{failed} of {measurements} field usage measurements were rejected: {e}"
                );
                Err(e.into())
            }
            None => {
                log::debug!(
                    "recorded {measurements} field usage measurements from {} records",
                    batch.len()
                );
                Ok(())
            }
        }
    }
}

impl<TStore> Sink<SchemaUsageInfo> for LocalMetricsSink<TStore>
where
    TStore: MetricStore,
{
    async fn export(&self, batch: &[SchemaUsageInfo]) -> Result<(), SinkError> {
        self.record(batch)
    }

    async fn close(&self) -> Result<(), SinkError> {
        Ok(self.store.close()?)
    }
}

/// Local measurement failures are programming or resource errors, so nothing is retried.
pub fn local_error_is_retryable(_error: &SinkError) -> bool {
    false
}

fn dimensions(key: FieldUsageKey) -> DimensionPosition {
    let mut position = DimensionPosition::from([
        (
            Name::from("wg.operation.name"),
            Dimension::from(key.operation_name),
        ),
        (
            Name::from("wg.operation.type"),
            Dimension::from(operation_type_name(key.operation_type)),
        ),
        (
            Name::from("wg.graphql.field.name"),
            Dimension::from(key.field_name),
        ),
        (
            Name::from("wg.graphql.parent_type"),
            Dimension::from(key.parent_type),
        ),
    ]);
    if let Some(hash) = key.operation_hash {
        position.insert(Name::from("wg.operation.sha256"), Dimension::from(hash));
    }
    position
}

fn operation_type_name(operation_type: OperationType) -> &'static str {
    match operation_type {
        OperationType::Query => "query",
        OperationType::Mutation => "mutation",
        OperationType::Subscription => "subscription",
    }
}

#[cfg(test)]
mod test {
    use crate::{
        aggregation::test::usage,
        metric_store::{CounterStore, MetricStoreError},
        sink::{Sink, SinkError},
        types::{Dimension, DimensionPosition, Name},
    };

    use super::{local_error_is_retryable, LocalMetricsSink, LocalMetricsSinkConfig};

    fn position(field: &'static str, hash: Option<&'static str>) -> DimensionPosition {
        let mut position = DimensionPosition::from([
            (Name::from("wg.operation.name"), Dimension::from("user".to_string())),
            (Name::from("wg.operation.type"), Dimension::from("query")),
            (Name::from("wg.graphql.field.name"), Dimension::from(field.to_string())),
            (Name::from("wg.graphql.parent_type"), Dimension::from("User".to_string())),
        ]);
        if let Some(hash) = hash {
            position.insert(
                Name::from("wg.operation.sha256"),
                Dimension::from(hash.to_string()),
            );
        }
        position
    }

    #[test_log::test(tokio::test)]
    async fn one_measurement_per_operation_and_field() {
        let store = CounterStore::default();
        let sink = LocalMetricsSink::new(store.clone(), LocalMetricsSinkConfig::default());

        sink.export(&[usage("123"), usage("456"), usage("123")])
            .await
            .expect("export works");

        let snapshot = store.snapshot();
        let usage = snapshot
            .get(&Name::from("router.graphql.schema_field_usage"))
            .expect("metric was recorded");
        assert_eq!(2, usage.len());
        assert_eq!(Some(&3), usage.get(&position("id", None)));
        assert_eq!(Some(&3), usage.get(&position("name", None)));
    }

    #[test_log::test(tokio::test)]
    async fn operation_hash_is_a_dimension_when_configured() {
        let store = CounterStore::default();
        let sink = LocalMetricsSink::new(
            store.clone(),
            LocalMetricsSinkConfig {
                include_operation_hash: true,
                ..Default::default()
            },
        );

        sink.export(&[usage("123"), usage("456")])
            .await
            .expect("export works");

        let snapshot = store.snapshot();
        let usage = snapshot
            .get(&Name::from("router.graphql.schema_field_usage"))
            .expect("metric was recorded");
        assert_eq!(4, usage.len());
        assert_eq!(Some(&1), usage.get(&position("id", Some("456"))));
    }

    #[test_log::test(tokio::test)]
    async fn rejected_keys_do_not_drop_accepted_ones() {
        let store = CounterStore::new(1);
        let sink = LocalMetricsSink::new(store.clone(), LocalMetricsSinkConfig::default());

        for _ in 0..2 {
            let error = sink
                .export(&[usage("123"), usage("456")])
                .await
                .expect_err("one of the two fields exceeds the store's cardinality");
            assert!(matches!(
                error,
                SinkError::Store(MetricStoreError::CardinalityLimit { limit: 1, .. })
            ));
        }

        let snapshot = store.snapshot();
        let usage = snapshot
            .get(&Name::from("router.graphql.schema_field_usage"))
            .expect("the accepted field was recorded");
        assert_eq!(1, usage.len());
        assert_eq!(vec![&4], usage.values().collect::<Vec<_>>());
    }

    #[test_log::test(tokio::test)]
    async fn store_failures_surface_and_are_final() {
        let store = CounterStore::new(1);
        let sink = LocalMetricsSink::new(store, LocalMetricsSinkConfig::default());

        let error = sink
            .export(&[usage("123")])
            .await
            .expect_err("second field exceeds the store's cardinality");
        assert!(matches!(
            error,
            SinkError::Store(MetricStoreError::CardinalityLimit { limit: 1, .. })
        ));
        assert!(!local_error_is_retryable(&error));

        sink.close().await.expect("close works");
        assert!(matches!(
            sink.export(&[usage("123")]).await,
            Err(SinkError::Store(MetricStoreError::Closed))
        ));
    }
}
