//! Ready-made schema usage exporters, one per destination.
//!
//! A router builds exactly one of these when it starts: the collector exporter when a
//! graph api token is configured, the local metrics exporter when schema usage should be
//! visible in the router's own metrics, or the no-op exporter when usage tracking is off.
//! All three take [`SchemaUsageInfo`] the same way, so request handling does not care which
//! one it was given.

use tokio::runtime::Handle;

use crate::{
    exporter::{Exporter, ExporterError, ExporterSettings},
    metric_store::MetricStore,
    proto::graphqlmetrics::SchemaUsageInfo,
    sink::{
        collector_error_is_retryable, local_error_is_retryable, GraphQlMetricsSink,
        GraphQlMetricsSinkConfig, LocalMetricsSink, LocalMetricsSinkConfig, NoopSink, SinkError,
    },
};

/// An exporter of schema usage records.
pub type SchemaUsageExporter<TSink> = Exporter<SchemaUsageInfo, TSink>;

/// Publish schema usage to the collector at `config.endpoint`.
///
/// The connection is made lazily on the first export, so an unreachable collector does
/// not fail router startup.
pub fn graphqlmetrics_exporter(
    config: &GraphQlMetricsSinkConfig,
    settings: ExporterSettings,
) -> Result<SchemaUsageExporter<GraphQlMetricsSink>, ExporterError> {
    settings.validate()?;
    // the lazy channel spawns its connection task
    Handle::try_current()?;
    let sink = GraphQlMetricsSink::connect_lazy(config)?;
    log::info!("publishing schema usage to {}", config.endpoint);
    Exporter::new(sink, collector_error_is_retryable, settings)
}

/// Count field usage into `store`.
pub fn local_metrics_exporter<TStore>(
    store: TStore,
    config: LocalMetricsSinkConfig,
    settings: ExporterSettings,
) -> Result<SchemaUsageExporter<LocalMetricsSink<TStore>>, ExporterError>
where
    TStore: MetricStore,
{
    log::info!("recording schema usage as {}", config.metric_name);
    Exporter::new(
        LocalMetricsSink::new(store, config),
        local_error_is_retryable,
        settings,
    )
}

/// Accept and discard schema usage.
pub fn noop_exporter() -> Result<SchemaUsageExporter<NoopSink>, ExporterError> {
    Exporter::new(
        NoopSink,
        |_: &SinkError| false,
        ExporterSettings::default(),
    )
}
