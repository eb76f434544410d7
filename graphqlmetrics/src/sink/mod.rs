//! Where exported batches go.

use std::{future::Future, sync::Arc, time::Duration};

mod graphqlmetrics_sink;
mod local_metrics_sink;
mod noop_sink;

pub use graphqlmetrics_sink::{
    collector_error_is_retryable, GraphQlMetricsSink, GraphQlMetricsSinkConfig,
};
pub use local_metrics_sink::{local_error_is_retryable, LocalMetricsSink, LocalMetricsSinkConfig};
pub use noop_sink::NoopSink;

use crate::metric_store::MetricStoreError;

pub(crate) type StdError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Decides whether a failed export is worth another attempt. `true` means retry.
pub type SinkErrorHandler = Arc<dyn Fn(&SinkError) -> bool + Send + Sync>;

/// A delivery target for batches.
///
/// Several batches may be exported at the same time, so implementations must be
/// safe to share. Dropping the returned future cancels the export.
pub trait Sink<T>: Send + Sync + 'static {
    /// Deliver one batch.
    fn export(&self, batch: &[T]) -> impl Future<Output = Result<(), SinkError>> + Send;

    /// Release resources. Called once, after all exports finished or were abandoned.
    fn close(&self) -> impl Future<Output = Result<(), SinkError>> + Send;
}

impl<T, TSink> Sink<T> for Arc<TSink>
where
    TSink: Sink<T>,
{
    fn export(&self, batch: &[T]) -> impl Future<Output = Result<(), SinkError>> + Send {
        self.as_ref().export(batch)
    }

    fn close(&self) -> impl Future<Output = Result<(), SinkError>> + Send {
        self.as_ref().close()
    }
}

/// Why a batch was not delivered.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The export did not finish within the exporter's export timeout.
    #[error("export timed out after {0:?}")]
    Timeout(Duration),
    /// The exporter is shutting down and abandoned the export.
    #[error("export was cancelled")]
    Cancelled,
    /// The collector answered with an error status.
    #[error("collector rejected the batch: {0}")]
    Status(#[from] tonic::Status),
    /// The collector endpoint could not be set up.
    #[error("collector transport failed: {0}")]
    Transport(#[from] tonic::transport::Error),
    /// The local metric store refused a measurement.
    #[error("could not record local metrics: {0}")]
    Store(#[from] MetricStoreError),
    /// Anything else a custom sink wants to report.
    #[error(transparent)]
    Other(StdError),
}
