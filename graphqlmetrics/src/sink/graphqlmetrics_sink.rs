use tonic::{
    codec::CompressionEncoding,
    metadata::AsciiMetadataValue,
    transport::{Channel, ClientTlsConfig, Endpoint},
    Code,
};

use crate::{
    aggregation::aggregate_schema_usage_info_batch,
    proto::graphqlmetrics::{
        graph_ql_metrics_service_client::GraphQlMetricsServiceClient,
        PublishAggregatedGraphQlRequestMetricsRequest, SchemaUsageInfo,
    },
};

use super::{Sink, SinkError};

/// Where and how to reach the schema usage collector.
#[derive(Clone, Debug)]
pub struct GraphQlMetricsSinkConfig {
    /// Collector base url, like `https://cosmo-metrics.wundergraph.com`
    pub endpoint: String,
    /// Graph api token; sent as a bearer token with every request
    pub api_token: String,
    /// Gzip request bodies
    pub gzip: bool,
}

impl GraphQlMetricsSinkConfig {
    /// Config for the hosted collector.
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            endpoint: "https://cosmo-metrics.wundergraph.com".to_string(),
            api_token: api_token.into(),
            gzip: true,
        }
    }
}

/// Aggregates each batch and publishes it to the schema usage collector.
#[derive(Clone, Debug)]
pub struct GraphQlMetricsSink {
    client: GraphQlMetricsServiceClient<Channel>,
    authorization: AsciiMetadataValue,
}

impl GraphQlMetricsSink {
    /// Create a sink from a client you configured yourself.
    pub fn new(
        client: GraphQlMetricsServiceClient<Channel>,
        api_token: &str,
    ) -> Result<Self, SinkError> {
        let authorization = format!("Bearer {api_token}")
            .parse()
            .map_err(|e| SinkError::Other(Box::new(e)))?;
        Ok(Self {
            client,
            authorization,
        })
    }

    /// Create a sink with a lazily connecting channel. Must be called within a tokio runtime.
    pub fn connect_lazy(config: &GraphQlMetricsSinkConfig) -> Result<Self, SinkError> {
        let mut endpoint = Endpoint::from_shared(config.endpoint.clone())?;
        if config.endpoint.starts_with("https://") {
            endpoint = endpoint.tls_config(ClientTlsConfig::new().with_webpki_roots())?;
        }
        let mut client = GraphQlMetricsServiceClient::new(endpoint.connect_lazy());
        if config.gzip {
            client = client.send_compressed(CompressionEncoding::Gzip);
        }
        Self::new(client, &config.api_token)
    }

    fn request<T>(&self, request: T) -> tonic::Request<T> {
        let mut request = tonic::Request::new(request);
        request
            .metadata_mut()
            .insert("authorization", self.authorization.clone());
        request
    }
}

impl Sink<SchemaUsageInfo> for GraphQlMetricsSink {
    async fn export(&self, batch: &[SchemaUsageInfo]) -> Result<(), SinkError> {
        let request: PublishAggregatedGraphQlRequestMetricsRequest =
            aggregate_schema_usage_info_batch(batch);
        let groups = request.aggregation.len();
        let response = self
            .client
            .clone()
            .publish_aggregated_graph_ql_metrics(self.request(request))
            .await;
        match response {
            Ok(_) => {
                log::debug!(
                    "published {} schema usage records as {groups} aggregations",
                    batch.len()
                );
                Ok(())
            }
            Err(status) => {
                if !status.metadata().is_empty() {
                    log::debug!(
                        "collector rejected schema usage: {status}. Metadata: {:?}",
                        status.metadata()
                    );
                }
                Err(status.into())
            }
        }
    }

    async fn close(&self) -> Result<(), SinkError> {
        log::debug!("schema usage collector sink closed");
        Ok(())
    }
}

/// Retry policy for the collector: credentials and payload problems do not go away on their own.
pub fn collector_error_is_retryable(error: &SinkError) -> bool {
    match error {
        SinkError::Status(status) => !matches!(
            status.code(),
            Code::Unauthenticated | Code::PermissionDenied | Code::InvalidArgument
        ),
        SinkError::Cancelled => false,
        _ => true,
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use tonic::{transport::Endpoint, Code, Status};

    use crate::{
        metric_store::MetricStoreError,
        proto::graphqlmetrics::graph_ql_metrics_service_client::GraphQlMetricsServiceClient,
        sink::SinkError,
    };

    use super::{collector_error_is_retryable, GraphQlMetricsSink, GraphQlMetricsSinkConfig};

    #[test_log::test]
    fn auth_and_validation_failures_are_final() {
        for code in [
            Code::Unauthenticated,
            Code::PermissionDenied,
            Code::InvalidArgument,
        ] {
            assert!(
                !collector_error_is_retryable(&SinkError::Status(Status::new(code, "no"))),
                "{code:?} should not be retried"
            );
        }
        assert!(!collector_error_is_retryable(&SinkError::Cancelled));
    }

    #[test_log::test]
    fn transient_failures_are_retried() {
        for code in [
            Code::Unavailable,
            Code::Internal,
            Code::DeadlineExceeded,
            Code::ResourceExhausted,
            Code::Unknown,
        ] {
            assert!(
                collector_error_is_retryable(&SinkError::Status(Status::new(code, "later"))),
                "{code:?} should be retried"
            );
        }
        assert!(collector_error_is_retryable(&SinkError::Timeout(Duration::from_secs(1))));
        assert!(collector_error_is_retryable(&SinkError::Store(MetricStoreError::Closed)));
    }

    #[test_log::test(tokio::test)]
    async fn requests_carry_the_bearer_token() {
        let channel = Endpoint::from_static("http://127.0.0.1:1").connect_lazy();
        let sink = GraphQlMetricsSink::new(GraphQlMetricsServiceClient::new(channel), "secret")
            .expect("token is a valid header");

        let request = sink.request(());

        assert_eq!(
            Some("Bearer secret"),
            request
                .metadata()
                .get("authorization")
                .and_then(|value| value.to_str().ok())
        );
    }

    #[test_log::test(tokio::test)]
    async fn tokens_must_be_header_safe() {
        let channel = Endpoint::from_static("http://127.0.0.1:1").connect_lazy();
        let result = GraphQlMetricsSink::new(GraphQlMetricsServiceClient::new(channel), "bad\ntoken");
        assert!(matches!(result, Err(SinkError::Other(_))));
    }

    #[test_log::test(tokio::test)]
    async fn lazy_connection_accepts_plain_http() {
        let mut config = GraphQlMetricsSinkConfig::new("token");
        config.endpoint = "http://127.0.0.1:1".to_string();
        GraphQlMetricsSink::connect_lazy(&config).expect("endpoint is valid");

        config.endpoint = "not a url".to_string();
        assert!(matches!(
            GraphQlMetricsSink::connect_lazy(&config),
            Err(SinkError::Transport(_))
        ));
    }
}
