//! Batched GraphQL schema usage export for routers.
//!
//! [`graphqlmetrics`] moves one [`SchemaUsageInfo`](proto::graphqlmetrics::SchemaUsageInfo)
//! per request off the request path and into batches, then delivers them to a collector
//! over [tonic] gRPC, into local metrics, or nowhere. Request latency comes first:
//! recording never blocks, and when telemetry cannot keep up it is dropped.
//!
//! # Getting Started
//!
//! Build an exporter with one of the helpers in [`schema_usage`], record into it from
//! request handlers, and shut it down when the router stops:
//!
//! ```no_run
//! # async fn run() -> Result<(), graphqlmetrics::exporter::ExporterError> {
//! use std::time::Duration;
//!
//! use graphqlmetrics::{
//!     exporter::ExporterSettings, proto::graphqlmetrics::SchemaUsageInfo,
//!     schema_usage::graphqlmetrics_exporter, sink::GraphQlMetricsSinkConfig,
//! };
//!
//! let exporter = graphqlmetrics_exporter(
//!     &GraphQlMetricsSinkConfig::new("graph api token"),
//!     ExporterSettings::default(),
//! )?;
//!
//! exporter.record(SchemaUsageInfo::default(), false).await;
//!
//! exporter.shutdown(Duration::from_secs(5)).await
//! # }
//! ```
//!
//! Any other destination plugs in through the [`sink::Sink`] trait.

pub mod aggregation;
pub mod exporter;
pub mod metric_store;
pub mod schema_usage;
pub mod sink;
pub mod types;

/// Wire types of the schema usage collector. Written in the shape `tonic-build` generates.
pub mod proto;
