//! Shrinking batches of schema usage before they leave the process.
//!
//! [`aggregate_schema_usage_info_batch`] is what the collector sink sends: one
//! record per distinct observation, with a request count. The nested usage
//! counters of a record travel once per group and are not summed.
//!
//! [`merge_schema_usage`] is the other semantic: it folds the nested usage
//! counters of duplicates together instead of counting occurrences.
//!
//! [`aggregate_field_usage`] serves the local metrics sink, which only cares about
//! how often each field is used by each operation.

mod field_usage;
mod merge;

use std::collections::HashMap;

pub use field_usage::{aggregate_field_usage, FieldUsageKey};
pub use merge::merge_schema_usage;

use crate::proto::graphqlmetrics::{
    PublishAggregatedGraphQlRequestMetricsRequest, SchemaUsageInfo, SchemaUsageInfoAggregation,
};

/// The equality signature of a schema usage record.
///
/// Records with equal keys are the same observation made again.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct AggregationKey<'a> {
    operation_hash: &'a str,
    schema_version: &'a str,
    client_name: &'a str,
    client_version: &'a str,
    request_error: bool,
    status_code: i32,
    attributes: &'a HashMap<String, String>,
}

impl<'a> AggregationKey<'a> {
    /// Derive the key of a record. Missing sub-messages compare as their defaults.
    pub fn of(usage: &'a SchemaUsageInfo) -> Self {
        let operation = usage.operation_info.as_ref();
        let client = usage.client_info.as_ref();
        let request = usage.request_info.as_ref();
        Self {
            operation_hash: operation.map(|o| o.hash.as_str()).unwrap_or_default(),
            schema_version: usage
                .schema_info
                .as_ref()
                .map(|s| s.version.as_str())
                .unwrap_or_default(),
            client_name: client.map(|c| c.name.as_str()).unwrap_or_default(),
            client_version: client.map(|c| c.version.as_str()).unwrap_or_default(),
            request_error: request.map(|r| r.error).unwrap_or_default(),
            status_code: request.map(|r| r.status_code).unwrap_or_default(),
            attributes: &usage.attributes,
        }
    }
}

/// Group a batch by [`AggregationKey`], counting how many records fell in each group.
///
/// Groups keep the first-seen order of their keys. The scan is linear in the
/// number of groups; batches are bounded by the exporter's batch size.
pub fn aggregate_schema_usage_info_batch(
    batch: &[SchemaUsageInfo],
) -> PublishAggregatedGraphQlRequestMetricsRequest {
    let mut keys: Vec<AggregationKey<'_>> = Vec::new();
    let mut aggregation: Vec<SchemaUsageInfoAggregation> = Vec::new();

    for usage in batch {
        let key = AggregationKey::of(usage);
        match keys.iter().position(|existing| *existing == key) {
            Some(index) => aggregation[index].request_count += 1,
            None => {
                keys.push(key);
                aggregation.push(SchemaUsageInfoAggregation {
                    schema_usage: Some(usage.clone()),
                    request_count: 1,
                });
            }
        }
    }

    PublishAggregatedGraphQlRequestMetricsRequest { aggregation }
}
