use crate::proto::graphqlmetrics::{
    ArgumentUsageInfo, InputUsageInfo, SchemaUsageInfo, TypeFieldUsageInfo,
};

use super::AggregationKey;

/// Fold duplicate records into one, summing their nested usage counters.
///
/// Records are duplicates when their [`AggregationKey`]s match. Within a merged
/// record, usage entries with the same structural identity have their counts
/// added; new entries are appended. Output keeps first-seen order.
///
/// This is not what the collector sink sends; see
/// [`aggregate_schema_usage_info_batch`](super::aggregate_schema_usage_info_batch).
pub fn merge_schema_usage(batch: Vec<SchemaUsageInfo>) -> Vec<SchemaUsageInfo> {
    let mut merged: Vec<SchemaUsageInfo> = Vec::with_capacity(batch.len());

    for usage in batch {
        let key = AggregationKey::of(&usage);
        match merged
            .iter_mut()
            .find(|existing| AggregationKey::of(existing) == key)
        {
            Some(existing) => absorb(existing, usage),
            None => merged.push(usage),
        }
    }

    merged
}

fn absorb(into: &mut SchemaUsageInfo, from: SchemaUsageInfo) {
    merge_counted(
        &mut into.type_field_metrics,
        from.type_field_metrics,
        same_type_field,
        |usage| &mut usage.count,
    );
    merge_counted(
        &mut into.argument_metrics,
        from.argument_metrics,
        same_argument,
        |usage| &mut usage.count,
    );
    merge_counted(
        &mut into.input_metrics,
        from.input_metrics,
        same_input,
        |usage| &mut usage.count,
    );
}

fn merge_counted<T>(
    into: &mut Vec<T>,
    from: Vec<T>,
    same: fn(&T, &T) -> bool,
    count: fn(&mut T) -> &mut u64,
) {
    for mut incoming in from {
        match into.iter_mut().find(|existing| same(existing, &incoming)) {
            Some(existing) => *count(existing) += *count(&mut incoming),
            None => into.push(incoming),
        }
    }
}

fn same_type_field(a: &TypeFieldUsageInfo, b: &TypeFieldUsageInfo) -> bool {
    a.path == b.path
        && a.type_names == b.type_names
        && a.subgraph_ids == b.subgraph_ids
        && a.named_type == b.named_type
        && a.indirect_interface_field == b.indirect_interface_field
}

fn same_argument(a: &ArgumentUsageInfo, b: &ArgumentUsageInfo) -> bool {
    a.path == b.path && a.type_name == b.type_name && a.named_type == b.named_type
}

fn same_input(a: &InputUsageInfo, b: &InputUsageInfo) -> bool {
    a.path == b.path
        && a.type_name == b.type_name
        && a.named_type == b.named_type
        && a.enum_values == b.enum_values
}
