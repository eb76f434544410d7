use std::collections::HashMap;

use crate::proto::graphqlmetrics::{OperationType, SchemaUsageInfo};

/// Identity of a local field usage measurement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldUsageKey {
    /// Name of the operation that selected the field
    pub operation_name: String,
    /// Query, mutation or subscription
    pub operation_type: OperationType,
    /// Present only when the sink is configured to split by operation hash
    pub operation_hash: Option<String>,
    /// Last segment of the field's path
    pub field_name: String,
    /// The type that declares the field
    pub parent_type: String,
}

/// Sum field usage counts per (operation, field).
///
/// A usage entry with a zero count was recorded without counting and is taken as
/// one observation. Entries without a path have no field to attribute and are skipped.
pub fn aggregate_field_usage(
    batch: &[SchemaUsageInfo],
    include_operation_hash: bool,
) -> HashMap<FieldUsageKey, u64> {
    let mut usage_counts: HashMap<FieldUsageKey, u64> = HashMap::new();

    for usage in batch {
        let operation = usage.operation_info.clone().unwrap_or_default();
        let operation_type =
            OperationType::try_from(operation.r#type).unwrap_or(OperationType::Query);
        let operation_hash = include_operation_hash.then_some(operation.hash);

        for field in &usage.type_field_metrics {
            let Some(field_name) = field.path.last() else {
                continue;
            };
            let key = FieldUsageKey {
                operation_name: operation.name.clone(),
                operation_type,
                operation_hash: operation_hash.clone(),
                field_name: field_name.clone(),
                parent_type: field.type_names.first().cloned().unwrap_or_default(),
            };
            *usage_counts.entry(key).or_default() += field.count.max(1);
        }
    }

    usage_counts
}

#[cfg(test)]
mod test {
    use crate::{aggregation::test::usage, proto::graphqlmetrics::OperationType};

    use super::{aggregate_field_usage, FieldUsageKey};

    fn key(field: &str, hash: Option<&str>) -> FieldUsageKey {
        FieldUsageKey {
            operation_name: "user".to_string(),
            operation_type: OperationType::Query,
            operation_hash: hash.map(str::to_string),
            field_name: field.to_string(),
            parent_type: "User".to_string(),
        }
    }

    #[test_log::test]
    fn counts_are_summed_per_operation_and_field() {
        let mut heavy = usage("123");
        heavy.type_field_metrics[0].count = 3;
        let batch = vec![usage("123"), heavy, usage("456")];

        let counts = aggregate_field_usage(&batch, false);

        assert_eq!(2, counts.len(), "hash is not part of the key");
        assert_eq!(Some(&5), counts.get(&key("id", None)));
        assert_eq!(Some(&3), counts.get(&key("name", None)));
    }

    #[test_log::test]
    fn operation_hash_splits_when_enabled() {
        let batch = vec![usage("123"), usage("456"), usage("456")];

        let counts = aggregate_field_usage(&batch, true);

        assert_eq!(4, counts.len());
        assert_eq!(Some(&1), counts.get(&key("id", Some("123"))));
        assert_eq!(Some(&2), counts.get(&key("id", Some("456"))));
        assert_eq!(Some(&2), counts.get(&key("name", Some("456"))));
    }

    #[test_log::test]
    fn unpathed_and_uncounted_fields() {
        let mut odd = usage("123");
        odd.type_field_metrics[0].path.clear();
        odd.type_field_metrics[1].count = 0;

        let counts = aggregate_field_usage(&[odd], false);

        assert_eq!(1, counts.len());
        assert_eq!(Some(&1), counts.get(&key("name", None)));
    }
}
