//! Customer-level persona keys and the persona price table

use std::collections::BTreeMap;

use super::age::AgeBuckets;
use super::aggregate::{DemographicAggregate, PriceStats};
use super::error::PipelineError;
use super::loader::KEY_SEPARATOR;

/// Build the composite customer-level key `COUNTRY_SOURCE_SEX_AGEBUCKET`.
pub fn customer_level_key(country: &str, source: &str, sex: &str, age_bucket: &str) -> String {
    let separator = KEY_SEPARATOR.to_string();
    [country, source, sex, age_bucket]
        .iter()
        .map(|part| part.to_uppercase())
        .collect::<Vec<_>>()
        .join(separator.as_str())
}

/// A four-way aggregate row tagged with its age bucket and persona key
#[derive(Debug, Clone, PartialEq)]
pub struct BucketedAggregate {
    pub aggregate: DemographicAggregate,
    pub age_bucket: String,
    pub key: String,
}

/// Attach age buckets and persona keys to the four-way aggregate rows.
pub fn bucket_aggregates(
    aggregates: &[DemographicAggregate],
    buckets: &AgeBuckets,
) -> Result<Vec<BucketedAggregate>, PipelineError> {
    aggregates
        .iter()
        .map(|row| -> Result<BucketedAggregate, PipelineError> {
            let age_bucket = buckets.bucket(row.age as i64)?.label();
            let key = customer_level_key(&row.country, &row.source, &row.sex, &age_bucket);
            Ok(BucketedAggregate {
                aggregate: row.clone(),
                age_bucket,
                key,
            })
        })
        .collect()
}

/// Mean price of one persona key
#[derive(Debug, Clone, PartialEq)]
pub struct PersonaPrice {
    pub key: String,
    pub price: f64,
    /// Number of four-way aggregate rows folded into this persona
    pub groups: usize,
}

/// Re-aggregate bucketed rows by persona key, sorted by key.
///
/// Each four-way group contributes its mean price once, so a persona's price
/// is the mean of its group means.
pub fn aggregate_personas(rows: &[BucketedAggregate]) -> Vec<PersonaPrice> {
    let mut personas: BTreeMap<&str, PriceStats> = BTreeMap::new();

    for row in rows {
        personas
            .entry(row.key.as_str())
            .or_default()
            .add(row.aggregate.price);
    }

    personas
        .into_iter()
        .map(|(key, stats)| PersonaPrice {
            key: key.to_string(),
            price: stats.mean(),
            groups: stats.count,
        })
        .collect()
}
