//! Persona table lookup and new-customer classification

use std::str::FromStr;

use super::age::AgeBuckets;
use super::aggregate::aggregate_demographics;
use super::error::PipelineError;
use super::loader::{normalize_category, TransactionTable};
use super::persona::{aggregate_personas, bucket_aggregates, customer_level_key};
use super::segment::{
    classify_segments, summarize_segments, QuartileEdges, SegmentSummary, SegmentedPersona,
};

/// Segmented personas of one run, ordered by key
#[derive(Debug, Clone, PartialEq)]
pub struct PersonaTable {
    personas: Vec<SegmentedPersona>,
    buckets: AgeBuckets,
    edges: QuartileEdges,
}

impl PersonaTable {
    pub fn new(
        mut personas: Vec<SegmentedPersona>,
        buckets: AgeBuckets,
        edges: QuartileEdges,
    ) -> Self {
        personas.sort_by(|a, b| a.key.cmp(&b.key));
        Self {
            personas,
            buckets,
            edges,
        }
    }

    /// Run aggregation, bucketing, keying and segmentation over `table`.
    pub fn build(table: &TransactionTable) -> Result<Self, PipelineError> {
        let max_age = table.max_age().ok_or(PipelineError::EmptyDataset)?;
        let buckets = AgeBuckets::new(max_age)?;

        let aggregates = aggregate_demographics(table);
        let bucketed = bucket_aggregates(&aggregates, &buckets)?;
        let personas = aggregate_personas(&bucketed);
        let (segmented, edges) = classify_segments(&personas)?;

        Ok(Self::new(segmented, buckets, edges))
    }

    pub fn personas(&self) -> &[SegmentedPersona] {
        &self.personas
    }

    pub fn len(&self) -> usize {
        self.personas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }

    pub fn buckets(&self) -> &AgeBuckets {
        &self.buckets
    }

    pub fn edges(&self) -> &QuartileEdges {
        &self.edges
    }

    pub fn summary(&self) -> Vec<SegmentSummary> {
        summarize_segments(&self.personas)
    }

    /// Exact-match lookup of a persona key.
    pub fn lookup(&self, key: &str) -> Option<&SegmentedPersona> {
        self.personas
            .binary_search_by(|p| p.key.as_str().cmp(key))
            .ok()
            .map(|idx| &self.personas[idx])
    }

    /// Bucket and key a raw customer profile, then look its persona up.
    ///
    /// Fails only when the age falls outside this run's buckets; an unknown
    /// persona is reported through `CustomerMatch::persona` being `None`.
    pub fn classify(&self, profile: &CustomerProfile) -> Result<CustomerMatch<'_>, PipelineError> {
        let bucket = self.buckets.bucket(profile.age)?;
        let key = customer_level_key(
            &profile.country,
            &profile.source,
            &profile.sex,
            &bucket.label(),
        );
        let persona = self.lookup(&key);

        Ok(CustomerMatch { key, persona })
    }
}

/// Outcome of classifying a customer profile
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerMatch<'a> {
    pub key: String,
    pub persona: Option<&'a SegmentedPersona>,
}

/// Raw demographic profile of a prospective customer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerProfile {
    pub country: String,
    pub source: String,
    pub sex: String,
    pub age: i64,
}

impl FromStr for CustomerProfile {
    type Err = String;

    /// Parse `COUNTRY,SOURCE,SEX,AGE`, e.g. `tur,android,female,33`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let [country, source, sex, age] = parts.as_slice() else {
            return Err(format!(
                "Invalid customer profile '{}'. Expected COUNTRY,SOURCE,SEX,AGE",
                s
            ));
        };

        let age: i64 = age
            .parse()
            .map_err(|_| format!("'{}' is not a valid age", age))?;

        let field = |value: &str| {
            normalize_category(value)
                .map_err(|reason| format!("Invalid customer profile '{}': {}", s, reason))
        };

        Ok(Self {
            country: field(*country)?,
            source: field(*source)?,
            sex: field(*sex)?,
            age,
        })
    }
}
