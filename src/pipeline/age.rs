//! Age bucketing into five ordered, right-closed ranges
//!
//! Ranges are `(0,18]`, `(18,23]`, `(23,30]`, `(30,40]` and `(40,max_age]`,
//! where `max_age` is the largest age present in the data.

use serde::Serialize;
use std::fmt;

use super::error::PipelineError;

/// Left-exclusive edges of the five buckets; the last bucket is closed by `max_age`
pub const AGE_EDGES: [u32; 5] = [0, 18, 23, 30, 40];

/// Number of age buckets
pub const BUCKET_COUNT: usize = AGE_EDGES.len();

/// One age range `(lower, upper]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct AgeBucket {
    /// Position of the bucket, 0 for the youngest
    pub index: usize,
    /// Exclusive lower bound
    pub lower: u32,
    /// Inclusive upper bound
    pub upper: u32,
}

impl AgeBucket {
    /// Label such as `0_18`, `19_23` or `41_66`.
    ///
    /// The first bucket is labelled from 0; the others from their first
    /// contained age.
    pub fn label(&self) -> String {
        let first = if self.index == 0 { 0 } else { self.lower + 1 };
        format!("{}_{}", first, self.upper)
    }

    pub fn contains(&self, age: i64) -> bool {
        age > self.lower as i64 && age <= self.upper as i64
    }
}

impl fmt::Display for AgeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// The five buckets of one run, closed by the run's maximum age
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgeBuckets {
    max_age: u32,
    buckets: [AgeBucket; BUCKET_COUNT],
}

impl AgeBuckets {
    /// Build the buckets for a dataset whose oldest customer is `max_age`.
    ///
    /// Fails when `max_age` does not exceed the last fixed edge, since the
    /// last bucket would be empty.
    pub fn new(max_age: u32) -> Result<Self, PipelineError> {
        let last_edge = AGE_EDGES[BUCKET_COUNT - 1];
        if max_age <= last_edge {
            return Err(PipelineError::InvalidAgeRange {
                max_age,
                lower_bound: last_edge,
            });
        }

        let buckets = std::array::from_fn(|index| AgeBucket {
            index,
            lower: AGE_EDGES[index],
            upper: AGE_EDGES.get(index + 1).copied().unwrap_or(max_age),
        });

        Ok(Self { max_age, buckets })
    }

    pub fn max_age(&self) -> u32 {
        self.max_age
    }

    pub fn buckets(&self) -> &[AgeBucket] {
        &self.buckets
    }

    /// Bucket containing `age`; an age on an edge belongs to the lower bucket.
    pub fn bucket(&self, age: i64) -> Result<AgeBucket, PipelineError> {
        self.buckets
            .iter()
            .find(|b| b.contains(age))
            .copied()
            .ok_or(PipelineError::AgeOutOfRange {
                age,
                max_age: self.max_age,
            })
    }

    /// Labels of all buckets, youngest first.
    pub fn labels(&self) -> Vec<String> {
        self.buckets.iter().map(AgeBucket::label).collect()
    }
}
