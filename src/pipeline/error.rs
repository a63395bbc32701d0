//! Error types for the segmentation pipeline.
//!
//! `PipelineError` captures the domain failures of loading, bucketing and
//! segmenting transactions. Plumbing errors (I/O, polars) travel as
//! `anyhow::Error` with context attached at the call site.

use thiserror::Error;

/// Errors that can occur while loading and segmenting transactions.
#[derive(Debug, Error, PartialEq)]
pub enum PipelineError {
    /// Input file extension is not one of the supported formats.
    #[error("Unsupported file format: '{0}'. Supported formats: csv, parquet")]
    UnsupportedFormat(String),

    /// Input contains a header but no transaction rows.
    #[error("Dataset contains no transactions")]
    EmptyDataset,

    /// A required column is absent from the input header.
    ///
    /// Column names are matched exactly, including case.
    #[error("Required column '{column}' not found. Available columns: {available:?}")]
    MissingColumn {
        /// Name of the missing column
        column: String,
        /// Columns present in the input
        available: Vec<String>,
    },

    /// A cell could not be parsed or violates the transaction data model.
    #[error("Invalid value in column '{column}' at row {row}: {reason}")]
    InvalidValue {
        /// Column name where the error occurred
        column: String,
        /// Zero-based data row index
        row: usize,
        /// What was wrong with the value
        reason: String,
    },

    /// Age falls outside every bucket, i.e. `age <= 0` or `age > max_age`.
    #[error("Age {age} is outside the bucket range (0, {max_age}]")]
    AgeOutOfRange {
        /// Offending age
        age: i64,
        /// Upper bound of the last bucket
        max_age: u32,
    },

    /// The maximum observed age does not leave room for the last bucket.
    #[error("Maximum age {max_age} must be greater than {lower_bound} to form the last age bucket")]
    InvalidAgeRange {
        /// Maximum age found in the data
        max_age: u32,
        /// Left edge of the last bucket
        lower_bound: u32,
    },

    /// Quartile segmentation needs four distinct, strictly increasing edges.
    #[error("Cannot form 4 segments: {distinct} distinct mean price value(s) across {personas} persona(s)")]
    InsufficientDistinctValues {
        /// Distinct mean prices observed
        distinct: usize,
        /// Number of personas being segmented
        personas: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_column_display() {
        let err = PipelineError::MissingColumn {
            column: "AGE".to_string(),
            available: vec!["PRICE".to_string(), "SOURCE".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Required column 'AGE' not found. Available columns: [\"PRICE\", \"SOURCE\"]"
        );
    }

    #[test]
    fn test_invalid_value_display() {
        let err = PipelineError::InvalidValue {
            column: "PRICE".to_string(),
            row: 7,
            reason: "negative price -3".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid value in column 'PRICE' at row 7: negative price -3"
        );
    }

    #[test]
    fn test_age_out_of_range_display() {
        let err = PipelineError::AgeOutOfRange { age: 70, max_age: 66 };
        assert_eq!(err.to_string(), "Age 70 is outside the bucket range (0, 66]");
    }

    #[test]
    fn test_insufficient_distinct_values_display() {
        let err = PipelineError::InsufficientDistinctValues {
            distinct: 2,
            personas: 5,
        };
        assert!(err.to_string().contains("2 distinct mean price value(s)"));
        assert!(err.to_string().contains("5 persona(s)"));
    }

    #[test]
    fn test_converts_into_anyhow() {
        let err: anyhow::Error = PipelineError::EmptyDataset.into();
        assert!(err.downcast_ref::<PipelineError>().is_some());
    }
}
