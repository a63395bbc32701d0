//! Command-line argument definitions using clap

use clap::Parser;
use std::path::PathBuf;

use crate::pipeline::CustomerProfile;

/// Persona keys looked up when no lookup or customer is given
pub const DEFAULT_LOOKUPS: [&str; 2] = ["TUR_ANDROID_FEMALE_31_40", "FRA_IOS_FEMALE_31_40"];

/// Persona - Segment customers by demographic persona and mean purchase price
#[derive(Parser, Debug)]
#[command(name = "persona")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input transaction file (CSV or Parquet) with PRICE, SOURCE, SEX, COUNTRY
    /// and AGE columns
    #[arg(short, long)]
    pub input: PathBuf,

    /// Persona key to look up, e.g. TUR_ANDROID_FEMALE_31_40 (repeatable).
    /// Exact, case-sensitive match.
    #[arg(short, long = "lookup")]
    pub lookups: Vec<String>,

    /// Customer profile to classify as COUNTRY,SOURCE,SEX,AGE,
    /// e.g. tur,android,female,33 (repeatable)
    #[arg(short, long = "customer")]
    pub customers: Vec<CustomerProfile>,

    /// Write the persona table to this file (CSV, Parquet or JSON, determined by extension)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Maximum number of rows printed per table. Default: all rows.
    #[arg(long, value_parser = validate_max_rows)]
    pub max_rows: Option<usize>,

    /// Number of rows to use for schema inference (CSV only).
    /// Use 0 for full table scan.
    #[arg(long, default_value = "10000")]
    pub infer_schema_length: usize,
}

impl Cli {
    /// Persona keys to look up; falls back to `DEFAULT_LOOKUPS` when neither
    /// lookups nor customers were requested.
    pub fn lookup_keys(&self) -> Vec<String> {
        if self.lookups.is_empty() && self.customers.is_empty() {
            DEFAULT_LOOKUPS.iter().map(|k| k.to_string()).collect()
        } else {
            self.lookups.clone()
        }
    }
}

/// Validator for max_rows parameter
fn validate_max_rows(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid row count", s))?;

    if value == 0 {
        Err("max_rows must be at least 1".to_string())
    } else {
        Ok(value)
    }
}
