//! Dataset loader for CSV and Parquet transaction files

use anyhow::{Context, Result};
use polars::prelude::*;
use std::path::Path;

use super::error::PipelineError;

pub const PRICE_COLUMN: &str = "PRICE";
pub const SOURCE_COLUMN: &str = "SOURCE";
pub const SEX_COLUMN: &str = "SEX";
pub const COUNTRY_COLUMN: &str = "COUNTRY";
pub const AGE_COLUMN: &str = "AGE";

/// Columns every transaction file must carry, matched case-sensitively
pub const REQUIRED_COLUMNS: [&str; 5] = [
    PRICE_COLUMN,
    SOURCE_COLUMN,
    SEX_COLUMN,
    COUNTRY_COLUMN,
    AGE_COLUMN,
];

/// Separator used by composite persona keys; rejected inside categorical values
pub const KEY_SEPARATOR: char = '_';

/// A single sale. Duplicate rows are meaningful: each one is a separate sale.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub price: f64,
    pub source: String,
    pub sex: String,
    pub country: String,
    pub age: u32,
}

impl Transaction {
    /// Build a transaction from already-normalized values.
    pub fn new(price: f64, source: &str, sex: &str, country: &str, age: u32) -> Self {
        Self {
            price,
            source: source.to_string(),
            sex: sex.to_string(),
            country: country.to_string(),
            age,
        }
    }
}

/// In-memory table of transactions, in file order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionTable {
    rows: Vec<Transaction>,
}

impl TransactionTable {
    pub fn new(rows: Vec<Transaction>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Transaction] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Largest age in the table, `None` when empty.
    pub fn max_age(&self) -> Option<u32> {
        self.rows.iter().map(|t| t.age).max()
    }
}

/// Shape and size of the loaded dataset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatasetStats {
    pub rows: usize,
    pub columns: usize,
    pub memory_mb: f64,
}

/// Load a dataset from a file (CSV or Parquet based on extension)
///
/// `infer_schema_length` of 0 scans the whole CSV file to infer column types.
pub fn load_dataset(path: &Path, infer_schema_length: usize) -> Result<DataFrame> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let schema_length = if infer_schema_length == 0 {
        None
    } else {
        Some(infer_schema_length)
    };

    let lf = match extension.as_str() {
        "csv" => LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(schema_length)
            .finish()
            .with_context(|| format!("Failed to load CSV file: {}", path.display()))?,
        "parquet" => LazyFrame::scan_parquet(path, Default::default())
            .with_context(|| format!("Failed to load Parquet file: {}", path.display()))?,
        _ => return Err(PipelineError::UnsupportedFormat(extension).into()),
    };

    lf.collect()
        .with_context(|| format!("Failed to read dataset: {}", path.display()))
}

/// Load a transaction file and validate it into a `TransactionTable`.
pub fn load_transactions(
    path: &Path,
    infer_schema_length: usize,
) -> Result<(TransactionTable, DatasetStats)> {
    let df = load_dataset(path, infer_schema_length)?;
    let (rows, columns) = df.shape();
    let memory_mb = df.estimated_size() as f64 / (1024.0 * 1024.0);

    let table = transactions_from_dataframe(&df)?;

    Ok((
        table,
        DatasetStats {
            rows,
            columns,
            memory_mb,
        },
    ))
}

/// Convert a DataFrame with the transaction columns into typed rows.
///
/// Extra columns are ignored. Categorical values are trimmed and lower-cased.
pub fn transactions_from_dataframe(df: &DataFrame) -> Result<TransactionTable> {
    let available: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    for required in REQUIRED_COLUMNS {
        if !available.iter().any(|c| c == required) {
            return Err(PipelineError::MissingColumn {
                column: required.to_string(),
                available,
            }
            .into());
        }
    }

    if df.height() == 0 {
        return Err(PipelineError::EmptyDataset.into());
    }

    let prices = numeric_values(df, PRICE_COLUMN)?;
    let ages = integer_values(df, AGE_COLUMN)?;
    let sources = categorical_values(df, SOURCE_COLUMN)?;
    let sexes = categorical_values(df, SEX_COLUMN)?;
    let countries = categorical_values(df, COUNTRY_COLUMN)?;

    let mut rows = Vec::with_capacity(df.height());
    for (row, price) in prices.iter().enumerate() {
        if !price.is_finite() || *price < 0.0 {
            let reason = format!("price must be a non-negative number, got {}", price);
            return Err(invalid(PRICE_COLUMN, row, reason).into());
        }
        let age = ages[row];
        if age <= 0 || age > u32::MAX as i64 {
            let reason = format!("age must be a positive integer, got {}", age);
            return Err(invalid(AGE_COLUMN, row, reason).into());
        }

        rows.push(Transaction {
            price: *price,
            source: sources[row].clone(),
            sex: sexes[row].clone(),
            country: countries[row].clone(),
            age: age as u32,
        });
    }

    Ok(TransactionTable::new(rows))
}

fn invalid(column: &str, row: usize, reason: String) -> PipelineError {
    PipelineError::InvalidValue {
        column: column.to_string(),
        row,
        reason,
    }
}

fn numeric_values(df: &DataFrame, column: &str) -> Result<Vec<f64>> {
    let col = df.column(column)?;
    let float_col = col
        .cast(&DataType::Float64)
        .with_context(|| format!("Column '{}' must be numeric", column))?;

    float_col
        .f64()?
        .iter()
        .enumerate()
        .map(|(row, v)| -> Result<f64> {
            Ok(v.ok_or_else(|| invalid(column, row, "missing or non-numeric value".to_string()))?)
        })
        .collect()
}

fn integer_values(df: &DataFrame, column: &str) -> Result<Vec<i64>> {
    let col = df.column(column)?;
    let float_col = col
        .cast(&DataType::Float64)
        .with_context(|| format!("Column '{}' must be numeric", column))?;

    float_col
        .f64()?
        .iter()
        .enumerate()
        .map(|(row, v)| -> Result<i64> {
            match v {
                Some(value) if value.is_finite() && value.fract() == 0.0 => Ok(value as i64),
                Some(value) => {
                    let reason = format!("expected an integer, got {}", value);
                    Err(invalid(column, row, reason).into())
                }
                None => Err(invalid(column, row, "missing or non-numeric value".to_string()).into()),
            }
        })
        .collect()
}

/// Trim and lowercase a categorical value for use in persona keys.
///
/// Rejects empty values, values containing `KEY_SEPARATOR`, and values whose
/// uppercase form does not lowercase back to themselves (e.g. `ß` -> `SS`),
/// so distinct values always produce distinct key parts.
pub fn normalize_category(raw: &str) -> Result<String, String> {
    let value = raw.trim().to_lowercase();
    if value.is_empty() {
        return Err("missing value".to_string());
    }
    if value.contains(KEY_SEPARATOR) {
        return Err(format!(
            "'{}' contains the key separator '{}'",
            value, KEY_SEPARATOR
        ));
    }
    if value.to_uppercase().to_lowercase() != value {
        return Err(format!(
            "'{}' does not keep its identity when uppercased for the persona key",
            value
        ));
    }
    Ok(value)
}

fn categorical_values(df: &DataFrame, column: &str) -> Result<Vec<String>> {
    let col = df.column(column)?;
    let string_col = col.cast(&DataType::String)?;

    string_col
        .str()?
        .iter()
        .enumerate()
        .map(|(row, v)| -> Result<String> {
            let raw = v.ok_or_else(|| invalid(column, row, "missing value".to_string()))?;
            normalize_category(raw).map_err(|reason| invalid(column, row, reason).into())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame() -> DataFrame {
        df! {
            "PRICE" => [39i64, 49, 29],
            "SOURCE" => ["android", "IOS", " android "],
            "SEX" => ["male", "female", "male"],
            "COUNTRY" => ["bra", "tur", "BRA"],
            "AGE" => [17i64, 33, 41],
        }
        .unwrap()
    }

    #[test]
    fn test_transactions_from_dataframe_normalizes_categories() {
        let table = transactions_from_dataframe(&sample_frame()).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.rows()[1].source, "ios");
        assert_eq!(table.rows()[2].source, "android");
        assert_eq!(table.rows()[2].country, "bra");
        assert_eq!(table.max_age(), Some(41));
    }

    #[test]
    fn test_missing_column_is_reported() {
        let df = sample_frame().drop("AGE").unwrap();

        let err = transactions_from_dataframe(&df).unwrap_err();
        match err.downcast_ref::<PipelineError>() {
            Some(PipelineError::MissingColumn { column, .. }) => assert_eq!(column, "AGE"),
            other => panic!("Expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn test_column_names_are_case_sensitive() {
        let df = df! {
            "price" => [39i64],
            "SOURCE" => ["android"],
            "SEX" => ["male"],
            "COUNTRY" => ["bra"],
            "AGE" => [17i64],
        }
        .unwrap();

        assert!(transactions_from_dataframe(&df).is_err());
    }

    #[test]
    fn test_negative_price_rejected() {
        let df = df! {
            "PRICE" => [39.0f64, -1.0],
            "SOURCE" => ["android", "ios"],
            "SEX" => ["male", "female"],
            "COUNTRY" => ["bra", "tur"],
            "AGE" => [17i64, 20],
        }
        .unwrap();

        let err = transactions_from_dataframe(&df).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::InvalidValue { row: 1, .. })
        ));
    }

    #[test]
    fn test_non_positive_age_rejected() {
        let df = df! {
            "PRICE" => [39i64],
            "SOURCE" => ["android"],
            "SEX" => ["male"],
            "COUNTRY" => ["bra"],
            "AGE" => [0i64],
        }
        .unwrap();

        assert!(transactions_from_dataframe(&df).is_err());
    }

    #[test]
    fn test_separator_in_category_rejected() {
        let df = df! {
            "PRICE" => [39i64],
            "SOURCE" => ["smart_tv"],
            "SEX" => ["male"],
            "COUNTRY" => ["bra"],
            "AGE" => [30i64],
        }
        .unwrap();

        let err = transactions_from_dataframe(&df).unwrap_err();
        assert!(err.to_string().contains("key separator"));
    }

    #[test]
    fn test_case_folding_collisions_rejected() {
        let df = df! {
            "PRICE" => [10i64, 30],
            "SOURCE" => ["ios", "ios"],
            "SEX" => ["male", "male"],
            "COUNTRY" => ["ß", "ss"],
            "AGE" => [20i64, 20],
        }
        .unwrap();

        let err = transactions_from_dataframe(&df).unwrap_err();
        assert_eq!(
            err.downcast_ref::<PipelineError>()
                .map(|e| matches!(e, PipelineError::InvalidValue { row: 0, .. })),
            Some(true)
        );
    }

    #[test]
    fn test_normalize_category() {
        assert_eq!(normalize_category("  Android "), Ok("android".to_string()));
        assert_eq!(normalize_category("TUR"), Ok("tur".to_string()));
        assert!(normalize_category("   ").is_err());
        assert!(normalize_category("smart_tv").is_err());
        assert!(normalize_category("ß").is_err());
        assert!(normalize_category("ı").is_err());
        assert_eq!(normalize_category("Ünited"), Ok("ünited".to_string()));
    }

    #[test]
    fn test_missing_category_rejected() {
        let df = df! {
            "PRICE" => [39i64, 10],
            "SOURCE" => [Some("android"), None],
            "SEX" => ["male", "male"],
            "COUNTRY" => ["bra", "bra"],
            "AGE" => [30i64, 31],
        }
        .unwrap();

        assert!(transactions_from_dataframe(&df).is_err());
    }
}
