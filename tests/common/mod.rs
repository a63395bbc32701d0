//! Shared test utilities and fixture generators

#![allow(dead_code)]

use persona::pipeline::{Transaction, TransactionTable};
use polars::prelude::*;
use rand::{Rng, SeedableRng};
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

/// Small persona dataset with six personas and a maximum age of 66
///
/// Persona mean prices:
/// - `BRA_ANDROID_MALE_0_18`: (39 + 39 + 49) / 3
/// - `TUR_ANDROID_MALE_0_18`: (29 + 49) / 2 = 39
/// - `TUR_IOS_FEMALE_31_40`: 59
/// - `FRA_IOS_FEMALE_24_30`: 19
/// - `USA_ANDROID_FEMALE_41_66`: 69
/// - `DEU_IOS_MALE_41_66`: 9
pub const PERSONA_SAMPLE: &[(i64, &str, &str, &str, i64)] = &[
    (39, "android", "male", "bra", 17),
    (39, "android", "male", "bra", 17),
    (49, "android", "male", "bra", 17),
    (29, "android", "male", "tur", 17),
    (49, "android", "male", "tur", 17),
    (59, "ios", "female", "tur", 33),
    (19, "ios", "female", "fra", 25),
    (69, "android", "female", "usa", 45),
    (9, "ios", "male", "deu", 66),
];

/// Write rows to a CSV file with the transaction header
pub fn write_transactions_csv(rows: &[(i64, &str, &str, &str, i64)]) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("persona.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    writeln!(file, "PRICE,SOURCE,SEX,COUNTRY,AGE").unwrap();
    for (price, source, sex, country, age) in rows {
        writeln!(file, "{},{},{},{},{}", price, source, sex, country, age).unwrap();
    }
    drop(file);

    (temp_dir, csv_path)
}

/// Write raw CSV text to a temporary file
pub fn write_raw_csv(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("raw.csv");
    std::fs::write(&csv_path, contents).unwrap();
    (temp_dir, csv_path)
}

/// Build the sample dataset as an in-memory table
pub fn sample_table() -> TransactionTable {
    TransactionTable::new(
        PERSONA_SAMPLE
            .iter()
            .map(|&(price, source, sex, country, age)| {
                Transaction::new(price as f64, source, sex, country, age as u32)
            })
            .collect(),
    )
}

/// Build a sample DataFrame with the transaction columns
pub fn sample_dataframe() -> DataFrame {
    df! {
        "PRICE" => PERSONA_SAMPLE.iter().map(|r| r.0).collect::<Vec<i64>>(),
        "SOURCE" => PERSONA_SAMPLE.iter().map(|r| r.1).collect::<Vec<&str>>(),
        "SEX" => PERSONA_SAMPLE.iter().map(|r| r.2).collect::<Vec<&str>>(),
        "COUNTRY" => PERSONA_SAMPLE.iter().map(|r| r.3).collect::<Vec<&str>>(),
        "AGE" => PERSONA_SAMPLE.iter().map(|r| r.4).collect::<Vec<i64>>(),
    }
    .unwrap()
}

/// Create a temporary directory with a test Parquet file
pub fn create_temp_parquet(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let parquet_path = temp_dir.path().join("persona.parquet");

    let file = std::fs::File::create(&parquet_path).unwrap();
    ParquetWriter::new(file).finish(df).unwrap();

    (temp_dir, parquet_path)
}

/// Generate a reproducible random transaction table
///
/// The last row is always 66 years old so the age buckets are valid.
pub fn create_random_table(rows: usize, seed: u64) -> TransactionTable {
    const PRICES: [f64; 8] = [9.0, 19.0, 29.0, 39.0, 49.0, 59.0, 69.0, 79.0];
    const SOURCES: [&str; 2] = ["android", "ios"];
    const SEXES: [&str; 2] = ["female", "male"];
    const COUNTRIES: [&str; 6] = ["bra", "can", "deu", "fra", "tur", "usa"];

    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);

    let mut transactions: Vec<Transaction> = (0..rows)
        .map(|_| {
            Transaction::new(
                PRICES[rng.gen_range(0..PRICES.len())],
                SOURCES[rng.gen_range(0..SOURCES.len())],
                SEXES[rng.gen_range(0..SEXES.len())],
                COUNTRIES[rng.gen_range(0..COUNTRIES.len())],
                rng.gen_range(15..=65),
            )
        })
        .collect();
    transactions.push(Transaction::new(39.0, "ios", "female", "tur", 66));

    TransactionTable::new(transactions)
}
