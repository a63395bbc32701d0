//! Persona table export (CSV, Parquet or JSON by extension)

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use polars::prelude::*;
use serde::Serialize;

use crate::pipeline::{PersonaTable, PipelineError, SegmentSummary, SegmentedPersona};

pub const PERSONA_COLUMN: &str = "PERSONA";
pub const PRICE_COLUMN: &str = "PRICE";
pub const SEGMENT_COLUMN: &str = "SEGMENT";

/// Metadata about the segmentation run
#[derive(Serialize)]
pub struct ExportMetadata {
    /// Timestamp of the export (ISO 8601 format)
    pub timestamp: String,
    /// Persona version
    pub persona_version: String,
    /// Input file path
    pub input_file: String,
    /// Number of transactions loaded
    pub transactions: usize,
    /// Upper bound of the last age bucket
    pub max_age: u32,
    /// Age bucket labels, youngest first
    pub age_buckets: Vec<String>,
    /// Quartile edges over persona mean prices
    pub quartile_edges: Vec<f64>,
}

/// Complete persona export with metadata
#[derive(Serialize)]
pub struct PersonaExport<'a> {
    pub metadata: ExportMetadata,
    pub segments: Vec<SegmentSummary>,
    pub personas: &'a [SegmentedPersona],
}

/// Parameters for the export metadata
pub struct ExportParams<'a> {
    pub input_file: &'a str,
    pub transactions: usize,
}

/// Build a DataFrame with one row per persona: key, mean price and segment
pub fn persona_dataframe(table: &PersonaTable) -> Result<DataFrame> {
    let keys: Vec<&str> = table.personas().iter().map(|p| p.key.as_str()).collect();
    let prices: Vec<f64> = table.personas().iter().map(|p| p.price).collect();
    let segments: Vec<&str> = table.personas().iter().map(|p| p.segment.label()).collect();

    let df = df! {
        PERSONA_COLUMN => keys,
        PRICE_COLUMN => prices,
        SEGMENT_COLUMN => segments,
    }
    .context("Failed to build persona DataFrame")?;

    Ok(df)
}

/// Save the persona table to `path`; the extension selects the format.
pub fn save_persona_table(table: &PersonaTable, path: &Path, params: &ExportParams) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "csv" => {
            let mut df = persona_dataframe(table)?;
            let mut file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            CsvWriter::new(&mut file)
                .finish(&mut df)
                .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;
        }
        "parquet" => {
            let mut df = persona_dataframe(table)?;
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            ParquetWriter::new(file)
                .finish(&mut df)
                .with_context(|| format!("Failed to write Parquet file: {}", path.display()))?;
        }
        "json" => export_persona_json(table, path, params)?,
        _ => {
            return Err(PipelineError::UnsupportedFormat(extension))
                .context("Supported output formats: csv, parquet, json");
        }
    }

    Ok(())
}

/// Export the persona table with run metadata and segment summary as JSON
pub fn export_persona_json(table: &PersonaTable, path: &Path, params: &ExportParams) -> Result<()> {
    let export = PersonaExport {
        metadata: ExportMetadata {
            timestamp: Utc::now().to_rfc3339(),
            persona_version: env!("CARGO_PKG_VERSION").to_string(),
            input_file: params.input_file.to_string(),
            transactions: params.transactions,
            max_age: table.buckets().max_age(),
            age_buckets: table.buckets().labels(),
            quartile_edges: table.edges().edges.to_vec(),
        },
        segments: table.summary(),
        personas: table.personas(),
    };

    let json = serde_json::to_string_pretty(&export)
        .context("Failed to serialize persona table to JSON")?;

    std::fs::write(path, json)
        .with_context(|| format!("Failed to write persona table to {}", path.display()))?;

    Ok(())
}
