//! Persona: Customer Segmentation CLI Tool
//!
//! A command-line tool that aggregates purchase transactions by customer
//! demographics, builds customer-level personas and segments them by mean
//! purchase price.

use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use console::style;

use persona::cli::Cli;
use persona::pipeline::{
    aggregate_demographics, aggregate_personas, bucket_aggregates, classify_segments, describe,
    load_transactions, AgeBuckets, Dimension, PersonaTable, PipelineError, SegmentedPersona,
};
use persona::report::{
    bucketed_table, demographic_table, group_stats_table, lookup_table, persona_table,
    price_counts_table, print_table, save_persona_table, segment_summary_table,
    value_counts_table, ExportParams, RunSummary,
};
use persona::utils::{
    create_spinner, finish_with_success, finish_with_warning, print_banner, print_completion,
    print_config, print_count, print_info, print_section, print_step_header, print_step_time,
    print_success, print_warning,
};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let lookup_keys = cli.lookup_keys();
    let max_rows = cli.max_rows;

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(
        &cli.input,
        cli.output.as_deref(),
        lookup_keys.len() + cli.customers.len(),
        max_rows,
    );

    // Step 1: Load transactions
    print_step_header(1, "Load Transactions");

    let step_start = Instant::now();
    let spinner = create_spinner("Reading transactions...");
    let (transactions, stats) = match load_transactions(&cli.input, cli.infer_schema_length) {
        Ok(loaded) => loaded,
        Err(e) => {
            finish_with_warning(&spinner, "Failed to load transactions");
            return Err(e);
        }
    };
    finish_with_success(&spinner, "Transactions loaded");

    println!("\n    {} Dataset Statistics:", style("✧").cyan());
    println!("      Rows: {}", stats.rows);
    println!("      Columns: {}", stats.columns);
    println!("      Estimated memory: {:.2} MB", stats.memory_mb);

    let mut summary = RunSummary::new(transactions.len());
    let load_elapsed = step_start.elapsed();
    summary.set_load_time(load_elapsed);
    print_step_time(load_elapsed);

    // Step 2: Descriptive statistics
    print_step_header(2, "Descriptive Statistics");

    let step_start = Instant::now();
    let report = describe(&transactions);

    print_section(&format!("SOURCE ({} distinct)", report.distinct_sources));
    print_table(
        &value_counts_table(Dimension::Source, &report.source_counts, max_rows),
        report.source_counts.len(),
        max_rows,
    );

    print_section(&format!("PRICE ({} distinct)", report.distinct_prices));
    print_table(
        &price_counts_table(&report.price_counts, max_rows),
        report.price_counts.len(),
        max_rows,
    );

    print_section("Sales per COUNTRY");
    print_table(
        &value_counts_table(Dimension::Country, &report.country_counts, max_rows),
        report.country_counts.len(),
        max_rows,
    );

    print_section("Revenue and mean PRICE per COUNTRY");
    print_table(
        &group_stats_table(&[Dimension::Country], &report.by_country, max_rows),
        report.by_country.len(),
        max_rows,
    );

    print_section("Mean PRICE per SOURCE");
    print_table(
        &group_stats_table(&[Dimension::Source], &report.by_source, max_rows),
        report.by_source.len(),
        max_rows,
    );

    print_section("Mean PRICE per COUNTRY and SOURCE");
    print_table(
        &group_stats_table(
            &[Dimension::Country, Dimension::Source],
            &report.by_country_source,
            max_rows,
        ),
        report.by_country_source.len(),
        max_rows,
    );

    let describe_elapsed = step_start.elapsed();
    summary.set_describe_time(describe_elapsed);
    print_step_time(describe_elapsed);

    // Step 3: Demographic aggregation and persona keys
    print_step_header(3, "Customer Personas");

    let step_start = Instant::now();
    let aggregates = aggregate_demographics(&transactions);
    summary.demographic_groups = aggregates.len();
    print_count("COUNTRY/SOURCE/SEX/AGE group(s)", aggregates.len(), None);

    print_section("Mean PRICE per COUNTRY, SOURCE, SEX and AGE");
    print_table(
        &demographic_table(&aggregates, max_rows),
        aggregates.len(),
        max_rows,
    );

    let max_age = transactions.max_age().ok_or(PipelineError::EmptyDataset)?;
    let buckets = AgeBuckets::new(max_age)?;
    print_info(&format!("Age buckets: {}", buckets.labels().join(", ")));

    let bucketed = bucket_aggregates(&aggregates, &buckets)?;
    print_section("Age buckets and persona keys");
    print_table(&bucketed_table(&bucketed, max_rows), bucketed.len(), max_rows);

    let personas = aggregate_personas(&bucketed);
    summary.personas = personas.len();
    print_count(
        "persona(s)",
        personas.len(),
        Some(&format!("from {} bucketed group(s)", bucketed.len())),
    );

    let persona_elapsed = step_start.elapsed();
    summary.set_persona_time(persona_elapsed);
    print_step_time(persona_elapsed);

    // Step 4: Segmentation
    print_step_header(4, "Segmentation");

    let step_start = Instant::now();
    let spinner = create_spinner("Assigning quartile segments...");
    let (segmented, edges) = match classify_segments(&personas) {
        Ok(result) => result,
        Err(e) => {
            finish_with_warning(&spinner, "Segmentation failed");
            return Err(e.into());
        }
    };
    finish_with_success(&spinner, "Segments assigned");

    let edge_labels: Vec<String> = edges.edges.iter().map(|e| format!("{:.2}", e)).collect();
    print_info(&format!("Quartile edges: {}", edge_labels.join(" | ")));

    let table = PersonaTable::new(segmented, buckets, edges);

    print_section("Personas");
    print_table(&persona_table(table.personas(), max_rows), table.len(), max_rows);

    let segments = table.summary();
    print_section("Segments");
    print_table(&segment_summary_table(&segments), segments.len(), None);

    let segment_elapsed = step_start.elapsed();
    summary.set_segment_time(segment_elapsed);
    print_step_time(segment_elapsed);

    // Step 5: Lookups
    print_step_header(5, "Persona Lookup");

    let mut results: Vec<(String, Option<&SegmentedPersona>)> = lookup_keys
        .iter()
        .map(|key| (key.clone(), table.lookup(key)))
        .collect();

    for profile in &cli.customers {
        match table.classify(profile) {
            Ok(matched) => results.push((matched.key, matched.persona)),
            Err(e) => print_warning(&format!(
                "Customer {},{},{},{}: {}",
                profile.country, profile.source, profile.sex, profile.age, e
            )),
        }
    }

    for (_, persona) in &results {
        summary.record_lookup(persona.is_some());
    }

    if results.is_empty() {
        print_info("No lookups to run");
    } else {
        print_table(&lookup_table(&results), results.len(), None);
        if summary.lookups_found < summary.lookups {
            print_info("Keys without a matching persona have no segment in this dataset");
        }
    }

    // Step 6: Save results
    if let Some(output_path) = &cli.output {
        print_step_header(6, "Save Results");

        let step_start = Instant::now();
        let spinner = create_spinner("Writing persona table...");
        let input_file = cli.input.display().to_string();
        save_persona_table(
            &table,
            output_path,
            &ExportParams {
                input_file: &input_file,
                transactions: transactions.len(),
            },
        )?;
        finish_with_success(&spinner, &format!("Saved to {}", output_path.display()));
        let export_elapsed = step_start.elapsed();
        summary.set_export_time(export_elapsed);
        print_step_time(export_elapsed);
    }

    print_success("Segmentation finished");
    summary.display();
    print_completion();

    Ok(())
}
