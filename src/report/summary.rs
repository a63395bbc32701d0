//! Segmentation run summary

use std::time::Duration;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

/// Summary of one segmentation run
#[derive(Debug, Default)]
pub struct RunSummary {
    pub transactions: usize,
    pub demographic_groups: usize,
    pub personas: usize,
    pub lookups: usize,
    pub lookups_found: usize,
    pub load_time: Duration,
    pub describe_time: Duration,
    pub persona_time: Duration,
    pub segment_time: Duration,
    pub export_time: Option<Duration>,
}

impl RunSummary {
    pub fn new(transactions: usize) -> Self {
        Self {
            transactions,
            ..Default::default()
        }
    }

    pub fn set_load_time(&mut self, elapsed: Duration) {
        self.load_time = elapsed;
    }

    pub fn set_describe_time(&mut self, elapsed: Duration) {
        self.describe_time = elapsed;
    }

    pub fn set_persona_time(&mut self, elapsed: Duration) {
        self.persona_time = elapsed;
    }

    pub fn set_segment_time(&mut self, elapsed: Duration) {
        self.segment_time = elapsed;
    }

    pub fn set_export_time(&mut self, elapsed: Duration) {
        self.export_time = Some(elapsed);
    }

    pub fn record_lookup(&mut self, found: bool) {
        self.lookups += 1;
        if found {
            self.lookups_found += 1;
        }
    }

    pub fn total_time(&self) -> Duration {
        self.load_time
            + self.describe_time
            + self.persona_time
            + self.segment_time
            + self.export_time.unwrap_or_default()
    }

    /// Render the summary as a table
    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Metric").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        table.add_row(vec![
            Cell::new("📁 Transactions"),
            Cell::new(self.transactions),
        ]);
        table.add_row(vec![
            Cell::new("🧮 Demographic groups"),
            Cell::new(self.demographic_groups),
        ]);
        table.add_row(vec![
            Cell::new("👤 Personas"),
            Cell::new(self.personas)
                .fg(Color::Green)
                .add_attribute(Attribute::Bold),
        ]);
        table.add_row(vec![
            Cell::new("🔎 Lookups found"),
            Cell::new(format!("{}/{}", self.lookups_found, self.lookups)).fg(
                if self.lookups_found == self.lookups {
                    Color::White
                } else {
                    Color::Yellow
                },
            ),
        ]);
        table.add_row(vec![
            Cell::new("⏱️  Total time"),
            Cell::new(format!("{:.2?}", self.total_time())).fg(Color::Cyan),
        ]);

        table
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("SEGMENTATION SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        // Indent the table
        for line in self.to_table().to_string().lines() {
            println!("    {}", line);
        }
    }
}
