//! Terminal styling utilities for step-by-step console output

use console::{style, Emoji};
use std::path::Path;
use std::time::Duration;

// Emoji icons with fallbacks for terminals that don't support them
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[*] ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", ">> ");
pub static FOLDER: Emoji<'_, '_> = Emoji("📂 ", "");
pub static SAVE: Emoji<'_, '_> = Emoji("💾 ", "");
pub static SEARCH: Emoji<'_, '_> = Emoji("🔎 ", "");
pub static CHART: Emoji<'_, '_> = Emoji("📊 ", "");

/// Print the application banner
pub fn print_banner(version: &str) {
    let banner = r#"
    ╔═╗╔═╗╦═╗╔═╗╔═╗╔╗╔╔═╗
    ╠═╝║╣ ╠╦╝╚═╗║ ║║║║╠═╣
    ╩  ╚═╝╩╚═╚═╝╚═╝╝╚╝╩ ╩
    "#;

    println!();
    println!("{}", style(banner).cyan().bold());
    println!(
        "    {}",
        style("Rule-based customer segmentation").dim()
    );
    println!("    {}", style(format!("v{}", version)).dim());
    println!("    {}", style("━".repeat(50)).dim());
    println!();
}

/// Print configuration card
pub fn print_config(input: &Path, output: Option<&Path>, lookups: usize, max_rows: Option<usize>) {
    let box_width = 56;
    let line = "─".repeat(box_width - 2);

    let output_display = output
        .map(|p| truncate_path(p, 38))
        .unwrap_or_else(|| "(none)".to_string());
    let rows_display = max_rows
        .map(|n| n.to_string())
        .unwrap_or_else(|| "all".to_string());

    println!("    ┌{}┐", line);
    println!(
        "    │ {}{}│",
        style("⚙️  Configuration").cyan().bold(),
        " ".repeat(box_width - 20)
    );
    println!("    ├{}┤", line);
    println!("    │  {} Input:  {:<41}│", FOLDER, truncate_path(input, 40));
    println!("    │  {} Output: {:<41}│", SAVE, output_display);
    println!("    ├{}┤", line);
    println!(
        "    │  {} Lookups:         {:<32}│",
        SEARCH,
        style(lookups).yellow()
    );
    println!(
        "    │  {} Rows per table:  {:<32}│",
        CHART,
        style(rows_display).yellow()
    );
    println!("    └{}┘", line);
    println!();
}

/// Print a step header with styling
pub fn print_step_header(step_num: u8, title: &str) {
    println!();
    println!(
        "    {} {} {}",
        style(format!("STEP {}", step_num)).cyan().bold(),
        style("│").dim(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
}

/// Print a sub-section title inside a step
pub fn print_section(title: &str) {
    println!();
    println!("    {} {}", style("✧").cyan(), style(title).bold());
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("    {} {}", style("✓").green().bold(), style(message).green());
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("    {} {}", INFO, message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("    {} {}", WARN, style(message).yellow());
}

/// Print the elapsed time of a step
pub fn print_step_time(elapsed: Duration) {
    println!("    {}", style(format!("({:.2?})", elapsed)).dim());
}

/// Print a styled count message
pub fn print_count(description: &str, count: usize, detail: Option<&str>) {
    if let Some(info) = detail {
        println!(
            "      Found {} {} {}",
            style(count).yellow().bold(),
            description,
            style(info).dim()
        );
    } else {
        println!("      Found {} {}", style(count).yellow().bold(), description);
    }
}

/// Print the final completion message
pub fn print_completion() {
    println!();
    println!(
        "    {} {}",
        ROCKET,
        style("Persona segmentation complete!").green().bold()
    );
    println!();
}

// Helper functions

fn truncate_path(path: &Path, max_len: usize) -> String {
    let path_str = path.display().to_string();
    truncate_string(&path_str, max_len)
}

fn truncate_string(s: &str, max_len: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max_len {
        s.to_string()
    } else {
        let tail: String = chars[chars.len() - (max_len - 3)..].iter().collect();
        format!("...{}", tail)
    }
}
