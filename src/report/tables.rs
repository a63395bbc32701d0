//! Tabular rendering of aggregates, personas and lookups

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Color, Table};
use console::style;

use crate::pipeline::{
    BucketedAggregate, DemographicAggregate, Dimension, GroupStats, GroupValue, Segment,
    SegmentSummary, SegmentedPersona,
};

fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(
        header
            .iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
            .collect::<Vec<_>>(),
    );
    table
}

fn price_cell(value: f64) -> Cell {
    Cell::new(format!("{:.2}", value)).set_alignment(CellAlignment::Right)
}

fn count_cell(value: usize) -> Cell {
    Cell::new(value).set_alignment(CellAlignment::Right)
}

fn segment_cell(segment: Segment) -> Cell {
    let color = match segment {
        Segment::A => Color::Green,
        Segment::B => Color::Cyan,
        Segment::C => Color::Yellow,
        Segment::D => Color::Red,
    };
    Cell::new(segment.label())
        .fg(color)
        .add_attribute(Attribute::Bold)
}

/// First `max_rows` rows, or all of them
fn limit<T>(rows: &[T], max_rows: Option<usize>) -> &[T] {
    match max_rows {
        Some(n) if n < rows.len() => &rows[..n],
        _ => rows,
    }
}

/// Print a table indented under the current step, noting hidden rows
pub fn print_table(table: &Table, total_rows: usize, max_rows: Option<usize>) {
    for line in table.to_string().lines() {
        println!("    {}", line);
    }
    if let Some(n) = max_rows {
        if n < total_rows {
            println!(
                "    {}",
                style(format!("... {} more row(s) not shown", total_rows - n)).dim()
            );
        }
    }
}

/// Sales count per value of one dimension
pub fn value_counts_table(
    dimension: Dimension,
    counts: &[(GroupValue, usize)],
    max_rows: Option<usize>,
) -> Table {
    let mut table = new_table(&[dimension.column_name(), "Sales"]);
    for (value, count) in limit(counts, max_rows) {
        table.add_row(vec![Cell::new(value), count_cell(*count)]);
    }
    table
}

/// Sales count per distinct price
pub fn price_counts_table(counts: &[(f64, usize)], max_rows: Option<usize>) -> Table {
    let mut table = new_table(&["PRICE", "Sales"]);
    for (price, count) in limit(counts, max_rows) {
        table.add_row(vec![price_cell(*price), count_cell(*count)]);
    }
    table
}

/// Count, sum and mean price per group
pub fn group_stats_table(
    dimensions: &[Dimension],
    groups: &[GroupStats],
    max_rows: Option<usize>,
) -> Table {
    let mut header: Vec<&str> = dimensions.iter().map(|d| d.column_name()).collect();
    header.extend(["Sales", "Revenue", "Mean PRICE"]);

    let mut table = new_table(&header);
    for group in limit(groups, max_rows) {
        let mut row: Vec<Cell> = group.key.iter().map(Cell::new).collect();
        row.push(count_cell(group.stats.count));
        row.push(price_cell(group.stats.sum));
        row.push(price_cell(group.stats.mean()));
        table.add_row(row);
    }
    table
}

/// Mean price per (country, source, sex, age)
pub fn demographic_table(rows: &[DemographicAggregate], max_rows: Option<usize>) -> Table {
    let mut table = new_table(&["COUNTRY", "SOURCE", "SEX", "AGE", "Sales", "Mean PRICE"]);
    for row in limit(rows, max_rows) {
        table.add_row(vec![
            Cell::new(&row.country),
            Cell::new(&row.source),
            Cell::new(&row.sex),
            count_cell(row.age as usize),
            count_cell(row.sales),
            price_cell(row.price),
        ]);
    }
    table
}

/// Four-way aggregates with their age bucket and persona key
pub fn bucketed_table(rows: &[BucketedAggregate], max_rows: Option<usize>) -> Table {
    let mut table = new_table(&["AGE", "Age bucket", "Persona", "Mean PRICE"]);
    for row in limit(rows, max_rows) {
        table.add_row(vec![
            count_cell(row.aggregate.age as usize),
            Cell::new(&row.age_bucket),
            Cell::new(&row.key),
            price_cell(row.aggregate.price),
        ]);
    }
    table
}

/// Persona keys with mean price and segment
pub fn persona_table(personas: &[SegmentedPersona], max_rows: Option<usize>) -> Table {
    let mut table = new_table(&["Persona", "Mean PRICE", "Segment"]);
    for persona in limit(personas, max_rows) {
        table.add_row(vec![
            Cell::new(&persona.key),
            price_cell(persona.price),
            segment_cell(persona.segment),
        ]);
    }
    table
}

/// Per-segment persona count and price range
pub fn segment_summary_table(summary: &[SegmentSummary]) -> Table {
    let mut table = new_table(&["Segment", "Personas", "Mean PRICE", "Min", "Max"]);
    for s in summary {
        table.add_row(vec![
            segment_cell(s.segment),
            count_cell(s.personas),
            price_cell(s.mean_price),
            price_cell(s.min_price),
            price_cell(s.max_price),
        ]);
    }
    table
}

/// Lookup results; keys without a persona show as not found
pub fn lookup_table(results: &[(String, Option<&SegmentedPersona>)]) -> Table {
    let mut table = new_table(&["Persona", "Mean PRICE", "Segment"]);
    for (key, persona) in results {
        match persona {
            Some(p) => table.add_row(vec![
                Cell::new(key),
                price_cell(p.price),
                segment_cell(p.segment),
            ]),
            None => table.add_row(vec![
                Cell::new(key),
                Cell::new("not found").fg(Color::DarkGrey),
                Cell::new("-").fg(Color::DarkGrey),
            ]),
        };
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn persona(key: &str, price: f64, segment: Segment) -> SegmentedPersona {
        SegmentedPersona {
            key: key.to_string(),
            price,
            segment,
        }
    }

    #[test]
    fn test_limit_rows() {
        let rows = [1, 2, 3, 4];
        assert_eq!(limit(&rows, None).len(), 4);
        assert_eq!(limit(&rows, Some(2)), &[1, 2]);
        assert_eq!(limit(&rows, Some(10)).len(), 4);
    }

    #[test]
    fn test_persona_table_respects_max_rows() {
        let personas = vec![
            persona("BRA_ANDROID_MALE_0_18", 42.333, Segment::B),
            persona("TUR_IOS_FEMALE_19_23", 12.0, Segment::D),
        ];

        let rendered = persona_table(&personas, Some(1)).to_string();
        assert!(rendered.contains("BRA_ANDROID_MALE_0_18"));
        assert!(rendered.contains("42.33"));
        assert!(!rendered.contains("TUR_IOS_FEMALE_19_23"));
    }

    #[test]
    fn test_lookup_table_marks_missing_keys() {
        let found = persona("BRA_ANDROID_MALE_0_18", 42.0, Segment::A);
        let results = vec![
            ("BRA_ANDROID_MALE_0_18".to_string(), Some(&found)),
            ("TUR_ANDROID_FEMALE_31_40".to_string(), None),
        ];

        let rendered = lookup_table(&results).to_string();
        assert!(rendered.contains("not found"));
        assert!(rendered.contains("TUR_ANDROID_FEMALE_31_40"));
    }

    #[test]
    fn test_group_stats_table_headers() {
        let groups = vec![GroupStats {
            key: vec![GroupValue::Text("bra".to_string()), GroupValue::Text("ios".to_string())],
            stats: crate::pipeline::PriceStats { count: 2, sum: 78.0 },
        }];

        let rendered =
            group_stats_table(&[Dimension::Country, Dimension::Source], &groups, None).to_string();
        assert!(rendered.contains("COUNTRY"));
        assert!(rendered.contains("SOURCE"));
        assert!(rendered.contains("39.00"));
    }
}
