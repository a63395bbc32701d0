//! Group-wise price statistics over the transaction table
//!
//! Every grouping goes through an ordered map from group key to a
//! `PriceStats` accumulator, so output order is deterministic.

use std::collections::BTreeMap;
use std::fmt;

use super::loader::{
    Transaction, TransactionTable, AGE_COLUMN, COUNTRY_COLUMN, SEX_COLUMN, SOURCE_COLUMN,
};

/// Categorical dimension a table can be grouped on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Country,
    Source,
    Sex,
    Age,
}

impl Dimension {
    /// The four-way persona grouping, in key order
    pub const PERSONA: [Dimension; 4] = [
        Dimension::Country,
        Dimension::Source,
        Dimension::Sex,
        Dimension::Age,
    ];

    pub fn column_name(&self) -> &'static str {
        match self {
            Dimension::Country => COUNTRY_COLUMN,
            Dimension::Source => SOURCE_COLUMN,
            Dimension::Sex => SEX_COLUMN,
            Dimension::Age => AGE_COLUMN,
        }
    }

    pub fn value_of(&self, transaction: &Transaction) -> GroupValue {
        match self {
            Dimension::Country => GroupValue::Text(transaction.country.clone()),
            Dimension::Source => GroupValue::Text(transaction.source.clone()),
            Dimension::Sex => GroupValue::Text(transaction.sex.clone()),
            Dimension::Age => GroupValue::Age(transaction.age),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column_name())
    }
}

/// One component of a group key. Ages order numerically, text lexically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GroupValue {
    Age(u32),
    Text(String),
}

impl fmt::Display for GroupValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupValue::Age(age) => write!(f, "{}", age),
            GroupValue::Text(text) => write!(f, "{}", text),
        }
    }
}

/// Running count and sum of prices for one group
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PriceStats {
    pub count: usize,
    pub sum: f64,
}

impl PriceStats {
    pub fn add(&mut self, price: f64) {
        self.count += 1;
        self.sum += price;
    }

    /// `sum / count`; 0.0 for an empty accumulator.
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Price statistics for one group, keyed in dimension order
#[derive(Debug, Clone, PartialEq)]
pub struct GroupStats {
    pub key: Vec<GroupValue>,
    pub stats: PriceStats,
}

/// Group transactions on `dimensions`, returning one entry per group sorted by key.
pub fn group_by(table: &TransactionTable, dimensions: &[Dimension]) -> Vec<GroupStats> {
    let mut groups: BTreeMap<Vec<GroupValue>, PriceStats> = BTreeMap::new();

    for transaction in table.iter() {
        let key: Vec<GroupValue> = dimensions.iter().map(|d| d.value_of(transaction)).collect();
        groups.entry(key).or_default().add(transaction.price);
    }

    groups
        .into_iter()
        .map(|(key, stats)| GroupStats { key, stats })
        .collect()
}

/// Number of sales per value of `dimension`, sorted by count descending then value.
pub fn value_counts(table: &TransactionTable, dimension: Dimension) -> Vec<(GroupValue, usize)> {
    let mut counts: Vec<(GroupValue, usize)> = group_by(table, &[dimension])
        .into_iter()
        .filter_map(|g| g.key.into_iter().next().map(|v| (v, g.stats.count)))
        .collect();

    // Stable sort keeps ascending value order within equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Number of distinct values of `dimension`
pub fn distinct_count(table: &TransactionTable, dimension: Dimension) -> usize {
    group_by(table, &[dimension]).len()
}

/// Number of sales per distinct price, sorted by count descending then price.
pub fn price_value_counts(table: &TransactionTable) -> Vec<(f64, usize)> {
    let mut prices: Vec<f64> = table.iter().map(|t| t.price).collect();
    prices.sort_by(|a, b| a.total_cmp(b));

    let mut counts: Vec<(f64, usize)> = Vec::new();
    for price in prices {
        match counts.last_mut() {
            Some((last, count)) if *last == price => *count += 1,
            _ => counts.push((price, 1)),
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Mean price of one (country, source, sex, age) combination
#[derive(Debug, Clone, PartialEq)]
pub struct DemographicAggregate {
    pub country: String,
    pub source: String,
    pub sex: String,
    pub age: u32,
    pub sales: usize,
    pub price: f64,
}

/// Aggregate mean price by (country, source, sex, age), sorted by price descending.
///
/// Rows with equal mean price keep ascending key order.
pub fn aggregate_demographics(table: &TransactionTable) -> Vec<DemographicAggregate> {
    let mut groups: BTreeMap<(&str, &str, &str, u32), PriceStats> = BTreeMap::new();

    for t in table.iter() {
        groups
            .entry((t.country.as_str(), t.source.as_str(), t.sex.as_str(), t.age))
            .or_default()
            .add(t.price);
    }

    let mut rows: Vec<DemographicAggregate> = groups
        .into_iter()
        .map(|((country, source, sex, age), stats)| DemographicAggregate {
            country: country.to_string(),
            source: source.to_string(),
            sex: sex.to_string(),
            age,
            sales: stats.count,
            price: stats.mean(),
        })
        .collect();

    rows.sort_by(|a, b| b.price.total_cmp(&a.price));
    rows
}

/// The exploratory statistics printed before segmentation
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptiveReport {
    pub rows: usize,
    pub distinct_sources: usize,
    pub source_counts: Vec<(GroupValue, usize)>,
    pub distinct_prices: usize,
    pub price_counts: Vec<(f64, usize)>,
    pub country_counts: Vec<(GroupValue, usize)>,
    pub by_country: Vec<GroupStats>,
    pub by_source: Vec<GroupStats>,
    pub by_country_source: Vec<GroupStats>,
}

/// Compute the descriptive statistics of a transaction table.
pub fn describe(table: &TransactionTable) -> DescriptiveReport {
    let price_counts = price_value_counts(table);
    let source_counts = value_counts(table, Dimension::Source);

    DescriptiveReport {
        rows: table.len(),
        distinct_sources: source_counts.len(),
        source_counts,
        distinct_prices: price_counts.len(),
        price_counts,
        country_counts: value_counts(table, Dimension::Country),
        by_country: group_by(table, &[Dimension::Country]),
        by_source: group_by(table, &[Dimension::Source]),
        by_country_source: group_by(table, &[Dimension::Country, Dimension::Source]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> TransactionTable {
        TransactionTable::new(vec![
            Transaction::new(39.0, "android", "male", "bra", 17),
            Transaction::new(39.0, "android", "male", "bra", 17),
            Transaction::new(49.0, "android", "male", "bra", 17),
            Transaction::new(29.0, "android", "male", "tur", 17),
            Transaction::new(49.0, "ios", "female", "tur", 8),
        ])
    }

    #[test]
    fn test_price_stats_mean() {
        let mut stats = PriceStats::default();
        assert_eq!(stats.mean(), 0.0);
        stats.add(39.0);
        stats.add(49.0);
        assert_eq!(stats.count, 2);
        assert_eq!(stats.mean(), 44.0);
    }

    #[test]
    fn test_group_by_country_sums() {
        let groups = group_by(&table(), &[Dimension::Country]);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, vec![GroupValue::Text("bra".to_string())]);
        assert_eq!(groups[0].stats.count, 3);
        assert_eq!(groups[0].stats.sum, 127.0);
        assert_eq!(groups[1].stats.sum, 78.0);
    }

    #[test]
    fn test_age_keys_order_numerically() {
        let groups = group_by(&table(), &[Dimension::Age]);
        assert_eq!(groups[0].key, vec![GroupValue::Age(8)]);
        assert_eq!(groups[1].key, vec![GroupValue::Age(17)]);
    }

    #[test]
    fn test_value_counts_sorted_by_count() {
        let counts = value_counts(&table(), Dimension::Source);
        assert_eq!(counts[0], (GroupValue::Text("android".to_string()), 4));
        assert_eq!(counts[1], (GroupValue::Text("ios".to_string()), 1));
    }

    #[test]
    fn test_price_value_counts_ties_by_price() {
        let counts = price_value_counts(&table());
        assert_eq!(counts, vec![(39.0, 2), (49.0, 2), (29.0, 1)]);
    }

    #[test]
    fn test_aggregate_demographics_sorted_descending() {
        let rows = aggregate_demographics(&table());

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].country, "tur");
        assert_eq!(rows[0].age, 8);
        assert_eq!(rows[0].price, 49.0);
        assert_eq!(rows[1].country, "bra");
        assert_eq!(rows[1].sales, 3);
        assert!((rows[1].price - 127.0 / 3.0).abs() < 1e-12);
        assert_eq!(rows[2].price, 29.0);
    }

    #[test]
    fn test_describe_counts() {
        let report = describe(&table());
        assert_eq!(report.rows, 5);
        assert_eq!(report.distinct_sources, 2);
        assert_eq!(report.distinct_prices, 3);
        assert_eq!(report.by_country_source.len(), 3);
    }
}
