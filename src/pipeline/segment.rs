//! Quartile segmentation of persona mean prices
//!
//! Edges are the 0, 25, 50, 75 and 100th percentiles of the persona prices,
//! interpolated linearly between closest ranks. Bins are `[e0,e1]`,
//! `(e1,e2]`, `(e2,e3]` and `(e3,e4]`, labelled D, C, B, A.

use serde::Serialize;
use std::fmt;

use super::error::PipelineError;
use super::persona::PersonaPrice;

/// Number of quantile bins
pub const SEGMENT_COUNT: usize = 4;

/// Persona segment, ordered by ascending mean price (D < C < B < A)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Segment {
    D,
    C,
    B,
    A,
}

impl Segment {
    /// Segments from the lowest price quartile to the highest
    pub const ASCENDING: [Segment; SEGMENT_COUNT] = [Segment::D, Segment::C, Segment::B, Segment::A];

    /// Segment for a zero-based quartile index, clamped to the top quartile.
    pub fn from_quartile(index: usize) -> Self {
        Self::ASCENDING[index.min(SEGMENT_COUNT - 1)]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Segment::A => "A",
            Segment::B => "B",
            Segment::C => "C",
            Segment::D => "D",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// The five quartile edges of one run
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuartileEdges {
    pub edges: [f64; SEGMENT_COUNT + 1],
}

impl QuartileEdges {
    /// Compute quartile edges over `prices`.
    ///
    /// Fails with fewer than four distinct prices, or when the edges are not
    /// strictly increasing.
    pub fn from_prices(prices: &[f64]) -> Result<Self, PipelineError> {
        let mut sorted: Vec<f64> = prices.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let mut distinct = sorted.clone();
        distinct.dedup();

        let insufficient = PipelineError::InsufficientDistinctValues {
            distinct: distinct.len(),
            personas: prices.len(),
        };

        if distinct.len() < SEGMENT_COUNT {
            return Err(insufficient);
        }

        let edges: [f64; SEGMENT_COUNT + 1] =
            std::array::from_fn(|i| quantile(&sorted, i as f64 / SEGMENT_COUNT as f64));

        if edges.windows(2).any(|w| w[0] >= w[1]) {
            return Err(insufficient);
        }

        Ok(Self { edges })
    }

    /// Segment of `price`. Values on an inner edge go to the lower segment;
    /// values outside `[e0, e4]` are clamped to D or A.
    pub fn segment_for(&self, price: f64) -> Segment {
        let quartile = self.edges[1..]
            .iter()
            .position(|&upper| price <= upper)
            .unwrap_or(SEGMENT_COUNT - 1);
        Segment::from_quartile(quartile)
    }
}

/// Linear-interpolated quantile of an ascending, non-empty slice
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;

    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

/// A persona with its assigned segment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentedPersona {
    pub key: String,
    pub price: f64,
    pub segment: Segment,
}

/// Assign a segment to every persona, preserving input order.
pub fn classify_segments(
    personas: &[PersonaPrice],
) -> Result<(Vec<SegmentedPersona>, QuartileEdges), PipelineError> {
    let prices: Vec<f64> = personas.iter().map(|p| p.price).collect();
    let edges = QuartileEdges::from_prices(&prices)?;

    let segmented = personas
        .iter()
        .map(|p| SegmentedPersona {
            key: p.key.clone(),
            price: p.price,
            segment: edges.segment_for(p.price),
        })
        .collect();

    Ok((segmented, edges))
}

/// Price statistics of the personas in one segment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentSummary {
    pub segment: Segment,
    pub personas: usize,
    pub mean_price: f64,
    pub min_price: f64,
    pub max_price: f64,
}

/// Summarize each non-empty segment, ordered A, B, C, D.
pub fn summarize_segments(personas: &[SegmentedPersona]) -> Vec<SegmentSummary> {
    Segment::ASCENDING
        .iter()
        .rev()
        .filter_map(|&segment| {
            let prices: Vec<f64> = personas
                .iter()
                .filter(|p| p.segment == segment)
                .map(|p| p.price)
                .collect();

            if prices.is_empty() {
                return None;
            }

            Some(SegmentSummary {
                segment,
                personas: prices.len(),
                mean_price: prices.iter().sum::<f64>() / prices.len() as f64,
                min_price: prices.iter().copied().fold(f64::INFINITY, f64::min),
                max_price: prices.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            })
        })
        .collect()
}
