//! Persona: Rule-Based Customer Segmentation Library
//!
//! A library for aggregating purchase transactions by customer demographics,
//! building customer-level personas and segmenting them by mean price.

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;
