//! Report module - rendering and exporting segmentation results

pub mod persona_export;
pub mod summary;
pub mod tables;

pub use persona_export::*;
pub use summary::*;
pub use tables::*;
