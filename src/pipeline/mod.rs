//! Pipeline module - loading, aggregation and segmentation steps

pub mod age;
pub mod aggregate;
pub mod error;
pub mod loader;
pub mod lookup;
pub mod persona;
pub mod segment;

pub use age::*;
pub use aggregate::*;
pub use error::PipelineError;
pub use loader::*;
pub use lookup::*;
pub use persona::*;
pub use segment::*;
