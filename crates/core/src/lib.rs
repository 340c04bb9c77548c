//! tablestitch - ruled table reconstruction and cross-page table stitching.
//!
//! Rulings and positioned text of a page become [`table::Table`]s with
//! merged cells; tables continued on the next page are joined back into one.

pub mod combine;
pub mod error;
pub mod high_level;
pub mod page;
pub mod params;
pub mod table;
pub mod utils;

pub use combine::{CrossPageCombiner, SplitCellScorer, TableChain};
pub use error::{Result, TableError};
pub use high_level::extract_document;
pub use page::{DocumentInput, PageContext};
pub use params::{CombineParams, Config, LatticeParams};
