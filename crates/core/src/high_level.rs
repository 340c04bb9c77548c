//! Document-level table extraction.
//!
//! Runs lattice reconstruction on every page and, unless disabled,
//! stitches tables that continue across page breaks.
//!
//! # Example
//! ```ignore
//! use tablestitch_core::high_level::extract_document;
//! use tablestitch_core::params::Config;
//!
//! let tables = extract_document(&pages, &Config::default(), None)?;
//! for table in &tables {
//!     println!("pages {}-{}: {} rows", table.page_number, table.end_page_number, table.row_count());
//! }
//! ```

use rayon::prelude::*;
use tracing::debug;

use crate::combine::{CrossPageCombiner, SplitCellScorer};
use crate::error::Result;
use crate::page::PageContext;
use crate::params::Config;
use crate::table::{Table, extract_tables};

/// Extract the logical tables of a document.
///
/// Pages are processed in the given order. With cross-page combination
/// enabled the combiner carries state from page to page, so pages run one
/// after another; otherwise they are reconstructed in parallel. Tables are
/// returned in page order, continued tables once under their first page
/// with the later fragments kept in [`Table::merged_fragments`].
pub fn extract_document(
    pages: &[PageContext],
    config: &Config,
    scorer: Option<&dyn SplitCellScorer>,
) -> Result<Vec<Table>> {
    if !config.combine.enabled {
        let per_page: Vec<Vec<Table>> = pages
            .par_iter()
            .map(|page| extract_tables(page, &config.lattice))
            .collect::<Result<_>>()?;
        return Ok(per_page.into_iter().flatten().collect());
    }

    let mut combiner = CrossPageCombiner::new(config.combine.clone());
    if let Some(scorer) = scorer {
        combiner = combiner.with_scorer(scorer);
    }
    let mut tables = Vec::new();
    for page in pages {
        let found = extract_tables(page, &config.lattice)?;
        debug!(page = page.number, tables = found.len(), "page reconstructed");
        tables.extend(combiner.push_page(page, found));
    }
    tables.extend(combiner.finish());
    Ok(tables)
}
