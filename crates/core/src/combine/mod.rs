//! Cross-page table combination.
//!
//! Tables arrive page by page. The [`CrossPageCombiner`] holds at most one
//! pending chain: the last table seen, plus any fragments already judged to
//! continue it. A new page's first table is scored against the chain's
//! tail; a chain is aligned into one table once a page fails to continue
//! it or the document ends.

pub mod chain;
pub mod gap;
pub mod merge;
pub mod patterns;
pub mod rules;
pub mod similarity;
pub mod split;

use tracing::debug;

use crate::page::PageContext;
use crate::params::CombineParams;
use crate::table::Table;

pub use chain::TableChain;
pub use merge::ruling_table_combine;
pub use rules::{CombineScore, CombineVeto};
pub use similarity::edit_similarity;
pub use split::SplitCellScorer;

/// Outcome of judging whether two fragments form one table.
#[derive(Clone, Debug, PartialEq)]
pub enum CombineDecision {
    Vetoed(CombineVeto),
    /// Body text separates the fragments.
    BodyText,
    Scored(CombineScore),
}

impl CombineDecision {
    pub fn accepts(&self, params: &CombineParams) -> bool {
        match self {
            CombineDecision::Scored(score) => score.passes(params.threshold),
            _ => false,
        }
    }
}

/// Judge whether `next`, the first table on `next_page`, continues `prev`
/// from `prev_page`.
pub fn judge(
    prev: &Table,
    next: &Table,
    prev_page: &PageContext,
    next_page: &PageContext,
    params: &CombineParams,
) -> CombineDecision {
    if let Some(veto) = rules::check_vetoes(prev, next, prev_page, next_page, params) {
        return CombineDecision::Vetoed(veto);
    }
    if gap::has_body_text(prev, next, prev_page, next_page, params) {
        return CombineDecision::BodyText;
    }
    let input = rules::RuleInput {
        prev,
        next,
        body_text: false,
        params,
    };
    CombineDecision::Scored(rules::score(&input))
}

pub fn can_combine(
    prev: &Table,
    next: &Table,
    prev_page: &PageContext,
    next_page: &PageContext,
    params: &CombineParams,
) -> bool {
    judge(prev, next, prev_page, next_page, params).accepts(params)
}

/// Page-sequential state machine that stitches table fragments.
pub struct CrossPageCombiner<'s> {
    params: CombineParams,
    scorer: Option<&'s dyn SplitCellScorer>,
    pending: Option<TableChain>,
    prev_page: Option<PageContext>,
}

impl<'s> CrossPageCombiner<'s> {
    pub fn new(params: CombineParams) -> Self {
        Self {
            params,
            scorer: None,
            pending: None,
            prev_page: None,
        }
    }

    /// Consult `scorer` when punctuation alone cannot tell a split row.
    pub fn with_scorer(mut self, scorer: &'s dyn SplitCellScorer) -> Self {
        self.scorer = Some(scorer);
        self
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Feed one page's tables. Returns the tables that are final, in order.
    ///
    /// Pages must be pushed in page order, including pages without tables.
    pub fn push_page(&mut self, page: &PageContext, mut tables: Vec<Table>) -> Vec<Table> {
        let mut finished = Vec::new();
        if tables.is_empty() {
            finished.extend(self.finish());
            self.prev_page = Some(page.clone());
            return finished;
        }
        tables.sort_by(|a, b| a.bbox.top.total_cmp(&b.bbox.top));

        if let Some(mut chain) = self.pending.take() {
            let joined = self.prev_page.as_ref().is_some_and(|prev_page| {
                let decision = judge(chain.tail(), &tables[0], prev_page, page, &self.params);
                debug!(
                    prev_page = prev_page.number,
                    next_page = page.number,
                    ?decision,
                    "cross-page decision"
                );
                decision.accepts(&self.params)
            });
            if joined {
                chain.push(tables.remove(0));
                if tables.is_empty() {
                    self.pending = Some(chain);
                } else {
                    finished.push(self.close(chain));
                }
            } else {
                finished.push(self.close(chain));
            }
        }

        if let Some(last) = tables.pop() {
            finished.extend(tables);
            self.pending = Some(TableChain::new(last));
        }
        self.prev_page = Some(page.clone());
        finished
    }

    /// Close the pending chain, if any.
    pub fn finish(&mut self) -> Option<Table> {
        self.pending.take().map(|chain| self.close(chain))
    }

    fn close(&self, chain: TableChain) -> Table {
        if chain.len() > 1 {
            debug!(pages = ?chain.page_range(), fragments = chain.len(), "closing cross-page chain");
        }
        let mut table = chain.align(self.scorer, &self.params);
        table.need_combine = false;
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{BBox, TextChunk};

    fn page(number: usize) -> PageContext {
        PageContext {
            text_bounds: BBox::new(50.0, 50.0, 550.0, 750.0),
            chunks: vec![TextChunk::new(BBox::new(300.0, 20.0, 340.0, 30.0), "年度报告")],
            ..PageContext::new(number, 600.0, 800.0)
        }
    }

    fn table(page: usize, top: f64, rows: &[Vec<&str>]) -> Table {
        let bottom = top + 20.0 * rows.len() as f64;
        Table::from_text_rows(page, BBox::new(50.0, top, 550.0, bottom), rows)
    }

    #[test]
    fn test_sole_table_waits_for_next_page() {
        let mut combiner = CrossPageCombiner::new(CombineParams::default());
        let out = combiner.push_page(&page(1), vec![table(1, 600.0, &[vec!["项目", "2016"], vec!["A", "10"]])]);
        assert!(out.is_empty());
        assert!(combiner.has_pending());
        let last = combiner.finish().unwrap();
        assert_eq!(last.row_count(), 2);
        assert!(!combiner.has_pending());
    }

    #[test]
    fn test_earlier_tables_on_a_page_are_final() {
        let mut combiner = CrossPageCombiner::new(CombineParams::default());
        let mut second = table(1, 400.0, &[vec!["B", "20"]]);
        second.index = 1;
        let first = table(1, 100.0, &[vec!["A", "10"]]);
        let out = combiner.push_page(&page(1), vec![second, first]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].bbox.top, 100.0);
        assert!(combiner.has_pending());
    }

    #[test]
    fn test_continuation_is_merged() {
        let mut combiner = CrossPageCombiner::new(CombineParams::default());
        let prev = table(1, 660.0, &[vec!["项目", "2016"], vec!["A", "10"], vec!["B", "20"]]);
        let next = table(2, 60.0, &[vec!["项目", "2016"], vec!["C", "30"]]);
        assert!(combiner.push_page(&page(1), vec![prev]).is_empty());
        assert!(combiner.push_page(&page(2), vec![next]).is_empty());
        let out = combiner.push_page(&page(3), Vec::new());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].row_count(), 4);
        assert_eq!(out[0].end_page_number, 2);
        assert!(combiner.finish().is_none());
    }

    #[test]
    fn test_rejected_continuation_closes_chain() {
        let mut combiner = CrossPageCombiner::new(CombineParams::default());
        let prev = table(1, 660.0, &[vec!["项目", "2016"], vec!["A", "10"]]);
        let mut next = table(2, 60.0, &[vec!["项目", "2016"], vec!["C", "30"]]);
        next.title = Some("资产负债表（续）".to_string());
        combiner.push_page(&page(1), vec![prev]);
        let out = combiner.push_page(&page(2), vec![next]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].page_number, 1);
        assert_eq!(combiner.finish().map(|t| t.page_number), Some(2));
    }
}
