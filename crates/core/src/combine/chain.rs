//! An ordered group of table fragments that form one logical table.

use tracing::debug;

use crate::params::CombineParams;
use crate::table::{Table, TableType};

use super::merge::ruling_table_combine;
use super::split::SplitCellScorer;

/// Fragments of one logical table, head first, one per consecutive page.
#[derive(Clone, Debug)]
pub struct TableChain {
    fragments: Vec<Table>,
}

impl TableChain {
    pub fn new(head: Table) -> Self {
        Self {
            fragments: vec![head],
        }
    }

    /// Link `next` behind the current tail.
    pub fn push(&mut self, mut next: Table) {
        next.need_combine = true;
        if let Some(tail) = self.fragments.last_mut() {
            tail.need_combine = true;
        }
        self.fragments.push(next);
    }

    pub fn head(&self) -> &Table {
        &self.fragments[0]
    }

    pub fn tail(&self) -> &Table {
        &self.fragments[self.fragments.len() - 1]
    }

    pub fn get(&self, index: usize) -> Option<&Table> {
        self.fragments.get(index)
    }

    /// Fragment before `index`.
    pub fn prev(&self, index: usize) -> Option<&Table> {
        index.checked_sub(1).and_then(|i| self.fragments.get(i))
    }

    /// Fragment after `index`.
    pub fn next(&self, index: usize) -> Option<&Table> {
        self.fragments.get(index + 1)
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// First and last page covered by the fragments.
    pub fn page_range(&self) -> (usize, usize) {
        (self.head().page_number, self.tail().page_number)
    }

    /// Collapse the chain into its head table.
    ///
    /// Every ruled fragment is merged into the head, which then covers one
    /// more page per fragment. All fragments after the head end up in its
    /// `merged_fragments`, unruled ones without being merged.
    pub fn align(self, scorer: Option<&dyn SplitCellScorer>, params: &CombineParams) -> Table {
        let mut fragments = self.fragments.into_iter();
        let Some(mut head) = fragments.next() else {
            return Table::default();
        };
        for next in fragments {
            if head.table_type == TableType::Ruled {
                ruling_table_combine(&mut head, &next, scorer, params);
                head.end_page_number += 1;
            }
            head.merged_fragments.push(next);
        }
        debug!(
            page = head.page_number,
            end_page = head.end_page_number,
            rows = head.row_count(),
            fragments = head.merged_fragments.len(),
            "aligned cross-page table"
        );
        head
    }
}
