//! Gating checks and scoring rules for combining two table fragments.
//!
//! Vetoes reject a pair outright. Rules that hold multiply a running score
//! by their factor, in a fixed order; the pair combines when one minus the
//! final score reaches the threshold.

use thiserror::Error;

use crate::page::PageContext;
use crate::params::CombineParams;
use crate::table::{Cell, Table, TableType};
use crate::utils::feq_eps;

use super::patterns::{is_continued_title, is_number, is_table_title};
use super::similarity::edit_similarity;

/// Reason a pair of tables may not be combined.
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CombineVeto {
    #[error("page is not Chinese")]
    NotChinese,
    #[error("page heights differ")]
    PageHeightMismatch,
    #[error("tables are on the same page")]
    SamePage,
    #[error("pages are not adjacent")]
    NotAdjacentPages,
    #[error("previous table is not on the previous page")]
    PrevPageMismatch,
    #[error("next table is not first on its page")]
    NotFirstOnPage,
    #[error("table types differ")]
    TableTypeMismatch,
    #[error("tables without rulings are never combined")]
    Unruled,
    #[error("next table has a continuation title")]
    ContinuedTitle,
    #[error("next table opens with a title row")]
    TitleRow,
    #[error("tables lie outside the text region")]
    OutsideTextRegion,
}

/// First veto that applies to the pair, if any.
pub fn check_vetoes(
    prev: &Table,
    next: &Table,
    prev_page: &PageContext,
    next_page: &PageContext,
    params: &CombineParams,
) -> Option<CombineVeto> {
    if !next_page.is_chinese() {
        return Some(CombineVeto::NotChinese);
    }
    if prev_page.height != next_page.height {
        return Some(CombineVeto::PageHeightMismatch);
    }
    if prev.page_number == next.page_number {
        return Some(CombineVeto::SamePage);
    }
    if next.page_number != prev.page_number + 1 {
        return Some(CombineVeto::NotAdjacentPages);
    }
    if prev.page_number != prev_page.number {
        return Some(CombineVeto::PrevPageMismatch);
    }
    if next.index != 0 {
        return Some(CombineVeto::NotFirstOnPage);
    }
    if prev.table_type != next.table_type {
        return Some(CombineVeto::TableTypeMismatch);
    }
    if prev.table_type == TableType::Unruled {
        return Some(CombineVeto::Unruled);
    }
    if next.title.as_deref().is_some_and(is_continued_title) {
        return Some(CombineVeto::ContinuedTitle);
    }
    if is_title_row(next) {
        return Some(CombineVeto::TitleRow);
    }

    let prev_region = prev_page.text_bounds;
    let next_region = next_page.text_bounds;
    let next_starts_low = next_region.top + next_region.height() * params.region_top_ratio
        < next.bbox.top
        && next_region.height() > params.region_min_height;
    let prev_ends_high = prev_region.bottom * params.region_bottom_ratio > prev.bbox.bottom
        || prev_page.bottom() * params.page_bottom_ratio > prev.bbox.bottom;
    if next_starts_low || prev_ends_high {
        return Some(CombineVeto::OutsideTextRegion);
    }
    None
}

/// A first row made of one cell whose text reads like a table title.
fn is_title_row(table: &Table) -> bool {
    let ids = table.row_ids(0);
    let single = ids.first().is_some_and(|first| ids.iter().all(|id| id == first));
    if !single {
        return false;
    }
    let text = table.row_text(0);
    is_table_title(&text) || is_continued_title(&text)
}

fn is_digit_like(cell: &Cell) -> bool {
    let text = cell.text();
    text.is_empty() || is_number(&text)
}

/// Whether two rows have numbers in the same columns.
pub fn same_digit_structure(upper: &[&Cell], lower: &[&Cell]) -> bool {
    upper
        .iter()
        .zip(lower)
        .all(|(a, b)| is_digit_like(a) == is_digit_like(b))
}

/// Everything the scoring rules look at.
pub struct RuleInput<'a> {
    pub prev: &'a Table,
    pub next: &'a Table,
    /// Body text was found between the two tables.
    pub body_text: bool,
    pub params: &'a CombineParams,
}

/// A named scoring rule.
pub struct CombineRule {
    pub name: &'static str,
    pub factor: fn(&CombineParams) -> f64,
    pub applies: fn(&RuleInput<'_>) -> bool,
}

fn single_row(input: &RuleInput<'_>) -> bool {
    input.prev.is_single_row() || input.next.is_single_row()
}

fn same_column_count(input: &RuleInput<'_>) -> bool {
    input.prev.column_count() == input.next.column_count()
}

fn same_width(input: &RuleInput<'_>) -> bool {
    let (a, b) = (input.prev.bbox.width(), input.next.bbox.width());
    feq_eps(a, b, (a + b) * 0.5 * input.params.width_tolerance_ratio)
}

fn line_structure(input: &RuleInput<'_>) -> bool {
    let last = input.prev.row(input.prev.row_count().saturating_sub(1));
    let first = input.next.row(0);
    if last.len() == first.len() {
        return same_digit_structure(&last, &first);
    }
    first.first().is_some_and(|cell| {
        !feq_eps(
            cell.bbox.x0,
            input.next.bbox.x0,
            input.params.left_edge_tolerance,
        )
    })
}

fn same_header(input: &RuleInput<'_>) -> bool {
    let (prev, next) = (input.prev, input.next);
    let (prev_cols, next_cols) = (prev.column_count(), next.column_count());
    let mut prev_header = String::new();
    let mut next_header = String::new();
    for i in 0..prev.row_count().min(next.row_count()) {
        if prev.row(i).len() == prev_cols || next.row(i).len() == next_cols {
            if i == 0 {
                prev_header = prev.row_text(0);
                next_header = next.row_text(0);
            }
            break;
        }
        prev_header.push_str(&prev.row_text(i));
        next_header.push_str(&next.row_text(i));
    }
    edit_similarity(&prev_header, &next_header) > input.params.header_similarity
}

fn next_has_header(input: &RuleInput<'_>) -> bool {
    let first = input.next.row(0);
    let second = input.next.row(1);
    first.len() == input.next.column_count()
        && first.len() == second.len()
        && same_digit_structure(&first, &second)
}

fn no_body_text(input: &RuleInput<'_>) -> bool {
    !input.body_text
}

/// Scoring rules in evaluation order.
pub const RULES: &[CombineRule] = &[
    CombineRule {
        name: "single_row",
        factor: |p| p.single_row_penalty,
        applies: single_row,
    },
    CombineRule {
        name: "same_column_count",
        factor: |p| p.column_count_penalty,
        applies: same_column_count,
    },
    CombineRule {
        name: "same_width",
        factor: |p| p.width_penalty,
        applies: same_width,
    },
    CombineRule {
        name: "line_structure",
        factor: |p| p.line_structure_penalty,
        applies: line_structure,
    },
    CombineRule {
        name: "same_header",
        factor: |p| p.same_head_penalty,
        applies: same_header,
    },
    CombineRule {
        name: "next_has_header",
        factor: |p| p.exist_head_penalty,
        applies: next_has_header,
    },
    CombineRule {
        name: "no_body_text",
        factor: |p| p.no_text_penalty,
        applies: no_body_text,
    },
];

/// Result of running the scoring rules.
#[derive(Clone, Debug, PartialEq)]
pub struct CombineScore {
    pub score: f64,
    /// Names of the rules that held.
    pub applied: Vec<&'static str>,
}

impl CombineScore {
    pub fn confidence(&self) -> f64 {
        1.0 - self.score
    }

    pub fn passes(&self, threshold: f64) -> bool {
        self.confidence() >= threshold
    }
}

pub fn score(input: &RuleInput<'_>) -> CombineScore {
    let mut result = CombineScore {
        score: 1.0,
        applied: Vec::new(),
    };
    for rule in RULES {
        if (rule.applies)(input) {
            result.score *= (rule.factor)(input.params);
            result.applied.push(rule.name);
        }
    }
    result
}
