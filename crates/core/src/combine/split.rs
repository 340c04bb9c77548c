//! Detection of a cell split across the page break.
//!
//! When the last row of the previous fragment and the first row of the next
//! one are two halves of the same row, their texts are joined instead of
//! appending a new row.

use crate::params::CombineParams;
use crate::table::Cell;

use super::patterns::{has_numeric_section_prefix, is_index, is_no_merge_header, is_number, punctuations};

/// Scores (upper text, lower text) pairs for being one sentence split in two.
///
/// Returns one `(confidence, label)` per pair; a positive label means the
/// pair belongs together.
pub trait SplitCellScorer: Send + Sync {
    fn score(&self, pairs: &[(String, String)]) -> Vec<(f32, i64)>;
}

const OPENING_BRACKETS: &str = "<《“【[(（";
const CLOSING_BRACKETS: &str = ">》”】])）";
const SENTENCE_ENDS: &str = "。？?！!";
const LINKING: &str = "，,、/";
const EXPLAINING: &str = ":：";

fn single_char(text: &str) -> bool {
    text.chars().count() == 1
}

/// Whether `last` (upper) and `first` (lower) are the two halves of one row.
///
/// Both rows must have the same number of cells.
pub fn is_split_row(
    last: &[&Cell],
    first: &[&Cell],
    scorer: Option<&dyn SplitCellScorer>,
    params: &CombineParams,
) -> bool {
    if last.len() != first.len() || first.is_empty() {
        return false;
    }
    let last_texts: Vec<String> = last.iter().map(|c| c.text()).collect();
    let first_texts: Vec<String> = first.iter().map(|c| c.text()).collect();
    let text_cells = first_texts.iter().filter(|t| !t.is_empty()).count();

    for (i, (upper, lower)) in last_texts.iter().zip(&first_texts).enumerate() {
        if i == 0 && has_numeric_section_prefix(lower) && has_numeric_section_prefix(upper) {
            return false;
        }
        if i == 0 && (is_index(lower) || is_no_merge_header(upper)) {
            return false;
        }
        if is_number(upper) && is_number(lower) {
            return false;
        }
        if !lower.is_empty() && upper.is_empty() {
            return false;
        }
        if lower == upper && !lower.is_empty() {
            return false;
        }
    }

    if (text_cells as f64) < first.len() as f64 / 2.0 {
        if !last_texts[0].is_empty() && has_numeric_section_prefix(&first_texts[0]) {
            return false;
        }
        if first_texts[0].is_empty() {
            return true;
        }
        if single_char(&first_texts[0]) {
            return true;
        }
        return punctuation_feature(last, first, text_cells, scorer, params);
    }

    if first.len() == 2
        && first_texts[0].is_empty()
        && has_numeric_section_prefix(&first_texts[1])
        && has_numeric_section_prefix(&last_texts[1])
    {
        return true;
    }
    punctuation_feature(last, first, text_cells, scorer, params)
}

/// Punctuation at the seam: an upper cell ending on an opening bracket or a
/// comma, or a lower cell opening with a closing bracket, marks a split.
pub fn punctuation_feature(
    last: &[&Cell],
    first: &[&Cell],
    text_cells: usize,
    scorer: Option<&dyn SplitCellScorer>,
    params: &CombineParams,
) -> bool {
    for (i, (upper_cell, lower_cell)) in last.iter().zip(first).enumerate() {
        let upper = upper_cell.text();
        let lower = lower_cell.text();

        if let Some(mark) = punctuations(&upper).chars().next_back() {
            let tail = upper
                .rfind(mark)
                .map_or("", |pos| &upper[pos + mark.len_utf8()..]);
            if tail.is_empty() {
                if OPENING_BRACKETS.contains(mark) || LINKING.contains(mark) {
                    return true;
                }
            } else if single_char(tail) && !is_index(tail) && !EXPLAINING.contains(mark) {
                return true;
            }
        }

        if let Some(mark) = punctuations(&lower).chars().next() {
            let head = lower.find(mark).map_or("", |pos| &lower[..pos]);
            if head.is_empty() {
                if OPENING_BRACKETS.contains(mark) || SENTENCE_ENDS.contains(mark) {
                    return true;
                }
            } else if (single_char(head) && !is_index(head) && !EXPLAINING.contains(mark))
                || CLOSING_BRACKETS.contains(mark)
            {
                return true;
            }
        }

        if i == 0 && lower_cell.row_span() != 1 && !lower.is_empty() {
            return false;
        }
    }

    match scorer {
        Some(scorer) => semantic_feature(last, first, text_cells, scorer, params),
        None => false,
    }
}

/// Asks the scorer about every non-empty pair; enough confident positives
/// mark a split.
pub fn semantic_feature(
    last: &[&Cell],
    first: &[&Cell],
    text_cells: usize,
    scorer: &dyn SplitCellScorer,
    params: &CombineParams,
) -> bool {
    let pairs: Vec<(String, String)> = last
        .iter()
        .zip(first)
        .map(|(upper, lower)| (upper.text(), lower.text()))
        .filter(|(upper, lower)| !(upper.is_empty() && lower.is_empty()))
        .collect();
    let confirmed = scorer
        .score(&pairs)
        .into_iter()
        .filter(|(confidence, label)| f64::from(*confidence) > params.semantic_confidence && *label > 0)
        .count();
    confirmed as f64 > text_cells as f64 * params.semantic_ratio
}
