//! Detection of body text in the gap between two table fragments.
//!
//! The gap is the text region below the previous table plus the region
//! above the next one. Lines that repeat at the same place on the other
//! page are running headers or footers and do not count.

use crate::page::{PageContext, TextLine};
use crate::params::CombineParams;
use crate::table::{BBox, Table};

use super::patterns::{has_numeric_section_prefix, is_comment, is_page_footer, is_unit_statement};
use super::similarity::edit_similarity;

fn concat(lines: &[TextLine]) -> String {
    lines.iter().map(|l| l.text.as_str()).collect()
}

/// Whether `lines` are body text rather than furniture repeated on
/// `other_page` or pagination.
fn is_body_text(area: &BBox, other_page: &PageContext, lines: &[TextLine], params: &CombineParams) -> bool {
    // An empty gap is never body text, whatever the other page holds there.
    if lines.is_empty() {
        return false;
    }
    let other = other_page.lines_in(area);
    if other.is_empty() {
        return true;
    }
    if edit_similarity(&concat(lines), &concat(&other)) >= params.repeated_text_similarity {
        return false;
    }
    !lines.iter().all(|l| l.is_pagination)
}

/// Whether body text sits between `prev` (ending its page) and `next`
/// (opening the following page).
pub fn has_body_text(
    prev: &Table,
    next: &Table,
    prev_page: &PageContext,
    next_page: &PageContext,
    params: &CombineParams,
) -> bool {
    let prev_region = prev_page.text_bounds;
    let next_region = next_page.text_bounds;
    let below_prev = BBox::new(prev_region.x0, prev.bbox.bottom + 1.0, prev_region.x1, prev_region.bottom);
    let above_next = BBox::new(next_region.x0, next_region.top, next_region.x1, next.bbox.top - 1.0);

    let mut next_lines = if next.bbox.top < next_region.top {
        Vec::new()
    } else {
        next_page.lines_in(&above_next)
    };
    if next_lines
        .first()
        .is_some_and(|l| is_unit_statement(&l.text) && !has_numeric_section_prefix(&l.text))
    {
        next_lines.remove(0);
    }
    if is_body_text(&above_next, prev_page, &next_lines, params) {
        return true;
    }

    let mut prev_lines = prev_page.lines_in(&below_prev);
    if prev_lines.last().is_some_and(|l| {
        let text = l.text.trim();
        is_page_footer(text) || is_comment(text)
    }) {
        prev_lines.pop();
    }
    is_body_text(&below_prev, next_page, &prev_lines, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::TextChunk;

    fn page(number: usize, chunks: Vec<TextChunk>) -> PageContext {
        PageContext {
            text_bounds: BBox::new(50.0, 50.0, 550.0, 750.0),
            chunks,
            ..PageContext::new(number, 600.0, 800.0)
        }
    }

    fn chunk(y: f64, text: &str) -> TextChunk {
        TextChunk::new(BBox::new(60.0, y, 200.0, y + 10.0), text)
    }

    fn header(y: f64, text: &str) -> TextChunk {
        TextChunk {
            is_page_header: true,
            ..chunk(y, text)
        }
    }

    fn tables() -> (Table, Table) {
        let prev = Table::from_text_rows(1, BBox::new(50.0, 600.0, 550.0, 700.0), &[vec!["A", "1"]]);
        let next = Table::from_text_rows(2, BBox::new(50.0, 100.0, 550.0, 160.0), &[vec!["B", "2"]]);
        (prev, next)
    }

    #[test]
    fn test_empty_gap() {
        let (prev, next) = tables();
        let params = CombineParams::default();
        assert!(!has_body_text(&prev, &next, &page(1, vec![]), &page(2, vec![]), &params));
    }

    #[test]
    fn test_paragraph_above_next_table() {
        let (prev, next) = tables();
        let next_page = page(2, vec![chunk(70.0, "以下为本公司主要子公司情况")]);
        assert!(has_body_text(&prev, &next, &page(1, vec![]), &next_page, &CombineParams::default()));
    }

    #[test]
    fn test_running_header_is_ignored() {
        let (prev, next) = tables();
        let prev_page = page(1, vec![header(70.0, "某某股份有限公司2016年年度报告")]);
        let next_page = page(2, vec![header(70.0, "某某股份有限公司2016年年度报告")]);
        assert!(!has_body_text(&prev, &next, &prev_page, &next_page, &CombineParams::default()));
    }

    #[test]
    fn test_unit_statement_and_footer_are_ignored() {
        let (prev, next) = tables();
        let prev_page = page(1, vec![chunk(730.0, "12")]);
        let next_page = page(2, vec![chunk(70.0, "单位：元")]);
        assert!(!has_body_text(&prev, &next, &prev_page, &next_page, &CombineParams::default()));
    }

    #[test]
    fn test_text_after_previous_table() {
        let (prev, next) = tables();
        let prev_page = page(1, vec![chunk(715.0, "注释说明如下"), chunk(730.0, "12")]);
        assert!(has_body_text(&prev, &next, &prev_page, &page(2, vec![]), &CombineParams::default()));
    }
}
