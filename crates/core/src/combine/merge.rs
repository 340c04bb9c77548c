//! Appending a ruled fragment to the table it continues.

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::params::CombineParams;
use crate::table::{BBox, Cell, CellId, CellMatrix, Table};
use crate::utils::feq_eps;

use super::split::{SplitCellScorer, is_split_row};

/// Number of leading rows of `next` that repeat the header of `prev`.
pub fn repeated_header_rows(prev: &Table, next: &Table) -> usize {
    let mut rows = 0;
    for i in 0..prev.row_count().min(next.row_count()) {
        let text = prev.row_text(i);
        if text.is_empty() || text != next.row_text(i) {
            break;
        }
        rows += 1;
    }
    rows
}

fn distinct(ids: Vec<CellId>) -> Vec<CellId> {
    let mut seen = FxHashSet::default();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

/// Join the text of `next`'s row `first_row` onto `prev`'s last row, cell
/// by cell, and mark the joined cells as spanning the page break.
pub fn join_split_row(prev: &mut Table, next: &Table, first_row: usize) {
    let Some(last_row) = prev.row_count().checked_sub(1) else {
        return;
    };
    let mut last = prev.row_ids(last_row);
    let mut first = next.row_ids(first_row);
    if last.len() != first.len() {
        last = distinct(last);
        first = distinct(first);
        last.sort_by_key(|id| prev.cell_by_id(*id).col());
        first.sort_by_key(|id| next.cell_by_id(*id).col());
    }
    let mut joined = FxHashSet::default();
    for (upper, lower) in last.into_iter().zip(first) {
        if !joined.insert((upper, lower)) {
            continue;
        }
        let text = format!("{}{}", prev.cell_by_id(upper).text(), next.cell_by_id(lower).text());
        let cell = prev.cell_by_id_mut(upper);
        cell.mark_cross_page_cell();
        cell.set_text(text);
    }
}

/// Column boundaries from the distinct left edges plus the table's right
/// edge; boundaries closer than `tolerance` collapse.
fn column_bounds(table: &Table, tolerance: f64) -> Vec<BBox> {
    let mut edges: Vec<f64> = table.cells().iter().map(|c| c.bbox.x0).collect();
    edges.push(table.bbox.x1);
    edges.sort_by(f64::total_cmp);
    edges.dedup();
    edges
        .windows(2)
        .filter(|w| !feq_eps(w[1], w[0], tolerance))
        .map(|w| BBox::new(w[0], table.bbox.top, w[1], table.bbox.bottom))
        .collect()
}

/// Re-derive every cell's column and column span from its horizontal
/// extent, for tables whose fragments had different column counts.
fn realign_columns(table: &mut Table, params: &CombineParams) {
    let columns = column_bounds(table, params.column_merge_tolerance);
    let mut matrix = CellMatrix::new(table.row_count(), columns.len());
    let overlap = params.column_overlap_epsilon;

    for id in table.cell_ids() {
        let cell = table.cell_by_id(id);
        if cell.is_dirty() {
            matrix.next_col();
            continue;
        }
        if matrix.row() != Some(cell.row()) {
            matrix.next_row();
        }
        let mut col_span = 0;
        for column in &columns {
            if cell.bbox.horizontal_overlap(column) > overlap {
                col_span += 1;
            } else if column.x1 > cell.bbox.x0 + overlap {
                break;
            }
        }
        let col_span = col_span.max(1);
        let row_span = cell.row_span();
        let col = matrix.col();

        let cell = table.cell_by_id_mut(id);
        cell.set_col(col);
        cell.set_col_span(col_span);
        matrix.put_cell(row_span, col_span);
    }
}

/// Append the ruled fragment `next` to `prev`.
///
/// Repeated header rows are dropped, a row split across the break is joined
/// into `prev`'s last row, and the remaining rows are appended. When the
/// column counts differ, columns are rebuilt from the cell geometry.
pub fn ruling_table_combine(prev: &mut Table, next: &Table, scorer: Option<&dyn SplitCellScorer>, params: &CombineParams) {
    let mut start = repeated_header_rows(prev, next);
    let Some(last_row) = prev.row_count().checked_sub(1) else {
        return;
    };

    let split = {
        let last = prev.row(last_row);
        let first = next.row(start);
        if prev.column_count() == next.column_count() {
            is_split_row(&last, &first, scorer, params)
        } else {
            let mut last = dedup_cells(last);
            let mut first = dedup_cells(first);
            last.sort_by_key(|c| c.col());
            first.sort_by_key(|c| c.col());
            last.len() == first.len() && is_split_row(&last, &first, scorer, params)
        }
    };
    if split {
        debug!(page = next.page_number, "joining row split across the page break");
        join_split_row(prev, next, start);
        start += 1;
    }

    let realign = prev.column_count() != next.column_count();
    prev.add_table(next, start);
    if realign {
        realign_columns(prev, params);
    }
    prev.update_cells();
}

fn dedup_cells(cells: Vec<&Cell>) -> Vec<&Cell> {
    let mut unique: Vec<&Cell> = Vec::with_capacity(cells.len());
    for cell in cells {
        if !unique.iter().any(|c| std::ptr::eq(*c, cell)) {
            unique.push(cell);
        }
    }
    unique
}
