//! Tables: a cell grid plus page placement and cross-page metadata.

use crate::error::{Result, TableError};

use super::cell::Cell;
use super::container::CellContainer;
use super::types::{BBox, CellId, CrossPageRow, TableType, TextChunk};

/// A reconstructed table.
///
/// Cells are reached by (row, col); every slot covered by a merged cell
/// resolves to the same [`Cell`].
#[derive(Clone, Debug, Default)]
pub struct Table {
    pub bbox: BBox,
    container: CellContainer,
    /// Page the table starts on.
    pub page_number: usize,
    /// Last page the table covers once fragments are merged into it.
    pub end_page_number: usize,
    /// Position among the tables of its page, in reading order.
    pub index: usize,
    pub table_type: TableType,
    pub title: Option<String>,
    pub confidence: f64,
    /// Set once the table is known to continue on a later page.
    pub need_combine: bool,
    /// Bounds before rows from a later page were appended.
    pub original_bounds: Option<BBox>,
    /// Fragments from later pages folded into this table, kept as they were
    /// extracted. They are not emitted on their own but stay available for
    /// overlap checks against other page content.
    pub merged_fragments: Vec<Table>,
    has_text: bool,
}

impl Table {
    pub fn new(page_number: usize, bbox: BBox) -> Self {
        Self {
            bbox,
            page_number,
            end_page_number: page_number,
            confidence: 1.0,
            ..Default::default()
        }
    }

    /// Build a table of equally sized cells from rows of text.
    pub fn from_text_rows(page_number: usize, bbox: BBox, rows: &[Vec<&str>]) -> Self {
        let mut table = Self::new(page_number, bbox);
        let n_rows = rows.len().max(1) as f64;
        let n_cols = rows.iter().map(Vec::len).max().unwrap_or(1).max(1) as f64;
        let (w, h) = (bbox.width() / n_cols, bbox.height() / n_rows);
        for (i, row) in rows.iter().enumerate() {
            for (j, text) in row.iter().enumerate() {
                let x = bbox.x0 + j as f64 * w;
                let y = bbox.top + i as f64 * h;
                let cell = Cell::with_text(BBox::new(x, y, x + w, y + h), *text);
                table.add(cell, i, j);
            }
        }
        table
    }

    pub fn row_count(&self) -> usize {
        self.container.row_count()
    }

    pub fn column_count(&self) -> usize {
        self.container.column_count()
    }

    pub fn is_empty(&self) -> bool {
        self.container.is_empty()
    }

    pub fn has_text(&self) -> bool {
        self.has_text
    }

    pub fn is_single_row(&self) -> bool {
        self.row_count() == 1
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.container.get(row, col)
    }

    pub fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut Cell> {
        self.container.get_mut(row, col)
    }

    pub fn cell_id(&self, row: usize, col: usize) -> Option<CellId> {
        self.container.id_at(row, col)
    }

    pub fn cell_by_id(&self, id: CellId) -> &Cell {
        self.container.cell(id)
    }

    pub fn cell_by_id_mut(&mut self, id: CellId) -> &mut Cell {
        self.container.cell_mut(id)
    }

    /// Slot values of a row; a merged cell appears once per covered slot.
    pub fn row(&self, row: usize) -> Vec<&Cell> {
        self.container.row_cells(row)
    }

    pub fn row_ids(&self, row: usize) -> Vec<CellId> {
        self.container.row(row)
    }

    /// Distinct cells in row-major order.
    pub fn cells(&self) -> Vec<&Cell> {
        self.container.cells()
    }

    pub fn cell_ids(&self) -> Vec<CellId> {
        self.container.distinct_ids()
    }

    /// Text of a row; a slot repeating its left neighbour's text is skipped,
    /// so a merged cell counts once.
    pub fn row_text(&self, row: usize) -> String {
        let mut text = String::new();
        let mut previous = String::new();
        for cell in self.row(row) {
            let cell_text = cell.text();
            if cell_text != previous {
                text.push_str(&cell_text);
                previous = cell_text;
            }
        }
        text
    }

    /// Text at every slot, with merge markers on covered slots.
    pub fn text_grid(&self) -> Vec<Vec<String>> {
        (0..self.row_count())
            .map(|i| {
                (0..self.column_count())
                    .map(|j| {
                        self.cell(i, j)
                            .and_then(|c| c.text_at(i, j))
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .collect()
    }

    /// Place a cell at (row, col) and grow the table bounds around it.
    pub fn add(&mut self, mut cell: Cell, row: usize, col: usize) -> CellId {
        if !cell.bbox.is_empty() {
            self.bbox = if self.bbox.is_empty() {
                cell.bbox
            } else {
                self.bbox.union(&cell.bbox)
            };
        }
        cell.assign_position(row, col);
        self.has_text |= cell.has_text();
        let id = self.container.put(row, col, cell);
        self.container.cell_mut(id).set_clean();
        id
    }

    pub fn add_chunk(&mut self, id: CellId, chunk: TextChunk) {
        self.has_text |= !chunk.text.trim().is_empty();
        self.container.cell_mut(id).add_chunk(chunk);
    }

    /// Fill all slots covered by a cell's span.
    pub fn add_merged_cell(&mut self, id: CellId) {
        self.container.add_merged_cell(id);
        self.container.cell_mut(id).set_clean();
    }

    pub fn fill_merged_cell(&mut self, id: CellId, row: usize, col: usize) {
        self.container.put_id(row, col, id);
    }

    /// Extend a cell one column to the right onto (row, col).
    pub fn add_right_merged_cell(&mut self, id: CellId, row: usize, col: usize) {
        self.container.cell_mut(id).increase_col_span();
        self.fill_merged_cell(id, row, col);
        self.container.cell_mut(id).set_clean();
    }

    /// Extend a cell one row down onto (row, col).
    pub fn add_down_merged_cell(&mut self, id: CellId, row: usize, col: usize) {
        self.container.cell_mut(id).increase_row_span();
        self.fill_merged_cell(id, row, col);
        self.container.cell_mut(id).set_clean();
    }

    /// Rebuild the grid from the cells' current positions and spans.
    pub fn update_cells(&mut self) {
        self.container.rebuild();
    }

    /// Append the rows of `other` from `start_row` on below this table.
    ///
    /// Empty cells of the first appended row are folded into the cell above
    /// them. Appended cells keep their heights and are stacked from the
    /// current bottom. The boundary rows are tagged with their cross-page
    /// markers. Call [`Table::update_cells`] afterwards to fill spans.
    pub fn add_table(&mut self, other: &Table, start_row: usize) {
        self.original_bounds = Some(self.bbox);
        let base_row = self.row_count();
        let mut bottom = self.bbox.bottom;
        let mut idx = 0;
        let mut prev_row_col = 0;
        let mut merge_col = 0;
        let mut up_merge = true;

        for i in start_row..other.row_count() {
            let mut row_height: Option<f64> = None;
            let mut fallback_height: Option<f64> = None;
            for j in 0..other.column_count() {
                let Some(source) = other.cell(i, j) else {
                    continue;
                };
                let mut cell = source.clone();
                let above_row = (base_row + idx).checked_sub(1);
                let height = cell.bbox.height();
                let per_row = height / cell.row_span().max(1) as f64;
                let folds_up = up_merge && i == start_row && cell.text().is_empty();

                if !cell.is_pivot(i, j) {
                    if folds_up
                        && let Some(above_id) = above_row.and_then(|r| self.container.id_at(r, j))
                    {
                        let above = self.container.cell_mut(above_id);
                        let span = above.row_span() + cell.row_span() - 1;
                        above.set_row_span(span);
                        above.mark_cross_page_cell();
                        merge_col += above.col_span();
                        self.add_merged_cell(above_id);
                    }
                    up_merge = false;
                    continue;
                }

                if folds_up
                    && let Some(prev_id) =
                        above_row.and_then(|r| self.container.id_at(r, prev_row_col))
                {
                    let prev = self.container.cell_mut(prev_id);
                    if prev.col_span() > 1 {
                        prev_row_col += prev.col_span();
                        merge_col += prev.col_span();
                    } else {
                        prev_row_col += 1;
                    }
                    let span = prev.row_span() + cell.row_span();
                    prev.set_row_span(span);
                    prev.mark_cross_page_cell();
                    prev.bbox.bottom = bottom + height;
                    self.add_merged_cell(prev_id);
                    fallback_height =
                        Some(fallback_height.map_or(per_row, |h: f64| h.min(per_row)));
                    continue;
                }

                up_merge = false;
                cell.set_row(base_row + idx);
                cell.set_col(j);
                fallback_height = Some(fallback_height.map_or(per_row, |h: f64| h.min(per_row)));
                if cell.row_span() == 1 {
                    row_height = Some(row_height.map_or(height, |h: f64| h.min(height)));
                }
                cell.bbox.top = bottom;
                cell.bbox.bottom = bottom + height;
                let col = if i == start_row { j + merge_col } else { j };
                self.add(cell, base_row + idx, col);
            }
            bottom += row_height.or(fallback_height).unwrap_or(0.0);
            idx += 1;
        }

        if let Some(last) = base_row.checked_sub(1) {
            for id in self.container.row(last) {
                self.container
                    .cell_mut(id)
                    .set_cross_page_row(CrossPageRow::LastRow);
            }
        }
        for id in self.container.row(base_row) {
            self.container
                .cell_mut(id)
                .set_cross_page_row(CrossPageRow::FirstRow);
        }
    }

    /// A copy rotated by 90 (clockwise) or -90/270 (counter-clockwise)
    /// degrees. Spans are replayed as right and down merges.
    pub fn rotate(&self, degrees: i32) -> Result<Table> {
        let clockwise = match degrees {
            90 | -270 => true,
            -90 | 270 => false,
            other => return Err(TableError::UnsupportedRotation(other)),
        };
        let rows = self.row_count();
        let cols = self.column_count();

        let mut rotated = Table {
            container: CellContainer::new(),
            has_text: false,
            ..self.clone()
        };
        for cell in self.cells() {
            let (r, c, rs, cs) = (cell.row(), cell.col(), cell.row_span(), cell.col_span());
            let (nr, nc) = if clockwise {
                (c, rows.saturating_sub(r + rs))
            } else {
                (cols.saturating_sub(c + cs), r)
            };
            let (new_rs, new_cs) = (cs, rs);

            let mut copy = cell.clone();
            copy.set_row_span(1);
            copy.set_col_span(1);
            let id = rotated.add(copy, nr, nc);
            for k in 1..new_cs {
                rotated.add_right_merged_cell(id, nr, nc + k);
            }
            for k in 1..new_rs {
                rotated.add_down_merged_cell(id, nr + k, nc);
                for m in 1..new_cs {
                    rotated.fill_merged_cell(id, nr + k, nc + m);
                }
            }
        }
        Ok(rotated)
    }
}
