//! Sparse (row, col) grid of cells.
//!
//! Cells live in an arena; the grid maps each occupied slot to a
//! [`CellId`]. A merged cell's slots all hold the same id, so an edit through
//! any slot is visible from every other slot it covers.

use std::collections::BTreeMap;

use super::cell::Cell;
use super::types::CellId;

#[derive(Clone, Debug, Default)]
pub struct CellContainer {
    arena: Vec<Cell>,
    slots: BTreeMap<(usize, usize), CellId>,
}

impl CellContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn clear(&mut self) {
        self.arena.clear();
        self.slots.clear();
    }

    /// Add a cell to the arena without placing it.
    pub fn insert(&mut self, cell: Cell) -> CellId {
        self.arena.push(cell);
        CellId(self.arena.len() - 1)
    }

    pub fn cell(&self, id: CellId) -> &Cell {
        &self.arena[id.0]
    }

    pub fn cell_mut(&mut self, id: CellId) -> &mut Cell {
        &mut self.arena[id.0]
    }

    /// Store a new cell at a slot. An occupant is merged into it.
    pub fn put(&mut self, row: usize, col: usize, cell: Cell) -> CellId {
        let id = self.insert(cell);
        self.put_id(row, col, id);
        id
    }

    /// Point a slot at an existing cell.
    ///
    /// When the slot holds a different cell, its bounds are unioned into the
    /// incoming cell and its text is placed in front of the incoming text.
    pub fn put_id(&mut self, row: usize, col: usize, id: CellId) {
        if let Some(old) = self.slots.insert((row, col), id)
            && old != id
        {
            let (bbox, chunks) = {
                let displaced = &self.arena[old.0];
                (displaced.bbox, displaced.chunks().to_vec())
            };
            let target = &mut self.arena[id.0];
            target.bbox = target.bbox.union(&bbox);
            target.prepend_chunks(chunks);
        }
    }

    /// Fill every slot covered by a cell's span with that cell.
    pub fn add_merged_cell(&mut self, id: CellId) {
        let (row, col, row_span, col_span) = {
            let cell = &self.arena[id.0];
            (cell.row(), cell.col(), cell.row_span(), cell.col_span())
        };
        for i in 0..row_span {
            for j in 0..col_span {
                self.put_id(row + i, col + j, id);
            }
        }
    }

    pub fn id_at(&self, row: usize, col: usize) -> Option<CellId> {
        self.slots.get(&(row, col)).copied()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        self.id_at(row, col).map(|id| &self.arena[id.0])
    }

    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut Cell> {
        let id = self.id_at(row, col)?;
        Some(&mut self.arena[id.0])
    }

    /// Slot values of a row in column order; a merged cell repeats.
    pub fn row(&self, row: usize) -> Vec<CellId> {
        self.slots
            .range((row, 0)..=(row, usize::MAX))
            .map(|(_, id)| *id)
            .collect()
    }

    pub fn row_cells(&self, row: usize) -> Vec<&Cell> {
        self.row(row).into_iter().map(|id| &self.arena[id.0]).collect()
    }

    /// Distinct cells in row-major order of first appearance.
    pub fn distinct_ids(&self) -> Vec<CellId> {
        let mut seen = vec![false; self.arena.len()];
        let mut ids = Vec::new();
        for id in self.slots.values() {
            if !seen[id.0] {
                seen[id.0] = true;
                ids.push(*id);
            }
        }
        ids
    }

    pub fn cells(&self) -> Vec<&Cell> {
        self.distinct_ids()
            .into_iter()
            .map(|id| &self.arena[id.0])
            .collect()
    }

    pub fn max_row(&self) -> Option<usize> {
        self.slots.keys().map(|(r, _)| *r).max()
    }

    pub fn max_col(&self) -> Option<usize> {
        self.slots.keys().map(|(_, c)| *c).max()
    }

    pub fn row_count(&self) -> usize {
        self.max_row().map_or(0, |r| r + 1)
    }

    pub fn column_count(&self) -> usize {
        self.max_col().map_or(0, |c| c + 1)
    }

    /// Rebuild the grid from the distinct cells' current positions and spans.
    /// Unreferenced arena entries are dropped and ids are reassigned.
    pub fn rebuild(&mut self) {
        let cells: Vec<Cell> = self
            .distinct_ids()
            .into_iter()
            .map(|id| self.arena[id.0].clone())
            .collect();
        self.clear();
        for cell in cells {
            let id = self.insert(cell);
            self.add_merged_cell(id);
            self.arena[id.0].set_clean();
        }
    }
}

/// Occupancy matrix used to re-derive column positions row by row.
///
/// The cursor starts before the first row; [`CellMatrix::next_row`] moves to
/// the first free slot of the next row that has one.
pub struct CellMatrix {
    occupied: Vec<Vec<bool>>,
    rows: usize,
    cols: usize,
    row: Option<usize>,
    col: Option<usize>,
}

impl CellMatrix {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            occupied: vec![vec![false; cols]; rows],
            rows,
            cols,
            row: None,
            col: None,
        }
    }

    pub fn row(&self) -> Option<usize> {
        self.row
    }

    pub fn col(&self) -> usize {
        self.col.unwrap_or(0)
    }

    fn skip_occupied(&self, row: usize, mut col: usize) -> usize {
        while row < self.rows && col < self.cols && self.occupied[row][col] {
            col += 1;
        }
        col
    }

    pub fn next_row(&mut self) {
        loop {
            let row = self.row.map_or(0, |r| r + 1);
            let col = self.skip_occupied(row, 0);
            self.row = Some(row);
            self.col = Some(col);
            if !(col >= self.cols && row < self.rows) {
                break;
            }
        }
    }

    pub fn next_col(&mut self) {
        match self.col {
            None => self.col = Some(0),
            Some(c) if c <= self.cols => self.col = Some(c + 1),
            Some(_) => {}
        }
    }

    /// Mark a span at the cursor as occupied and move past it.
    pub fn put_cell(&mut self, row_span: usize, col_span: usize) {
        let row = self.row.unwrap_or(0);
        let col = self.col();
        for i in 0..row_span {
            for j in 0..col_span {
                if row + i < self.rows && col + j < self.cols {
                    self.occupied[row + i][col + j] = true;
                }
            }
        }
        let next = self.skip_occupied(row, col + col_span);
        self.col = Some(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::types::BBox;

    fn cell_at(row: usize, col: usize, text: &str) -> Cell {
        let (x, y) = (col as f64 * 10.0, row as f64 * 10.0);
        let mut cell = Cell::with_text(BBox::new(x, y, x + 10.0, y + 10.0), text);
        cell.assign_position(row, col);
        cell
    }

    #[test]
    fn test_merged_cell_shares_identity() {
        let mut container = CellContainer::new();
        let mut cell = cell_at(1, 1, "G");
        cell.set_row_span(2);
        cell.set_col_span(3);
        let id = container.insert(cell);
        container.add_merged_cell(id);
        for i in 0..2 {
            for j in 0..3 {
                assert_eq!(container.id_at(1 + i, 1 + j), Some(id));
            }
        }
        container.cell_mut(id).set_text("H");
        assert_eq!(container.get(2, 3).map(Cell::text).as_deref(), Some("H"));
        assert_eq!(container.row_count(), 3);
        assert_eq!(container.column_count(), 4);
        assert_eq!(container.cells().len(), 1);
        assert_eq!(container.row(2), vec![id, id, id]);
    }

    #[test]
    fn test_put_on_occupied_slot_merges() {
        let mut container = CellContainer::new();
        container.put(0, 0, cell_at(0, 0, "A"));
        let second = container.put(0, 0, cell_at(0, 0, "B"));
        assert_eq!(container.id_at(0, 0), Some(second));
        assert_eq!(container.get(0, 0).map(Cell::text).as_deref(), Some("AB"));

        // Re-pointing a slot at its own cell changes nothing.
        container.put_id(0, 0, second);
        assert_eq!(container.get(0, 0).map(Cell::text).as_deref(), Some("AB"));
    }

    #[test]
    fn test_empty_container() {
        let container = CellContainer::new();
        assert_eq!(container.row_count(), 0);
        assert_eq!(container.column_count(), 0);
        assert!(container.get(0, 0).is_none());
        assert!(container.row(0).is_empty());
    }

    #[test]
    fn test_rebuild_compacts() {
        let mut container = CellContainer::new();
        container.put(0, 0, cell_at(0, 0, "A"));
        container.put(0, 0, cell_at(0, 0, "B"));
        let id = container.put(0, 1, cell_at(0, 1, "C"));
        container.cell_mut(id).set_col(3);
        container.rebuild();
        assert_eq!(container.cells().len(), 2);
        assert!(container.get(0, 1).is_none());
        assert_eq!(container.get(0, 3).map(Cell::text).as_deref(), Some("C"));
    }

    #[test]
    fn test_cell_matrix_walk() {
        let mut matrix = CellMatrix::new(2, 3);
        matrix.next_row();
        assert_eq!((matrix.row(), matrix.col()), (Some(0), 0));
        // A 2x1 cell in column 0 occupies the slot below it.
        matrix.put_cell(2, 1);
        assert_eq!(matrix.col(), 1);
        matrix.put_cell(1, 2);
        assert_eq!(matrix.col(), 3);
        matrix.next_row();
        assert_eq!((matrix.row(), matrix.col()), (Some(1), 1));
    }

    #[test]
    fn test_cell_matrix_skips_full_rows() {
        let mut matrix = CellMatrix::new(3, 1);
        matrix.next_row();
        matrix.put_cell(2, 1);
        matrix.next_row();
        assert_eq!(matrix.row(), Some(2));
        assert_eq!(matrix.col(), 0);
    }
}
