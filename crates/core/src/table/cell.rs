//! A single logical table cell.

use super::types::{BBox, CrossPageRow, TextChunk};

/// Marker for a slot merged into the cell on its left.
pub const LEFT_MERGED: &str = "←";
/// Marker for a slot merged into the cell above.
pub const UP_MERGED: &str = "↑";
/// Marker for a slot merged into the cell above and to the left.
pub const UP_LEFT_MERGED: &str = "↖";

/// A rectangle anchored at (row, col) that covers `row_span` x `col_span`
/// grid slots and owns the text chunks inside it.
///
/// The dirty flag records span or position edits since the last
/// [`Cell::set_clean`]; setting only the column leaves it untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub bbox: BBox,
    row: usize,
    col: usize,
    row_span: usize,
    col_span: usize,
    chunks: Vec<TextChunk>,
    dirty: bool,
    cross_page_cell: bool,
    cross_page_row: Option<CrossPageRow>,
}

impl Cell {
    pub fn new(bbox: BBox) -> Self {
        Self {
            bbox,
            row: 0,
            col: 0,
            row_span: 1,
            col_span: 1,
            chunks: Vec::new(),
            dirty: false,
            cross_page_cell: false,
            cross_page_row: None,
        }
    }

    /// A cell holding one chunk of `text` that covers the whole cell.
    pub fn with_text(bbox: BBox, text: impl Into<String>) -> Self {
        let mut cell = Self::new(bbox);
        cell.set_text(text);
        cell
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn col(&self) -> usize {
        self.col
    }

    pub fn row_span(&self) -> usize {
        self.row_span
    }

    pub fn col_span(&self) -> usize {
        self.col_span
    }

    pub fn assign_position(&mut self, row: usize, col: usize) {
        self.row = row;
        self.col = col;
        self.dirty = true;
    }

    pub fn set_row(&mut self, row: usize) {
        self.row = row;
        self.dirty = true;
    }

    pub fn set_col(&mut self, col: usize) {
        self.col = col;
    }

    pub fn set_row_span(&mut self, span: usize) {
        self.row_span = span;
        self.dirty = true;
    }

    pub fn set_col_span(&mut self, span: usize) {
        self.col_span = span;
        self.dirty = true;
    }

    pub fn increase_row_span(&mut self) {
        self.row_span += 1;
        self.dirty = true;
    }

    pub fn increase_col_span(&mut self) {
        self.col_span += 1;
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_clean(&mut self) {
        self.dirty = false;
    }

    pub fn is_cross_page_cell(&self) -> bool {
        self.cross_page_cell
    }

    pub fn mark_cross_page_cell(&mut self) {
        self.cross_page_cell = true;
    }

    pub fn cross_page_row(&self) -> Option<CrossPageRow> {
        self.cross_page_row
    }

    pub fn set_cross_page_row(&mut self, marker: CrossPageRow) {
        self.cross_page_row = Some(marker);
    }

    pub fn is_pivot(&self, row: usize, col: usize) -> bool {
        self.row == row && self.col == col
    }

    pub fn contains_position(&self, row: usize, col: usize) -> bool {
        self.row <= row
            && row < self.row + self.row_span
            && self.col <= col
            && col < self.col + self.col_span
    }

    pub fn is_up_merged(&self, row: usize, col: usize) -> bool {
        self.row < row && row < self.row + self.row_span && self.col == col
    }

    pub fn is_left_merged(&self, row: usize, col: usize) -> bool {
        self.row == row && self.col < col && col < self.col + self.col_span
    }

    pub fn is_up_left_merged(&self, row: usize, col: usize) -> bool {
        self.row < row
            && row < self.row + self.row_span
            && self.col < col
            && col < self.col + self.col_span
    }

    pub fn chunks(&self) -> &[TextChunk] {
        &self.chunks
    }

    pub fn add_chunk(&mut self, chunk: TextChunk) {
        self.chunks.push(chunk);
    }

    pub(crate) fn prepend_chunks(&mut self, mut chunks: Vec<TextChunk>) {
        chunks.append(&mut self.chunks);
        self.chunks = chunks;
    }

    /// Concatenated chunk text, trimmed.
    pub fn text(&self) -> String {
        let text: String = self.chunks.iter().map(|c| c.text.as_str()).collect();
        text.trim().to_string()
    }

    pub fn has_text(&self) -> bool {
        self.chunks.iter().any(|c| !c.text.trim().is_empty())
    }

    /// Replace all chunks with a single chunk of `text`.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.chunks = vec![TextChunk::new(self.bbox, text)];
    }

    /// Text shown at a grid slot: the text at the pivot, a merge marker on
    /// covered slots, `None` outside the cell.
    pub fn text_at(&self, row: usize, col: usize) -> Option<String> {
        if self.is_pivot(row, col) {
            Some(self.text())
        } else if self.is_left_merged(row, col) {
            Some(LEFT_MERGED.to_string())
        } else if self.is_up_merged(row, col) {
            Some(UP_MERGED.to_string())
        } else if self.is_up_left_merged(row, col) {
            Some(UP_LEFT_MERGED.to_string())
        } else {
            None
        }
    }
}
