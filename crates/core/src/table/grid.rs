//! Table cell and grid construction from intersections.
//!
//! Cells are closed loops of the ruling grid. Cells sharing a corner form
//! one table; boundaries collected from the cells give each one its row,
//! column and spans.

use std::collections::{BTreeMap, VecDeque};

use rustc_hash::FxHashMap;

use super::cell::Cell;
use super::clustering::{cluster_by_average, distinct_boundaries};
use super::intersections::IntersectionIndex;
use super::model::Table;
use super::types::{BBox, KeyF64, KeyPoint, TextChunk, key_f64, key_point};

/// Cell edges closer than this share a grid boundary.
pub const BOUNDARY_TOLERANCE: f64 = 1.0;
/// Chunks whose centres are closer than this vertically share a text line.
pub const LINE_TOLERANCE: f64 = 2.0;

/// Convert intersections to cell rectangles.
///
/// Each point in Y-then-X order is tried as a top-left corner. Candidates
/// below it on the same vertical ruling and right of it on the same
/// horizontal ruling are combined in order; the first pair whose
/// bottom-right corner is an intersection of the closing rulings wins.
pub(crate) fn intersections_to_cells(index: &IntersectionIndex) -> Vec<BBox> {
    let points = index.sorted_points();

    let mut below: BTreeMap<KeyF64, Vec<f64>> = BTreeMap::new();
    let mut right: BTreeMap<KeyF64, Vec<f64>> = BTreeMap::new();
    for &(x, y) in &points {
        below.entry(key_f64(x)).or_default().push(y);
        right.entry(key_f64(y)).or_default().push(x);
    }

    let mut cells = Vec::new();
    for &(x, y) in &points {
        let Some(top_left) = index.get(x, y) else {
            continue;
        };
        let column = below.get(&key_f64(x)).map(Vec::as_slice).unwrap_or_default();
        let row = right.get(&key_f64(y)).map(Vec::as_slice).unwrap_or_default();

        'below: for &by in column.iter().filter(|&&by| by > y) {
            let Some(bottom_left) = index.get(x, by) else {
                continue;
            };
            if bottom_left.v != top_left.v {
                continue;
            }
            for &rx in row.iter().filter(|&&rx| rx > x) {
                let Some(top_right) = index.get(rx, y) else {
                    continue;
                };
                if top_right.h != top_left.h {
                    continue;
                }
                if let Some(bottom_right) = index.get(rx, by)
                    && bottom_right.h == bottom_left.h
                    && bottom_right.v == top_right.v
                {
                    cells.push(BBox::new(x, y, rx, by));
                    break 'below;
                }
            }
        }
    }
    cells
}

/// Group cells into connected tables using corner-sharing.
///
/// Groups come out ordered by their top-left cell.
pub fn cells_to_tables(cells: Vec<BBox>) -> Vec<Vec<BBox>> {
    fn corners(b: &BBox) -> [KeyPoint; 4] {
        [
            key_point(b.x0, b.top),
            key_point(b.x0, b.bottom),
            key_point(b.x1, b.top),
            key_point(b.x1, b.bottom),
        ]
    }

    let mut corner_map: FxHashMap<KeyPoint, Vec<usize>> = FxHashMap::default();
    for (idx, cell) in cells.iter().enumerate() {
        for corner in corners(cell) {
            corner_map.entry(corner).or_default().push(idx);
        }
    }

    let mut visited = vec![false; cells.len()];
    let mut tables: Vec<Vec<BBox>> = Vec::new();
    let mut queue: VecDeque<usize> = VecDeque::new();
    for start in 0..cells.len() {
        if visited[start] {
            continue;
        }
        visited[start] = true;
        queue.push_back(start);
        let mut group = Vec::new();
        while let Some(idx) = queue.pop_front() {
            group.push(idx);
            for corner in corners(&cells[idx]) {
                for &neighbor in corner_map.get(&corner).into_iter().flatten() {
                    if !visited[neighbor] {
                        visited[neighbor] = true;
                        queue.push_back(neighbor);
                    }
                }
            }
        }
        group.sort_unstable();
        tables.push(group.into_iter().map(|i| cells[i]).collect());
    }

    let origin = |group: &Vec<BBox>| {
        group
            .iter()
            .map(|c| (key_f64(c.top), key_f64(c.x0)))
            .min()
    };
    tables.sort_by_key(origin);
    tables
}

fn boundary_index(bounds: &[f64], value: f64) -> usize {
    bounds
        .partition_point(|b| *b < value - BOUNDARY_TOLERANCE)
        .min(bounds.len().saturating_sub(1))
}

/// Place a group of cell rectangles on a grid.
///
/// Row boundaries are the distinct cell tops plus the lowest bottom, column
/// boundaries the distinct lefts plus the rightmost right. A cell spans every
/// boundary interval between its edges.
pub fn build_table(page_number: usize, cells: &[BBox]) -> Table {
    let mut table = Table::new(page_number, BBox::default());
    if cells.is_empty() {
        return table;
    }

    let mut ys: Vec<f64> = cells.iter().map(|c| c.top).collect();
    ys.extend(cells.iter().map(|c| c.bottom).reduce(f64::max));
    let mut xs: Vec<f64> = cells.iter().map(|c| c.x0).collect();
    xs.extend(cells.iter().map(|c| c.x1).reduce(f64::max));
    let rows = distinct_boundaries(ys, BOUNDARY_TOLERANCE);
    let cols = distinct_boundaries(xs, BOUNDARY_TOLERANCE);

    let mut ordered = cells.to_vec();
    ordered.sort_by_key(|c| (key_f64(c.top), key_f64(c.x0)));
    for bbox in ordered {
        let row = boundary_index(&rows, bbox.top);
        let col = boundary_index(&cols, bbox.x0);
        let row_span = boundary_index(&rows, bbox.bottom).saturating_sub(row).max(1);
        let col_span = boundary_index(&cols, bbox.x1).saturating_sub(col).max(1);

        let mut cell = Cell::new(bbox);
        cell.set_row_span(row_span);
        cell.set_col_span(col_span);
        let id = table.add(cell, row, col);
        if row_span > 1 || col_span > 1 {
            table.add_merged_cell(id);
        }
    }
    table
}

/// Sort chunks into reading order: lines top to bottom, then left to right.
pub fn reading_order(chunks: &[TextChunk]) -> Vec<usize> {
    cluster_by_average(chunks, |c| c.bbox.center_y(), LINE_TOLERANCE)
        .into_iter()
        .flat_map(|mut line| {
            line.sort_by_key(|&i| key_f64(chunks[i].bbox.x0));
            line
        })
        .collect()
}

/// Hand text chunks to the cells of a table.
///
/// A chunk goes to the first cell, in reading order, whose bounds grown by
/// `epsilon` contain its centre. `taken` marks chunks already owned by a
/// cell and is updated for the chunks assigned here.
pub fn assign_text(table: &mut Table, chunks: &[TextChunk], taken: &mut [bool], epsilon: f64) {
    let ids = table.cell_ids();
    for idx in reading_order(chunks) {
        if taken[idx] {
            continue;
        }
        let chunk = &chunks[idx];
        let (cx, cy) = (chunk.bbox.center_x(), chunk.bbox.center_y());
        let owner = ids
            .iter()
            .copied()
            .find(|&id| table.cell_by_id(id).bbox.expand(epsilon).contains_point(cx, cy));
        if let Some(id) = owner {
            table.add_chunk(id, chunk.clone());
            taken[idx] = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::intersections::find_intersections;
    use crate::table::ruling::Ruling;

    fn lattice(ys: &[f64], xs: &[f64]) -> IntersectionIndex {
        let (left, right) = (xs[0], xs[xs.len() - 1]);
        let (top, bottom) = (ys[0], ys[ys.len() - 1]);
        let h: Vec<Ruling> = ys.iter().map(|&y| Ruling::horizontal(y, left, right)).collect();
        let v: Vec<Ruling> = xs.iter().map(|&x| Ruling::vertical(x, top, bottom)).collect();
        find_intersections(&h, &v, 2.0).unwrap()
    }

    #[test]
    fn test_full_grid_cells() {
        let index = lattice(&[0.0, 10.0, 20.0, 30.0], &[0.0, 50.0, 100.0]);
        let cells = intersections_to_cells(&index);
        assert_eq!(cells.len(), 6);
        assert_eq!(cells[0], BBox::new(0.0, 0.0, 50.0, 10.0));
        assert_eq!(cells[5], BBox::new(50.0, 20.0, 100.0, 30.0));
    }

    #[test]
    fn test_merged_cell_from_missing_segment() {
        // The middle vertical stops at y=10, so the lower row is one cell.
        let h: Vec<Ruling> = [0.0, 10.0, 20.0]
            .iter()
            .map(|&y| Ruling::horizontal(y, 0.0, 100.0))
            .collect();
        let v = vec![
            Ruling::vertical(0.0, 0.0, 20.0),
            Ruling::vertical(50.0, 0.0, 10.0),
            Ruling::vertical(100.0, 0.0, 20.0),
        ];
        let index = find_intersections(&h, &v, 2.0).unwrap();
        let cells = intersections_to_cells(&index);
        assert_eq!(cells.len(), 3);
        let table = build_table(1, &cells);
        assert_eq!((table.row_count(), table.column_count()), (2, 2));
        let merged = table.cell(1, 0).unwrap();
        assert_eq!(merged.col_span(), 2);
        assert_eq!(table.cell_id(1, 1), table.cell_id(1, 0));
    }

    #[test]
    fn test_separate_tables() {
        let mut cells = intersections_to_cells(&lattice(&[200.0, 220.0], &[0.0, 10.0, 20.0]));
        cells.extend(intersections_to_cells(&lattice(&[0.0, 10.0], &[0.0, 10.0])));
        let tables = cells_to_tables(cells);
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].len(), 1);
        assert_eq!(tables[1].len(), 2);
    }

    #[test]
    fn test_assign_text_first_match() {
        let cells = intersections_to_cells(&lattice(&[0.0, 20.0], &[0.0, 50.0, 100.0]));
        let mut table = build_table(1, &cells);
        let chunks = vec![
            TextChunk::new(BBox::new(60.0, 5.0, 70.0, 15.0), "右"),
            TextChunk::new(BBox::new(10.0, 5.0, 20.0, 15.0), "左"),
            TextChunk::new(BBox::new(22.0, 5.0, 30.0, 15.0), "边"),
            TextChunk::new(BBox::new(10.0, 50.0, 20.0, 60.0), "外"),
        ];
        let mut taken = vec![false; chunks.len()];
        assign_text(&mut table, &chunks, &mut taken, 1.0);
        assert_eq!(taken, vec![true, true, true, false]);
        assert_eq!(table.row_text(0), "左边右");
        assert!(table.has_text());
    }
}
