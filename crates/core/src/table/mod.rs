//! Table structure reconstruction from rulings and positioned text.
//!
//! This module turns a page's line segments into a lattice of cells,
//! groups them into tables and fills them with text. The resulting
//! [`Table`]s carry a sparse cell grid with shared merged cells.

pub mod cell;
pub mod clustering;
pub mod container;
pub mod edges;
pub mod finder;
pub mod grid;
pub(crate) mod intersections;
pub mod model;
pub mod ruling;
pub mod serialize;
pub mod types;

pub use cell::{Cell, LEFT_MERGED, UP_LEFT_MERGED, UP_MERGED};
pub use container::{CellContainer, CellMatrix};
pub use finder::{extract_tables, page_rulings};
pub use model::Table;
pub use ruling::Ruling;
pub use serialize::{CellRecord, TableDocument, tables_to_json};
pub use types::{BBox, CellId, Color, CrossPageRow, DrawType, Orientation, TableType, TextChunk};

/// Cell rectangles closed by a set of horizontal and vertical rulings.
pub fn find_cells(
    horizontal: &[Ruling],
    vertical: &[Ruling],
    expand: f64,
) -> crate::error::Result<Vec<BBox>> {
    let index = intersections::find_intersections(horizontal, vertical, expand)?;
    Ok(grid::intersections_to_cells(&index))
}

#[cfg(test)]
mod table_extraction_tests {
    use super::grid::{build_table, cells_to_tables};
    use super::*;

    fn make_v(x: f64, top: f64, bottom: f64) -> Ruling {
        Ruling::vertical(x, top, bottom)
    }

    fn make_h(y: f64, x0: f64, x1: f64) -> Ruling {
        Ruling::horizontal(y, x0, x1)
    }

    #[test]
    fn test_grid_cell_count() {
        for (h, v) in [(2, 2), (3, 4), (6, 5)] {
            let bottom = 10.0 * (h - 1) as f64;
            let right = 20.0 * (v - 1) as f64;
            let horizontal: Vec<Ruling> = (0..h).map(|i| make_h(10.0 * i as f64, 0.0, right)).collect();
            let vertical: Vec<Ruling> = (0..v).map(|j| make_v(20.0 * j as f64, 0.0, bottom)).collect();
            let cells = find_cells(&horizontal, &vertical, 2.0).unwrap();
            assert_eq!(cells.len(), (h - 1) * (v - 1));

            let tables = cells_to_tables(cells);
            assert_eq!(tables.len(), 1);
            let table = build_table(1, &tables[0]);
            assert_eq!((table.row_count(), table.column_count()), (h - 1, v - 1));
            assert!(table.cells().iter().all(|c| c.row_span() == 1 && c.col_span() == 1));
        }
    }

    #[test]
    fn test_spanning_cell_shares_slots() {
        // A header spanning two columns over a 2x2 body.
        let horizontal = vec![make_h(0.0, 0.0, 40.0), make_h(10.0, 0.0, 40.0), make_h(20.0, 0.0, 40.0)];
        let vertical = vec![make_v(0.0, 0.0, 20.0), make_v(20.0, 10.0, 20.0), make_v(40.0, 0.0, 20.0)];
        let cells = find_cells(&horizontal, &vertical, 2.0).unwrap();
        let table = build_table(1, &cells);
        let header = table.cell_id(0, 0).unwrap();
        assert_eq!(table.cell_by_id(header).col_span(), 2);
        assert_eq!(table.cell_id(0, 1), Some(header));
        assert_ne!(table.cell_id(1, 1), Some(header));
        assert_eq!(table.cells().len(), 3);
    }

    #[test]
    fn test_unclosed_rulings_make_no_cells() {
        let horizontal = vec![make_h(0.0, 0.0, 40.0)];
        let vertical = vec![make_v(0.0, 0.0, 20.0), make_v(40.0, 0.0, 20.0)];
        assert!(find_cells(&horizontal, &vertical, 2.0).unwrap().is_empty());
    }
}
