//! Per-page lattice table extraction.
//!
//! The pipeline runs in this order:
//!
//! 1. normalize the input rulings and drop degenerate ones
//! 2. join dotted lines
//! 3. snap endpoints with a language dependent tolerance
//! 4. collapse segmented strokes per orientation
//! 5. drop repeated strokes and synthesise missing horizontals
//! 6. sweep for intersections and close cells
//! 7. group cells into tables, assign text, fix rotated tables

use tracing::debug;

use crate::error::Result;
use crate::page::PageContext;
use crate::params::LatticeParams;

use super::edges::{
    collapse_oriented_rulings, join_dot_rulings, prepare_rulings, snap_points, snap_tolerance,
    split_by_orientation,
};
use super::grid::{assign_text, build_table, cells_to_tables, intersections_to_cells};
use super::intersections::find_intersections;
use super::model::Table;
use super::ruling::Ruling;
use super::types::{TableType, key_f64};

/// Tolerance used to gather dots of one dotted line.
const DOT_JOIN_TOLERANCE: f64 = 1.0;

/// Clean-up of a page's rulings into horizontal and vertical sets.
pub fn page_rulings(page: &PageContext, params: &LatticeParams) -> Result<(Vec<Ruling>, Vec<Ruling>)> {
    let mut rulings: Vec<Ruling> = page
        .rulings
        .iter()
        .cloned()
        .map(|mut r| {
            r.normalize();
            r
        })
        .filter(|r| r.length() > params.min_ruling_length)
        .collect();

    if params.join_dots {
        let (dots, mut lines): (Vec<Ruling>, Vec<Ruling>) =
            rulings.into_iter().partition(|r| r.draw_type.is_dot());
        lines.extend(join_dot_rulings(&dots, DOT_JOIN_TOLERANCE, DOT_JOIN_TOLERANCE));
        rulings = lines;
    }

    let (x_tolerance, y_tolerance) = params.snap_tolerance.unwrap_or_else(|| {
        snap_tolerance(
            &rulings,
            page.min_char_width,
            page.min_char_height,
            page.is_chinese(),
        )
    });
    snap_points(&mut rulings, x_tolerance, y_tolerance);

    let (horizontal, vertical) = split_by_orientation(rulings);
    let horizontal = collapse_oriented_rulings(horizontal, params)?;
    let vertical = collapse_oriented_rulings(vertical, params)?;
    Ok(prepare_rulings(horizontal, vertical, params))
}

/// Extract the ruled tables of a page, ordered by top and indexed from 0.
pub fn extract_tables(page: &PageContext, params: &LatticeParams) -> Result<Vec<Table>> {
    let (horizontal, vertical) = page_rulings(page, params)?;
    if horizontal.is_empty() || vertical.is_empty() {
        return Ok(Vec::new());
    }

    let index = find_intersections(&horizontal, &vertical, params.perpendicular_expand)?;
    let cells = intersections_to_cells(&index);
    let groups = cells_to_tables(cells);
    debug!(
        page = page.number,
        intersections = index.len(),
        tables = groups.len(),
        "found lattice tables"
    );

    let mut taken = vec![false; page.chunks.len()];
    let mut tables = Vec::with_capacity(groups.len());
    for group in &groups {
        let mut table = build_table(page.number, group);
        table.table_type = TableType::Ruled;
        assign_text(&mut table, &page.chunks, &mut taken, params.cell_text_epsilon);
        if params.correct_rotation {
            table = correct_rotation(table)?;
        }
        tables.push(table);
    }

    tables.sort_by_key(|t| key_f64(t.bbox.top));
    for (i, table) in tables.iter_mut().enumerate() {
        table.index = i;
    }
    Ok(tables)
}

/// Rotate a table whose text mostly runs vertically.
fn correct_rotation(table: Table) -> Result<Table> {
    let rotations: Vec<i32> = table
        .cells()
        .iter()
        .flat_map(|c| c.chunks().iter().map(|chunk| chunk.rotation))
        .collect();
    let majority = |angle: i32| rotations.iter().filter(|&&r| r == angle).count() * 2 > rotations.len();

    if majority(90) {
        debug!(page = table.page_number, "rotating table with 90 degree text");
        table.rotate(-90)
    } else if majority(270) {
        debug!(page = table.page_number, "rotating table with 270 degree text");
        table.rotate(90)
    } else {
        Ok(table)
    }
}
