//! Canonical JSON shape of reconstructed tables.
//!
//! Cells are written row-major, one object per pivot; covered slots only
//! count towards `rowCount`/`columnCount`. Field order is fixed.

use serde::Serialize;

use crate::error::Result;

use super::model::Table;
use super::types::{CrossPageRow, TableType};

/// One pivot cell in the output array.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CellRecord {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub row: usize,
    pub column: usize,
    pub text: String,
    #[serde(rename = "colSpan", skip_serializing_if = "Option::is_none")]
    pub col_span: Option<usize>,
    #[serde(rename = "rowSpan", skip_serializing_if = "Option::is_none")]
    pub row_span: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cross_page_row: Option<CrossPageRow>,
}

/// One logical table in the output array.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TableDocument {
    pub page: usize,
    #[serde(rename = "endPage")]
    pub end_page: usize,
    pub index: usize,
    #[serde(rename = "type")]
    pub table_type: TableType,
    pub title: Option<String>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// `None` for a table without cells.
    pub cells: Option<Vec<CellRecord>>,
    #[serde(rename = "rowCount")]
    pub row_count: usize,
    #[serde(rename = "columnCount")]
    pub column_count: usize,
}

impl Table {
    /// Pivot cells in row-major order.
    pub fn cell_records(&self) -> Vec<CellRecord> {
        let mut records = Vec::new();
        for i in 0..self.row_count() {
            for j in 0..self.column_count() {
                let Some(cell) = self.cell(i, j) else {
                    continue;
                };
                if !cell.is_pivot(i, j) {
                    continue;
                }
                records.push(CellRecord {
                    x: cell.bbox.x0,
                    y: cell.bbox.top,
                    width: cell.bbox.width(),
                    height: cell.bbox.height(),
                    row: i,
                    column: j,
                    text: cell.text(),
                    col_span: (cell.col_span() > 1).then_some(cell.col_span()),
                    row_span: (cell.row_span() > 1).then_some(cell.row_span()),
                    cross_page_row: cell.cross_page_row(),
                });
            }
        }
        records
    }

    pub fn to_document(&self) -> TableDocument {
        TableDocument {
            page: self.page_number,
            end_page: self.end_page_number,
            index: self.index,
            table_type: self.table_type,
            title: self.title.clone(),
            x: self.bbox.x0,
            y: self.bbox.top,
            width: self.bbox.width(),
            height: self.bbox.height(),
            cells: (!self.is_empty()).then(|| self.cell_records()),
            row_count: self.row_count(),
            column_count: self.column_count(),
        }
    }
}

/// Serialize tables as a JSON array of [`TableDocument`]s.
pub fn tables_to_json(tables: &[Table], pretty: bool) -> Result<String> {
    let docs: Vec<TableDocument> = tables.iter().map(Table::to_document).collect();
    let json = if pretty {
        serde_json::to_string_pretty(&docs)?
    } else {
        serde_json::to_string(&docs)?
    };
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::types::BBox;

    #[test]
    fn test_merged_cell_record() {
        let mut table = Table::from_text_rows(
            1,
            BBox::new(0.0, 0.0, 100.0, 40.0),
            &[vec!["合计", ""], vec!["A", "B"]],
        );
        let id = table.cell_id(0, 0).unwrap();
        table.add_right_merged_cell(id, 0, 1);
        let records = table.cell_records();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].col_span, Some(2));
        assert_eq!(records[0].row_span, None);
        assert_eq!((records[1].row, records[1].column), (1, 0));
    }

    #[test]
    fn test_empty_table_document() {
        let table = Table::new(3, BBox::default());
        let doc = table.to_document();
        assert!(doc.cells.is_none());
        assert_eq!((doc.row_count, doc.column_count), (0, 0));
        let json = tables_to_json(&[table], false).unwrap();
        assert!(json.contains("\"cells\":null"));
        assert!(json.contains("\"type\":\"ruled\""));
    }
}
