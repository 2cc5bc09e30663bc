//! Cell grid reconstruction: flat OCR cells -> ordered row/column grid.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::normalize::{normalize_text, primary_line};
use crate::types::RawCell;

/// One reconstructed table row, columns ordered ascending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    pub index: usize,
    cells: BTreeMap<usize, String>,
}

impl Row {
    /// Trimmed cell text, as the OCR engine produced it (may be multi-line).
    pub fn cell(&self, col: usize) -> Option<&str> {
        self.cells
            .get(&col)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }

    /// First physical line of a multi-line cell.
    pub fn primary(&self, col: usize) -> Option<&str> {
        self.cell(col).map(primary_line).filter(|s| !s.is_empty())
    }

    /// Cell text with whitespace runs (including newlines) collapsed.
    pub fn text(&self, col: usize) -> Option<String> {
        self.cell(col).map(normalize_text)
    }

    /// Every non-empty line of every cell at or right of `col`.
    pub fn lines_from(&self, col: usize) -> Vec<&str> {
        self.cells
            .range(col..)
            .flat_map(|(_, text)| text.lines())
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect()
    }

    pub fn columns(&self) -> impl Iterator<Item = (usize, &str)> {
        self.cells.iter().map(|(c, t)| (*c, t.as_str()))
    }

    /// True when any cell contains any of the given keywords.
    pub fn contains_any(&self, keywords: &[&str]) -> bool {
        self.cells
            .values()
            .any(|text| keywords.iter().any(|k| text.contains(k)))
    }

    /// Whole row joined with spaces, left to right.
    pub fn joined(&self) -> String {
        self.cells
            .values()
            .map(|t| normalize_text(t))
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Rows keyed by row index, ascending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowGrid {
    rows: BTreeMap<usize, Row>,
}

impl RowGrid {
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.values()
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(&index)
    }

    pub fn first(&self) -> Option<&Row> {
        self.rows.values().next()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Group OCR cells into a [`RowGrid`].
///
/// Cells missing a row or column index are skipped. Two cells landing on the
/// same position are treated as one multi-line cell and joined with `\n`.
pub fn build_grid(cells: &[RawCell]) -> Result<RowGrid> {
    let mut rows: BTreeMap<usize, Row> = BTreeMap::new();
    let mut skipped = 0usize;

    for cell in cells {
        let (Some(r), Some(c)) = (cell.row, cell.col) else {
            skipped += 1;
            continue;
        };

        let row = rows.entry(r).or_insert_with(|| Row {
            index: r,
            cells: BTreeMap::new(),
        });
        row.cells
            .entry(c)
            .and_modify(|existing| {
                existing.push('\n');
                existing.push_str(&cell.text);
            })
            .or_insert_with(|| cell.text.clone());
    }

    if skipped > 0 {
        tracing::debug!(skipped, "dropped cells without row/column position");
    }

    if rows.is_empty() {
        return Err(Error::EmptyGrid);
    }

    Ok(RowGrid { rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(row: usize, col: usize, text: &str) -> RawCell {
        RawCell::new(row, col, text)
    }

    #[test]
    fn test_orders_rows_and_columns() {
        let cells = vec![
            cell(2, 1, "b2"),
            cell(1, 3, "d1"),
            cell(2, 0, "a2"),
            cell(1, 0, "a1"),
        ];
        let grid = build_grid(&cells).unwrap();
        let indices: Vec<_> = grid.rows().map(|r| r.index).collect();
        assert_eq!(indices, vec![1, 2]);

        let cols: Vec<_> = grid.row(1).unwrap().columns().map(|(c, _)| c).collect();
        assert_eq!(cols, vec![0, 3]);
    }

    #[test]
    fn test_skips_cells_without_position() {
        let cells = vec![
            RawCell { row: None, col: Some(0), text: "orphan".into(), confidence: None },
            cell(0, 0, "kept"),
        ];
        let grid = build_grid(&cells).unwrap();
        assert_eq!(grid.len(), 1);
        assert_eq!(grid.row(0).unwrap().cell(0), Some("kept"));
    }

    #[test]
    fn test_empty_grid_error() {
        let cells = vec![RawCell { row: Some(1), col: None, text: "x".into(), confidence: None }];
        assert!(matches!(build_grid(&cells), Err(Error::EmptyGrid)));
        assert!(matches!(build_grid(&[]), Err(Error::EmptyGrid)));
    }

    #[test]
    fn test_multi_line_cells() {
        let cells = vec![cell(3, 0, "20230105"), cell(3, 0, "20230105")];
        let grid = build_grid(&cells).unwrap();
        let row = grid.row(3).unwrap();
        assert_eq!(row.cell(0), Some("20230105\n20230105"));
        assert_eq!(row.primary(0), Some("20230105"));
        assert_eq!(row.text(0).as_deref(), Some("20230105 20230105"));
    }

    #[test]
    fn test_lines_from_collects_trailing_columns() {
        let cells = vec![
            cell(1, 4, "100.00"),
            cell(1, 5, "张三\n6222 0000"),
            cell(1, 6, " 北京分行 "),
        ];
        let grid = build_grid(&cells).unwrap();
        assert_eq!(
            grid.row(1).unwrap().lines_from(5),
            vec!["张三", "6222 0000", "北京分行"]
        );
    }
}
