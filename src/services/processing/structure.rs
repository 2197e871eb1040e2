//! Workbook loading for process plan files
//!
//! Each worksheet is materialised as a dense grid addressed by absolute
//! zero-based (row, column) positions, so the fixed layout offsets of the
//! metadata block and step table can be applied directly.

use calamine::{Data, Range, Reader, Xlsx, open_workbook_from_rs};
use std::io::Cursor;

use super::errors::ConversionError;

/// One worksheet as a 2-D cell grid
#[derive(Debug, Clone, PartialEq)]
pub struct SheetGrid {
    pub name: String,
    pub rows: Vec<Vec<Data>>,
}

impl SheetGrid {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<Data>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// Build a grid from a calamine range, re-anchoring it at A1.
    ///
    /// Calamine trims leading empty rows and columns from the used range; the
    /// layout offsets are absolute, so they are padded back in.
    pub fn from_range(name: &str, range: &Range<Data>) -> Self {
        let (row_offset, col_offset) = range
            .start()
            .map_or((0, 0), |(r, c)| (r as usize, c as usize));

        let mut rows: Vec<Vec<Data>> = vec![Vec::new(); row_offset];
        for row in range.rows() {
            let mut cells = vec![Data::Empty; col_offset];
            cells.extend(row.iter().cloned());
            rows.push(cells);
        }

        Self::new(name, rows)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Data> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// A sheet with no non-blank cell at all
    pub fn is_empty(&self) -> bool {
        self.rows
            .iter()
            .flatten()
            .all(|cell| super::utils::extract_text(cell).is_none())
    }
}

/// Load every worksheet of an `.xlsx` workbook, in workbook order.
pub fn load_workbook(bytes: &[u8]) -> Result<Vec<SheetGrid>, ConversionError> {
    let cursor = Cursor::new(bytes);
    let mut workbook: Xlsx<_> =
        open_workbook_from_rs(cursor).map_err(|e| ConversionError::Workbook {
            message: format!("Failed to open Excel workbook: {e}"),
        })?;

    let sheet_names = workbook.sheet_names();
    if sheet_names.is_empty() {
        return Err(ConversionError::Workbook {
            message: "Excel file has no sheets".to_string(),
        });
    }

    let mut sheets = Vec::with_capacity(sheet_names.len());
    for name in sheet_names {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| ConversionError::Validation {
                sheet: name.clone(),
                message: format!("Failed to read worksheet: {e}"),
            })?;
        sheets.push(SheetGrid::from_range(&name, &range));
    }

    Ok(sheets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_range_restores_absolute_positions() {
        let mut range: Range<Data> = Range::new((2, 1), (3, 2));
        range.set_value((2, 1), Data::String("Station".to_string()));
        range.set_value((3, 2), Data::Float(4.0));

        let grid = SheetGrid::from_range("Plan", &range);
        assert_eq!(grid.height(), 4);
        assert_eq!(grid.cell(2, 1), Some(&Data::String("Station".to_string())));
        assert_eq!(grid.cell(3, 2), Some(&Data::Float(4.0)));
        assert_eq!(grid.cell(0, 0), None);
        assert_eq!(grid.cell(2, 0), Some(&Data::Empty));
        assert!(!grid.is_empty());
    }

    #[test]
    fn test_empty_grid() {
        let grid = SheetGrid::new("Blank", vec![vec![Data::Empty, Data::String("  ".to_string())]]);
        assert!(grid.is_empty());
        assert_eq!(grid.width(), 2);
    }

    #[test]
    fn test_load_workbook_rejects_garbage() {
        let result = load_workbook(b"definitely not a zip archive");
        assert!(matches!(result, Err(ConversionError::Workbook { .. })));
    }
}
