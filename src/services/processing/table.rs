//! Step table normalization
//!
//! Slices the tabular region below the metadata block, names its columns from the
//! header row and produces one [`Row`] per data row, with station numbers
//! forward-filled and flag columns coerced.

use std::collections::HashMap;

use super::errors::ConversionError;
use super::row::{Row, columns};
use super::structure::SheetGrid;
use super::utils::{extract_integer, extract_text, zero_pad_step};
use crate::config::ExcelLayout;

/// The step table of one sheet
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

/// Column names from the header row, trimmed, without trailing blanks
pub fn read_headers(grid: &SheetGrid, layout: &ExcelLayout) -> Vec<String> {
    let Some(header_row) = grid.rows.get(layout.header_row) else {
        return Vec::new();
    };

    let mut headers: Vec<String> = header_row
        .iter()
        .skip(layout.table_start_col)
        .map(|cell| extract_text(cell).unwrap_or_default())
        .collect();

    while headers.last().is_some_and(String::is_empty) {
        headers.pop();
    }
    headers
}

/// Required columns that do not appear in `headers`
pub fn missing_required_columns(headers: &[String]) -> Vec<&'static str> {
    columns::REQUIRED
        .iter()
        .filter(|required| !headers.iter().any(|h| h == *required))
        .copied()
        .collect()
}

pub fn normalize_table(
    grid: &SheetGrid,
    layout: &ExcelLayout,
) -> Result<NormalizedTable, ConversionError> {
    let headers = read_headers(grid, layout);

    let missing = missing_required_columns(&headers);
    if !missing.is_empty() {
        return Err(ConversionError::validation(
            &grid.name,
            format!("missing required columns: {}", missing.join(", ")),
        ));
    }

    let station_idx = column_index(&headers, columns::STATION);
    let step_idx = column_index(&headers, columns::STEP);

    let mut rows = Vec::new();
    // Station cells are only filled on the first row of each station
    let mut last_station: Option<u32> = None;

    for row_idx in layout.data_start_row..grid.height() {
        let cells: Vec<Option<String>> = (0..headers.len())
            .map(|i| {
                grid.cell(row_idx, layout.table_start_col + i)
                    .and_then(extract_text)
            })
            .collect();

        if cells.iter().all(Option::is_none) {
            tracing::debug!("Sheet '{}': skipping blank row {}", grid.name, row_idx + 1);
            continue;
        }

        if let Some(station_cell) = grid.cell(row_idx, layout.table_start_col + station_idx) {
            if let Some(raw) = extract_text(station_cell) {
                last_station = Some(parse_station(&grid.name, row_idx, &raw, station_cell)?);
            }
        }

        let Some(station) = last_station else {
            tracing::debug!(
                "Sheet '{}': row {} precedes the first station, ignoring",
                grid.name,
                row_idx + 1
            );
            continue;
        };

        let step = zero_pad_step(cells[step_idx].as_deref().unwrap_or_default());

        let named: HashMap<String, String> = headers
            .iter()
            .zip(cells)
            .filter(|(name, _)| !name.is_empty())
            .filter_map(|(name, value)| value.map(|v| (name.clone(), v)))
            .collect();

        rows.push(Row::new(station, step, named));
    }

    Ok(NormalizedTable { headers, rows })
}

fn column_index(headers: &[String], name: &str) -> usize {
    // Callers check required columns first
    headers.iter().position(|h| h == name).unwrap_or_default()
}

fn parse_station(
    sheet: &str,
    row_idx: usize,
    raw: &str,
    cell: &calamine::Data,
) -> Result<u32, ConversionError> {
    extract_integer(cell)
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| {
            ConversionError::validation(
                sheet,
                format!("invalid station value '{raw}' in row {}", row_idx + 1),
            )
        })
}
