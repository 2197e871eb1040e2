//! Metadata block extraction
//!
//! The first rows of every process plan sheet hold `label | value` pairs in two
//! fixed columns. Only labels from the required set are picked up.

use std::collections::HashMap;

use super::errors::ConversionError;
use super::structure::SheetGrid;
use super::utils::extract_text;
use crate::config::ExcelLayout;

/// Placeholder PLM id used when the sheet does not provide one
pub const DEFAULT_SCOPE_MATERIAL_PLM_ID: &str = "00000010";

/// Scope information shared by every document generated from one sheet
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SheetMetadata {
    pub scope_material_number: String,
    pub scope_material_title: String,
    pub scope_material_plm_id: String,
    pub area_name: String,
    pub line_name: String,
}

impl SheetMetadata {
    /// Resolve metadata from extracted fields, applying defaults for missing keys
    pub fn from_fields(fields: &HashMap<String, String>) -> Self {
        let get = |key: &str| fields.get(key).cloned().unwrap_or_default();
        Self {
            scope_material_number: get("scopeMaterialNumber"),
            scope_material_title: get("scopeMaterialTitle"),
            scope_material_plm_id: fields
                .get("scopeMaterialPlmId")
                .cloned()
                .unwrap_or_else(|| DEFAULT_SCOPE_MATERIAL_PLM_ID.to_string()),
            area_name: get("areaName"),
            line_name: get("lineName"),
        }
    }

    /// Every `;`-separated entry of the line name cell, trimmed, blanks included
    pub fn line_names(&self) -> Vec<String> {
        if self.line_name.trim().is_empty() {
            return Vec::new();
        }
        self.line_name
            .split(';')
            .map(|name| name.trim().to_string())
            .collect()
    }

    /// Copy of this metadata scoped to a single line
    #[must_use]
    pub fn for_line(&self, line_name: &str) -> Self {
        Self {
            line_name: line_name.to_string(),
            ..self.clone()
        }
    }
}

/// Read recognised `label -> value` pairs out of the metadata block.
///
/// Labels are trimmed; a label that is blank or not in the required set is
/// ignored. A recognised label with a blank value maps to an empty string.
pub fn extract_metadata(grid: &SheetGrid, layout: &ExcelLayout) -> HashMap<String, String> {
    let mut fields = HashMap::new();

    for row in 0..layout.meta_rows {
        let Some(label) = grid
            .cell(row, layout.meta_col_name)
            .and_then(extract_text)
        else {
            continue;
        };

        if layout.required_meta_fields.iter().any(|f| *f == label) {
            let value = grid
                .cell(row, layout.meta_col_value)
                .and_then(extract_text)
                .unwrap_or_default();
            fields.insert(label, value);
        }
    }

    fields
}

/// Fail when a required label is absent from the block altogether.
///
/// A present label with a blank value passes; only `lineName` is checked for
/// content, by the line name validator.
pub fn require_metadata_fields(
    sheet: &str,
    fields: &HashMap<String, String>,
    layout: &ExcelLayout,
) -> Result<(), ConversionError> {
    let mut missing: Vec<&str> = layout
        .required_meta_fields
        .iter()
        .filter(|f| !fields.contains_key(f.as_str()))
        .map(String::as_str)
        .collect();

    if missing.is_empty() {
        return Ok(());
    }

    missing.sort_unstable();
    Err(ConversionError::validation(
        sheet,
        format!("missing required metadata fields: {}", missing.join(", ")),
    ))
}
