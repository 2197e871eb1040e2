//! Structural checks for sheets, line names and finished documents

use serde_json::Value;

use super::errors::ConversionError;
use super::structure::SheetGrid;
use super::table::{missing_required_columns, read_headers};
use crate::common::errors::BusinessError;
use crate::config::ExcelLayout;
use crate::validation_error;

const MIN_COLUMNS: usize = 5;
const INVALID_LINE_NAME_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Reject a sheet whose shape cannot hold a process plan
pub fn validate_sheet(grid: &SheetGrid, layout: &ExcelLayout) -> Result<(), ConversionError> {
    let sheet = grid.name.as_str();

    if grid.is_empty() {
        return Err(ConversionError::validation(sheet, "sheet is empty"));
    }
    if grid.width() < MIN_COLUMNS {
        return Err(ConversionError::validation(
            sheet,
            format!("sheet must have at least {MIN_COLUMNS} columns"),
        ));
    }
    if grid.height() < layout.data_start_row {
        return Err(ConversionError::validation(
            sheet,
            format!("sheet must have at least {} rows", layout.data_start_row),
        ));
    }
    if layout.header_row >= grid.height() {
        return Err(ConversionError::validation(sheet, "missing header row"));
    }

    let headers = read_headers(grid, layout);
    let missing = missing_required_columns(&headers);
    if !missing.is_empty() {
        return Err(ConversionError::validation(
            sheet,
            format!("missing required columns: {}", missing.join(", ")),
        ));
    }

    if layout.data_start_row >= grid.height() {
        return Err(ConversionError::validation(sheet, "sheet has no data rows"));
    }

    Ok(())
}

pub fn validate_line_names(sheet: &str, line_names: &[String]) -> Result<(), ConversionError> {
    if line_names.is_empty() {
        return Err(ConversionError::validation(
            sheet,
            "at least one line name is required",
        ));
    }

    for name in line_names {
        if name.trim().is_empty() {
            return Err(ConversionError::validation(sheet, "line names cannot be empty"));
        }
        if let Some(c) = name.chars().find(|c| INVALID_LINE_NAME_CHARS.contains(c)) {
            return Err(ConversionError::validation(
                sheet,
                format!("line name '{name}' contains invalid character: {c}"),
            ));
        }
    }

    Ok(())
}

/// Check the skeleton of a document before it is sent to the MES
pub fn validate_document(document: &Value) -> Result<(), BusinessError> {
    for field in ["scopeMaterialNumber", "operationsDefinitions"] {
        if document.get(field).is_none() {
            return Err(validation_error!(
                field,
                format!("missing required field: {field}")
            ));
        }
    }

    let Some(operations) = document["operationsDefinitions"].as_array() else {
        return Err(validation_error!(
            "operationsDefinitions",
            "operationsDefinitions must be a list"
        ));
    };

    for (i, operation) in operations.iter().enumerate() {
        for field in ["operationTitle", "workstationName", "operationSegments"] {
            if operation.get(field).is_none() {
                return Err(validation_error!(
                    format!("operationsDefinitions[{i}]"),
                    format!("operation {i} missing required field: {field}")
                ));
            }
        }

        let Some(segments) = operation["operationSegments"].as_array() else {
            return Err(validation_error!(
                format!("operationsDefinitions[{i}]"),
                format!("operation {i} operationSegments must be a list")
            ));
        };

        for (j, segment) in segments.iter().enumerate() {
            validate_segment(segment, i, j)?;
        }
    }

    Ok(())
}

fn validate_segment(segment: &Value, operation: usize, index: usize) -> Result<(), BusinessError> {
    let location = format!("operationsDefinitions[{operation}].operationSegments[{index}]");

    if segment.get("segmentTitle").is_none() {
        return Err(validation_error!(
            location,
            format!("segment {operation}.{index} missing required field: segmentTitle")
        ));
    }
    for field in ["operationInputMaterials", "sampleDefinitions"] {
        match segment.get(field) {
            None => {
                return Err(validation_error!(
                    location,
                    format!("segment {operation}.{index} missing required field: {field}")
                ));
            }
            Some(value) if !value.is_array() => {
                return Err(validation_error!(
                    location,
                    format!("segment {operation}.{index} {field} must be a list")
                ));
            }
            Some(_) => {}
        }
    }

    Ok(())
}

/// Reduce a user-supplied name to a safe ASCII file name component.
///
/// Path separators and whitespace runs become `_`, anything outside
/// `[A-Za-z0-9._-]` is dropped and leading or trailing dots and underscores are
/// stripped. May return an empty string.
pub fn sanitize_filename(name: &str) -> String {
    let spaced = name.replace(['/', '\\'], " ");
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");

    joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect::<String>()
        .trim_matches(['.', '_'])
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{PlanSheet, num};
    use calamine::Data;
    use serde_json::json;

    #[test]
    fn test_valid_sheet_passes() {
        let grid = PlanSheet::new("Plan")
            .row(&[("Station", num(1.0)), ("Step", num(10.0))])
            .grid();
        assert!(validate_sheet(&grid, &ExcelLayout::default()).is_ok());
    }

    #[test]
    fn test_empty_sheet_rejected() {
        let grid = SheetGrid::new("Blank", vec![vec![Data::Empty; 3]; 2]);
        let err = validate_sheet(&grid, &ExcelLayout::default()).unwrap_err();
        assert_eq!(err, ConversionError::validation("Blank", "sheet is empty"));
    }

    #[test]
    fn test_narrow_and_short_sheets_rejected() {
        let narrow = SheetGrid::new("Narrow", vec![vec![Data::String("x".into()); 3]; 10]);
        assert!(
            validate_sheet(&narrow, &ExcelLayout::default())
                .unwrap_err()
                .to_string()
                .contains("at least 5 columns")
        );

        let short = SheetGrid::new("Short", vec![vec![Data::String("x".into()); 6]; 4]);
        assert!(
            validate_sheet(&short, &ExcelLayout::default())
                .unwrap_err()
                .to_string()
                .contains("at least 8 rows")
        );
    }

    #[test]
    fn test_sheet_without_data_rows_rejected() {
        let grid = PlanSheet::new("Plan").grid();
        let err = validate_sheet(&grid, &ExcelLayout::default()).unwrap_err();
        assert_eq!(err, ConversionError::validation("Plan", "sheet has no data rows"));
    }

    #[test]
    fn test_sheet_missing_columns_rejected() {
        let grid = PlanSheet::new("Plan")
            .headers(&["Station", "Step", "Title", "Qty", "Scan"])
            .row(&[("Station", num(1.0))])
            .grid();
        let err = validate_sheet(&grid, &ExcelLayout::default()).unwrap_err();
        assert!(err.to_string().contains("Parts, Trace"));
    }

    #[test]
    fn test_line_names() {
        let names = |items: &[&str]| items.iter().map(ToString::to_string).collect::<Vec<_>>();

        assert!(validate_line_names("Plan", &names(&["Citrine1", "Citrine2"])).is_ok());
        assert!(validate_line_names("Plan", &[]).is_err());
        assert!(validate_line_names("Plan", &names(&["Citrine1", " "])).is_err());

        let err = validate_line_names("Plan", &names(&["Line/2"])).unwrap_err();
        assert!(err.to_string().contains("invalid character: /"));
    }

    #[test]
    fn test_document_validation() {
        let valid = json!({
            "scopeMaterialNumber": "200006524A",
            "operationsDefinitions": [{
                "operationTitle": "Frame",
                "workstationName": "S001",
                "operationSegments": [{
                    "segmentTitle": "Place",
                    "operationInputMaterials": [],
                    "sampleDefinitions": []
                }]
            }]
        });
        assert!(validate_document(&valid).is_ok());

        let mut missing_title = valid.clone();
        missing_title["operationsDefinitions"][0]
            .as_object_mut()
            .unwrap()
            .remove("operationTitle");
        let err = validate_document(&missing_title).unwrap_err();
        assert!(err.to_string().contains("operation 0 missing required field: operationTitle"));

        let mut bad_samples = valid.clone();
        bad_samples["operationsDefinitions"][0]["operationSegments"][0]["sampleDefinitions"] =
            json!("none");
        let err = validate_document(&bad_samples).unwrap_err();
        assert!(err.to_string().contains("segment 0.0 sampleDefinitions must be a list"));

        let err = validate_document(&json!({"scopeMaterialNumber": "X"})).unwrap_err();
        assert!(err.to_string().contains("operationsDefinitions"));
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("Hand Assembly"), "Hand_Assembly");
        assert_eq!(sanitize_filename("../../etc/passwd"), "etc_passwd");
        assert_eq!(sanitize_filename("plan (v2).xlsx"), "plan_v2.xlsx");
        assert_eq!(sanitize_filename("Åland"), "land");
        assert_eq!(sanitize_filename("..."), "");
    }
}
