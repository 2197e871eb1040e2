//! Workbook to MES document conversion
//!
//! Runs every sheet through metadata extraction, table normalization, station
//! grouping and document assembly, once per line name. Sheets fail
//! independently; a failing sheet is recorded in the report and the rest of the
//! workbook is still converted.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;
use serde_json::ser::PrettyFormatter;
use utoipa::ToSchema;

use super::bundle::archive_entry_name;
use super::document::{assemble_document, output_file_name};
use super::errors::ConversionError;
use super::metadata::{SheetMetadata, extract_metadata, require_metadata_fields};
use super::stations::group_stations;
use super::structure::{SheetGrid, load_workbook};
use super::table::{NormalizedTable, normalize_table};
use super::validation::{validate_line_names, validate_sheet};
use crate::config::{ExcelLayout, MetadataPolicy};

/// One MES document produced from a (sheet, line name) pair
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct GeneratedDocument {
    pub file_name: String,
    pub sheet_name: String,
    pub line_name: String,
    #[schema(value_type = Object)]
    pub document: Value,
}

impl GeneratedDocument {
    /// The document as 4-space indented JSON
    pub fn to_pretty_json(&self) -> serde_json::Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
        self.document.serialize(&mut serializer)?;
        Ok(buffer)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SheetFailure {
    pub sheet_name: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, ToSchema)]
pub struct ConversionReport {
    pub documents: Vec<GeneratedDocument>,
    pub failures: Vec<SheetFailure>,
    /// Sheets passed over without producing anything (blank sheets in lenient mode)
    pub skipped: Vec<String>,
}

impl ConversionReport {
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Outcome of converting one sheet
#[derive(Debug, Clone, PartialEq)]
pub enum SheetOutcome {
    Converted(Vec<GeneratedDocument>),
    Skipped,
}

#[derive(Debug, Clone, Default)]
pub struct ProcessPlanConverter {
    layout: ExcelLayout,
    policy: MetadataPolicy,
}

impl ProcessPlanConverter {
    pub fn new(layout: ExcelLayout, policy: MetadataPolicy) -> Self {
        Self { layout, policy }
    }

    pub fn policy(&self) -> MetadataPolicy {
        self.policy
    }

    /// Convert every sheet of an `.xlsx` workbook held in memory.
    ///
    /// Only an unreadable workbook is an error; sheet-level problems end up in
    /// [`ConversionReport::failures`].
    pub fn convert_workbook(&self, bytes: &[u8]) -> Result<ConversionReport, ConversionError> {
        let sheets = load_workbook(bytes)?;
        Ok(self.convert_sheets(&sheets))
    }

    pub fn convert_sheets(&self, sheets: &[SheetGrid]) -> ConversionReport {
        self.convert_sheets_with(sheets, |_| {})
    }

    /// Convert `sheets` in order, calling `on_sheet` once each sheet is settled.
    ///
    /// A sheet whose output file names clash with documents already emitted by
    /// an earlier sheet fails as a whole.
    pub fn convert_sheets_with(
        &self,
        sheets: &[SheetGrid],
        mut on_sheet: impl FnMut(&SheetGrid),
    ) -> ConversionReport {
        let mut report = ConversionReport::default();
        let mut taken: HashMap<String, String> = HashMap::new();

        for grid in sheets {
            let outcome = self.convert_sheet(grid).and_then(|outcome| {
                if let SheetOutcome::Converted(documents) = &outcome {
                    claim_file_names(&mut taken, &grid.name, documents)?;
                }
                Ok(outcome)
            });

            match outcome {
                Ok(SheetOutcome::Converted(documents)) => {
                    tracing::info!(
                        "Sheet '{}': generated {} document(s)",
                        grid.name,
                        documents.len()
                    );
                    report.documents.extend(documents);
                }
                Ok(SheetOutcome::Skipped) => {
                    tracing::info!("Sheet '{}': skipped", grid.name);
                    report.skipped.push(grid.name.clone());
                }
                Err(err) => {
                    tracing::warn!("Error processing sheet '{}': {err}", grid.name);
                    report.failures.push(SheetFailure {
                        sheet_name: grid.name.clone(),
                        message: err.to_string(),
                    });
                }
            }
            on_sheet(grid);
        }

        report
    }

    pub fn convert_sheet(&self, grid: &SheetGrid) -> Result<SheetOutcome, ConversionError> {
        let strict = self.policy == MetadataPolicy::Strict;

        if grid.is_empty() && !strict {
            return Ok(SheetOutcome::Skipped);
        }
        if strict {
            validate_sheet(grid, &self.layout)?;
        }

        let fields = extract_metadata(grid, &self.layout);
        if strict {
            require_metadata_fields(&grid.name, &fields, &self.layout)?;
        }
        let metadata = SheetMetadata::from_fields(&fields);
        let line_names = self.resolve_line_names(grid, &metadata)?;

        let NormalizedTable { headers, rows } = normalize_table(grid, &self.layout)?;
        let stations = group_stations(rows);
        tracing::debug!(
            "Sheet '{}': {} column(s), {} station(s) for {} line(s)",
            grid.name,
            headers.len(),
            stations.len(),
            line_names.len()
        );

        line_names
            .iter()
            .map(|line_name| {
                let document = assemble_document(&metadata.for_line(line_name), &stations)
                    .to_mes_value()
                    .map_err(|e| ConversionError::Serialization {
                        sheet: grid.name.clone(),
                        message: e.to_string(),
                    })?;

                Ok(GeneratedDocument {
                    file_name: output_file_name(&grid.name, line_name),
                    sheet_name: grid.name.clone(),
                    line_name: line_name.clone(),
                    document,
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(SheetOutcome::Converted)
    }

    /// Line names to emit documents for, first occurrence wins on duplicates.
    ///
    /// Strict mode rejects a missing, blank or malformed name. Lenient mode drops
    /// blank entries and falls back to a single unnamed document.
    fn resolve_line_names(
        &self,
        grid: &SheetGrid,
        metadata: &SheetMetadata,
    ) -> Result<Vec<String>, ConversionError> {
        let mut names = metadata.line_names();

        if self.policy == MetadataPolicy::Strict {
            validate_line_names(&grid.name, &names)?;
        } else {
            names.retain(|name| !name.is_empty());
            if names.is_empty() {
                names.push(String::new());
            }
        }

        let mut unique: Vec<String> = Vec::with_capacity(names.len());
        for name in names {
            if unique.contains(&name) {
                tracing::warn!("Sheet '{}': duplicate line name '{name}' ignored", grid.name);
            } else {
                unique.push(name);
            }
        }
        Ok(unique)
    }
}

/// Reserve the archive entry names of one sheet's documents.
///
/// `taken` maps entry names to the sheet that produced them. Nothing is
/// reserved when any name clashes.
fn claim_file_names(
    taken: &mut HashMap<String, String>,
    sheet: &str,
    documents: &[GeneratedDocument],
) -> Result<(), ConversionError> {
    let mut claimed: Vec<String> = Vec::with_capacity(documents.len());

    for document in documents {
        let entry = archive_entry_name(&document.file_name);
        let owner = taken
            .get(&entry)
            .map(String::as_str)
            .or_else(|| claimed.contains(&entry).then_some(sheet));
        if let Some(owner) = owner {
            return Err(ConversionError::validation(
                sheet,
                format!("output file '{entry}' clashes with a document from sheet '{owner}'"),
            ));
        }
        claimed.push(entry);
    }

    for entry in claimed {
        taken.insert(entry, sheet.to_string());
    }
    Ok(())
}
