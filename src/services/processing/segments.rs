//! Segment construction for each station kind

use serde::Serialize;

use super::row::Row;
use super::samples::{
    PLM_ID_PLACEHOLDER, SampleDefinition, cure_buffer_samples, eol_sample, resolve_step_samples,
};
use super::stations::StepGroup;

pub const SCAN_FIXTURE_ACTION: &str = "Scan Fixture";
pub const EOL_SEGMENT_TITLE: &str = "EOL Testing";
const DEFAULT_UNITS: &str = "each";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlternateMaterial {
    pub material_number: String,
    pub material_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    #[serde(rename = "inputMaterialPMlmId")]
    pub input_material_plm_id: String,
    pub material_name: String,
    pub quantity: u32,
    pub material_number: String,
    pub material_title: String,
    pub units: String,
    pub scan: bool,
    pub parent_identifier: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alternates: Vec<AlternateMaterial>,
}

impl Material {
    /// Material consumed by a row, if the row names a part and is not a data-capture step
    pub fn from_row(row: &Row) -> Option<Self> {
        if row.is_manual_entry() {
            return None;
        }
        let part = row.parts()?;

        Some(Self {
            input_material_plm_id: PLM_ID_PLACEHOLDER.to_string(),
            material_name: String::new(),
            quantity: row.qty(),
            material_number: part.to_string(),
            material_title: String::new(),
            units: row.unit().unwrap_or(DEFAULT_UNITS).to_string(),
            scan: row.scan,
            parent_identifier: row.trace,
            alternates: row
                .alternates()
                .into_iter()
                .map(|(number, name)| AlternateMaterial {
                    material_number: number.to_string(),
                    material_name: name.unwrap_or_default().to_string(),
                })
                .collect(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomAction {
    pub action_type: String,
    pub action_target: String,
    pub action_settings: serde_json::Map<String, serde_json::Value>,
}

impl CustomAction {
    pub fn scan_fixture(fixture: &str) -> Self {
        Self {
            action_type: SCAN_FIXTURE_ACTION.to_string(),
            action_target: fixture.trim().to_string(),
            action_settings: serde_json::Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkInstruction {
    pub pdf_link: String,
    pub plm_id: String,
}

impl WorkInstruction {
    pub fn new(pdf_link: &str) -> Self {
        Self {
            pdf_link: pdf_link.to_string(),
            plm_id: PLM_ID_PLACEHOLDER.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub segment_title: String,
    pub segment_name: String,
    pub segment_plm_id: String,
    pub segment_sequence: u32,
    pub operation_input_materials: Vec<Material>,
    pub sample_definitions: Vec<SampleDefinition>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub custom_actions: Vec<CustomAction>,
    pub work_instruction: WorkInstruction,
}

impl Segment {
    fn titled(title: &str, samples: Vec<SampleDefinition>) -> Self {
        Self {
            segment_title: title.to_string(),
            segment_name: String::new(),
            segment_plm_id: String::new(),
            segment_sequence: 0,
            operation_input_materials: Vec::new(),
            sample_definitions: samples,
            custom_actions: Vec::new(),
            work_instruction: WorkInstruction::new(""),
        }
    }
}

/// One segment from a group of rows sharing a step
pub fn build_segment(group: &StepGroup<'_>, line_name: &str) -> Segment {
    let first = group.first();

    let mut segment = Segment::titled(first.title(), resolve_step_samples(first, line_name));
    segment.operation_input_materials = group
        .rows
        .iter()
        .copied()
        .filter_map(Material::from_row)
        .collect();
    segment.custom_actions = first
        .fixture()
        .map(CustomAction::scan_fixture)
        .into_iter()
        .collect();
    segment.work_instruction = WorkInstruction::new(first.work_instruction().unwrap_or_default());
    segment
}

/// The fixed tester segment of an end-of-line station
pub fn eol_segment(line_name: &str, station: u32) -> Segment {
    Segment::titled(EOL_SEGMENT_TITLE, vec![eol_sample(line_name, station)])
}

/// The timestamp segment of a cure-buffer station
pub fn cure_buffer_segment(operation_title: &str, line_name: &str) -> Segment {
    Segment::titled(
        operation_title,
        cure_buffer_samples(operation_title, line_name),
    )
}
