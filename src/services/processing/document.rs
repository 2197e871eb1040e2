//! Operation and document assembly

use serde::Serialize;
use serde_json::Value;

use super::metadata::SheetMetadata;
use super::segments::{Segment, build_segment, cure_buffer_segment, eol_segment};
use super::stations::{Station, StationKind};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub operation_title: String,
    pub operation_name: String,
    pub operation_plm_id: String,
    pub workstation_name: String,
    pub operation_segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessPlanDocument {
    pub scope_material_number: String,
    pub scope_material_title: String,
    pub scope_material_plm_id: String,
    pub area_name: String,
    pub line_name: String,
    pub operations_definitions: Vec<Operation>,
}

pub fn build_operation(station: &Station, line_name: &str) -> Operation {
    let operation_segments = match station.kind {
        StationKind::CureBuffer => vec![cure_buffer_segment(&station.title, line_name)],
        StationKind::EndOfLine => vec![eol_segment(line_name, station.number)],
        StationKind::Standard => station
            .step_groups()
            .iter()
            .map(|group| build_segment(group, line_name))
            .collect(),
    };

    Operation {
        operation_title: station.title.clone(),
        operation_name: String::new(),
        operation_plm_id: String::new(),
        workstation_name: station.workstation_name(),
        operation_segments,
    }
}

/// Build the document for one line; `metadata` is already scoped to that line
pub fn assemble_document(metadata: &SheetMetadata, stations: &[Station]) -> ProcessPlanDocument {
    ProcessPlanDocument {
        scope_material_number: metadata.scope_material_number.clone(),
        scope_material_title: metadata.scope_material_title.clone(),
        scope_material_plm_id: metadata.scope_material_plm_id.clone(),
        area_name: metadata.area_name.clone(),
        line_name: metadata.line_name.clone(),
        operations_definitions: stations
            .iter()
            .map(|station| build_operation(station, &metadata.line_name))
            .collect(),
    }
}

impl ProcessPlanDocument {
    /// JSON tree in the shape the MES ingests, booleans as `"True"`/`"False"`
    pub fn to_mes_value(&self) -> serde_json::Result<Value> {
        let mut value = serde_json::to_value(self)?;
        stringify_booleans(&mut value);
        Ok(value)
    }
}

/// Replace every boolean leaf with its capitalized string form
pub fn stringify_booleans(value: &mut Value) {
    match value {
        Value::Bool(flag) => {
            let text = if *flag { "True" } else { "False" };
            *value = Value::String(text.to_string());
        }
        Value::Array(items) => items.iter_mut().for_each(stringify_booleans),
        Value::Object(map) => map.values_mut().for_each(stringify_booleans),
        _ => {}
    }
}

/// `{sheet}_{line}.json`, or `{sheet}.json` without a line name
pub fn output_file_name(sheet_name: &str, line_name: &str) -> String {
    if line_name.is_empty() {
        format!("{sheet_name}.json")
    } else {
        format!("{sheet_name}_{line_name}.json")
    }
}
