//! Shared test helpers for building process plan workbooks and HTTP requests
//!
//! `PlanSheet` lays a sheet out the way released process plan templates do:
//! metadata labels in D1:E5, the step table header in row 8 from column B and
//! step rows below it.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use calamine::Data;
use rust_xlsxwriter::Workbook;
use serde_json::{Value, json};

use crate::config::ExcelLayout;
use crate::services::processing::structure::SheetGrid;

pub const STANDARD_HEADERS: [&str; 11] = [
    "Station",
    "Step",
    "Title",
    "Parts",
    "Qty",
    "Scan",
    "Trace",
    "Tools",
    "Pset Program Number",
    "Work Instruction",
    "Fixture",
];

const MULTIPART_BOUNDARY: &str = "test_boundary_process_plan";

pub fn num(value: f64) -> Data {
    Data::Float(value)
}

pub fn text(value: &str) -> Data {
    Data::String(value.to_string())
}

/// Builder for a single process plan sheet
#[derive(Debug, Clone)]
pub struct PlanSheet {
    name: String,
    metadata: Vec<(String, String)>,
    headers: Vec<String>,
    rows: Vec<Vec<(String, Data)>>,
}

impl PlanSheet {
    /// Sheet with the standard header row and a complete metadata block
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            metadata: [
                ("scopeMaterialNumber", "200006524A"),
                ("scopeMaterialTitle", "Hand Assembly"),
                ("scopeMaterialPlmId", "00000042"),
                ("areaName", "Hands"),
                ("lineName", "Citrine1"),
            ]
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect(),
            headers: STANDARD_HEADERS.iter().map(ToString::to_string).collect(),
            rows: Vec::new(),
        }
    }

    /// Sheet without a single cell
    pub fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            metadata: Vec::new(),
            headers: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn metadata(mut self, label: &str, value: &str) -> Self {
        match self.metadata.iter_mut().find(|(l, _)| l == label) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.metadata.push((label.to_string(), value.to_string())),
        }
        self
    }

    pub fn without_metadata(mut self, label: &str) -> Self {
        self.metadata.retain(|(l, _)| l != label);
        self
    }

    pub fn headers(mut self, headers: &[&str]) -> Self {
        self.headers = headers.iter().map(ToString::to_string).collect();
        self
    }

    /// Append a step row; cells are addressed by header name
    pub fn row(mut self, cells: &[(&str, Data)]) -> Self {
        self.rows.push(
            cells
                .iter()
                .map(|(column, value)| ((*column).to_string(), value.clone()))
                .collect(),
        );
        self
    }

    pub fn grid(&self) -> SheetGrid {
        if self.metadata.is_empty() && self.headers.is_empty() && self.rows.is_empty() {
            return SheetGrid::new(self.name.clone(), Vec::new());
        }

        let layout = ExcelLayout::default();
        let width = (layout.table_start_col + self.headers.len()).max(layout.meta_col_value + 1);
        let height = layout.data_start_row + self.rows.len();
        let mut rows = vec![vec![Data::Empty; width]; height];

        for (i, (label, value)) in self.metadata.iter().enumerate() {
            rows[i][layout.meta_col_name] = text(label);
            rows[i][layout.meta_col_value] = text(value);
        }

        for (i, header) in self.headers.iter().enumerate() {
            rows[layout.header_row][layout.table_start_col + i] = text(header);
        }

        for (offset, cells) in self.rows.iter().enumerate() {
            for (column, value) in cells {
                let index = self
                    .headers
                    .iter()
                    .position(|h| h == column)
                    .unwrap_or_else(|| panic!("Unknown column '{column}' in test sheet"));
                rows[layout.data_start_row + offset][layout.table_start_col + index] =
                    value.clone();
            }
        }

        SheetGrid::new(self.name.clone(), rows)
    }
}

/// Render sheets into an in-memory `.xlsx` workbook
pub fn workbook_bytes(sheets: &[PlanSheet]) -> Vec<u8> {
    let mut workbook = Workbook::new();

    for sheet in sheets {
        let grid = sheet.grid();
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(&grid.name)
            .expect("Failed to name worksheet");

        for (r, row) in grid.rows.iter().enumerate() {
            let r = u32::try_from(r).expect("Row index out of range");
            for (c, cell) in row.iter().enumerate() {
                let c = u16::try_from(c).expect("Column index out of range");
                let written = match cell {
                    Data::String(s) if s.is_empty() => continue,
                    Data::String(s) => worksheet.write_string(r, c, s).map(|_| ()),
                    Data::Float(f) => worksheet.write_number(r, c, *f).map(|_| ()),
                    #[allow(clippy::cast_precision_loss)]
                    Data::Int(i) => worksheet.write_number(r, c, *i as f64).map(|_| ()),
                    Data::Bool(b) => worksheet.write_boolean(r, c, *b).map(|_| ()),
                    _ => continue,
                };
                written.expect("Failed to write test cell");
            }
        }
    }

    workbook
        .save_to_buffer()
        .expect("Failed to render test workbook")
}

/// Extract response body as JSON for testing
pub async fn extract_response_body(response: axum::response::Response) -> (StatusCode, Value) {
    use axum::body::to_bytes;

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    let body: Value = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| json!({"error": "Invalid JSON response"}));
    (status, body)
}

/// A multipart form POST with text fields and an optional file part named `file`
pub fn multipart_request(
    uri: &str,
    fields: &[(&str, &str)],
    file: Option<(&str, &[u8])>,
) -> Request<Body> {
    let boundary = MULTIPART_BOUNDARY;
    let mut body: Vec<u8> = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }

    if let Some((filename, content)) = file {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/vnd.openxmlformats-officedocument.spreadsheetml.sheet\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .expect("Failed to build multipart request")
}
