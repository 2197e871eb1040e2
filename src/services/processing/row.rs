//! Row model for the process plan step table

use std::collections::HashMap;

/// Column names as they appear in the header row of the step table
pub mod columns {
    pub const STATION: &str = "Station";
    pub const STEP: &str = "Step";
    pub const TITLE: &str = "Title";
    pub const PARTS: &str = "Parts";
    pub const QTY: &str = "Qty";
    pub const SCAN: &str = "Scan";
    pub const TRACE: &str = "Trace";
    pub const TOOLS: &str = "Tools";
    pub const PSET: &str = "Pset Program Number";
    pub const WORK_INSTRUCTION: &str = "Work Instruction";
    pub const FIXTURE: &str = "Fixture";
    pub const UNIT: &str = "Unit";
    pub const UNIT_LOWER: &str = "unit";
    pub const ALTERNATE_1: &str = "Alternate 1";
    pub const ALT_1_NAME: &str = "Alt 1 Name";
    // Several released templates carry this misspelling
    pub const ALT_1_NAME_TYPO: &str = "Atl 1 Name";
    pub const ALTERNATE_2: &str = "Alternate 2";
    pub const ALT_2_NAME: &str = "Alt 2 Name";

    pub const REQUIRED: [&str; 7] = [STATION, STEP, TITLE, PARTS, QTY, SCAN, TRACE];
}

/// Tool value that turns a step into a data-capture step instead of a material
pub const MANUAL_ENTRY_TOOL: &str = "Manual Entry";

/// The step label that marks a station's title row
pub const TITLE_STEP: &str = "000";

/// One step-table row after normalization.
///
/// Optional columns are kept as a column-name mapping; a column that is absent from
/// the sheet and a blank cell are indistinguishable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub station: u32,
    pub step: String,
    pub scan: bool,
    pub trace: bool,
    cells: HashMap<String, String>,
}

impl Row {
    pub fn new(station: u32, step: impl Into<String>, cells: HashMap<String, String>) -> Self {
        let scan = super::utils::is_true(cells.get(columns::SCAN).map(String::as_str));
        let trace = super::utils::is_true(cells.get(columns::TRACE).map(String::as_str));
        Self {
            station,
            step: step.into(),
            scan,
            trace,
            cells,
        }
    }

    /// Trimmed, non-blank value of a column
    pub fn text(&self, column: &str) -> Option<&str> {
        self.cells
            .get(column)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }

    pub fn is_title_row(&self) -> bool {
        self.step == TITLE_STEP
    }

    pub fn title(&self) -> &str {
        self.text(columns::TITLE).unwrap_or_default()
    }

    pub fn parts(&self) -> Option<&str> {
        self.text(columns::PARTS)
    }

    /// Quantity column; blank, unparseable and non-positive values all read as 1
    pub fn qty(&self) -> u32 {
        self.text(columns::QTY)
            .and_then(|q| q.parse::<f64>().ok())
            .filter(|q| q.is_finite() && *q >= 1.0)
            .map_or(1, |q| {
                // Safe cast: at least 1 and truncated to a whole number
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let whole = q.trunc().min(f64::from(u32::MAX)) as u32;
                whole
            })
    }

    pub fn tools(&self) -> Option<&str> {
        self.text(columns::TOOLS)
    }

    pub fn pset(&self) -> Option<&str> {
        self.text(columns::PSET)
    }

    pub fn work_instruction(&self) -> Option<&str> {
        self.text(columns::WORK_INSTRUCTION)
    }

    pub fn fixture(&self) -> Option<&str> {
        self.text(columns::FIXTURE)
    }

    /// Declared unit of measure, from either spelling of the column
    pub fn unit(&self) -> Option<&str> {
        self.text(columns::UNIT)
            .or_else(|| self.text(columns::UNIT_LOWER))
    }

    pub fn is_manual_entry(&self) -> bool {
        self.tools() == Some(MANUAL_ENTRY_TOOL)
    }

    /// Alternate part numbers with their optional display names
    pub fn alternates(&self) -> Vec<(&str, Option<&str>)> {
        let first = self.text(columns::ALTERNATE_1).map(|number| {
            let name = self
                .text(columns::ALT_1_NAME)
                .or_else(|| self.text(columns::ALT_1_NAME_TYPO));
            (number, name)
        });
        let second = self
            .text(columns::ALTERNATE_2)
            .map(|number| (number, self.text(columns::ALT_2_NAME)));

        first.into_iter().chain(second).collect()
    }
}
