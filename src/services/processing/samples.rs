//! Sample definition templates and the rules that pick them
//!
//! Every standard step gets a `Confirm` sample. A step's first row may add one more:
//! a `ManualEntry` capture when its tool is "Manual Entry", or a `Torque` capture
//! when it names both a tool and a pset program. Cure-buffer and end-of-line
//! stations use fixed templates instead.

use indexmap::IndexMap;
use serde::ser::{Serialize, Serializer};

use super::row::Row;

/// Placeholder written wherever the MES expects a PLM id we do not track
pub const PLM_ID_PLACEHOLDER: &str = "PLM_ID";

const TIMESTAMP_FORMAT: &str = "YYYY-MM-DD HH:mm:ss UTC";

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DataType {
    Boolean,
    String,
    Real,
    Integer,
}

/// Bound or nominal value of an attribute; blank bounds are empty strings
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum Limit {
    Text(String),
    Number(f64),
}

impl Limit {
    pub fn blank() -> Self {
        Limit::Text(String::new())
    }

    pub fn text(value: &str) -> Self {
        Limit::Text(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AttributeSchema {
    pub data_type: DataType,
    pub required: bool,
    pub description: String,
    pub format: String,
    pub order: u32,
    pub minimum_value: Limit,
    pub maximum_value: Limit,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nominal_value: Option<Limit>,
}

impl AttributeSchema {
    /// Required attribute with blank format and bounds
    pub fn required(data_type: DataType, description: &str, order: u32) -> Self {
        Self {
            data_type,
            required: true,
            description: description.to_string(),
            format: String::new(),
            order,
            minimum_value: Limit::blank(),
            maximum_value: Limit::blank(),
            nominal_value: None,
        }
    }

    #[must_use]
    pub fn with_format(mut self, format: &str) -> Self {
        self.format = format.to_string();
        self
    }

    #[must_use]
    pub fn with_range(mut self, minimum: Limit, maximum: Limit) -> Self {
        self.minimum_value = minimum;
        self.maximum_value = maximum;
        self
    }

    #[must_use]
    pub fn with_nominal(mut self, nominal: Limit) -> Self {
        self.nominal_value = Some(nominal);
        self
    }
}

/// Attribute schemas keyed by attribute name, serialized in insertion order
pub type Attributes = IndexMap<String, AttributeSchema>;

/// Which end of a cure hold a timestamp sample captures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CureMark {
    Start,
    End,
}

impl CureMark {
    fn attribute(self) -> &'static str {
        match self {
            CureMark::Start => "StartTimestamp",
            CureMark::End => "EndTimestamp",
        }
    }
}

/// One inspection, test or data-capture instruction attached to a segment
#[derive(Debug, Clone, PartialEq)]
pub enum SampleDefinition {
    Confirm {
        name: String,
    },
    Torque {
        name: String,
        tool: String,
        pset: String,
        qty: u32,
    },
    ManualEntry {
        name: String,
        field: String,
        qty: u32,
    },
    EolTester {
        name: String,
    },
    CureBuffer {
        name: String,
        sample_class: String,
        mark: CureMark,
    },
}

#[derive(serde::Serialize)]
struct TorqueSettings<'a> {
    #[serde(rename = "pSet")]
    p_set: &'a str,
}

/// Wire shape shared by every sample class
#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct SampleRecord<'a> {
    instructions: String,
    sample_definition_name: &'a str,
    plm_id: &'static str,
    sample_class: &'a str,
    sample_qty: u32,
    attributes: Attributes,
    #[serde(skip_serializing_if = "Option::is_none")]
    settings: Option<TorqueSettings<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_resource_instance: Option<&'a str>,
}

impl SampleDefinition {
    pub fn name(&self) -> &str {
        match self {
            SampleDefinition::Confirm { name }
            | SampleDefinition::Torque { name, .. }
            | SampleDefinition::ManualEntry { name, .. }
            | SampleDefinition::EolTester { name }
            | SampleDefinition::CureBuffer { name, .. } => name,
        }
    }

    pub fn sample_class(&self) -> &str {
        match self {
            SampleDefinition::Confirm { .. } => "Confirm",
            SampleDefinition::Torque { .. } => "Torque",
            SampleDefinition::ManualEntry { .. } => "Manual Entry",
            SampleDefinition::EolTester { .. } => "EOL_Tester",
            SampleDefinition::CureBuffer { sample_class, .. } => sample_class,
        }
    }

    pub fn sample_qty(&self) -> u32 {
        match self {
            SampleDefinition::Torque { qty, .. } | SampleDefinition::ManualEntry { qty, .. } => {
                *qty
            }
            _ => 1,
        }
    }

    pub fn instructions(&self) -> String {
        match self {
            SampleDefinition::Confirm { .. } => "Next?".to_string(),
            SampleDefinition::Torque { .. } => "Torque to specification".to_string(),
            SampleDefinition::ManualEntry { field, .. } => format!("Enter {field}"),
            SampleDefinition::EolTester { .. } => "Run end of line test".to_string(),
            SampleDefinition::CureBuffer { mark, .. } => match mark {
                CureMark::Start => "Start cure timer".to_string(),
                CureMark::End => "End cure timer".to_string(),
            },
        }
    }

    pub fn attributes(&self) -> Attributes {
        match self {
            SampleDefinition::Confirm { .. } => confirm_attributes(),
            SampleDefinition::Torque { .. } => torque_attributes(),
            SampleDefinition::ManualEntry { field, .. } => Attributes::from([(
                field.clone(),
                AttributeSchema::required(DataType::Real, field, 1).with_format("#0.00"),
            )]),
            SampleDefinition::EolTester { .. } => eol_attributes(),
            SampleDefinition::CureBuffer { mark, .. } => Attributes::from([(
                mark.attribute().to_string(),
                AttributeSchema::required(
                    DataType::String,
                    match mark {
                        CureMark::Start => "Time the part entered the cure buffer",
                        CureMark::End => "Time the part left the cure buffer",
                    },
                    1,
                )
                .with_format(TIMESTAMP_FORMAT),
            )]),
        }
    }
}

impl Serialize for SampleDefinition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (settings, tool_resource_instance) = match self {
            SampleDefinition::Torque { tool, pset, .. } => {
                (Some(TorqueSettings { p_set: pset }), Some(tool.as_str()))
            }
            _ => (None, None),
        };

        SampleRecord {
            instructions: self.instructions(),
            sample_definition_name: self.name(),
            plm_id: PLM_ID_PLACEHOLDER,
            sample_class: self.sample_class(),
            sample_qty: self.sample_qty(),
            attributes: self.attributes(),
            settings,
            tool_resource_instance,
        }
        .serialize(serializer)
    }
}

fn confirm_attributes() -> Attributes {
    Attributes::from([(
        "PassFail".to_string(),
        AttributeSchema::required(DataType::Boolean, "STRING", 1)
            .with_format("#0.00")
            .with_range(Limit::text("NUMERIC"), Limit::text("NUMERIC")),
    )])
}

fn torque_attributes() -> Attributes {
    let mut attributes = Attributes::new();
    attributes.insert(
        "PassFail".to_string(),
        AttributeSchema::required(DataType::Boolean, "Tool reported OK", 1),
    );
    attributes.insert(
        "Torque".to_string(),
        AttributeSchema::required(DataType::Real, "Final torque (Nm)", 2)
            .with_format("#0.00")
            .with_range(Limit::Number(1.3), Limit::Number(1.7))
            .with_nominal(Limit::Number(1.5)),
    );
    attributes.insert(
        "Angle".to_string(),
        AttributeSchema::required(DataType::Real, "Final angle (deg)", 3).with_format("#0.0"),
    );
    attributes.insert(
        "PSet".to_string(),
        AttributeSchema::required(DataType::Integer, "Tool program number", 4),
    );
    attributes
}

fn eol_attributes() -> Attributes {
    use DataType::{Integer, String as Text};

    let fields: [(&str, DataType, &str, &str); 15] = [
        ("testUUID", Text, "Defined by Test SW", ""),
        ("testType", Text, "Test type, e.g. battery-pre-potting", ""),
        ("testStatus", Text, "Status of test: PASS, FAIL, or ERROR", ""),
        (
            "testErrorCode",
            Integer,
            "Classifies type of error encountered (e.g., 0 if none)",
            "",
        ),
        ("testErrors", Text, "List of errors separated by semicolon", ""),
        ("rejectCode", Integer, "Reject code classifying error type", ""),
        (
            "rejectReason",
            Text,
            "List of failed test parameters separated by semicolon",
            "",
        ),
        ("testRevision", Text, "Revision code", ""),
        (
            "testCount",
            Integer,
            "Number of tests run since permission granted",
            "",
        ),
        (
            "testTimestamp",
            Text,
            "Timestamp in 'YYYY-MM-DD HH:MM:SS UTC' format",
            TIMESTAMP_FORMAT,
        ),
        (
            "testDuration",
            Text,
            "Duration of test in 'HH:MM:SS' format",
            "HH:MM:SS",
        ),
        ("urlString", Text, "URL to detailed test report", "URL"),
        ("operatorUserName", Text, "User name of operator starting tests", ""),
        ("operatorLevel", Text, "Operator level, e.g., OPERATOR or ADMIN", ""),
        (
            "testMetadata",
            Text,
            "Catch-all JSON string with additional test info",
            "JSON string",
        ),
    ];

    fields
        .iter()
        .zip(1u32..)
        .map(|(&(name, data_type, description, format), order)| {
            (
                name.to_string(),
                AttributeSchema::required(data_type, description, order).with_format(format),
            )
        })
        .collect()
}

/// `{line}{suffix}`, or empty when the sheet has no line name
fn line_scoped_name(line_name: &str, suffix: &str) -> String {
    if line_name.is_empty() {
        String::new()
    } else {
        format!("{line_name}{suffix}")
    }
}

/// Samples for a standard step, decided from the step's first row
pub fn resolve_step_samples(first: &Row, line_name: &str) -> Vec<SampleDefinition> {
    let mut samples = vec![SampleDefinition::Confirm {
        name: line_scoped_name(line_name, "Confirm"),
    }];

    if first.is_manual_entry() {
        samples.push(SampleDefinition::ManualEntry {
            name: line_scoped_name(line_name, "ManualEntry"),
            field: first.parts().unwrap_or("ManualEntry").to_string(),
            qty: first.qty(),
        });
    } else if let (Some(tool), Some(pset)) = (first.tools(), first.pset()) {
        samples.push(SampleDefinition::Torque {
            name: line_scoped_name(line_name, "Torque"),
            tool: tool.to_string(),
            pset: pset.to_string(),
            qty: first.qty(),
        });
    }

    samples
}

/// Sample class for a cure-buffer station: the title minus "buffer" and whitespace
pub fn cure_buffer_class(operation_title: &str) -> String {
    let stripped: String = operation_title
        .replace("buffer", "")
        .replace("Buffer", "")
        .split_whitespace()
        .collect();

    if stripped.chars().count() < 3 {
        "CureBuffer".to_string()
    } else {
        stripped
    }
}

/// Start and end timestamp samples for a cure-buffer station
pub fn cure_buffer_samples(operation_title: &str, line_name: &str) -> Vec<SampleDefinition> {
    let sample_class = cure_buffer_class(operation_title);
    [CureMark::Start, CureMark::End]
        .into_iter()
        .map(|mark| SampleDefinition::CureBuffer {
            name: line_scoped_name(line_name, &format!("{sample_class}{}", mark.attribute())),
            sample_class: sample_class.clone(),
            mark,
        })
        .collect()
}

/// The tester sample of an end-of-line station
pub fn eol_sample(line_name: &str, station: u32) -> SampleDefinition {
    SampleDefinition::EolTester {
        name: line_scoped_name(line_name, &format!("S{station:03}EOLTester")),
    }
}
