use std::fmt;

/// Structural problems that make a sheet (or the whole workbook) unconvertible.
///
/// These are reported per sheet; one bad sheet never aborts the others.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// The sheet does not follow the process plan layout
    Validation { sheet: String, message: String },
    /// The uploaded bytes are not a readable workbook
    Workbook { message: String },
    /// A generated document could not be rendered as JSON
    Serialization { sheet: String, message: String },
}

impl ConversionError {
    pub fn validation(sheet: &str, message: impl Into<String>) -> Self {
        ConversionError::Validation {
            sheet: sheet.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionError::Validation { sheet, message } => {
                write!(f, "Sheet '{sheet}': {message}")
            }
            ConversionError::Workbook { message } => write!(f, "Invalid Excel file: {message}"),
            ConversionError::Serialization { sheet, message } => {
                write!(f, "Sheet '{sheet}': failed to render document: {message}")
            }
        }
    }
}

impl std::error::Error for ConversionError {}
