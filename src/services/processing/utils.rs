//! Cell coercion helpers for process plan sheets
//!
//! Spreadsheet cells arrive as loosely typed `calamine::Data`. Everything the
//! converter needs is either text, a whole number or a "true"-ish flag, and a blank
//! cell is always treated the same as a missing one.

use calamine::Data;

/// Render a cell the way it reads in the sheet, trimmed. Blank and error cells yield `None`.
pub fn extract_text(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::Empty | Data::Error(_) => return None,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_number(*f),
        Data::Bool(b) => if *b { "True" } else { "False" }.to_string(),
        Data::DateTime(dt) => format_number(dt.as_f64()),
    };

    if text.is_empty() { None } else { Some(text) }
}

/// Whole-valued floats print without a fractional part so that `10.0` reads as `10`.
fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        // Safe cast: finite, integral and well inside the i64 range
        #[allow(clippy::cast_possible_truncation)]
        let whole = value as i64;
        whole.to_string()
    } else {
        value.to_string()
    }
}

/// Parse a number out of a cell, accepting numeric text such as `" 3 "`.
pub fn extract_number(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(f) => Some(*f),
        #[allow(clippy::cast_precision_loss)]
        Data::Int(i) => Some(*i as f64),
        _ => extract_text(cell).and_then(|s| s.parse::<f64>().ok()),
    }
    .filter(|v| v.is_finite())
}

/// Extract a whole number, truncating any fractional part like `int()` does.
pub fn extract_integer(cell: &Data) -> Option<i64> {
    let value = extract_number(cell)?.trunc();
    if value >= -9.0e15 && value <= 9.0e15 {
        // Safe cast: checked bounds and finiteness above
        #[allow(clippy::cast_possible_truncation)]
        Some(value as i64)
    } else {
        None
    }
}

/// Flag columns hold `TRUE`/`true`/`True`; anything else, blank included, is false.
pub fn is_true(text: Option<&str>) -> bool {
    text.is_some_and(|t| t.trim().eq_ignore_ascii_case("true"))
}

/// Left-pad a step label with zeros to three characters.
///
/// A blank step pads to `"000"`, the same label that marks a station title row.
pub fn zero_pad_step(step: &str) -> String {
    let len = step.chars().count();
    if len >= 3 {
        step.to_string()
    } else {
        format!("{}{step}", "0".repeat(3 - len))
    }
}
