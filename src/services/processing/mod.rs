//! Process plan workbook conversion engine
//!
//! Pure and synchronous: bytes in, MES documents out. Callers in async contexts
//! run it on the blocking pool.

pub mod bundle;
pub mod converter;
pub mod document;
pub mod errors;
pub mod metadata;
pub mod row;
pub mod samples;
pub mod segments;
pub mod stations;
pub mod structure;
pub mod table;
pub mod utils;
pub mod validation;

pub use converter::{ConversionReport, GeneratedDocument, ProcessPlanConverter, SheetFailure};
pub use errors::ConversionError;
