//! Health-record import: XML documents in, partial health records out.
//!
//! Two entry points share one structural XML pass (`document`):
//! - `parse_health_xml` maps free-form tag names through the alias table
//! - `parse_apple_health` reads `<Record type=".." value="..">` exports

pub mod aliases;
pub mod apple_health;
pub mod document;
pub mod xml;

pub use aliases::*;
pub use apple_health::*;
pub use xml::*;

use serde::Serialize;
use thiserror::Error;

use crate::models::{HealthField, PartialHealthRecord};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    /// The text is not well-formed XML. Nothing is imported.
    #[error("Invalid XML format: {0}")]
    MalformedXml(String),

    /// Well-formed XML without a single usable health field.
    #[error("No recognized health fields found in XML")]
    NoRecognizedFields,
}

/// Outcome of one successful import call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub parsed_data: PartialHealthRecord,
    pub field_count: usize,
}

impl ImportResult {
    pub(crate) fn from_record(parsed_data: PartialHealthRecord) -> Result<Self, ImportError> {
        let field_count = parsed_data.len();
        if field_count == 0 {
            return Err(ImportError::NoRecognizedFields);
        }
        Ok(Self {
            parsed_data,
            field_count,
        })
    }

    /// Critical fields this import did not supply.
    pub fn missing_critical(&self) -> Vec<HealthField> {
        missing_critical(&self.parsed_data)
    }
}

/// Critical fields absent from `record`, in `CRITICAL_FIELDS` order.
pub fn missing_critical(record: &PartialHealthRecord) -> Vec<HealthField> {
    CRITICAL_FIELDS
        .iter()
        .copied()
        .filter(|field| !record.contains(*field))
        .collect()
}

/// User-facing warning for missing critical fields, `None` when all are present.
pub fn missing_critical_warning(missing: &[HealthField]) -> Option<String> {
    if missing.is_empty() {
        return None;
    }
    let names: Vec<&str> = missing.iter().map(HealthField::as_str).collect();
    Some(format!("Critical fields missing: {}", names.join(", ")))
}
