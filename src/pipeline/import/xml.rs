use crate::models::PartialHealthRecord;

use super::aliases::lookup_alias;
use super::document::read_elements;
use super::{ImportError, ImportResult};

/// Import a free-form XML health record.
///
/// Every element at any depth whose tag name (case-insensitive) is a known
/// alias contributes its trimmed direct text, read as an integer prefix.
/// Unknown tags, empty text and non-numeric text are skipped. When a field
/// appears more than once the later element wins.
pub fn parse_health_xml(xml: &str) -> Result<ImportResult, ImportError> {
    let elements = read_elements(xml)?;
    let mut record = PartialHealthRecord::new();

    for element in &elements {
        let Some(field) = lookup_alias(&element.name) else {
            continue;
        };
        let text = element.text.trim();
        if text.is_empty() {
            continue;
        }
        match parse_integer_prefix(text) {
            Some(value) => {
                if let Some(previous) = record.insert(field, value) {
                    tracing::debug!(%field, previous, value, "Duplicate field, keeping later value");
                }
            }
            None => {
                tracing::debug!(%field, tag = %element.name, "Skipping non-numeric value");
            }
        }
    }

    let result = ImportResult::from_record(record)?;
    tracing::info!(
        field_count = result.field_count,
        elements = elements.len(),
        "XML health record imported"
    );
    Ok(result)
}

/// Read a leading base-10 integer: optional sign then ASCII digits, anything
/// after the digits ignored (`"28.5"` reads as 28, `"12abc"` as 12).
///
/// Prefixes beyond `i64` keep their nearest `f64` value. `None` when there
/// are no digits or the prefix is too long to be finite.
pub fn parse_integer_prefix(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let (sign, digits) = match text.as_bytes().first() {
        Some(b'-') => ("-", &text[1..]),
        Some(b'+') => ("", &text[1..]),
        _ => ("", text),
    };

    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    let digits = &digits[..end];
    if digits.is_empty() {
        return None;
    }

    let value: f64 = format!("{sign}{digits}").parse().ok()?;
    value.is_finite().then_some(value)
}
