//! Apple Health `export.xml` import.
//!
//! Health exports are a flat list of `<Record type=".." value=".."/>`
//! samples. Quantity types we know are mapped onto canonical fields; body
//! mass and height are held back to derive BMI.

use crate::models::{HealthField, PartialHealthRecord};

use super::document::read_elements;
use super::{ImportError, ImportResult};

/// Where a known Apple Health quantity type ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordTarget {
    Field(HealthField),
    WeightKg,
    HeightCm,
}

const RECORD_TYPES: &[(&str, RecordTarget)] = &[
    ("HKQuantityTypeIdentifierBodyMass", RecordTarget::WeightKg),
    ("HKQuantityTypeIdentifierHeight", RecordTarget::HeightCm),
    (
        "HKQuantityTypeIdentifierHeartRate",
        RecordTarget::Field(HealthField::HeartRate),
    ),
    (
        "HKQuantityTypeIdentifierBloodPressureSystolic",
        RecordTarget::Field(HealthField::SystolicBp),
    ),
    (
        "HKQuantityTypeIdentifierBloodPressureDiastolic",
        RecordTarget::Field(HealthField::DiastolicBp),
    ),
    (
        "HKQuantityTypeIdentifierBodyMassIndex",
        RecordTarget::Field(HealthField::Bmi),
    ),
    (
        "HKQuantityTypeIdentifierBloodGlucose",
        RecordTarget::Field(HealthField::Glucose),
    ),
];

fn record_target(record_type: &str) -> Option<RecordTarget> {
    RECORD_TYPES
        .iter()
        .find(|(name, _)| *name == record_type)
        .map(|(_, target)| *target)
}

/// Import an Apple Health export.
///
/// Mapped samples are rounded to whole numbers; the latest sample of each
/// type wins. When both weight and height are known, BMI is derived from
/// them (one decimal) and replaces any recorded BMI sample.
pub fn parse_apple_health(xml: &str) -> Result<ImportResult, ImportError> {
    let elements = read_elements(xml)?;
    let mut record = PartialHealthRecord::new();
    let mut weight_kg = 0.0_f64;
    let mut height_cm = 0.0_f64;
    let mut samples = 0usize;

    for element in elements.iter().filter(|e| e.name == "Record") {
        let Some(target) = element.attribute("type").and_then(record_target) else {
            continue;
        };
        let Some(value) = element.attribute("value").and_then(parse_decimal_prefix) else {
            tracing::debug!(?target, "Skipping Apple Health record without numeric value");
            continue;
        };
        samples += 1;
        match target {
            RecordTarget::WeightKg => weight_kg = value,
            RecordTarget::HeightCm => height_cm = value,
            RecordTarget::Field(field) => {
                record.insert(field, value.round());
            }
        }
    }

    if let Some(bmi) = body_mass_index(weight_kg, height_cm) {
        record.insert(HealthField::Bmi, bmi);
    }

    let result = ImportResult::from_record(record)?;
    tracing::info!(
        field_count = result.field_count,
        samples,
        "Apple Health export imported"
    );
    Ok(result)
}

/// BMI from kilograms and centimetres, rounded to one decimal.
pub fn body_mass_index(weight_kg: f64, height_cm: f64) -> Option<f64> {
    if weight_kg <= 0.0 || height_cm <= 0.0 {
        return None;
    }
    let height_m = height_cm / 100.0;
    let bmi = weight_kg / (height_m * height_m);
    Some((bmi * 10.0).round() / 10.0)
}

/// Longest leading decimal number in `text` (`"72.5 count/min"` → 72.5).
pub fn parse_decimal_prefix(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut mantissa_digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        mantissa_digits += frac_end - frac_start;
        if mantissa_digits > 0 {
            end = frac_end;
        }
    }
    if mantissa_digits == 0 {
        return None;
    }

    // Exponent only counts when digits follow it.
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > digits_start {
            end = exp_end;
        }
    }

    text[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}
