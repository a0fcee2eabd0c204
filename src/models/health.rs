use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::enums::HealthField;

/// A subset of canonical fields with their values.
///
/// Keys are ordered by field declaration order, so two records holding the
/// same values always serialize identically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartialHealthRecord(BTreeMap<HealthField, f64>);

impl PartialHealthRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, returning the value it replaced.
    pub fn insert(&mut self, field: HealthField, value: f64) -> Option<f64> {
        self.0.insert(field, value)
    }

    pub fn get(&self, field: HealthField) -> Option<f64> {
        self.0.get(&field).copied()
    }

    pub fn contains(&self, field: HealthField) -> bool {
        self.0.contains_key(&field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (HealthField, f64)> + '_ {
        self.0.iter().map(|(field, value)| (*field, *value))
    }
}

impl FromIterator<(HealthField, f64)> for PartialHealthRecord {
    fn from_iter<I: IntoIterator<Item = (HealthField, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Raised when a strict conversion finds fields without a value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Health record is missing {} field(s): {}", .missing.len(), join_fields(.missing))]
pub struct IncompleteRecord {
    pub missing: Vec<HealthField>,
}

fn join_fields(fields: &[HealthField]) -> String {
    fields
        .iter()
        .map(HealthField::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Complete record with all 22 fields, as sent to the prediction service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct HealthRecord {
    /// 1 = male, 0 = female
    pub sex: f64,
    /// Total cholesterol (mg/dL)
    pub totchol: f64,
    pub age: f64,
    /// Systolic blood pressure (mmHg)
    pub sysbp: f64,
    /// Diastolic blood pressure (mmHg)
    pub diabp: f64,
    pub cursmoke: f64,
    pub cigpday: f64,
    pub bmi: f64,
    pub diabetes: f64,
    pub bpmeds: f64,
    /// Heart rate (bpm)
    pub heartrte: f64,
    /// Glucose (mg/dL)
    pub glucose: f64,
    /// Education level (1-4)
    #[serde(rename = "educ")]
    pub educ: f64,
    pub prevchd: f64,
    pub prevap: f64,
    pub prevmi: f64,
    pub prevstrk: f64,
    pub prevhyp: f64,
    pub period: f64,
    /// HDL cholesterol (mg/dL)
    pub hdlc: f64,
    /// LDL cholesterol (mg/dL)
    pub ldlc: f64,
    pub hyperten: f64,
}

impl Default for HealthRecord {
    /// Starting values of the assessment form before any input or import.
    fn default() -> Self {
        Self {
            sex: 1.0,
            totchol: 200.0,
            age: 50.0,
            sysbp: 120.0,
            diabp: 80.0,
            cursmoke: 0.0,
            cigpday: 0.0,
            bmi: 25.0,
            diabetes: 0.0,
            bpmeds: 0.0,
            heartrte: 70.0,
            glucose: 100.0,
            educ: 1.0,
            prevchd: 0.0,
            prevap: 0.0,
            prevmi: 0.0,
            prevstrk: 0.0,
            prevhyp: 0.0,
            period: 0.0,
            hdlc: 50.0,
            ldlc: 130.0,
            hyperten: 0.0,
        }
    }
}

impl HealthRecord {
    fn slot_mut(&mut self, field: HealthField) -> &mut f64 {
        match field {
            HealthField::Sex => &mut self.sex,
            HealthField::TotalCholesterol => &mut self.totchol,
            HealthField::Age => &mut self.age,
            HealthField::SystolicBp => &mut self.sysbp,
            HealthField::DiastolicBp => &mut self.diabp,
            HealthField::CurrentSmoker => &mut self.cursmoke,
            HealthField::CigarettesPerDay => &mut self.cigpday,
            HealthField::Bmi => &mut self.bmi,
            HealthField::Diabetes => &mut self.diabetes,
            HealthField::BpMedications => &mut self.bpmeds,
            HealthField::HeartRate => &mut self.heartrte,
            HealthField::Glucose => &mut self.glucose,
            HealthField::Education => &mut self.educ,
            HealthField::PreviousChd => &mut self.prevchd,
            HealthField::PreviousAngina => &mut self.prevap,
            HealthField::PreviousMi => &mut self.prevmi,
            HealthField::PreviousStroke => &mut self.prevstrk,
            HealthField::PreviousHypertension => &mut self.prevhyp,
            HealthField::Period => &mut self.period,
            HealthField::HdlCholesterol => &mut self.hdlc,
            HealthField::LdlCholesterol => &mut self.ldlc,
            HealthField::Hypertension => &mut self.hyperten,
        }
    }

    pub fn get(&self, field: HealthField) -> f64 {
        match field {
            HealthField::Sex => self.sex,
            HealthField::TotalCholesterol => self.totchol,
            HealthField::Age => self.age,
            HealthField::SystolicBp => self.sysbp,
            HealthField::DiastolicBp => self.diabp,
            HealthField::CurrentSmoker => self.cursmoke,
            HealthField::CigarettesPerDay => self.cigpday,
            HealthField::Bmi => self.bmi,
            HealthField::Diabetes => self.diabetes,
            HealthField::BpMedications => self.bpmeds,
            HealthField::HeartRate => self.heartrte,
            HealthField::Glucose => self.glucose,
            HealthField::Education => self.educ,
            HealthField::PreviousChd => self.prevchd,
            HealthField::PreviousAngina => self.prevap,
            HealthField::PreviousMi => self.prevmi,
            HealthField::PreviousStroke => self.prevstrk,
            HealthField::PreviousHypertension => self.prevhyp,
            HealthField::Period => self.period,
            HealthField::HdlCholesterol => self.hdlc,
            HealthField::LdlCholesterol => self.ldlc,
            HealthField::Hypertension => self.hyperten,
        }
    }

    pub fn set(&mut self, field: HealthField, value: f64) {
        *self.slot_mut(field) = value;
    }

    /// Overwrite every field present in `partial`, leaving the rest untouched.
    pub fn overlay(&mut self, partial: &PartialHealthRecord) {
        for (field, value) in partial.iter() {
            self.set(field, value);
        }
    }

    /// Defaults merged with whatever `partial` supplies.
    pub fn with_defaults(partial: &PartialHealthRecord) -> Self {
        let mut record = Self::default();
        record.overlay(partial);
        record
    }

    pub fn to_partial(&self) -> PartialHealthRecord {
        HealthField::ALL
            .iter()
            .map(|field| (*field, self.get(*field)))
            .collect()
    }
}

impl TryFrom<&PartialHealthRecord> for HealthRecord {
    type Error = IncompleteRecord;

    /// Strict conversion: every canonical field must be present.
    fn try_from(partial: &PartialHealthRecord) -> Result<Self, Self::Error> {
        let missing: Vec<HealthField> = HealthField::ALL
            .iter()
            .copied()
            .filter(|field| !partial.contains(*field))
            .collect();
        if !missing.is_empty() {
            return Err(IncompleteRecord { missing });
        }
        Ok(Self::with_defaults(partial))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_serializes_with_canonical_keys_in_field_order() {
        let mut partial = PartialHealthRecord::new();
        partial.insert(HealthField::Education, 2.0);
        partial.insert(HealthField::Sex, 1.0);
        partial.insert(HealthField::Age, 45.0);

        let json = serde_json::to_string(&partial).unwrap();
        assert_eq!(json, r#"{"SEX":1.0,"AGE":45.0,"educ":2.0}"#);
    }

    #[test]
    fn partial_deserializes_from_canonical_keys() {
        let partial: PartialHealthRecord =
            serde_json::from_str(r#"{"SYSBP": 140, "educ": 3}"#).unwrap();
        assert_eq!(partial.get(HealthField::SystolicBp), Some(140.0));
        assert_eq!(partial.get(HealthField::Education), Some(3.0));
        assert_eq!(partial.len(), 2);
    }

    #[test]
    fn partial_rejects_unknown_keys() {
        let result: Result<PartialHealthRecord, _> = serde_json::from_str(r#"{"WEIGHT": 80}"#);
        assert!(result.is_err());
    }

    #[test]
    fn record_serializes_all_canonical_names() {
        let value = serde_json::to_value(HealthRecord::default()).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 22);
        for field in HealthField::ALL {
            assert!(object.contains_key(field.as_str()), "missing {field}");
        }
        assert_eq!(object["TOTCHOL"], 200.0);
    }

    #[test]
    fn defaults_merge_under_imported_values() {
        let partial: PartialHealthRecord = [(HealthField::Age, 65.0), (HealthField::Bmi, 28.5)]
            .into_iter()
            .collect();
        let record = HealthRecord::with_defaults(&partial);
        assert_eq!(record.age, 65.0);
        assert_eq!(record.bmi, 28.5);
        assert_eq!(record.sysbp, 120.0);
    }

    #[test]
    fn get_and_set_address_the_same_slot() {
        let mut record = HealthRecord::default();
        for (i, field) in HealthField::ALL.iter().enumerate() {
            record.set(*field, i as f64);
        }
        for (i, field) in HealthField::ALL.iter().enumerate() {
            assert_eq!(record.get(*field), i as f64);
        }
    }

    #[test]
    fn strict_conversion_lists_missing_fields() {
        let partial: PartialHealthRecord = [(HealthField::Age, 45.0)].into_iter().collect();
        let err = HealthRecord::try_from(&partial).unwrap_err();
        assert_eq!(err.missing.len(), 21);
        assert!(!err.missing.contains(&HealthField::Age));
        assert!(err.to_string().starts_with("Health record is missing 21 field(s): SEX, TOTCHOL"));
    }

    #[test]
    fn strict_conversion_accepts_complete_partial() {
        let complete = HealthRecord::default().to_partial();
        assert_eq!(complete.len(), 22);
        assert_eq!(HealthRecord::try_from(&complete).unwrap(), HealthRecord::default());
    }
}
