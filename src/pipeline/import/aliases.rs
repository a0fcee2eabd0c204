use crate::models::HealthField;

/// Recognized input tag names (lower case) and the field each one feeds.
///
/// Many-to-one: several spellings land on the same canonical field. This is
/// the only vocabulary `parse_health_xml` understands.
pub const FIELD_ALIASES: &[(&str, HealthField)] = &[
    ("age", HealthField::Age),
    ("sex", HealthField::Sex),
    ("gender", HealthField::Sex),
    ("totchol", HealthField::TotalCholesterol),
    ("total_cholesterol", HealthField::TotalCholesterol),
    ("sysbp", HealthField::SystolicBp),
    ("systolic_bp", HealthField::SystolicBp),
    ("diabp", HealthField::DiastolicBp),
    ("diastolic_bp", HealthField::DiastolicBp),
    ("cursmoke", HealthField::CurrentSmoker),
    ("current_smoker", HealthField::CurrentSmoker),
    ("cigpday", HealthField::CigarettesPerDay),
    ("cigarettes_per_day", HealthField::CigarettesPerDay),
    ("bmi", HealthField::Bmi),
    ("diabetes", HealthField::Diabetes),
    ("bpmeds", HealthField::BpMedications),
    ("bp_medications", HealthField::BpMedications),
    ("heartrte", HealthField::HeartRate),
    ("heart_rate", HealthField::HeartRate),
    ("glucose", HealthField::Glucose),
    ("blood_glucose", HealthField::Glucose),
    ("educ", HealthField::Education),
    ("education", HealthField::Education),
    ("prevchd", HealthField::PreviousChd),
    ("previous_chd", HealthField::PreviousChd),
    ("prevap", HealthField::PreviousAngina),
    ("previous_angina", HealthField::PreviousAngina),
    ("prevmi", HealthField::PreviousMi),
    ("previous_mi", HealthField::PreviousMi),
    ("prevstrk", HealthField::PreviousStroke),
    ("previous_stroke", HealthField::PreviousStroke),
    ("prevhyp", HealthField::PreviousHypertension),
    ("previous_hypertension", HealthField::PreviousHypertension),
    ("period", HealthField::Period),
    ("hdlc", HealthField::HdlCholesterol),
    ("hdl_cholesterol", HealthField::HdlCholesterol),
    ("ldlc", HealthField::LdlCholesterol),
    ("ldl_cholesterol", HealthField::LdlCholesterol),
    ("hyperten", HealthField::Hypertension),
    ("hypertension", HealthField::Hypertension),
];

/// Fields whose absence earns a warning (never a failure) after import.
pub const CRITICAL_FIELDS: &[HealthField] = &[
    HealthField::Age,
    HealthField::Sex,
    HealthField::TotalCholesterol,
    HealthField::SystolicBp,
    HealthField::DiastolicBp,
];

/// Resolve a tag name, ignoring case.
pub fn lookup_alias(tag: &str) -> Option<HealthField> {
    let tag = tag.to_lowercase();
    FIELD_ALIASES
        .iter()
        .find(|(alias, _)| *alias == tag)
        .map(|(_, field)| *field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn aliases_are_lowercase_and_unique() {
        let mut seen = HashSet::new();
        for (alias, _) in FIELD_ALIASES {
            assert_eq!(*alias, alias.to_lowercase());
            assert!(seen.insert(*alias), "duplicate alias {alias}");
        }
    }

    #[test]
    fn every_canonical_field_has_an_alias() {
        let covered: HashSet<HealthField> = FIELD_ALIASES.iter().map(|(_, f)| *f).collect();
        for field in HealthField::ALL {
            assert!(covered.contains(field), "{field} has no alias");
        }
    }

    #[test]
    fn lookup_ignores_case() {
        assert_eq!(lookup_alias("Systolic_BP"), Some(HealthField::SystolicBp));
        assert_eq!(lookup_alias("SYSBP"), Some(HealthField::SystolicBp));
        assert_eq!(lookup_alias("Gender"), Some(HealthField::Sex));
        assert_eq!(lookup_alias("EDUCATION"), Some(HealthField::Education));
    }

    #[test]
    fn lookup_rejects_unknown_tags() {
        assert_eq!(lookup_alias("nested"), None);
        assert_eq!(lookup_alias("PatientData"), None);
        assert_eq!(lookup_alias("age "), None);
    }
}
