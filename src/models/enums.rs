use serde::{Deserialize, Serialize};

/// Error returned when a string does not name any variant of a `str_enum!` type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {kind} value: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr pattern.
///
/// The string form doubles as the serde name, so JSON and `as_str()` never
/// disagree.
macro_rules! str_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(UnknownVariant {
                        kind: stringify!($name),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(
    /// Canonical health-record field, named exactly as the prediction model expects.
    HealthField {
        Sex => "SEX",
        TotalCholesterol => "TOTCHOL",
        Age => "AGE",
        SystolicBp => "SYSBP",
        DiastolicBp => "DIABP",
        CurrentSmoker => "CURSMOKE",
        CigarettesPerDay => "CIGPDAY",
        Bmi => "BMI",
        Diabetes => "DIABETES",
        BpMedications => "BPMEDS",
        HeartRate => "HEARTRTE",
        Glucose => "GLUCOSE",
        Education => "educ",
        PreviousChd => "PREVCHD",
        PreviousAngina => "PREVAP",
        PreviousMi => "PREVMI",
        PreviousStroke => "PREVSTRK",
        PreviousHypertension => "PREVHYP",
        Period => "PERIOD",
        HdlCholesterol => "HDLC",
        LdlCholesterol => "LDLC",
        Hypertension => "HYPERTEN",
    }
);

str_enum!(
    /// Risk band shown next to the gauge.
    RiskLevel {
        Low => "Low",
        Moderate => "Moderate",
        High => "High",
        VeryHigh => "Very High",
    }
);

str_enum!(
    /// Direction of the latest assessment relative to the one before it.
    RiskTrend {
        Improving => "improving",
        Worsening => "worsening",
        Stable => "stable",
    }
);

str_enum!(
    /// Where a risk percentage came from.
    PredictionSource {
        Model => "model",
        Heuristic => "heuristic",
        FallbackDefault => "fallback-default",
    }
);

str_enum!(
    /// Origin of feedback text: the model, or which failure produced a canned fallback.
    FeedbackSource {
        OpenRouter => "openrouter",
        FallbackEmpty => "fallback-empty",
        FallbackParseError => "fallback-parse-error",
        FallbackApiError => "fallback-api-error",
        FallbackTimeout => "fallback-timeout",
        FallbackError => "fallback-error",
    }
);

impl FeedbackSource {
    pub fn is_fallback(&self) -> bool {
        !matches!(self, FeedbackSource::OpenRouter)
    }
}

str_enum!(
    ChatSource {
        Model => "model",
        Fallback => "fallback",
    }
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn health_field_has_22_variants() {
        assert_eq!(HealthField::ALL.len(), 22);
    }

    #[test]
    fn health_field_round_trip() {
        for field in HealthField::ALL {
            assert_eq!(HealthField::from_str(field.as_str()).unwrap(), *field);
        }
    }

    #[test]
    fn education_keeps_lowercase_name() {
        assert_eq!(HealthField::Education.as_str(), "educ");
        let json = serde_json::to_string(&HealthField::Education).unwrap();
        assert_eq!(json, "\"educ\"");
    }

    #[test]
    fn risk_level_serializes_with_space() {
        let json = serde_json::to_string(&RiskLevel::VeryHigh).unwrap();
        assert_eq!(json, "\"Very High\"");
        assert_eq!(RiskLevel::from_str("Moderate").unwrap(), RiskLevel::Moderate);
    }

    #[test]
    fn feedback_sources_distinguish_fallbacks() {
        assert!(!FeedbackSource::OpenRouter.is_fallback());
        for source in &FeedbackSource::ALL[1..] {
            assert!(source.is_fallback());
            assert!(source.as_str().starts_with("fallback-"));
        }
    }

    #[test]
    fn unknown_value_reports_kind() {
        let err = RiskTrend::from_str("sideways").unwrap_err();
        assert_eq!(err.kind, "RiskTrend");
        assert_eq!(err.to_string(), "Invalid RiskTrend value: sideways");
    }
}
