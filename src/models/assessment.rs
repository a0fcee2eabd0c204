use serde::{Deserialize, Serialize};

use super::enums::{RiskLevel, RiskTrend};
use super::health::HealthRecord;

impl RiskLevel {
    /// Band a 10-year risk percentage: 10 / 20 / 30 are the lower bounds.
    pub fn from_percentage(risk: f64) -> Self {
        if risk >= 30.0 {
            RiskLevel::VeryHigh
        } else if risk >= 20.0 {
            RiskLevel::High
        } else if risk >= 10.0 {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        }
    }
}

/// One completed assessment, as stored in history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResult {
    pub id: String,
    /// RFC 3339 timestamp.
    pub date: String,
    pub health_data: HealthRecord,
    pub risk_percentage: f64,
    pub risk_level: RiskLevel,
}

impl AssessmentResult {
    pub fn new(health_data: HealthRecord, risk_percentage: f64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            date: chrono::Utc::now().to_rfc3339(),
            health_data,
            risk_percentage,
            risk_level: RiskLevel::from_percentage(risk_percentage),
        }
    }
}

/// Headline and suggestions for a risk band.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskInsights {
    pub message: &'static str,
    pub recommendations: [&'static str; 3],
}

pub fn risk_insights(risk: f64) -> RiskInsights {
    match RiskLevel::from_percentage(risk) {
        RiskLevel::Low => RiskInsights {
            message: "Amazing! Your heart is throwing a healthy party!",
            recommendations: [
                "Keep rocking those healthy lifestyle habits!",
                "Your heart loves your exercise routine! Keep it up!",
                "Continue monitoring - your heart is in the party mood!",
            ],
        },
        RiskLevel::Moderate => RiskInsights {
            message: "Your heart's doing okay, but let's turn up the health party!",
            recommendations: [
                "Let's get 150 minutes of heart-pumping fun per week!",
                "Show your heart some love with fruits and veggies!",
                "Keep an eye on blood pressure - your heart will thank you!",
            ],
        },
        RiskLevel::High => RiskInsights {
            message: "Time to give your heart some extra love and attention!",
            recommendations: [
                "Chat with your doctor about a heart-healthy action plan",
                "Consider medication if your healthcare provider recommends it",
                "Transform your lifestyle: diet, exercise, and chill vibes!",
            ],
        },
        RiskLevel::VeryHigh => RiskInsights {
            message: "Your heart needs immediate care and attention!",
            recommendations: [
                "Schedule a doctor visit ASAP - your heart is calling!",
                "Discuss medication and lifestyle changes with your provider",
                "Consider a cardiac evaluation for your heart's health",
            ],
        },
    }
}

impl RiskTrend {
    pub fn between(current: f64, previous: f64) -> Self {
        if current < previous {
            RiskTrend::Improving
        } else if current > previous {
            RiskTrend::Worsening
        } else {
            RiskTrend::Stable
        }
    }
}

/// Trend of the newest assessment against the one before it.
///
/// `history` is newest-first; `None` with fewer than two entries.
pub fn latest_trend(history: &[AssessmentResult]) -> Option<RiskTrend> {
    match history {
        [latest, previous, ..] => Some(RiskTrend::between(
            latest.risk_percentage,
            previous.risk_percentage,
        )),
        _ => None,
    }
}
