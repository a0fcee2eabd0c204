//! 10-year cardiovascular risk estimation.
//!
//! The production path forwards the complete health record to the model
//! service (`POST {base}/api/predict`). Any failure there resolves to a
//! fixed default so an assessment can always be completed. A local point
//! heuristic can stand in for the service entirely.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{HealthRecord, PredictionSource};

/// Risk reported when the model service cannot answer.
pub const DEFAULT_RISK_PERCENTAGE: f64 = 15.0;

const HEURISTIC_CAP: f64 = 99.0;

#[derive(Error, Debug)]
pub enum PredictionError {
    #[error("Prediction request timed out")]
    Timeout,

    #[error("Cannot reach prediction service at {0}")]
    Connection(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Prediction service returned status {status}: {body}")]
    Service { status: u16, body: String },

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Response has no cvd_probability_percent")]
    MissingProbability,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub risk_percentage: f64,
    pub source: PredictionSource,
}

#[derive(Deserialize)]
struct PredictResponse {
    cvd_probability_percent: Option<f64>,
}

/// HTTP client for the model service.
pub struct PredictionClient {
    base_url: String,
    client: reqwest::Client,
}

impl PredictionClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, PredictionError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PredictionError::HttpClient(e.to_string()))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn predict(&self, record: &HealthRecord) -> Result<f64, PredictionError> {
        let url = format!("{}/api/predict", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(record)
            .send()
            .await
            .map_err(|e| map_reqwest_error(e, &url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PredictionError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: PredictResponse = response
            .json()
            .await
            .map_err(|e| map_reqwest_error(e, &url))?;
        parsed
            .cvd_probability_percent
            .ok_or(PredictionError::MissingProbability)
    }
}

fn map_reqwest_error(err: reqwest::Error, url: &str) -> PredictionError {
    if err.is_timeout() {
        PredictionError::Timeout
    } else if err.is_connect() {
        PredictionError::Connection(url.to_string())
    } else if err.is_decode() {
        PredictionError::ResponseParsing(err.to_string())
    } else {
        PredictionError::HttpClient(err.to_string())
    }
}

/// Which backend scores a record.
pub enum RiskPredictor {
    Remote(PredictionClient),
    Heuristic,
}

impl RiskPredictor {
    /// Short label for the health endpoint.
    pub fn backend(&self) -> &'static str {
        match self {
            RiskPredictor::Remote(_) => "remote",
            RiskPredictor::Heuristic => "heuristic",
        }
    }

    pub async fn predict(&self, record: &HealthRecord) -> Prediction {
        match self {
            RiskPredictor::Heuristic => Prediction {
                risk_percentage: heuristic_risk(record),
                source: PredictionSource::Heuristic,
            },
            RiskPredictor::Remote(client) => match client.predict(record).await {
                Ok(risk_percentage) => {
                    tracing::info!(risk_percentage, "Prediction received");
                    Prediction {
                        risk_percentage,
                        source: PredictionSource::Model,
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        default = DEFAULT_RISK_PERCENTAGE,
                        "Prediction failed, using default risk"
                    );
                    Prediction {
                        risk_percentage: DEFAULT_RISK_PERCENTAGE,
                        source: PredictionSource::FallbackDefault,
                    }
                }
            },
        }
    }
}

/// Additive point score over the Framingham fields, capped at 99.
pub fn heuristic_risk(r: &HealthRecord) -> f64 {
    let mut risk = 0.0_f64;

    risk += if r.age > 60.0 {
        15.0
    } else if r.age > 50.0 {
        10.0
    } else if r.age > 40.0 {
        5.0
    } else {
        0.0
    };

    risk += if r.totchol > 240.0 {
        10.0
    } else if r.totchol > 200.0 {
        5.0
    } else {
        0.0
    };

    risk += if r.sysbp > 140.0 {
        10.0
    } else if r.sysbp > 130.0 {
        5.0
    } else {
        0.0
    };

    risk += if r.bmi > 30.0 {
        10.0
    } else if r.bmi > 25.0 {
        5.0
    } else {
        0.0
    };

    let flags = [
        (r.cursmoke, 15.0),
        (r.diabetes, 12.0),
        (r.prevchd, 20.0),
        (r.prevmi, 20.0),
        (r.prevstrk, 15.0),
        (r.prevhyp, 8.0),
    ];
    for (value, points) in flags {
        if value == 1.0 {
            risk += points;
        }
    }

    if r.hdlc < 40.0 {
        risk += 5.0;
    }
    if r.ldlc > 160.0 {
        risk += 8.0;
    }

    risk.min(HEURISTIC_CAP)
}
