//! Health-record upload endpoints.
//!
//! Both take the raw document as the request body (any content type) and
//! answer with the partial record plus which critical fields are still
//! missing, so the form can prompt for them. A body that is not UTF-8 is
//! malformed XML.

use axum::body::Bytes;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::models::HealthField;
use crate::pipeline::import::{
    missing_critical_warning, parse_apple_health, parse_health_xml, ImportError, ImportResult,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    #[serde(flatten)]
    pub result: ImportResult,
    pub missing_critical: Vec<HealthField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl From<ImportResult> for ImportResponse {
    fn from(result: ImportResult) -> Self {
        let missing_critical = result.missing_critical();
        let warning = missing_critical_warning(&missing_critical);
        Self {
            result,
            missing_critical,
            warning,
        }
    }
}

fn utf8_body(body: &Bytes) -> Result<&str, ImportError> {
    std::str::from_utf8(body).map_err(|e| {
        ImportError::MalformedXml(format!("document is not valid UTF-8: {e}"))
    })
}

/// `POST /api/import/xml`
pub async fn xml(body: Bytes) -> Result<Json<ImportResponse>, ApiError> {
    let result = utf8_body(&body).and_then(parse_health_xml).inspect_err(|e| {
        tracing::info!(error = %e, bytes = body.len(), "XML import rejected");
    })?;
    Ok(Json(result.into()))
}

/// `POST /api/import/apple-health`
pub async fn apple_health(body: Bytes) -> Result<Json<ImportResponse>, ApiError> {
    let result = utf8_body(&body).and_then(parse_apple_health).inspect_err(|e| {
        tracing::info!(error = %e, bytes = body.len(), "Apple Health import rejected");
    })?;
    Ok(Json(result.into()))
}
