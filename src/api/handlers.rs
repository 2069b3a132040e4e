//! API request handlers
//!
//! Handlers for all REST API endpoints. Bills arrive as multipart uploads;
//! an extraction failure is isolated to its request and reported with the
//! taxonomy message, never a server crash.

use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::error::BillError;
use crate::excel::{grid_from_bytes, ReportTemplate};
use crate::extract::extract_bill;
use crate::layout::TemplateLayout;
use crate::types::{BillExtraction, FacilityProfile};

use super::server::AppState;

/// Standard API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            request_id: Uuid::new_v4().to_string(),
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            request_id: Uuid::new_v4().to_string(),
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Root endpoint response
#[derive(Serialize)]
pub struct RootResponse {
    pub name: String,
    pub version: String,
    pub description: String,
    pub endpoints: Vec<EndpointInfo>,
}

#[derive(Serialize)]
pub struct EndpointInfo {
    pub path: String,
    pub method: String,
    pub description: String,
}

/// GET / - Root info
pub async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let response = RootResponse {
        name: "utilibill API Server".to_string(),
        version: state.version.clone(),
        description: "HTTP API for utility bill extraction and report generation".to_string(),
        endpoints: vec![
            EndpointInfo {
                path: "/health".to_string(),
                method: "GET".to_string(),
                description: "Health check endpoint".to_string(),
            },
            EndpointInfo {
                path: "/version".to_string(),
                method: "GET".to_string(),
                description: "Get server version".to_string(),
            },
            EndpointInfo {
                path: "/api/v1/extract".to_string(),
                method: "POST".to_string(),
                description: "Extract monthly records from an uploaded bill".to_string(),
            },
            EndpointInfo {
                path: "/api/v1/apply".to_string(),
                method: "POST".to_string(),
                description: "Apply an uploaded bill to the report template".to_string(),
            },
        ],
    };
    Json(ApiResponse::ok(response))
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// GET /health - Health check
pub async fn health() -> impl IntoResponse {
    Json(ApiResponse::ok(HealthResponse {
        status: "healthy".to_string(),
    }))
}

/// Version response
#[derive(Serialize)]
pub struct VersionResponse {
    pub version: String,
    pub features: Vec<String>,
}

/// GET /version - Server version
pub async fn version(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(VersionResponse {
        version: state.version.clone(),
        features: vec!["extract".to_string(), "apply".to_string()],
    }))
}

/// Extract response payload
#[derive(Serialize)]
pub struct ExtractData {
    pub bill: String,
    #[serde(flatten)]
    pub extraction: BillExtraction,
    pub generated_at: String,
}

/// POST /api/v1/extract - Extract monthly records from an uploaded bill
pub async fn extract(mut multipart: Multipart) -> Response {
    let upload = match read_upload(&mut multipart).await {
        Ok(upload) => upload,
        Err(response) => return response,
    };

    match grid_from_bytes(upload.bytes).and_then(|grid| extract_bill(&grid)) {
        Ok(extraction) => Json(ApiResponse::ok(ExtractData {
            bill: upload.file_name,
            extraction,
            generated_at: chrono::Utc::now().to_rfc3339(),
        }))
        .into_response(),
        Err(e) => error_response(status_for(&e), e.to_string()),
    }
}

/// POST /api/v1/apply - Apply an uploaded bill to the report template
pub async fn apply(mut multipart: Multipart) -> Response {
    let upload = match read_upload(&mut multipart).await {
        Ok(upload) => upload,
        Err(response) => return response,
    };

    let extraction = match grid_from_bytes(upload.bytes).and_then(|grid| extract_bill(&grid)) {
        Ok(extraction) => extraction,
        Err(e) => return error_response(status_for(&e), e.to_string()),
    };

    let template = ReportTemplate::new(upload.layout.unwrap_or_default());
    match template.to_bytes(&extraction, upload.profile.as_ref()) {
        Ok(bytes) => (
            StatusCode::OK,
            [
                (
                    header::CONTENT_TYPE,
                    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
                        .to_string(),
                ),
                (
                    header::CONTENT_DISPOSITION,
                    format!(
                        "attachment; filename=\"{}\"",
                        report_file_name(&upload.file_name)
                    ),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => error_response(status_for(&e), e.to_string()),
    }
}

/// One decoded multipart upload: the bill bytes plus optional profile and
/// layout documents sent alongside it.
struct BillUpload {
    file_name: String,
    bytes: Vec<u8>,
    profile: Option<FacilityProfile>,
    layout: Option<TemplateLayout>,
}

async fn read_upload(multipart: &mut Multipart) -> Result<BillUpload, Response> {
    let mut file_name = "bill".to_string();
    let mut bytes = Vec::new();
    let mut profile = None;
    let mut layout = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return Err(error_response(
                    StatusCode::BAD_REQUEST,
                    format!("malformed multipart request: {e}"),
                ))
            }
        };

        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                if let Some(original) = field.file_name() {
                    file_name = original.to_string();
                }
                bytes = match field.bytes().await {
                    Ok(data) => data.to_vec(),
                    Err(e) => {
                        return Err(error_response(
                            StatusCode::BAD_REQUEST,
                            format!("failed to read uploaded file: {e}"),
                        ))
                    }
                };
            }
            "profile" => {
                let text = match field.text().await {
                    Ok(text) => text,
                    Err(e) => {
                        return Err(error_response(
                            StatusCode::BAD_REQUEST,
                            format!("failed to read profile field: {e}"),
                        ))
                    }
                };
                profile = match serde_yaml::from_str(&text) {
                    Ok(profile) => Some(profile),
                    Err(e) => {
                        return Err(error_response(
                            StatusCode::BAD_REQUEST,
                            format!("invalid profile document: {e}"),
                        ))
                    }
                };
            }
            "layout" => {
                let text = match field.text().await {
                    Ok(text) => text,
                    Err(e) => {
                        return Err(error_response(
                            StatusCode::BAD_REQUEST,
                            format!("failed to read layout field: {e}"),
                        ))
                    }
                };
                layout = match TemplateLayout::from_yaml_str(&text) {
                    Ok(layout) => Some(layout),
                    Err(e) => {
                        return Err(error_response(
                            StatusCode::BAD_REQUEST,
                            format!("invalid layout document: {e}"),
                        ))
                    }
                };
            }
            _ => {}
        }
    }

    if bytes.is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "missing 'file' field in multipart upload".to_string(),
        ));
    }

    Ok(BillUpload {
        file_name,
        bytes,
        profile,
        layout,
    })
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(ApiResponse::<()>::err(message))).into_response()
}

/// Map a pipeline failure onto an HTTP status: undecodable uploads are the
/// client's request, unresolvable bills are valid uploads with bad content.
fn status_for(error: &BillError) -> StatusCode {
    match error {
        BillError::Import(_) => StatusCode::BAD_REQUEST,
        BillError::HeaderNotFound | BillError::MissingRoles(_) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn report_file_name(bill_name: &str) -> String {
    let stem = std::path::Path::new(bill_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("bill");
    let clean: String = stem
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("{clean}-report.xlsx")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&BillError::Import("bad".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&BillError::HeaderNotFound),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(&BillError::MissingRoles(vec![Role::Kw])),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(&BillError::Export("disk".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_report_file_name_sanitizes() {
        assert_eq!(report_file_name("march bill.xlsm"), "march_bill-report.xlsx");
        assert_eq!(report_file_name("bill.xlsx"), "bill-report.xlsx");
        assert_eq!(report_file_name(""), "bill-report.xlsx");
    }

    #[test]
    fn test_api_response_shapes() {
        let ok = serde_json::to_value(ApiResponse::ok("data")).unwrap();
        assert_eq!(ok["success"], true);
        assert_eq!(ok["data"], "data");
        assert!(ok.get("error").is_none());

        let err = serde_json::to_value(ApiResponse::<()>::err("boom")).unwrap();
        assert_eq!(err["success"], false);
        assert_eq!(err["error"], "boom");
    }
}
