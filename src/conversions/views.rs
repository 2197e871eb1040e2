use super::models::ConversionForm;
use super::services::{bundle_upload, convert_upload, read_upload};
use crate::common::errors::BusinessError;
use crate::common::state::AppState;
use crate::services::processing::ConversionReport;
use axum::{
    Json,
    extract::{Multipart, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use utoipa_axum::{router::OpenApiRouter, routes};

pub const SHEET_FAILURES_HEADER: &str = "x-sheet-failures";

pub fn router(state: &AppState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(convert_workbook))
        .routes(routes!(preview_conversion))
        .with_state(state.clone())
}

/// Convert a process plan workbook into a zip of MES documents
#[utoipa::path(
    post,
    path = "/api/conversions",
    request_body(content = ConversionForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Zip bundle of MES documents, one per sheet and line name", body = Vec<u8>, content_type = "application/zip"),
        (status = 400, description = "Missing or invalid upload"),
        (status = 422, description = "No sheet in the workbook could be converted"),
        (status = 500, description = "Internal server error")
    ),
    tag = "conversions"
)]
pub async fn convert_workbook(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, BusinessError> {
    let upload = read_upload(multipart).await?;
    let bundle = bundle_upload(&state.config, upload).await?;

    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        bundle.file_name
    ))
    .map_err(|e| BusinessError::InternalError {
        message: format!("Invalid bundle file name: {e}"),
    })?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/zip")),
            (header::CONTENT_DISPOSITION, disposition),
            (
                header::HeaderName::from_static(SHEET_FAILURES_HEADER),
                HeaderValue::from(bundle.report.failures.len()),
            ),
        ],
        bundle.bytes,
    )
        .into_response())
}

/// Convert a workbook and return the documents and per-sheet failures as JSON
#[utoipa::path(
    post,
    path = "/api/conversions/preview",
    request_body(content = ConversionForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Generated documents and sheet failures", body = ConversionReport),
        (status = 400, description = "Missing or invalid upload"),
        (status = 500, description = "Internal server error")
    ),
    tag = "conversions"
)]
pub async fn preview_conversion(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ConversionReport>, BusinessError> {
    let upload = read_upload(multipart).await?;
    let report = convert_upload(&state.config, upload).await?;
    Ok(Json(report))
}
