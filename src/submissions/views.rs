use super::models::{HistoryQuery, SubmissionRequest, UploadRecord};
use super::services::{get_record, list_history, submit_document};
use crate::common::errors::BusinessError;
use crate::common::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
};
use utoipa_axum::{router::OpenApiRouter, routes};
use uuid::Uuid;

pub fn router(state: &AppState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(submit, list_submissions))
        .routes(routes!(get_submission))
        .with_state(state.clone())
}

/// Send one generated document to the MES and record the attempt
#[utoipa::path(
    post,
    path = "/api/submissions",
    request_body = SubmissionRequest,
    responses(
        (status = 200, description = "MES accepted the document", body = UploadRecord),
        (status = 400, description = "Document failed structural validation"),
        (status = 502, description = "MES rejected the document or could not be reached")
    ),
    tag = "submissions"
)]
pub async fn submit(
    State(state): State<AppState>,
    Json(request): Json<SubmissionRequest>,
) -> Result<Json<UploadRecord>, BusinessError> {
    let record = submit_document(&state.db, state.mes.as_ref(), request).await?;
    Ok(Json(record))
}

/// Submission history, newest first
#[utoipa::path(
    get,
    path = "/api/submissions",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Recorded submission attempts", body = Vec<UploadRecord>)
    ),
    tag = "submissions"
)]
pub async fn list_submissions(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<UploadRecord>>, BusinessError> {
    Ok(Json(list_history(&state.db, query.limit).await?))
}

#[utoipa::path(
    get,
    path = "/api/submissions/{id}",
    params(("id" = Uuid, Path, description = "Upload record id")),
    responses(
        (status = 200, description = "The recorded attempt", body = UploadRecord),
        (status = 404, description = "No such record")
    ),
    tag = "submissions"
)]
pub async fn get_submission(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UploadRecord>, BusinessError> {
    Ok(Json(get_record(&state.db, id).await?))
}
