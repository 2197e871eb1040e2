use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, QuerySelect, Set};
use serde_json::Value;
use uuid::Uuid;

use super::models::{self, SubmissionRequest, SubmissionStatus, UploadRecord};
use crate::common::errors::{BusinessResult, DbErrorExt};
use crate::external::mes::DocumentSink;
use crate::not_found;
use crate::services::processing::document::output_file_name;
use crate::services::processing::validation::{sanitize_filename, validate_document};

pub const DEFAULT_HISTORY_LIMIT: u64 = 50;
pub const MAX_HISTORY_LIMIT: u64 = 500;

/// File name recorded for a submission without an explicit one
fn derived_filename(document: &Value) -> String {
    let material = document["scopeMaterialNumber"].as_str().unwrap_or_default();
    let line = document["lineName"].as_str().unwrap_or_default();
    let name = sanitize_filename(&output_file_name(material, line));
    if name.is_empty() || name == "json" {
        "document.json".to_string()
    } else {
        name
    }
}

/// Validate a document, send it to the MES and record the attempt.
///
/// Validation failures are returned without reaching the MES or the history.
/// MES failures are recorded, then returned.
pub async fn submit_document(
    db: &DatabaseConnection,
    sink: &dyn DocumentSink,
    request: SubmissionRequest,
) -> BusinessResult<UploadRecord> {
    validate_document(&request.document)?;

    let filename = request
        .filename
        .as_deref()
        .map(sanitize_filename)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| derived_filename(&request.document));

    let outcome = sink.submit(&request.document).await;
    let (status, message) = match &outcome {
        Ok(reply) => (SubmissionStatus::Success, reply.clone()),
        Err(err) => (SubmissionStatus::Failed, err.to_string()),
    };

    let record = record_attempt(db, &filename, status, Some(message), request.document).await?;
    tracing::info!("Recorded {} submission of '{filename}'", status.as_str());

    outcome.map(|_| record)
}

pub async fn record_attempt(
    db: &DatabaseConnection,
    filename: &str,
    status: SubmissionStatus,
    message: Option<String>,
    payload: Value,
) -> BusinessResult<UploadRecord> {
    let model = models::ActiveModel {
        id: Set(Uuid::new_v4()),
        filename: Set(filename.to_string()),
        status: Set(status.as_str().to_string()),
        message: Set(message),
        payload: Set(payload),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await
    .map_err(|e| e.to_business_error("upload_history"))?;

    Ok(model.into())
}

/// Most recent attempts first
pub async fn list_history(
    db: &DatabaseConnection,
    limit: Option<u64>,
) -> BusinessResult<Vec<UploadRecord>> {
    let limit = limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);

    let rows = models::Entity::find()
        .order_by_desc(models::Column::CreatedAt)
        .limit(limit)
        .all(db)
        .await
        .map_err(|e| e.to_business_error("upload_history"))?;

    Ok(rows.into_iter().map(UploadRecord::from).collect())
}

pub async fn get_record(db: &DatabaseConnection, id: Uuid) -> BusinessResult<UploadRecord> {
    models::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| e.to_business_error("upload_history"))?
        .map(UploadRecord::from)
        .ok_or_else(|| not_found!("Upload record", id))
}
