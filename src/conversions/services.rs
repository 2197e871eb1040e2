use axum::extract::Multipart;

use super::models::WorkbookUpload;
use crate::common::errors::{BusinessError, BusinessResult};
use crate::config::{Config, MetadataPolicy};
use crate::services::processing::bundle::{build_zip, bundle_file_name};
use crate::services::processing::{ConversionReport, ProcessPlanConverter};
use crate::validation_error;

/// A zip bundle ready for download, with the report it was built from
pub struct ConversionBundle {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub report: ConversionReport,
}

/// Pull the workbook and form fields out of a multipart upload
pub async fn read_upload(mut multipart: Multipart) -> BusinessResult<WorkbookUpload> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut material: Option<String> = None;
    let mut metadata_policy: Option<MetadataPolicy> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| validation_error!("file", format!("Multipart error: {e}")))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                let file_name = field
                    .file_name()
                    .map_or_else(|| "upload.xlsx".to_string(), ToString::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| {
                        validation_error!("file", format!("Failed to read file data: {e}"))
                    })?
                    .to_vec();
                file = Some((file_name, bytes));
            }
            "material" => {
                let value = read_text(field, "material").await?;
                material = Some(value).filter(|m| !m.is_empty());
            }
            "metadata_policy" => {
                let value = read_text(field, "metadata_policy").await?;
                metadata_policy = Some(parse_policy(&value)?);
            }
            other => tracing::debug!("Ignoring multipart field '{other}'"),
        }
    }

    let (file_name, bytes) =
        file.ok_or_else(|| validation_error!("file", "No Excel file found in request"))?;

    if !std::path::Path::new(&file_name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx"))
    {
        return Err(validation_error!("file", "Please upload a valid .xlsx file"));
    }

    Ok(WorkbookUpload {
        file_name,
        bytes,
        material,
        metadata_policy,
    })
}

async fn read_text(
    field: axum::extract::multipart::Field<'_>,
    name: &str,
) -> BusinessResult<String> {
    field
        .text()
        .await
        .map(|value| value.trim().to_string())
        .map_err(|e| validation_error!(name, format!("Failed to read field: {e}")))
}

fn parse_policy(value: &str) -> BusinessResult<MetadataPolicy> {
    match value.to_ascii_lowercase().as_str() {
        "strict" => Ok(MetadataPolicy::Strict),
        "lenient" => Ok(MetadataPolicy::Lenient),
        _ => Err(validation_error!(
            "metadata_policy",
            format!("unknown policy '{value}', expected 'strict' or 'lenient'")
        )),
    }
}

fn converter_for(config: &Config, upload: &WorkbookUpload) -> ProcessPlanConverter {
    ProcessPlanConverter::new(
        config.layout.clone(),
        upload.metadata_policy.unwrap_or(config.metadata_policy),
    )
}

/// Convert an uploaded workbook on the blocking pool
pub async fn convert_upload(
    config: &Config,
    upload: WorkbookUpload,
) -> BusinessResult<ConversionReport> {
    let converter = converter_for(config, &upload);
    tracing::info!(
        "Converting '{}' ({} bytes, {:?} metadata)",
        upload.file_name,
        upload.bytes.len(),
        converter.policy()
    );

    tokio::task::spawn_blocking(move || converter.convert_workbook(&upload.bytes))
        .await
        .map_err(|e| BusinessError::InternalError {
            message: format!("Conversion task failed: {e}"),
        })?
        .map_err(BusinessError::from)
}

/// Convert an uploaded workbook and package the documents as a zip bundle
pub async fn bundle_upload(
    config: &Config,
    upload: WorkbookUpload,
) -> BusinessResult<ConversionBundle> {
    let file_name = bundle_file_name(upload.material.as_deref().unwrap_or_default());
    let report = convert_upload(config, upload).await?;

    if report.is_empty() {
        let details: Vec<String> = report.failures.iter().map(|f| f.message.clone()).collect();
        return Err(BusinessError::BusinessRuleViolation {
            rule: "no_valid_sheets".to_string(),
            message: if details.is_empty() {
                "No valid sheets found in the Excel file".to_string()
            } else {
                format!("No valid sheets found in the Excel file: {}", details.join("; "))
            },
        });
    }

    let (bytes, report) = tokio::task::spawn_blocking(move || {
        build_zip(&report.documents).map(|bytes| (bytes, report))
    })
    .await
    .map_err(|e| BusinessError::InternalError {
        message: format!("Bundling task failed: {e}"),
    })?
    .map_err(|e| BusinessError::InternalError {
        message: format!("Failed to build zip bundle: {e:#}"),
    })?;

    Ok(ConversionBundle {
        file_name,
        bytes,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_policy() {
        assert_eq!(parse_policy("Lenient").unwrap(), MetadataPolicy::Lenient);
        assert_eq!(parse_policy("strict").unwrap(), MetadataPolicy::Strict);
        assert!(parse_policy("loose").is_err());
    }
}
