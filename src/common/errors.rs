use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde_json::json;
use std::fmt;

use crate::services::processing::errors::ConversionError;

/// Error types surfaced by the HTTP layer
#[derive(Debug, Clone)]
pub enum BusinessError {
    /// Validation errors for user input (400 Bad Request)
    ValidationError { field: String, message: String },
    /// Uploaded workbook produced nothing usable (422 Unprocessable Entity)
    BusinessRuleViolation { rule: String, message: String },
    /// Resource not found (404 Not Found)
    NotFound { resource: String, id: String },
    /// External service errors (502 Bad Gateway)
    ExternalServiceError { service: String, message: String },
    /// Generic application error (500 Internal Server Error)
    InternalError { message: String },
}

impl fmt::Display for BusinessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusinessError::ValidationError { field, message } => {
                write!(f, "Validation error in field '{field}': {message}")
            }
            BusinessError::BusinessRuleViolation { rule, message } => {
                write!(f, "Business rule '{rule}' violated: {message}")
            }
            BusinessError::NotFound { resource, id } => {
                write!(f, "{resource} with id '{id}' not found")
            }
            BusinessError::ExternalServiceError { service, message } => {
                write!(f, "External service '{service}' error: {message}")
            }
            BusinessError::InternalError { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for BusinessError {}

impl BusinessError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            BusinessError::ValidationError { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            BusinessError::BusinessRuleViolation { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "BUSINESS_RULE_VIOLATION",
            ),
            BusinessError::NotFound { .. } => (StatusCode::NOT_FOUND, "RESOURCE_NOT_FOUND"),
            BusinessError::ExternalServiceError { .. } => {
                (StatusCode::BAD_GATEWAY, "EXTERNAL_SERVICE_ERROR")
            }
            BusinessError::InternalError { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        }
    }
}

/// Convert `BusinessError` to HTTP responses
impl IntoResponse for BusinessError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();
        let message = self.to_string();

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
                "type": format!("{self:?}").split(' ').next().unwrap_or("Unknown")
            }
        }));

        (status, body).into_response()
    }
}

impl From<ConversionError> for BusinessError {
    fn from(err: ConversionError) -> Self {
        match err {
            ConversionError::Validation { sheet, message } => BusinessError::ValidationError {
                field: sheet,
                message,
            },
            err @ ConversionError::Workbook { .. } => BusinessError::ValidationError {
                field: "file".to_string(),
                message: err.to_string(),
            },
            err @ ConversionError::Serialization { .. } => BusinessError::InternalError {
                message: err.to_string(),
            },
        }
    }
}

/// Map `DbErr` to business errors with the resource named by `context`
pub fn map_db_error(err: DbErr, context: &str) -> BusinessError {
    match err {
        DbErr::RecordNotFound(msg) => BusinessError::NotFound {
            resource: context.replace('_', " "),
            id: msg,
        },
        DbErr::Conn(conn_err) => BusinessError::ExternalServiceError {
            service: "database".to_string(),
            message: conn_err.to_string(),
        },
        _ => BusinessError::InternalError {
            message: err.to_string(),
        },
    }
}

/// Extension trait to add business error conversion to `DbErr`
pub trait DbErrorExt {
    fn to_business_error(self, context: &str) -> BusinessError;
}

impl DbErrorExt for DbErr {
    fn to_business_error(self, context: &str) -> BusinessError {
        map_db_error(self, context)
    }
}

/// Convenience macros for creating business errors
#[macro_export]
macro_rules! validation_error {
    ($field:expr, $message:expr) => {
        $crate::common::errors::BusinessError::ValidationError {
            field: $field.to_string(),
            message: $message.to_string(),
        }
    };
}

#[macro_export]
macro_rules! not_found {
    ($resource:expr, $id:expr) => {
        $crate::common::errors::BusinessError::NotFound {
            resource: $resource.to_string(),
            id: $id.to_string(),
        }
    };
}

/// Result type alias for business operations
pub type BusinessResult<T> = Result<T, BusinessError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn test_validation_error_creation() {
        let err = validation_error!("file", "must be an .xlsx workbook");
        assert!(matches!(err, BusinessError::ValidationError { .. }));
        assert_eq!(
            err.to_string(),
            "Validation error in field 'file': must be an .xlsx workbook"
        );
    }

    #[test]
    fn test_conversion_error_maps_to_validation() {
        let err: BusinessError = ConversionError::Validation {
            sheet: "Citrine1".to_string(),
            message: "missing required columns: Qty".to_string(),
        }
        .into();

        match err {
            BusinessError::ValidationError { field, message } => {
                assert_eq!(field, "Citrine1");
                assert!(message.contains("Qty"));
            }
            _ => panic!("Expected validation error"),
        }
    }

    #[test]
    fn test_db_error_mapping() {
        let err = DbErr::RecordNotFound("abc-123".to_string()).to_business_error("upload_history");
        match err {
            BusinessError::NotFound { resource, id } => {
                assert_eq!(resource, "upload history");
                assert_eq!(id, "abc-123");
            }
            _ => panic!("Expected not found error"),
        }

        let err = DbErr::Custom("boom".to_string()).to_business_error("upload_history");
        assert!(matches!(err, BusinessError::InternalError { .. }));
    }

    #[tokio::test]
    async fn test_error_response_shape() {
        let response = BusinessError::ExternalServiceError {
            service: "mes".to_string(),
            message: "timed out".to_string(),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "EXTERNAL_SERVICE_ERROR");
        assert_eq!(body["error"]["type"], "ExternalServiceError");
        assert!(
            body["error"]["message"]
                .as_str()
                .unwrap()
                .contains("timed out")
        );
    }
}
