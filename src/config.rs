use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use utoipa::ToSchema;

/// Materials offered by the upload form; the chosen one names the zip bundle.
pub const MATERIAL_LIST: &[&str] = &[
    "JADE",
    "SAPPHIRE",
    "LAPIS",
    "PAPAYA",
    "CARROT",
    "CITRINE",
    "MRC",
    "TACTILE",
    "FINGER",
    "FINGERMOTOR",
    "THUMBSENSOR",
    "THUMBMOTOR",
    "THUMB",
    "HANDPALM",
    "HANDCAMERAGLUE",
    "HAND",
    "ARMRIGHT",
    "ARMLEFT",
    "LEGRIGHT",
    "LEGLEFT",
    "SHIN",
    "NECKWRIST",
    "PELVIS",
    "COMPUTE",
    "TORSOASSEMBLY",
    "FINALASSEMBLY",
    "BRINGUP",
    "BMSTEST",
    "CELLTEST",
    "BATTERYMAIN",
    "CASEPREPSUB",
    "BUSBARCCASUB",
    "BMSBOTTOMCOVERSUB",
];

const DEFAULT_MES_API_URL: &str =
    "https://mes.dev.figure.ai:60088/system/webdev/BotQ-MES/Operations/OperationsRouteManual";

/// How a sheet's metadata block is treated when fields are missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MetadataPolicy {
    /// Reject sheets with missing metadata, blank or malformed line names.
    #[default]
    Strict,
    /// Fill missing metadata with defaults and keep going.
    Lenient,
}

impl MetadataPolicy {
    fn from_env_value(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("lenient") {
            Self::Lenient
        } else {
            Self::Strict
        }
    }
}

/// Fixed positions of the metadata block and step table inside a process plan sheet.
/// All indices are zero-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcelLayout {
    pub meta_rows: usize,
    pub meta_col_name: usize,
    pub meta_col_value: usize,
    pub header_row: usize,
    pub data_start_row: usize,
    /// First column of the step table (column B).
    pub table_start_col: usize,
    pub required_meta_fields: Vec<String>,
}

impl Default for ExcelLayout {
    fn default() -> Self {
        Self {
            meta_rows: 5,
            meta_col_name: 3,
            meta_col_value: 4,
            header_row: 7,
            data_start_row: 8,
            table_start_col: 1,
            required_meta_fields: [
                "scopeMaterialNumber",
                "scopeMaterialTitle",
                "scopeMaterialPlmId",
                "areaName",
                "lineName",
            ]
            .iter()
            .map(ToString::to_string)
            .collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub db_url: Option<String>,
    pub app_name: String,
    pub deployment: String,
    pub mes_api_url: String,
    pub mes_username: String,
    pub mes_password: String,
    pub mes_timeout_seconds: u64,
    pub metadata_policy: MetadataPolicy,
    pub max_upload_mb: usize,
    pub layout: ExcelLayout,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok(); // Load from .env file if available
        let db_url = env::var("DB_URL").ok().or_else(|| {
            let user = env::var("DB_USER").ok()?;
            Some(format!(
                "{}://{}:{}@{}:{}/{}",
                env::var("DB_PREFIX").unwrap_or_else(|_| "postgresql".to_string()),
                user,
                env::var("DB_PASSWORD").unwrap_or_default(),
                env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
                env::var("DB_PORT").unwrap_or_else(|_| "5432".to_string()),
                env::var("DB_NAME").unwrap_or_else(|_| "process_plans".to_string()),
            ))
        });

        Config {
            app_name: env::var("APP_NAME").unwrap_or_else(|_| "process-plan-api".to_string()),
            deployment: env::var("DEPLOYMENT").unwrap_or_else(|_| "local".to_string()),
            mes_api_url: env::var("MES_API_URL")
                .unwrap_or_else(|_| DEFAULT_MES_API_URL.to_string()),
            mes_username: env::var("MES_USERNAME").unwrap_or_else(|_| "figure".to_string()),
            mes_password: env::var("MES_PASSWORD").unwrap_or_else(|_| "figure".to_string()),
            // Large plans take several minutes on the MES side
            mes_timeout_seconds: env::var("MES_TIMEOUT_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(600),
            metadata_policy: env::var("METADATA_POLICY")
                .map(|v| MetadataPolicy::from_env_value(&v))
                .unwrap_or_default(),
            max_upload_mb: env::var("MAX_UPLOAD_MB")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(100),
            layout: ExcelLayout::default(),
            db_url,
        }
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Config {
            app_name: "process-plan-api-test".to_string(),
            deployment: "test".to_string(),
            mes_api_url: "http://127.0.0.1:9/mes".to_string(),
            mes_username: "test-user".to_string(),
            mes_password: "test-password".to_string(),
            mes_timeout_seconds: 5,
            metadata_policy: MetadataPolicy::Strict,
            max_upload_mb: 10,
            layout: ExcelLayout::default(),
            db_url: None,
        }
    }
}

#[cfg(test)]
pub mod test_helpers {
    use super::*;
    use crate::common::errors::BusinessError;
    use crate::external::mes::DocumentSink;
    use crate::routes::build_router;
    use async_trait::async_trait;
    use axum::Router;
    use sea_orm::{ConnectOptions, Database, DatabaseConnection};
    use serde_json::Value;
    use std::sync::{Arc, Mutex};

    /// Stand-in for the MES endpoint that records every document it receives.
    #[derive(Default)]
    pub struct RecordingSink {
        pub received: Mutex<Vec<Value>>,
        pub fail_with: Option<String>,
    }

    impl RecordingSink {
        pub fn failing(message: &str) -> Self {
            Self {
                received: Mutex::new(Vec::new()),
                fail_with: Some(message.to_string()),
            }
        }
    }

    #[async_trait]
    impl DocumentSink for RecordingSink {
        async fn submit(&self, document: &Value) -> Result<String, BusinessError> {
            self.received.lock().unwrap().push(document.clone());
            match &self.fail_with {
                Some(message) => Err(BusinessError::ExternalServiceError {
                    service: "mes".to_string(),
                    message: message.clone(),
                }),
                None => Ok("accepted".to_string()),
            }
        }
    }

    pub async fn setup_test_db() -> DatabaseConnection {
        // A single connection keeps the in-memory database alive for the whole test
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1).min_connections(1);
        let db = Database::connect(options)
            .await
            .expect("Failed to open in-memory database");

        use migration::{Migrator, MigratorTrait};
        Migrator::up(&db, None)
            .await
            .expect("Failed to run database migrations");

        db
    }

    pub async fn setup_test_app() -> Router {
        setup_test_app_with_sink(Arc::new(RecordingSink::default())).await
    }

    pub async fn setup_test_app_with_sink(sink: Arc<dyn DocumentSink>) -> Router {
        let db = setup_test_db().await;
        build_router(&db, &Config::for_tests(), sink)
    }
}
