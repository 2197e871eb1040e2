use crate::config::MetadataPolicy;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(ToSchema, Deserialize, Serialize)]
pub struct HealthCheck {
    pub status: String,
}

/// Materials offered for bundle naming, plus how uploads are validated
#[derive(ToSchema, Deserialize, Serialize)]
pub struct MaterialList {
    pub materials: Vec<String>,
    pub metadata_policy: MetadataPolicy,
}
