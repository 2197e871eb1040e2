use crate::config::MetadataPolicy;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Multipart form accepted by the conversion endpoints
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ConversionForm {
    /// The `.xlsx` process plan workbook
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    /// Names the downloaded bundle, e.g. `HAND` gives `HAND_jsons.zip`
    pub material: Option<String>,
    /// Overrides the server's metadata policy for this upload
    pub metadata_policy: Option<MetadataPolicy>,
}

/// A workbook upload pulled out of the multipart body
#[derive(Debug, Clone)]
pub struct WorkbookUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub material: Option<String>,
    pub metadata_policy: Option<MetadataPolicy>,
}
