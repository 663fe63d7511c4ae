//! Photo metadata and pending uploads

use axum::body::Bytes;
use serde::{Deserialize, Serialize};

/// Content type used when the client did not declare one
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Metadata describing one photo stored in object storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    #[serde(rename = "Bucket")]
    pub bucket: String,
    #[serde(rename = "Object")]
    pub object: String,
    #[serde(rename = "Url")]
    pub url: String,
    #[serde(rename = "ContentType")]
    pub content_type: String,
    #[serde(rename = "Size")]
    pub size: u64,
}

/// A photo file part read from an upload form, not yet stored
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl PhotoUpload {
    /// Lowercased file extension of the submitted file name, if any
    pub fn extension(&self) -> Option<String> {
        let name = self.file_name.as_deref()?;
        let (stem, ext) = name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }

    pub fn content_type(&self) -> &str {
        self.content_type
            .as_deref()
            .filter(|ct| !ct.is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}
