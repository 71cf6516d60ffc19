use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::shared::work_image::WorkImage;

/// The three storage areas an upload moves through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StorageArea {
    /// Raw uploads awaiting normalization.
    Input,
    /// Normalized frames awaiting merge.
    Interim,
    /// Merged, publicly addressable artifacts.
    Output,
}

impl StorageArea {
    pub fn name(&self) -> &'static str {
        match self {
            StorageArea::Input => "input",
            StorageArea::Interim => "interim",
            StorageArea::Output => "output",
        }
    }
}

/// Metadata carried with a stored object.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMetadata {
    /// Raw content-aware shrink percentage from the upload, uninterpreted;
    /// the pipeline clamps it at use time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shrink_percent: Option<String>,
}

/// Domain interface over the durable object store the pipeline stages
/// coordinate through.
///
/// The store is the single owner of session state: tickets and their
/// counts live here, and every reader recomputes them per query. Listing
/// is eventually consistent with concurrent writers.
pub trait ObjectStore: Send + Sync {
    /// Keys in `area` starting with `prefix`, unordered.
    fn list(
        &self,
        area: StorageArea,
        prefix: &str,
    ) -> Result<Vec<String>, Box<dyn std::error::Error + Send + Sync>>;

    fn put(
        &self,
        area: StorageArea,
        key: &str,
        bytes: &[u8],
        metadata: &ObjectMetadata,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Downloads an object to a local work file and returns its metadata.
    fn fetch(
        &self,
        area: StorageArea,
        key: &str,
        dest: &Path,
    ) -> Result<ObjectMetadata, Box<dyn std::error::Error + Send + Sync>>;

    /// Uploads a local work file as `key`.
    fn put_file(
        &self,
        area: StorageArea,
        key: &str,
        source: &WorkImage,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    fn delete(
        &self,
        area: StorageArea,
        key: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Publicly addressable URL of an object (output artifacts).
    fn url(&self, area: StorageArea, key: &str) -> String;
}
