//! Moves one upload through the pipeline: input area → normalize → interim
//! area.
//!
//! The input object is deleted exactly once its normalized frame is safely
//! in the interim area; the readiness predicate (`input == 0`) depends on
//! that ordering. On failure the input object is deleted as well: the
//! upload is unusable and keeping it would wedge the session's readiness
//! forever.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{info, warn};
use thiserror::Error;

use crate::pipeline::normalize_face_use_case::{NormalizeError, NormalizeFaceUseCase};
use crate::shared::work_image::WorkImage;
use crate::storage::domain::object_store::{ObjectStore, StorageArea};

type ExternalError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error("object store failure")]
    Store(#[source] ExternalError),
}

pub struct ProcessUploadUseCase {
    store: Arc<dyn ObjectStore>,
    normalizer: NormalizeFaceUseCase,
    scratch_dir: PathBuf,
}

impl ProcessUploadUseCase {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        normalizer: NormalizeFaceUseCase,
        scratch_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            normalizer,
            scratch_dir: scratch_dir.into(),
        }
    }

    /// Scratch file an input object key is fetched to; deterministic so
    /// callers can seed auxiliary files (landmark sidecars) beside it.
    pub fn scratch_path(scratch_dir: &Path, key: &str) -> PathBuf {
        scratch_dir.join(key)
    }

    /// Processes one input object end to end. The work image never becomes
    /// visible to other stages until fully normalized.
    pub fn execute(&mut self, key: &str) -> Result<(), ProcessError> {
        let scratch = Self::scratch_path(&self.scratch_dir, key);
        let metadata = self
            .store
            .fetch(StorageArea::Input, key, &scratch)
            .map_err(ProcessError::Store)?;

        let work = WorkImage::new(&scratch);
        let result = self
            .normalizer
            .execute(&work, metadata.shrink_percent.as_deref());

        match result {
            Ok(()) => {
                self.store
                    .put_file(StorageArea::Interim, key, &work)
                    .map_err(ProcessError::Store)?;
                self.store
                    .delete(StorageArea::Input, key)
                    .map_err(ProcessError::Store)?;
                let _ = std::fs::remove_file(&scratch);
                info!("processed {key}");
                Ok(())
            }
            Err(e) => {
                // Unusable upload: drop it so the session can still become
                // ready from its remaining frames.
                warn!("normalization of {key} failed, discarding input: {e}");
                let _ = std::fs::remove_file(&scratch);
                self.store
                    .delete(StorageArea::Input, key)
                    .map_err(ProcessError::Store)?;
                Err(e.into())
            }
        }
    }
}
