//! The merge worker behind the coordinator's queue message: turns a ready
//! ticket's interim frames into the session's output artifact.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::info;
use thiserror::Error;

use crate::imaging::domain::frame_animator::FrameAnimator;
use crate::shared::constants::{ANIMATION_DELAY_MS, OUTPUT_ARTIFACT};
use crate::shared::ticket::Ticket;
use crate::shared::work_image::WorkImage;
use crate::storage::domain::object_store::{ObjectStore, StorageArea};

type ExternalError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum MergeError {
    /// A single frame cannot animate. The worker re-validates readiness
    /// rather than trusting the (fire-and-forget) merge request.
    #[error("not enough frames to animate: found {found}, need at least 2")]
    NotEnoughFrames { found: usize },

    #[error("object store failure")]
    Store(#[source] ExternalError),

    #[error("animation failed")]
    Animator(#[source] ExternalError),
}

pub struct MergeSessionUseCase {
    store: Arc<dyn ObjectStore>,
    animator: Box<dyn FrameAnimator>,
    scratch_dir: PathBuf,
    delay_ms: u32,
}

impl MergeSessionUseCase {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        animator: Box<dyn FrameAnimator>,
        scratch_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            animator,
            scratch_dir: scratch_dir.into(),
            delay_ms: ANIMATION_DELAY_MS,
        }
    }

    /// Merges the ticket's interim frames into `{ticket}/out.gif` in the
    /// output area, then cleans the interim area. Returns the artifact's
    /// public URL.
    pub fn execute(&self, ticket: &Ticket) -> Result<String, MergeError> {
        let prefix = format!("{ticket}/");
        let mut keys = self
            .store
            .list(StorageArea::Interim, &prefix)
            .map_err(MergeError::Store)?;
        if keys.len() < 2 {
            return Err(MergeError::NotEnoughFrames { found: keys.len() });
        }
        // Store listings are unordered; sort for a stable frame order.
        keys.sort();

        let scratch = self.scratch_dir.join(format!("{ticket}-animate"));
        let mut frames = Vec::with_capacity(keys.len());
        for key in &keys {
            let dest = scratch.join(basename(key));
            self.store
                .fetch(StorageArea::Interim, key, &dest)
                .map_err(MergeError::Store)?;
            frames.push(WorkImage::new(dest));
        }

        let output = scratch.join(OUTPUT_ARTIFACT);
        self.animator
            .animate(&frames, &output, self.delay_ms)
            .map_err(MergeError::Animator)?;

        let output_key = format!("{ticket}/{OUTPUT_ARTIFACT}");
        self.store
            .put_file(StorageArea::Output, &output_key, &WorkImage::new(&output))
            .map_err(MergeError::Store)?;

        // Interim frames are consumed; the output artifact alone drives
        // the completion predicate from here on.
        for key in &keys {
            self.store
                .delete(StorageArea::Interim, key)
                .map_err(MergeError::Store)?;
        }

        let url = self.store.url(StorageArea::Output, &output_key);
        info!("merged {} frames for ticket {ticket} -> {url}", keys.len());
        Ok(url)
    }
}

fn basename(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}
