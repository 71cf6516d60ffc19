use std::path::Path;
use std::sync::Arc;

use log::{error, info};

use crate::detection::domain::face_detector::FaceDetector;
use crate::imaging::domain::image_mutator::ImageMutator;
use crate::pipeline::normalize_face_use_case::NormalizeFaceUseCase;
use crate::pipeline::process_upload_use_case::ProcessUploadUseCase;
use crate::shared::alignment_target::AlignmentTarget;
use crate::storage::domain::object_store::ObjectStore;

/// Outcome of one pool run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProcessReport {
    pub processed: usize,
    pub failed: usize,
}

/// Fans per-image processing out over worker threads.
///
/// Images are independent (normalization is a strict sequential chain
/// *within* one image, but no state is shared *across* images beyond the
/// store), so keys from any mix of tickets run in full parallelism. Each
/// worker owns its own detector and mutator. A failed image is logged and
/// counted, not fatal: its input was already discarded by the use case,
/// matching the isolation of independently triggered workers.
pub struct ProcessWorkerPool {
    workers: usize,
}

impl ProcessWorkerPool {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn run(
        &self,
        store: Arc<dyn ObjectStore>,
        target: AlignmentTarget,
        scratch_dir: &Path,
        keys: Vec<String>,
        make_detector: &(dyn Fn() -> Box<dyn FaceDetector> + Sync),
        make_mutator: &(dyn Fn() -> Box<dyn ImageMutator> + Sync),
    ) -> ProcessReport {
        let total = keys.len();
        let (key_tx, key_rx) = crossbeam_channel::bounded::<String>(self.workers);
        let (report_tx, report_rx) = crossbeam_channel::unbounded::<bool>();

        std::thread::scope(|scope| {
            for _ in 0..self.workers {
                let key_rx = key_rx.clone();
                let report_tx = report_tx.clone();
                let store = store.clone();
                scope.spawn(move || {
                    let normalizer = NormalizeFaceUseCase::new(
                        make_detector(),
                        make_mutator(),
                        target,
                    );
                    let mut use_case =
                        ProcessUploadUseCase::new(store, normalizer, scratch_dir);
                    for key in key_rx {
                        let ok = match use_case.execute(&key) {
                            Ok(()) => true,
                            Err(e) => {
                                error!("processing {key} failed: {e}");
                                false
                            }
                        };
                        if report_tx.send(ok).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(report_tx);

            for key in keys {
                if key_tx.send(key).is_err() {
                    break;
                }
            }
            drop(key_tx);
        });

        let mut report = ProcessReport::default();
        for ok in report_rx {
            if ok {
                report.processed += 1;
            } else {
                report.failed += 1;
            }
        }
        info!(
            "pool done: {}/{total} processed, {} failed",
            report.processed, report.failed
        );
        report
    }
}
