use crate::shared::landmark::FaceDetection;
use crate::shared::work_image::WorkImage;

/// Domain interface for face detection.
///
/// Backed by an external vision service in deployment; implementations may
/// be stateful (e.g., connection reuse), hence `&mut self`. Calls are
/// expected to be slow and may time out; failures propagate as-is.
pub trait FaceDetector: Send {
    fn detect(
        &mut self,
        image: &WorkImage,
    ) -> Result<Vec<FaceDetection>, Box<dyn std::error::Error + Send + Sync>>;
}
