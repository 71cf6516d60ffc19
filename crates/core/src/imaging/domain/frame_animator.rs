use std::path::Path;

use crate::shared::work_image::WorkImage;

/// Domain interface for merging normalized frames into a looping animation.
pub trait FrameAnimator: Send {
    /// Assembles `frames`, in order, into an endlessly looping animation at
    /// `output`, showing each frame for `delay_ms`.
    fn animate(
        &self,
        frames: &[WorkImage],
        output: &Path,
        delay_ms: u32,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
