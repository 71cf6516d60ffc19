use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame};

use crate::imaging::domain::frame_animator::FrameAnimator;
use crate::shared::work_image::WorkImage;

/// Assembles normalized frames into an endlessly looping GIF with the
/// `image` crate's encoder.
pub struct GifAnimator;

impl GifAnimator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GifAnimator {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameAnimator for GifAnimator {
    fn animate(
        &self,
        frames: &[WorkImage],
        output: &Path,
        delay_ms: u32,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = BufWriter::new(File::create(output)?);
        let mut encoder = GifEncoder::new(file);
        encoder.set_repeat(Repeat::Infinite)?;

        let delay = Delay::from_numer_denom_ms(delay_ms, 1);
        for frame in frames {
            let img = image::open(frame.path())?.to_rgba8();
            encoder.encode_frame(Frame::from_parts(img, 0, 0, delay))?;
        }
        Ok(())
    }
}
