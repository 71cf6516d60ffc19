use crate::shared::work_image::WorkImage;

/// Domain interface for geometric image mutation.
///
/// Operations mutate the externally stored pixel data in place; the domain
/// layer never sees pixels. Backed by an image-processing service or tool
/// in deployment. Failures propagate as-is and the caller discards the
/// work image rather than continuing with a half-transformed one.
pub trait ImageMutator: Send {
    /// Current pixel dimensions of the work image.
    fn dimensions(
        &self,
        image: &WorkImage,
    ) -> Result<(u32, u32), Box<dyn std::error::Error + Send + Sync>>;

    /// Resizes to exactly `width`×`height`, then rotates by
    /// `angle_degrees`, expanding the bounds to fit the rotated image.
    fn resize_rotate(
        &self,
        image: &WorkImage,
        width: u32,
        height: u32,
        angle_degrees: f64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Pastes the image onto a blank canvas of the given size at `offset`
    /// from the top-left corner (components may be negative); the work
    /// image becomes the canvas.
    fn composite_onto_canvas(
        &self,
        image: &WorkImage,
        canvas_width: u32,
        canvas_height: u32,
        offset: (i64, i64),
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Content-aware rescale by `percent` of the current dimensions.
    /// Applied in a shrink-then-restore pair before detection; must keep
    /// the restored dimensions within rounding of the originals.
    fn content_rescale(
        &self,
        image: &WorkImage,
        percent: u32,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
