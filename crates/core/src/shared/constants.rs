//! Fixed output geometry and session-coordination defaults.

/// Output canvas dimensions, shared by every normalized frame of a session
/// so the merged animation does not jitter.
pub const OUTPUT_WIDTH: u32 = 640;
pub const OUTPUT_HEIGHT: u32 = 480;

/// Target position of the left eye pupil on the output canvas.
pub const TARGET_PUPIL_X: f64 = 260.0;
pub const TARGET_PUPIL_Y: f64 = 170.0;

/// Target inter-pupil distance after scaling.
pub const TARGET_PUPIL_DISTANCE: f64 = 120.0;

/// Fallback content-aware shrink percentage for missing or invalid values.
pub const DEFAULT_SHRINK_PERCENT: u32 = 50;

/// Upload size cap, applied to decoded bytes.
pub const MAX_UPLOAD_BYTES: usize = 8 * 1024 * 1024;

/// Topic the merge coordinator publishes ticket ids to.
pub const MERGE_TOPIC: &str = "faceloop-merge";

/// Key of the merged artifact within a ticket's output prefix.
pub const OUTPUT_ARTIFACT: &str = "out.gif";

/// Per-frame delay of the merged animation (ImageMagick's `-delay 10`).
pub const ANIMATION_DELAY_MS: u32 = 100;
