use crate::shared::constants::{
    OUTPUT_HEIGHT, OUTPUT_WIDTH, TARGET_PUPIL_DISTANCE, TARGET_PUPIL_X, TARGET_PUPIL_Y,
};
use crate::shared::landmark::Point;

/// Where the face must land: canvas size, left-pupil anchor, and the
/// inter-pupil distance every normalized frame is scaled to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AlignmentTarget {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub left_pupil: Point,
    pub pupil_distance: f64,
}

impl Default for AlignmentTarget {
    fn default() -> Self {
        Self {
            canvas_width: OUTPUT_WIDTH,
            canvas_height: OUTPUT_HEIGHT,
            left_pupil: Point::new(TARGET_PUPIL_X, TARGET_PUPIL_Y),
            pupil_distance: TARGET_PUPIL_DISTANCE,
        }
    }
}
