//! Pure pupil-alignment geometry. No I/O.
//!
//! Pass 1 computes rotation and scale from the two pupils of a fresh
//! detection. Translation is deliberately *not* derived from that
//! transform: resizing and rotating shift pixel coordinates in ways this
//! module does not track, so the pipeline re-detects on the mutated image
//! and measures the offset directly (`translation_offset`).

use thiserror::Error;

use crate::shared::landmark::Point;

#[derive(Error, Debug, PartialEq)]
pub enum GeometryError {
    /// Pupils are coincident or vertically stacked; the roll angle is
    /// undefined and any transform built from them would be NaN/Infinity.
    #[error("degenerate pupil geometry: left ({0:?}) vs right ({1:?})")]
    DegenerateGeometry(Point, Point),
}

/// Rotation and scale of the first normalization pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AlignmentTransform {
    /// Degrees; positivity levels a face whose right eye sits lower.
    pub angle_degrees: f64,
    /// Multiplier bringing the inter-pupil distance to the target.
    pub scale_factor: f64,
}

/// Computes the rotation/scale that levels the eye line and brings the
/// inter-pupil distance to `target_distance`.
pub fn compute_alignment(
    left_pupil: Point,
    right_pupil: Point,
    target_distance: f64,
) -> Result<AlignmentTransform, GeometryError> {
    let opposite = right_pupil.y - left_pupil.y;
    let adjacent = right_pupil.x - left_pupil.x;
    let hypotenuse = (opposite * opposite + adjacent * adjacent).sqrt();

    if adjacent == 0.0 || hypotenuse == 0.0 {
        return Err(GeometryError::DegenerateGeometry(left_pupil, right_pupil));
    }

    Ok(AlignmentTransform {
        angle_degrees: -(opposite / adjacent).atan().to_degrees(),
        scale_factor: target_distance / hypotenuse,
    })
}

/// Second-pass translation: where the canvas must receive the image so the
/// freshly re-detected left pupil lands on the target anchor. Either
/// component may be negative.
pub fn translation_offset(detected_left_pupil: Point, target_left_pupil: Point) -> (i64, i64) {
    (
        (target_left_pupil.x - detected_left_pupil.x).round() as i64,
        (target_left_pupil.y - detected_left_pupil.y).round() as i64,
    )
}

/// Whole-image dimensions after applying `scale_factor`, rounded.
pub fn projected_size(width: u32, height: u32, scale_factor: f64) -> (u32, u32) {
    (
        (f64::from(width) * scale_factor).round() as u32,
        (f64::from(height) * scale_factor).round() as u32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn test_horizontal_pupils_no_rotation() {
        let t = compute_alignment(
            Point::new(100.0, 200.0),
            Point::new(180.0, 200.0),
            60.0,
        )
        .unwrap();
        assert_relative_eq!(t.angle_degrees, 0.0);
        assert_relative_eq!(t.scale_factor, 0.75);
    }

    #[test]
    fn test_right_eye_lower_rotates_counterclockwise() {
        // Right pupil 30px below the left over a 30px run: 45° tilt.
        let t = compute_alignment(Point::new(0.0, 0.0), Point::new(30.0, 30.0), 60.0).unwrap();
        assert_relative_eq!(t.angle_degrees, -45.0);
    }

    #[test]
    fn test_right_eye_higher_rotates_clockwise() {
        let t = compute_alignment(Point::new(0.0, 30.0), Point::new(30.0, 0.0), 60.0).unwrap();
        assert_relative_eq!(t.angle_degrees, 45.0);
    }

    #[rstest]
    #[case(Point::new(50.0, 50.0), Point::new(50.0, 50.0))] // coincident
    #[case(Point::new(50.0, 10.0), Point::new(50.0, 90.0))] // vertical
    fn test_degenerate_pairs_rejected(#[case] left: Point, #[case] right: Point) {
        assert!(matches!(
            compute_alignment(left, right, 60.0),
            Err(GeometryError::DegenerateGeometry(..))
        ));
    }

    #[rstest]
    #[case(Point::new(0.0, 0.0), Point::new(80.0, 0.0))]
    #[case(Point::new(10.0, 40.0), Point::new(90.0, 10.0))]
    #[case(Point::new(200.0, 90.0), Point::new(120.0, 150.0))] // mirrored face
    fn test_transform_hits_target_distance(#[case] left: Point, #[case] right: Point) {
        let target = 120.0;
        let t = compute_alignment(left, right, target).unwrap();
        assert!(t.scale_factor > 0.0);
        assert!(t.angle_degrees > -90.0 && t.angle_degrees <= 90.0);

        // Scale and rotate the pair by the computed transform, then
        // re-measure the inter-pupil distance.
        let theta = t.angle_degrees.to_radians();
        // Screen coordinates, y down: positive angles rotate clockwise.
        let rotate = |p: Point| {
            let (x, y) = (p.x * t.scale_factor, p.y * t.scale_factor);
            Point::new(
                x * theta.cos() - y * theta.sin(),
                x * theta.sin() + y * theta.cos(),
            )
        };
        let (l, r) = (rotate(left), rotate(right));
        let measured = ((r.x - l.x).powi(2) + (r.y - l.y).powi(2)).sqrt();
        assert_relative_eq!(measured, target, epsilon = 1e-9);
    }

    #[test]
    fn test_translation_offset_moves_pupil_to_anchor() {
        let offset = translation_offset(Point::new(120.0, 90.0), Point::new(150.0, 150.0));
        assert_eq!(offset, (30, 60));
    }

    #[test]
    fn test_translation_offset_may_be_negative() {
        let offset = translation_offset(Point::new(400.0, 300.0), Point::new(150.0, 150.0));
        assert_eq!(offset, (-250, -150));
    }

    #[test]
    fn test_projected_size_rounds() {
        assert_eq!(projected_size(801, 601, 0.75), (601, 451));
    }
}
