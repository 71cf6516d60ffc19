//! Two-pass face normalization: measure, transform, re-measure, correct.
//!
//! Pass 1 rotates and scales from a fresh detection; pass 2 re-detects on
//! the mutated image and composites so the measured left pupil lands on
//! the target anchor. The re-detection is deliberate: resampling shifts
//! pixel coordinates in ways the geometry does not track analytically, so
//! the pipeline measures the result instead of predicting it.

use log::debug;
use thiserror::Error;

use crate::detection::domain::face_detector::FaceDetector;
use crate::geometry::alignment::{
    compute_alignment, projected_size, translation_offset, GeometryError,
};
use crate::geometry::content_shrink::{restore_percent, shrink_percent};
use crate::imaging::domain::image_mutator::ImageMutator;
use crate::shared::alignment_target::AlignmentTarget;
use crate::shared::landmark::{FaceDetection, Point};
use crate::shared::work_image::WorkImage;

type ExternalError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum NormalizeError {
    /// Zero or several faces. The system refuses ambiguous input rather
    /// than guessing; the caller discards the upload.
    #[error("expected exactly one face, found {found}")]
    AmbiguousFace { found: usize },

    /// The single face was missing an eye pupil landmark.
    #[error("detection carries no {which} pupil landmark")]
    MissingPupil { which: &'static str },

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error("face detection failed")]
    Detector(#[source] ExternalError),

    #[error("image mutation failed")]
    Mutator(#[source] ExternalError),
}

/// Requires exactly one detected face.
fn single_face(faces: Vec<FaceDetection>) -> Result<FaceDetection, NormalizeError> {
    let found = faces.len();
    faces
        .into_iter()
        .next()
        .filter(|_| found == 1)
        .ok_or(NormalizeError::AmbiguousFace { found })
}

fn pupils(face: &FaceDetection) -> Result<(Point, Point), NormalizeError> {
    let left = face
        .left_pupil()
        .ok_or(NormalizeError::MissingPupil { which: "left" })?;
    let right = face
        .right_pupil()
        .ok_or(NormalizeError::MissingPupil { which: "right" })?;
    Ok((left, right))
}

/// Normalizes one face image in place: after `execute` the work image is
/// the fixed-size canvas with the left pupil on the target anchor and the
/// inter-pupil distance at the target.
///
/// Any failure aborts the chain before the next mutation; the caller
/// discards the work image, so no partially transformed artifact becomes
/// visible downstream.
pub struct NormalizeFaceUseCase {
    detector: Box<dyn FaceDetector>,
    mutator: Box<dyn ImageMutator>,
    target: AlignmentTarget,
}

impl NormalizeFaceUseCase {
    pub fn new(
        detector: Box<dyn FaceDetector>,
        mutator: Box<dyn ImageMutator>,
        target: AlignmentTarget,
    ) -> Self {
        Self {
            detector,
            mutator,
            target,
        }
    }

    pub fn execute(
        &mut self,
        image: &WorkImage,
        raw_shrink: Option<&str>,
    ) -> Result<(), NormalizeError> {
        // Optional detection-accuracy aid: content-aware shrink and
        // compensating restore, leaving dimensions unchanged.
        if raw_shrink.is_some() {
            let shrink = shrink_percent(raw_shrink);
            let restore = restore_percent(shrink);
            debug!("content shrink {shrink}% / restore {restore}%");
            self.mutator
                .content_rescale(image, shrink)
                .map_err(NormalizeError::Mutator)?;
            self.mutator
                .content_rescale(image, restore)
                .map_err(NormalizeError::Mutator)?;
        }

        // Pass 1: fresh detection, rotate and scale blindly.
        let face = single_face(
            self.detector
                .detect(image)
                .map_err(NormalizeError::Detector)?,
        )?;
        let (left, right) = pupils(&face)?;
        let transform = compute_alignment(left, right, self.target.pupil_distance)?;

        let (width, height) = self
            .mutator
            .dimensions(image)
            .map_err(NormalizeError::Mutator)?;
        let (new_width, new_height) = projected_size(width, height, transform.scale_factor);
        debug!(
            "pass 1: angle {:.2}°, scale {:.4}, {width}x{height} -> {new_width}x{new_height}",
            transform.angle_degrees, transform.scale_factor
        );
        self.mutator
            .resize_rotate(image, new_width, new_height, transform.angle_degrees)
            .map_err(NormalizeError::Mutator)?;

        // Pass 2: measure where the mutation actually put the pupil and
        // correct position while compositing onto the canvas.
        let face = single_face(
            self.detector
                .detect(image)
                .map_err(NormalizeError::Detector)?,
        )?;
        let (left, _) = pupils(&face)?;
        let offset = translation_offset(left, self.target.left_pupil);
        debug!("pass 2: left pupil at ({:.1}, {:.1}), offset {offset:?}", left.x, left.y);
        self.mutator
            .composite_onto_canvas(
                image,
                self.target.canvas_width,
                self.target.canvas_height,
                offset,
            )
            .map_err(NormalizeError::Mutator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::landmark::{Landmark, LandmarkKind};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    // --- Stubs ---

    struct ScriptedDetector {
        responses: VecDeque<Result<Vec<FaceDetection>, String>>,
    }

    impl ScriptedDetector {
        fn new(responses: Vec<Result<Vec<FaceDetection>, String>>) -> Self {
            Self {
                responses: responses.into(),
            }
        }
    }

    impl FaceDetector for ScriptedDetector {
        fn detect(
            &mut self,
            _image: &WorkImage,
        ) -> Result<Vec<FaceDetection>, Box<dyn std::error::Error + Send + Sync>> {
            self.responses
                .pop_front()
                .expect("unexpected extra detection call")
                .map_err(Into::into)
        }
    }

    #[derive(Clone, Debug, PartialEq)]
    enum MutatorCall {
        ContentRescale(u32),
        ResizeRotate(u32, u32, f64),
        Composite(u32, u32, (i64, i64)),
    }

    #[derive(Clone)]
    struct RecordingMutator {
        calls: Arc<Mutex<Vec<MutatorCall>>>,
        dimensions: (u32, u32),
    }

    impl RecordingMutator {
        fn new(dimensions: (u32, u32)) -> Self {
            Self {
                calls: Arc::new(Mutex::new(Vec::new())),
                dimensions,
            }
        }

        fn calls(&self) -> Vec<MutatorCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ImageMutator for RecordingMutator {
        fn dimensions(
            &self,
            _image: &WorkImage,
        ) -> Result<(u32, u32), Box<dyn std::error::Error + Send + Sync>> {
            Ok(self.dimensions)
        }

        fn resize_rotate(
            &self,
            _image: &WorkImage,
            width: u32,
            height: u32,
            angle_degrees: f64,
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            self.calls
                .lock()
                .unwrap()
                .push(MutatorCall::ResizeRotate(width, height, angle_degrees));
            Ok(())
        }

        fn composite_onto_canvas(
            &self,
            _image: &WorkImage,
            canvas_width: u32,
            canvas_height: u32,
            offset: (i64, i64),
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            self.calls
                .lock()
                .unwrap()
                .push(MutatorCall::Composite(canvas_width, canvas_height, offset));
            Ok(())
        }

        fn content_rescale(
            &self,
            _image: &WorkImage,
            percent: u32,
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            self.calls
                .lock()
                .unwrap()
                .push(MutatorCall::ContentRescale(percent));
            Ok(())
        }
    }

    // --- Helpers ---

    fn face(left: (f64, f64), right: (f64, f64)) -> FaceDetection {
        FaceDetection::new(vec![
            Landmark {
                kind: LandmarkKind::LeftEyePupil,
                position: Point::new(left.0, left.1),
            },
            Landmark {
                kind: LandmarkKind::RightEyePupil,
                position: Point::new(right.0, right.1),
            },
        ])
    }

    fn target() -> AlignmentTarget {
        AlignmentTarget {
            canvas_width: 640,
            canvas_height: 480,
            left_pupil: Point::new(150.0, 150.0),
            pupil_distance: 60.0,
        }
    }

    fn work() -> WorkImage {
        WorkImage::new("/scratch/t1/photo.png")
    }

    // --- Tests ---

    #[test]
    fn test_two_pass_normalization_places_pupil_on_anchor() {
        // Horizontal eyes 80px apart, target distance 60: scale 0.75,
        // no rotation. The scripted re-detection reports the pupils at
        // their post-scale positions.
        let detector = ScriptedDetector::new(vec![
            Ok(vec![face((100.0, 200.0), (180.0, 200.0))]),
            Ok(vec![face((75.0, 150.0), (135.0, 150.0))]),
        ]);
        let mutator = RecordingMutator::new((800, 600));
        let calls = mutator.clone();

        let mut uc = NormalizeFaceUseCase::new(Box::new(detector), Box::new(mutator), target());
        uc.execute(&work(), None).unwrap();

        assert_eq!(
            calls.calls(),
            vec![
                MutatorCall::ResizeRotate(600, 450, 0.0),
                MutatorCall::Composite(640, 480, (75, 0)),
            ]
        );
    }

    #[test]
    fn test_two_faces_abort_before_any_mutation() {
        let detector = ScriptedDetector::new(vec![Ok(vec![
            face((10.0, 10.0), (50.0, 10.0)),
            face((200.0, 10.0), (240.0, 10.0)),
        ])]);
        let mutator = RecordingMutator::new((800, 600));
        let calls = mutator.clone();

        let mut uc = NormalizeFaceUseCase::new(Box::new(detector), Box::new(mutator), target());
        let err = uc.execute(&work(), None).unwrap_err();

        assert!(matches!(err, NormalizeError::AmbiguousFace { found: 2 }));
        assert!(calls.calls().is_empty());
    }

    #[test]
    fn test_zero_faces_abort_before_any_mutation() {
        let detector = ScriptedDetector::new(vec![Ok(vec![])]);
        let mutator = RecordingMutator::new((800, 600));
        let calls = mutator.clone();

        let mut uc = NormalizeFaceUseCase::new(Box::new(detector), Box::new(mutator), target());
        let err = uc.execute(&work(), None).unwrap_err();

        assert!(matches!(err, NormalizeError::AmbiguousFace { found: 0 }));
        assert!(calls.calls().is_empty());
    }

    #[test]
    fn test_coincident_pupils_rejected_before_mutation() {
        let detector =
            ScriptedDetector::new(vec![Ok(vec![face((100.0, 100.0), (100.0, 100.0))])]);
        let mutator = RecordingMutator::new((800, 600));
        let calls = mutator.clone();

        let mut uc = NormalizeFaceUseCase::new(Box::new(detector), Box::new(mutator), target());
        let err = uc.execute(&work(), None).unwrap_err();

        assert!(matches!(err, NormalizeError::Geometry(_)));
        assert!(calls.calls().is_empty());
    }

    #[test]
    fn test_shrink_metadata_triggers_rescale_pair_before_detection() {
        let detector = ScriptedDetector::new(vec![
            Ok(vec![face((100.0, 200.0), (180.0, 200.0))]),
            Ok(vec![face((75.0, 150.0), (135.0, 150.0))]),
        ]);
        let mutator = RecordingMutator::new((800, 600));
        let calls = mutator.clone();

        let mut uc = NormalizeFaceUseCase::new(Box::new(detector), Box::new(mutator), target());
        uc.execute(&work(), Some("80")).unwrap();

        assert_eq!(
            &calls.calls()[..2],
            &[
                MutatorCall::ContentRescale(80),
                MutatorCall::ContentRescale(125),
            ]
        );
    }

    #[test]
    fn test_invalid_shrink_falls_back_to_default() {
        let detector = ScriptedDetector::new(vec![
            Ok(vec![face((100.0, 200.0), (180.0, 200.0))]),
            Ok(vec![face((75.0, 150.0), (135.0, 150.0))]),
        ]);
        let mutator = RecordingMutator::new((800, 600));
        let calls = mutator.clone();

        let mut uc = NormalizeFaceUseCase::new(Box::new(detector), Box::new(mutator), target());
        uc.execute(&work(), Some("abc")).unwrap();

        assert_eq!(
            &calls.calls()[..2],
            &[
                MutatorCall::ContentRescale(50),
                MutatorCall::ContentRescale(200),
            ]
        );
    }

    #[test]
    fn test_second_detection_failure_stops_before_composite() {
        let detector = ScriptedDetector::new(vec![
            Ok(vec![face((100.0, 200.0), (180.0, 200.0))]),
            Err("vision service timeout".to_string()),
        ]);
        let mutator = RecordingMutator::new((800, 600));
        let calls = mutator.clone();

        let mut uc = NormalizeFaceUseCase::new(Box::new(detector), Box::new(mutator), target());
        let err = uc.execute(&work(), None).unwrap_err();

        assert!(matches!(err, NormalizeError::Detector(_)));
        assert_eq!(
            calls.calls(),
            vec![MutatorCall::ResizeRotate(600, 450, 0.0)]
        );
    }

    #[test]
    fn test_tilted_face_gets_leveling_rotation() {
        // Right eye 30px lower over a 40px run.
        let detector = ScriptedDetector::new(vec![
            Ok(vec![face((100.0, 100.0), (140.0, 130.0))]),
            Ok(vec![face((90.0, 120.0), (150.0, 120.0))]),
        ]);
        let mutator = RecordingMutator::new((400, 400));
        let calls = mutator.clone();

        let mut uc = NormalizeFaceUseCase::new(Box::new(detector), Box::new(mutator), target());
        uc.execute(&work(), None).unwrap();

        match calls.calls()[0] {
            MutatorCall::ResizeRotate(w, h, angle) => {
                // hyp = 50, scale = 1.2, angle = -atan(30/40) ≈ -36.87°.
                assert_eq!((w, h), (480, 480));
                assert!((angle + 36.87).abs() < 0.01, "angle {angle}");
            }
            ref other => panic!("expected resize_rotate first, got {other:?}"),
        }
    }
}
