//! Facial landmark value types produced by detection.
//!
//! Coordinates are in pixel space of the image the detector ran on.
//! A detection is a snapshot: after any geometric mutation the caller
//! must re-detect rather than transform these points analytically.

use serde::{Deserialize, Serialize};

/// A 2-D point in image pixel space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Named facial keypoints. Wire names follow the vision-API convention.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LandmarkKind {
    LeftEyePupil,
    RightEyePupil,
    NoseTip,
    MouthCenter,
    #[serde(other)]
    Other,
}

/// A named keypoint coordinate. Immutable once produced.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    #[serde(rename = "type")]
    pub kind: LandmarkKind,
    pub position: Point,
}

/// The landmark set of one detected face.
///
/// The two pupil landmarks are the only ones the alignment geometry
/// requires; detectors may report any number of additional kinds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FaceDetection {
    pub landmarks: Vec<Landmark>,
}

impl FaceDetection {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks }
    }

    fn find(&self, kind: LandmarkKind) -> Option<Point> {
        self.landmarks
            .iter()
            .find(|l| l.kind == kind)
            .map(|l| l.position)
    }

    pub fn left_pupil(&self) -> Option<Point> {
        self.find(LandmarkKind::LeftEyePupil)
    }

    pub fn right_pupil(&self) -> Option<Point> {
        self.find(LandmarkKind::RightEyePupil)
    }
}
