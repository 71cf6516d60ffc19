use std::fs;
use std::path::{Path, PathBuf};

use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::landmark::FaceDetection;
use crate::shared::work_image::WorkImage;

/// Deterministic detector for local runs and tests: reads the landmark
/// sidecar file written next to the work image.
///
/// Stands in for the external vision service. The raster mutator maps
/// sidecar coordinates through every geometric mutation it applies, so a
/// second detection pass on the mutated image reports genuine
/// post-transform positions, exactly like a real re-detection would.
pub struct SidecarFaceDetector;

impl SidecarFaceDetector {
    pub fn new() -> Self {
        Self
    }

    /// Sidecar path for a work image: `<image>.landmarks.json`.
    pub fn sidecar_path(image: &Path) -> PathBuf {
        let mut name = image.as_os_str().to_os_string();
        name.push(".landmarks.json");
        PathBuf::from(name)
    }

    /// Writes a sidecar next to `image`, one entry per face.
    pub fn write_sidecar(
        image: &Path,
        faces: &[FaceDetection],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let json = serde_json::to_vec_pretty(faces)?;
        fs::write(Self::sidecar_path(image), json)?;
        Ok(())
    }
}

impl Default for SidecarFaceDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl FaceDetector for SidecarFaceDetector {
    fn detect(
        &mut self,
        image: &WorkImage,
    ) -> Result<Vec<FaceDetection>, Box<dyn std::error::Error + Send + Sync>> {
        let path = Self::sidecar_path(image.path());
        let bytes = fs::read(&path)
            .map_err(|e| format!("no landmark sidecar at {}: {e}", path.display()))?;
        let faces: Vec<FaceDetection> = serde_json::from_slice(&bytes)?;
        Ok(faces)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::landmark::{Landmark, LandmarkKind, Point};

    fn one_face() -> FaceDetection {
        FaceDetection::new(vec![
            Landmark {
                kind: LandmarkKind::LeftEyePupil,
                position: Point::new(100.0, 200.0),
            },
            Landmark {
                kind: LandmarkKind::RightEyePupil,
                position: Point::new(180.0, 200.0),
            },
        ])
    }

    #[test]
    fn test_roundtrips_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("photo.png");
        SidecarFaceDetector::write_sidecar(&image, &[one_face()]).unwrap();

        let mut detector = SidecarFaceDetector::new();
        let faces = detector.detect(&WorkImage::new(&image)).unwrap();
        assert_eq!(faces, vec![one_face()]);
    }

    #[test]
    fn test_missing_sidecar_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut detector = SidecarFaceDetector::new();
        let result = detector.detect(&WorkImage::new(dir.path().join("nope.png")));
        assert!(result.is_err());
    }

    #[test]
    fn test_sidecar_path_appends_suffix() {
        let path = SidecarFaceDetector::sidecar_path(Path::new("/tmp/a/photo.png"));
        assert_eq!(path, Path::new("/tmp/a/photo.png.landmarks.json"));
    }
}
