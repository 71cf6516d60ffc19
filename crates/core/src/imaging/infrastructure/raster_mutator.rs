use std::path::Path;

use image::{imageops, Rgb, RgbImage};

use crate::detection::infrastructure::sidecar_face_detector::SidecarFaceDetector;
use crate::geometry::alignment::projected_size;
use crate::imaging::domain::image_mutator::ImageMutator;
use crate::shared::landmark::{FaceDetection, Point};
use crate::shared::work_image::WorkImage;

type MutateError = Box<dyn std::error::Error + Send + Sync>;

/// Local `image`-crate implementation of the mutation port.
///
/// Rotation follows ImageMagick `-rotate` semantics: positive angles turn
/// the image clockwise (screen coordinates, y down) and the bounds expand
/// to fit, with black fill. Content rescale is a plain resize: the
/// dimension-restoring contract of the shrink/restore pair holds, seam
/// carving itself needs an external tool.
///
/// If a landmark sidecar exists next to the image, its coordinates are
/// mapped through the same affine transform the pixels undergo, so a
/// subsequent sidecar "detection" reports real post-transform positions.
pub struct RasterMutator;

impl RasterMutator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RasterMutator {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageMutator for RasterMutator {
    fn dimensions(&self, image: &WorkImage) -> Result<(u32, u32), MutateError> {
        Ok(image::image_dimensions(image.path())?)
    }

    fn resize_rotate(
        &self,
        image: &WorkImage,
        width: u32,
        height: u32,
        angle_degrees: f64,
    ) -> Result<(), MutateError> {
        let img = image::open(image.path())?.to_rgb8();
        let (orig_w, orig_h) = img.dimensions();

        let scaled = imageops::resize(&img, width, height, imageops::FilterType::Triangle);
        let rotated = rotate_expand(&scaled, angle_degrees);
        let (new_w, new_h) = rotated.dimensions();
        rotated.save(image.path())?;

        let sx = f64::from(width) / f64::from(orig_w);
        let sy = f64::from(height) / f64::from(orig_h);
        let theta = angle_degrees.to_radians();
        let scaled_center = (f64::from(width) / 2.0, f64::from(height) / 2.0);
        let new_center = (f64::from(new_w) / 2.0, f64::from(new_h) / 2.0);
        map_sidecar(image.path(), |p| {
            let (x, y) = (p.x * sx - scaled_center.0, p.y * sy - scaled_center.1);
            Point::new(
                x * theta.cos() - y * theta.sin() + new_center.0,
                x * theta.sin() + y * theta.cos() + new_center.1,
            )
        })
    }

    fn composite_onto_canvas(
        &self,
        image: &WorkImage,
        canvas_width: u32,
        canvas_height: u32,
        offset: (i64, i64),
    ) -> Result<(), MutateError> {
        let img = image::open(image.path())?.to_rgb8();
        let mut canvas = RgbImage::from_pixel(canvas_width, canvas_height, Rgb([0, 0, 0]));
        imageops::overlay(&mut canvas, &img, offset.0, offset.1);
        canvas.save(image.path())?;

        map_sidecar(image.path(), |p| {
            Point::new(p.x + offset.0 as f64, p.y + offset.1 as f64)
        })
    }

    fn content_rescale(&self, image: &WorkImage, percent: u32) -> Result<(), MutateError> {
        let img = image::open(image.path())?.to_rgb8();
        let (w, h) = img.dimensions();
        let (new_w, new_h) = projected_size(w, h, f64::from(percent) / 100.0);
        let resized = imageops::resize(&img, new_w.max(1), new_h.max(1), imageops::FilterType::Triangle);
        resized.save(image.path())?;

        let sx = f64::from(new_w.max(1)) / f64::from(w);
        let sy = f64::from(new_h.max(1)) / f64::from(h);
        map_sidecar(image.path(), |p| Point::new(p.x * sx, p.y * sy))
    }
}

/// Rotates clockwise by `angle_degrees` about the center, expanding the
/// output bounds to fit. Sampling is inverse-mapped bilinear; pixels that
/// fall outside the source are black.
fn rotate_expand(src: &RgbImage, angle_degrees: f64) -> RgbImage {
    let theta = angle_degrees.to_radians();
    if theta == 0.0 {
        return src.clone();
    }

    let (w, h) = src.dimensions();
    let (wf, hf) = (f64::from(w), f64::from(h));
    let (sin, cos) = (theta.sin(), theta.cos());
    let new_w = (wf * cos.abs() + hf * sin.abs()).ceil() as u32;
    let new_h = (wf * sin.abs() + hf * cos.abs()).ceil() as u32;

    let src_center = (wf / 2.0, hf / 2.0);
    let dst_center = (f64::from(new_w) / 2.0, f64::from(new_h) / 2.0);

    let mut dst = RgbImage::from_pixel(new_w, new_h, Rgb([0, 0, 0]));
    for dy in 0..new_h {
        for dx in 0..new_w {
            // Inverse rotation back into source space. Pixel centers sit
            // at half-integer coordinates.
            let x = f64::from(dx) + 0.5 - dst_center.0;
            let y = f64::from(dy) + 0.5 - dst_center.1;
            let sx_pos = x * cos + y * sin + src_center.0 - 0.5;
            let sy_pos = -x * sin + y * cos + src_center.1 - 0.5;
            if let Some(pixel) = sample_bilinear(src, sx_pos, sy_pos) {
                dst.put_pixel(dx, dy, pixel);
            }
        }
    }
    dst
}

fn sample_bilinear(src: &RgbImage, x: f64, y: f64) -> Option<Rgb<u8>> {
    let (w, h) = src.dimensions();
    if x < -1.0 || y < -1.0 || x > f64::from(w) || y > f64::from(h) {
        return None;
    }

    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;

    let clamp_get = |xi: f64, yi: f64| -> [f64; 3] {
        let cx = xi.clamp(0.0, f64::from(w - 1)) as u32;
        let cy = yi.clamp(0.0, f64::from(h - 1)) as u32;
        let p = src.get_pixel(cx, cy).0;
        [f64::from(p[0]), f64::from(p[1]), f64::from(p[2])]
    };

    let p00 = clamp_get(x0, y0);
    let p10 = clamp_get(x0 + 1.0, y0);
    let p01 = clamp_get(x0, y0 + 1.0);
    let p11 = clamp_get(x0 + 1.0, y0 + 1.0);

    let mut out = [0u8; 3];
    for c in 0..3 {
        let top = p00[c] * (1.0 - fx) + p10[c] * fx;
        let bottom = p01[c] * (1.0 - fx) + p11[c] * fx;
        out[c] = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
    }
    Some(Rgb(out))
}

/// Applies `map` to every landmark in the image's sidecar, if one exists.
fn map_sidecar(
    image_path: &Path,
    map: impl Fn(Point) -> Point,
) -> Result<(), MutateError> {
    let sidecar = SidecarFaceDetector::sidecar_path(image_path);
    if !sidecar.exists() {
        return Ok(());
    }
    let bytes = std::fs::read(&sidecar)?;
    let mut faces: Vec<FaceDetection> = serde_json::from_slice(&bytes)?;
    for face in &mut faces {
        for landmark in &mut face.landmarks {
            landmark.position = map(landmark.position);
        }
    }
    std::fs::write(&sidecar, serde_json::to_vec_pretty(&faces)?)?;
    Ok(())
}
