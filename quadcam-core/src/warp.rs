/// Perspective texture warping: a texture's rectangle is mapped onto a
/// projected quad with a homography and resampled into the quad's bounding box
use image::{Rgb, Rgba, RgbaImage};
use nalgebra::{Matrix3, Point2, SMatrix, SVector, Vector3};
use thiserror::Error;

use crate::surface::Rect;
use crate::texture::Texture;

/// Largest bounding-box side the warper will allocate for.
pub const MAX_WARP_EXTENT: u32 = 8192;

#[derive(Debug, Error, PartialEq)]
pub enum WarpError {
    #[error("quad must contain four points, got {points}")]
    InvalidQuad { points: usize },

    #[error("quad has a non-finite coordinate")]
    NonFinite,

    #[error("warped bounds {width}x{height} exceed the size limit")]
    Oversized { width: f32, height: f32 },
}

/// Output of [`warp`]: the resampled pixels plus the source color key, if any.
///
/// Pixels outside the quad carry alpha 0.
#[derive(Debug, Clone)]
pub struct WarpedImage {
    pub pixels: RgbaImage,
    pub color_key: Option<Rgb<u8>>,
}

/// 3x3 planar perspective transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Homography(pub Matrix3<f64>);

impl Homography {
    /// Solve the transform taking each `src[i]` to `dst[i]`.
    ///
    /// Returns `None` when three or more points are collinear.
    pub fn from_correspondences(src: &[Point2<f64>; 4], dst: &[Point2<f64>; 4]) -> Option<Self> {
        let mut a = SMatrix::<f64, 8, 8>::zeros();
        let mut b = SVector::<f64, 8>::zeros();

        for (i, (s, d)) in src.iter().zip(dst).enumerate() {
            let rows = [
                [s.x, s.y, 1.0, 0.0, 0.0, 0.0, -d.x * s.x, -d.x * s.y],
                [0.0, 0.0, 0.0, s.x, s.y, 1.0, -d.y * s.x, -d.y * s.y],
            ];
            for (k, row) in rows.iter().enumerate() {
                for (c, value) in row.iter().enumerate() {
                    a[(2 * i + k, c)] = *value;
                }
            }
            b[2 * i] = d.x;
            b[2 * i + 1] = d.y;
        }

        let h = a.lu().solve(&b)?;
        let m = Matrix3::new(h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], 1.0);
        if !m.iter().all(|v| v.is_finite()) || m.determinant().abs() < 1e-12 {
            return None;
        }
        Some(Self(m))
    }

    pub fn inverse(&self) -> Option<Self> {
        self.0.try_inverse().map(Self)
    }

    /// Map a point. `None` if it lands on the line at infinity.
    pub fn apply(&self, p: Point2<f64>) -> Option<Point2<f64>> {
        let v = self.0 * Vector3::new(p.x, p.y, 1.0);
        if v.z.abs() < 1e-12 {
            return None;
        }
        Some(Point2::new(v.x / v.z, v.y / v.z))
    }
}

/// Warp `texture` onto `quad`.
///
/// Texture corners (0,0), (w,0), (w,h), (0,h) land on `quad[0..4]` in that
/// order. The returned rect is where the image must be composited.
///
/// The output covers the quad's whole bounding box and is not clipped to any
/// target surface, so a face close to the camera can allocate up to
/// [`MAX_WARP_EXTENT`] squared pixels. Larger boxes fail with
/// [`WarpError::Oversized`] and the face is not drawn.
pub fn warp(texture: &Texture, quad: &[Point2<f32>]) -> Result<(WarpedImage, Rect), WarpError> {
    let quad: &[Point2<f32>; 4] = quad
        .try_into()
        .map_err(|_| WarpError::InvalidQuad { points: quad.len() })?;
    if quad.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
        return Err(WarpError::NonFinite);
    }

    let bounds = bounding_rect(quad)?;
    let origin = Point2::new(bounds.x as f64, bounds.y as f64);

    let (w, h) = (texture.width() as f64, texture.height() as f64);
    let src = [
        Point2::new(0.0, 0.0),
        Point2::new(w, 0.0),
        Point2::new(w, h),
        Point2::new(0.0, h),
    ];
    let dst = quad.map(|p| Point2::new(p.x as f64 - origin.x, p.y as f64 - origin.y));

    let mut pixels = RgbaImage::new(bounds.width, bounds.height);
    match Homography::from_correspondences(&src, &dst).and_then(|m| m.inverse()) {
        Some(inverse) => resample(texture, &inverse, &mut pixels),
        None => tracing::debug!(?quad, "degenerate quad, warped image left transparent"),
    }

    Ok((
        WarpedImage {
            pixels,
            color_key: texture.color_key(),
        },
        bounds,
    ))
}

/// Integer bounding box of the quad, at least one pixel on each side.
fn bounding_rect(quad: &[Point2<f32>; 4]) -> Result<Rect, WarpError> {
    let (mut min_x, mut min_y) = (f32::INFINITY, f32::INFINITY);
    let (mut max_x, mut max_y) = (f32::NEG_INFINITY, f32::NEG_INFINITY);
    for p in quad {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }

    let (x, y) = (min_x.floor(), min_y.floor());
    let (width, height) = ((max_x - x).ceil(), (max_y - y).ceil());
    if width > MAX_WARP_EXTENT as f32 || height > MAX_WARP_EXTENT as f32 {
        return Err(WarpError::Oversized { width, height });
    }

    Ok(Rect {
        x: x as i32,
        y: y as i32,
        width: (width as u32).max(1),
        height: (height as u32).max(1),
    })
}

fn resample(texture: &Texture, inverse: &Homography, out: &mut RgbaImage) {
    let src = texture.image();
    let (w, h) = (src.width() as f64, src.height() as f64);
    let keep_alpha = texture.has_alpha();

    for (px, py, pixel) in out.enumerate_pixels_mut() {
        let centre = Point2::new(px as f64 + 0.5, py as f64 + 0.5);
        let Some(s) = inverse.apply(centre) else {
            continue;
        };
        if s.x < 0.0 || s.y < 0.0 || s.x > w || s.y > h {
            continue;
        }

        let [r, g, b, a] = bilinear(src, s.x - 0.5, s.y - 0.5);
        *pixel = Rgba([r, g, b, if keep_alpha { a } else { 255 }]);
    }
}

/// Sample at pixel-centre coordinates, clamping to the image edge.
fn bilinear(img: &RgbaImage, x: f64, y: f64) -> [u8; 4] {
    let max_x = (img.width() - 1) as f64;
    let max_y = (img.height() - 1) as f64;
    let x = x.clamp(0.0, max_x);
    let y = y.clamp(0.0, max_y);

    let (x0, y0) = (x.floor(), y.floor());
    let (fx, fy) = (x - x0, y - y0);
    let (x0, y0) = (x0 as u32, y0 as u32);
    let x1 = (x0 + 1).min(img.width() - 1);
    let y1 = (y0 + 1).min(img.height() - 1);

    let p00 = img.get_pixel(x0, y0).0;
    let p10 = img.get_pixel(x1, y0).0;
    let p01 = img.get_pixel(x0, y1).0;
    let p11 = img.get_pixel(x1, y1).0;

    let mut out = [0u8; 4];
    for c in 0..4 {
        let top = p00[c] as f64 * (1.0 - fx) + p10[c] as f64 * fx;
        let bottom = p01[c] as f64 * (1.0 - fx) + p11[c] as f64 * fx;
        out[c] = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::Transparency;

    fn corners(x: f32, y: f32, w: f32, h: f32) -> Vec<Point2<f32>> {
        vec![
            Point2::new(x, y),
            Point2::new(x + w, y),
            Point2::new(x + w, y + h),
            Point2::new(x, y + h),
        ]
    }

    fn checker() -> Texture {
        Texture::checker(16, 12, 4, Rgb([240, 20, 20]), Rgb([20, 20, 240]))
    }

    #[test]
    fn test_rejects_wrong_point_counts() {
        let tex = checker();
        let mut quad = corners(0.0, 0.0, 10.0, 10.0);

        quad.pop();
        assert_eq!(warp(&tex, &quad).unwrap_err(), WarpError::InvalidQuad { points: 3 });

        quad.push(Point2::new(0.0, 10.0));
        quad.push(Point2::new(5.0, 5.0));
        assert_eq!(warp(&tex, &quad).unwrap_err(), WarpError::InvalidQuad { points: 5 });
    }

    #[test]
    fn test_identity_quad_reproduces_texture() {
        let tex = checker();
        let (warped, rect) = warp(&tex, &corners(0.0, 0.0, 16.0, 12.0)).unwrap();

        assert_eq!(rect, Rect { x: 0, y: 0, width: 16, height: 12 });
        for (x, y, px) in tex.image().enumerate_pixels() {
            let out = warped.pixels.get_pixel(x, y);
            for c in 0..4 {
                assert!(
                    (out[c] as i32 - px[c] as i32).abs() <= 1,
                    "pixel ({x}, {y}) channel {c}: {} vs {}",
                    out[c],
                    px[c]
                );
            }
        }
    }

    #[test]
    fn test_rect_is_placed_at_bounding_box() {
        let tex = checker();
        let (warped, rect) = warp(&tex, &corners(100.0, 40.0, 32.0, 24.0)).unwrap();
        assert_eq!(rect, Rect { x: 100, y: 40, width: 32, height: 24 });
        assert_eq!(warped.pixels.dimensions(), (32, 24));

        // Doubling the size keeps the top-left cell red
        assert!(warped.pixels.get_pixel(1, 1)[0] > 200);
        assert!(warped.pixels.get_pixel(9, 1)[2] > 200);
    }

    #[test]
    fn test_pixels_outside_quad_are_transparent() {
        let tex = checker();
        let diamond = vec![
            Point2::new(20.0, 0.0),
            Point2::new(40.0, 20.0),
            Point2::new(20.0, 40.0),
            Point2::new(0.0, 20.0),
        ];
        let (warped, rect) = warp(&tex, &diamond).unwrap();
        assert_eq!((rect.width, rect.height), (40, 40));
        assert_eq!(warped.pixels.get_pixel(0, 0)[3], 0);
        assert_eq!(warped.pixels.get_pixel(39, 39)[3], 0);
        assert_eq!(warped.pixels.get_pixel(20, 20)[3], 255);
    }

    #[test]
    fn test_degenerate_quad_is_clamped_and_blank() {
        let tex = checker();
        let line = vec![
            Point2::new(5.0, 5.0),
            Point2::new(5.0, 5.0),
            Point2::new(5.0, 5.0),
            Point2::new(5.0, 5.0),
        ];
        let (warped, rect) = warp(&tex, &line).unwrap();
        assert_eq!(rect, Rect { x: 5, y: 5, width: 1, height: 1 });
        assert_eq!(warped.pixels.get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn test_color_key_is_inherited() {
        let key = Rgb([255, 0, 255]);
        let tex = checker().with_transparency(Transparency::ColorKey(key));
        let (warped, _) = warp(&tex, &corners(0.0, 0.0, 8.0, 8.0)).unwrap();
        assert_eq!(warped.color_key, Some(key));

        let (opaque, _) = warp(&checker(), &corners(0.0, 0.0, 8.0, 8.0)).unwrap();
        assert_eq!(opaque.color_key, None);
    }

    #[test]
    fn test_alpha_channel_is_warped() {
        let mut image = RgbaImage::from_pixel(8, 8, Rgba([10, 200, 10, 255]));
        for y in 0..8 {
            for x in 4..8 {
                image.put_pixel(x, y, Rgba([10, 200, 10, 0]));
            }
        }
        let tex = Texture::new(image, Transparency::Alpha).unwrap();
        let (warped, _) = warp(&tex, &corners(0.0, 0.0, 16.0, 16.0)).unwrap();

        assert_eq!(warped.pixels.get_pixel(2, 8)[3], 255);
        assert_eq!(warped.pixels.get_pixel(13, 8)[3], 0);
    }

    #[test]
    fn test_opaque_texture_ignores_source_alpha() {
        let image = RgbaImage::from_pixel(4, 4, Rgba([50, 50, 50, 0]));
        let tex = Texture::new(image, Transparency::Opaque).unwrap();
        let (warped, _) = warp(&tex, &corners(0.0, 0.0, 4.0, 4.0)).unwrap();
        assert_eq!(warped.pixels.get_pixel(1, 1)[3], 255);
    }

    #[test]
    fn test_non_finite_and_oversized_rejected() {
        let tex = checker();
        let mut quad = corners(0.0, 0.0, 10.0, 10.0);
        quad[2].x = f32::NAN;
        assert_eq!(warp(&tex, &quad).unwrap_err(), WarpError::NonFinite);

        let huge = corners(0.0, 0.0, 1.0e6, 10.0);
        assert!(matches!(warp(&tex, &huge), Err(WarpError::Oversized { .. })));
    }

    #[test]
    fn test_homography_maps_corners() {
        let src = [
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(0.0, 10.0),
        ];
        let dst = [
            Point2::new(2.0, 1.0),
            Point2::new(30.0, 4.0),
            Point2::new(25.0, 22.0),
            Point2::new(0.0, 18.0),
        ];
        let m = Homography::from_correspondences(&src, &dst).unwrap();
        for (s, d) in src.iter().zip(&dst) {
            let p = m.apply(*s).unwrap();
            assert!((p - d).norm() < 1e-9);
        }
        let back = m.inverse().unwrap().apply(dst[2]).unwrap();
        assert!((back - src[2]).norm() < 1e-9);
    }
}
