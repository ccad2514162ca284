/// Render targets
use std::path::Path;

use image::{Rgba, RgbaImage};

use crate::warp::WarpedImage;

/// Axis-aligned pixel rectangle on a target surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Anything a camera can draw into.
pub trait Surface {
    /// Composite `image` with its top-left corner at `dest`.
    fn blit(&mut self, image: &WarpedImage, dest: Rect);

    /// Overwrite every pixel.
    fn fill(&mut self, color: Rgba<u8>);
}

/// In-memory RGBA render target
#[derive(Debug, Clone)]
pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.image.get_pixel(x, y)
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Write the current contents to an image file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), image::ImageError> {
        self.image.save(path)
    }
}

impl Surface for Canvas {
    fn blit(&mut self, image: &WarpedImage, dest: Rect) {
        let src = &image.pixels;
        let width = dest.width.min(src.width());
        let height = dest.height.min(src.height());

        for sy in 0..height {
            let ty = dest.y as i64 + sy as i64;
            if ty < 0 || ty >= self.image.height() as i64 {
                continue;
            }
            for sx in 0..width {
                let tx = dest.x as i64 + sx as i64;
                if tx < 0 || tx >= self.image.width() as i64 {
                    continue;
                }

                let Rgba([r, g, b, a]) = *src.get_pixel(sx, sy);
                if a == 0 || image.color_key.is_some_and(|key| key.0 == [r, g, b]) {
                    continue;
                }

                let target = self.image.get_pixel_mut(tx as u32, ty as u32);
                *target = source_over(Rgba([r, g, b, a]), *target);
            }
        }
    }

    fn fill(&mut self, color: Rgba<u8>) {
        for pixel in self.image.pixels_mut() {
            *pixel = color;
        }
    }
}

fn source_over(src: Rgba<u8>, dst: Rgba<u8>) -> Rgba<u8> {
    let a = src[3] as u32;
    if a == 255 {
        return src;
    }
    let mix = |s: u8, d: u8| ((s as u32 * a + d as u32 * (255 - a) + 127) / 255) as u8;
    let out_a = a + dst[3] as u32 * (255 - a) / 255;
    Rgba([
        mix(src[0], dst[0]),
        mix(src[1], dst[1]),
        mix(src[2], dst[2]),
        out_a.min(255) as u8,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn warped(w: u32, h: u32, color: Rgba<u8>) -> WarpedImage {
        WarpedImage {
            pixels: RgbaImage::from_pixel(w, h, color),
            color_key: None,
        }
    }

    #[test]
    fn test_fill() {
        let mut canvas = Canvas::new(3, 2);
        canvas.fill(Rgba([1, 2, 3, 255]));
        assert!(canvas.image().pixels().all(|p| *p == Rgba([1, 2, 3, 255])));
    }

    #[test]
    fn test_blit_clips_to_bounds() {
        let mut canvas = Canvas::new(4, 4);
        canvas.blit(
            &warped(3, 3, Rgba([9, 9, 9, 255])),
            Rect { x: -1, y: 2, width: 3, height: 3 },
        );
        assert_eq!(canvas.pixel(0, 2), Rgba([9, 9, 9, 255]));
        assert_eq!(canvas.pixel(1, 3), Rgba([9, 9, 9, 255]));
        assert_eq!(canvas.pixel(2, 2), Rgba([0, 0, 0, 0]));
        assert_eq!(canvas.pixel(0, 1), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_blit_skips_transparent_and_keyed_pixels() {
        let mut canvas = Canvas::new(2, 1);
        canvas.fill(Rgba([7, 7, 7, 255]));

        let mut image = warped(2, 1, Rgba([255, 0, 255, 255]));
        image.pixels.put_pixel(1, 0, Rgba([1, 1, 1, 0]));
        image.color_key = Some(Rgb([255, 0, 255]));
        canvas.blit(&image, Rect { x: 0, y: 0, width: 2, height: 1 });

        assert_eq!(canvas.pixel(0, 0), Rgba([7, 7, 7, 255]));
        assert_eq!(canvas.pixel(1, 0), Rgba([7, 7, 7, 255]));
    }

    #[test]
    fn test_blit_blends_partial_alpha() {
        let mut canvas = Canvas::new(1, 1);
        canvas.fill(Rgba([0, 0, 0, 255]));
        canvas.blit(
            &warped(1, 1, Rgba([255, 255, 255, 128])),
            Rect { x: 0, y: 0, width: 1, height: 1 },
        );
        let p = canvas.pixel(0, 0);
        assert!((127..=129).contains(&p[0]));
        assert_eq!(p[3], 255);
    }
}
