/// Presents a rendered canvas as colored terminal cells
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use image::Rgba;
use quadcam_core::Canvas;
use std::io::Write;

/// Character luminosity ramp (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Downsamples a canvas into a grid of characters, one per terminal cell
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    char_buffer: Vec<char>,
    color_buffer: Vec<Color>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            char_buffer: vec![' '; size],
            color_buffer: vec![Color::Reset; size],
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height);
    }

    pub fn cell(&self, x: usize, y: usize) -> (char, Color) {
        let idx = y * self.width + x;
        (self.char_buffer[idx], self.color_buffer[idx])
    }

    /// Average each cell's block of canvas pixels
    pub fn rasterize(&mut self, canvas: &Canvas) {
        if self.width == 0 || self.height == 0 || canvas.width() == 0 || canvas.height() == 0 {
            return;
        }

        for cy in 0..self.height {
            let (y0, y1) = span(cy, self.height, canvas.height());
            for cx in 0..self.width {
                let (x0, x1) = span(cx, self.width, canvas.width());

                let mut sum = [0u32; 3];
                let mut count = 0u32;
                for y in y0..y1 {
                    for x in x0..x1 {
                        let Rgba([r, g, b, _]) = canvas.pixel(x, y);
                        sum[0] += r as u32;
                        sum[1] += g as u32;
                        sum[2] += b as u32;
                        count += 1;
                    }
                }
                let count = count.max(1);
                let (r, g, b) = (
                    (sum[0] / count) as u8,
                    (sum[1] / count) as u8,
                    (sum[2] / count) as u8,
                );

                let idx = cy * self.width + cx;
                self.char_buffer[idx] = luminosity_char(r, g, b);
                self.color_buffer[idx] = Color::Rgb { r, g, b };
            }
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            for x in 0..self.width {
                let (c, color) = self.cell(x, y);
                writer.queue(SetForegroundColor(color))?;
                writer.queue(Print(c))?;
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Pixel range covered by cell `i` of `cells`, never empty
fn span(i: usize, cells: usize, pixels: u32) -> (u32, u32) {
    let pixels = pixels as usize;
    let start = i * pixels / cells;
    let end = ((i + 1) * pixels / cells).max(start + 1).min(pixels);
    (start.min(pixels - 1) as u32, end as u32)
}

fn luminosity_char(r: u8, g: u8, b: u8) -> char {
    let luma = 0.2126 * r as f32 + 0.7152 * g as f32 + 0.0722 * b as f32;
    let index = (luma / 255.0 * (LUMINOSITY_RAMP.len() - 1) as f32).round() as usize;
    LUMINOSITY_RAMP[index.min(LUMINOSITY_RAMP.len() - 1)]
}
