// filepath: src/draw.rs
//! Drawing utilities for touch-overlay
//!
//! This file contains the Canvas used to compose the overlay:
//! alpha-blended rectangles and bitmap-font text on a raw pixel
//! buffer in any supported pixel format.

use crate::font;
use crate::pixel::{split_rgba, PixelFormat, Rgb};

/// Canvas over a raw, row-strided pixel buffer
pub struct Canvas<'a> {
    buffer: &'a mut [u8],
    width: u32,
    height: u32,
    stride: usize,
    format: PixelFormat,
}

impl<'a> Canvas<'a> {
    /// Create a new canvas from a raw buffer; `stride` is the row length in bytes
    pub fn new(
        buffer: &'a mut [u8],
        width: u32,
        height: u32,
        stride: usize,
        format: PixelFormat,
    ) -> Self {
        Self {
            buffer,
            width,
            height,
            stride,
            format,
        }
    }

    fn pixel_range(&self, x: u32, y: u32) -> Option<std::ops::Range<usize>> {
        let bpp = self.format.bytes_per_pixel();
        let start = y as usize * self.stride + x as usize * bpp;
        let end = start + bpp;
        (end <= self.buffer.len()).then_some(start..end)
    }

    pub fn read_pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        let range = self.pixel_range(x, y)?;
        Some(self.format.read_pixel(&self.buffer[range]))
    }

    /// Blend `color` into the pixel at (x, y); out-of-bounds writes are dropped
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Rgb, alpha: u8) {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return;
        }
        let Some(range) = self.pixel_range(x as u32, y as u32) else {
            return;
        };
        let pixel = &mut self.buffer[range];
        let out = if alpha == u8::MAX {
            color
        } else {
            color.blend_over(self.format.read_pixel(pixel), alpha)
        };
        self.format.write_pixel(pixel, out);
    }

    /// Draw a filled rectangle, blended with the alpha byte of `color`
    pub fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, color: [u8; 4]) {
        // Ensure the rectangle is within bounds
        let x_start = x.max(0) as i64;
        let y_start = y.max(0) as i64;
        let x_end = (x as i64 + width as i64).min(self.width as i64);
        let y_end = (y as i64 + height as i64).min(self.height as i64);

        if x_end <= x_start || y_end <= y_start {
            return; // Nothing to draw
        }

        let (rgb, alpha) = split_rgba(color);
        for py in y_start..y_end {
            for px in x_start..x_end {
                self.blend_pixel(px as i32, py as i32, rgb, alpha);
            }
        }
    }

    /// Draw `text` with the built-in 5x7 font; no wrapping
    pub fn draw_text(&mut self, x: i32, y: i32, text: &str, color: [u8; 4]) {
        let (rgb, alpha) = split_rgba(color);
        let mut cursor_x = x;
        for ch in text.chars() {
            let glyph = font::glyph(ch);
            for row in 0..font::GLYPH_HEIGHT {
                for col in 0..font::GLYPH_WIDTH {
                    if font::is_set(glyph, col, row) {
                        self.blend_pixel(cursor_x + col, y + row, rgb, alpha);
                    }
                }
            }
            cursor_x += font::ADVANCE;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas_buffer(width: u32, height: u32, format: PixelFormat) -> Vec<u8> {
        vec![0u8; (width * height) as usize * format.bytes_per_pixel()]
    }

    #[test]
    fn fill_rect_clips_to_bounds() {
        let mut buf = canvas_buffer(4, 4, PixelFormat::Argb8888);
        let mut canvas = Canvas::new(&mut buf, 4, 4, 16, PixelFormat::Argb8888);
        canvas.fill_rect(-2, 2, 4, 10, [255, 0, 0, 255]);

        for y in 0..4 {
            for x in 0..4 {
                let expected = if x < 2 && y >= 2 {
                    Rgb::new(255, 0, 0)
                } else {
                    Rgb::default()
                };
                assert_eq!(canvas.read_pixel(x, y), Some(expected), "pixel {x},{y}");
            }
        }
    }

    #[test]
    fn empty_or_offscreen_rect_is_noop() {
        let mut buf = canvas_buffer(4, 4, PixelFormat::Rgb565);
        let before = buf.clone();
        let mut canvas = Canvas::new(&mut buf, 4, 4, 8, PixelFormat::Rgb565);
        canvas.fill_rect(1, 1, 0, 3, [255, 255, 255, 255]);
        canvas.fill_rect(10, 10, 5, 5, [255, 255, 255, 255]);
        canvas.fill_rect(-9, 0, 5, 5, [255, 255, 255, 255]);
        assert_eq!(buf, before);
    }

    #[test]
    fn fill_rect_blends_with_destination() {
        let mut buf = canvas_buffer(1, 1, PixelFormat::Argb8888);
        let mut canvas = Canvas::new(&mut buf, 1, 1, 4, PixelFormat::Argb8888);
        canvas.fill_rect(0, 0, 1, 1, [200, 100, 0, 255]);
        canvas.fill_rect(0, 0, 1, 1, [0, 0, 255, 51]);
        assert_eq!(canvas.read_pixel(0, 0), Some(Rgb::new(160, 80, 51)));
    }

    #[test]
    fn stride_padding_is_left_alone() {
        // 2x2 surface, 12-byte rows: 4 bytes of padding per row
        let mut buf = vec![0xAAu8; 24];
        let mut canvas = Canvas::new(&mut buf, 2, 2, 12, PixelFormat::Argb8888);
        canvas.fill_rect(0, 0, 2, 2, [1, 2, 3, 255]);
        assert_eq!(&buf[8..12], &[0xAA; 4]);
        assert_eq!(&buf[20..24], &[0xAA; 4]);
    }

    #[test]
    fn draw_text_sets_glyph_pixels_only() {
        let mut buf = canvas_buffer(12, 7, PixelFormat::Argb8888);
        let mut canvas = Canvas::new(&mut buf, 12, 7, 48, PixelFormat::Argb8888);
        canvas.draw_text(0, 0, "L1", [255, 255, 255, 255]);

        let white = Some(Rgb::new(255, 255, 255));
        // 'L' column 0 is fully lit
        assert!((0..7).all(|y| canvas.read_pixel(0, y) == white));
        // spacing column between glyphs stays untouched
        assert!((0..7).all(|y| canvas.read_pixel(5, y) == Some(Rgb::default())));
        // '1' starts at x=6; its top row has a single pixel at col 2
        assert_eq!(canvas.read_pixel(8, 0), white);
        assert_eq!(canvas.read_pixel(6, 0), Some(Rgb::default()));
    }

    #[test]
    fn text_past_the_edge_is_clipped() {
        let mut buf = canvas_buffer(3, 3, PixelFormat::Rgb565);
        let mut canvas = Canvas::new(&mut buf, 3, 3, 6, PixelFormat::Rgb565);
        canvas.draw_text(-4, -4, "W", [255, 255, 255, 255]);
        canvas.draw_text(2, 2, "MMM", [255, 255, 255, 255]);
        assert_eq!(canvas.read_pixel(2, 2), Some(Rgb::new(0xF8, 0xFC, 0xF8)));
    }
}
