//! Pixel canvas for preview rendering
//!
//! An owned ARGB buffer with clipped drawing primitives. Out-of-bounds
//! operations are silently clipped.

use image::{Rgba, RgbaImage};

use crate::layout::Rect;

/// Blend a foreground color onto a background color using alpha compositing.
///
/// Both colors are in ARGB format (0xAARRGGBB). Returns the blended color
/// with full opacity.
#[inline]
pub fn blend_colors(bg: u32, fg: u32, alpha: f32) -> u32 {
    let channel = |shift: u32| {
        let b = ((bg >> shift) & 0xFF) as f32;
        let f = ((fg >> shift) & 0xFF) as f32;
        ((b * (1.0 - alpha) + f * alpha) as u32).min(0xFF)
    };
    0xFF000000 | (channel(16) << 16) | (channel(8) << 8) | channel(0)
}

pub struct Canvas {
    buffer: Vec<u32>,
    width: usize,
    height: usize,
}

impl Canvas {
    pub fn new(width: usize, height: usize, background: u32) -> Self {
        Self {
            buffer: vec![background | 0xFF000000; width * height],
            width,
            height,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Pixel at (x, y), or 0 if out of bounds
    #[inline]
    pub fn get_pixel(&self, x: usize, y: usize) -> u32 {
        if x < self.width && y < self.height {
            self.buffer[y * self.width + x]
        } else {
            0
        }
    }

    /// Convert float rect coordinates into a clipped pixel span
    fn clip(&self, rect: Rect) -> (usize, usize, usize, usize) {
        let x0 = (rect.x.max(0.0) as usize).min(self.width);
        let y0 = (rect.y.max(0.0) as usize).min(self.height);
        let x1 = (rect.right().max(0.0).ceil() as usize).min(self.width);
        let y1 = (rect.bottom().max(0.0).ceil() as usize).min(self.height);
        (x0, y0, x1, y1)
    }

    /// Blend a pixel with alpha (ARGB format, alpha in high byte)
    #[inline]
    pub fn blend_pixel(&mut self, x: isize, y: isize, color: u32) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let alpha = ((color >> 24) & 0xFF) as f32 / 255.0;
        if alpha <= 0.0 {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        self.buffer[idx] = if alpha >= 1.0 {
            color | 0xFF000000
        } else {
            blend_colors(self.buffer[idx], color, alpha)
        };
    }

    /// Fill a rectangle with alpha blending
    pub fn blend_rect(&mut self, rect: Rect, color: u32) {
        let (x0, y0, x1, y1) = self.clip(rect);
        for y in y0..y1 {
            for x in x0..x1 {
                self.blend_pixel(x as isize, y as isize, color);
            }
        }
    }

    /// Draw a 1px outline just inside `rect`
    pub fn stroke_rect(&mut self, rect: Rect, color: u32) {
        let (x0, y0, x1, y1) = self.clip(rect);
        if x1 <= x0 || y1 <= y0 {
            return;
        }
        for x in x0..x1 {
            self.blend_pixel(x as isize, y0 as isize, color);
            self.blend_pixel(x as isize, (y1 - 1) as isize, color);
        }
        for y in (y0 + 1)..(y1 - 1).max(y0 + 1) {
            self.blend_pixel(x0 as isize, y as isize, color);
            self.blend_pixel((x1 - 1) as isize, y as isize, color);
        }
    }

    /// Vertical guide line at `x`, dotted
    pub fn guide_vertical(&mut self, x: f32, color: u32) {
        let x = x.round() as isize;
        for y in (0..self.height).step_by(2) {
            self.blend_pixel(x, y as isize, color);
        }
    }

    /// Horizontal guide line at `y`, dotted
    pub fn guide_horizontal(&mut self, y: f32, color: u32) {
        let y = y.round() as isize;
        for x in (0..self.width).step_by(2) {
            self.blend_pixel(x as isize, y, color);
        }
    }

    /// Blit an RGBA image stretched to `dest` with nearest-neighbor sampling
    pub fn blit_scaled(&mut self, image: &RgbaImage, dest: Rect) {
        if image.width() == 0 || image.height() == 0 || dest.width <= 0.0 || dest.height <= 0.0
        {
            return;
        }
        let (x0, y0, x1, y1) = self.clip(dest);
        let scale_x = image.width() as f32 / dest.width;
        let scale_y = image.height() as f32 / dest.height;
        for y in y0..y1 {
            let src_y = (((y as f32 - dest.y) * scale_y) as u32).min(image.height() - 1);
            for x in x0..x1 {
                let src_x = (((x as f32 - dest.x) * scale_x) as u32).min(image.width() - 1);
                let Rgba([r, g, b, a]) = *image.get_pixel(src_x, src_y);
                let argb = (u32::from(a) << 24) | (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b);
                self.blend_pixel(x as isize, y as isize, argb);
            }
        }
    }

    /// Draw a coverage bitmap (one alpha byte per pixel) tinted with `color`
    pub fn draw_coverage(
        &mut self,
        coverage: &[u8],
        width: usize,
        left: isize,
        top: isize,
        color: u32,
    ) {
        if width == 0 {
            return;
        }
        for (i, alpha) in coverage.iter().enumerate() {
            if *alpha == 0 {
                continue;
            }
            let px = left + (i % width) as isize;
            let py = top + (i / width) as isize;
            let a = ((u32::from(*alpha) * ((color >> 24) & 0xFF)) / 0xFF) << 24;
            self.blend_pixel(px, py, (color & 0x00FFFFFF) | a);
        }
    }

    pub fn into_image(self) -> RgbaImage {
        let mut image = RgbaImage::new(self.width as u32, self.height as u32);
        for (pixel, argb) in image.pixels_mut().zip(self.buffer) {
            *pixel = Rgba([
                ((argb >> 16) & 0xFF) as u8,
                ((argb >> 8) & 0xFF) as u8,
                (argb & 0xFF) as u8,
                ((argb >> 24) & 0xFF) as u8,
            ]);
        }
        image
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_half() {
        assert_eq!(blend_colors(0xFF000000, 0xFFFFFFFF, 0.5), 0xFF7F7F7F);
    }

    #[test]
    fn test_rect_is_clipped() {
        let mut canvas = Canvas::new(4, 4, 0);
        canvas.blend_rect(Rect::new(2.0, 2.0, 10.0, 10.0), 0xFFFF0000);
        assert_eq!(canvas.get_pixel(3, 3), 0xFFFF0000);
        assert_eq!(canvas.get_pixel(1, 1), 0xFF000000);
    }

    #[test]
    fn test_into_image_channels() {
        let canvas = Canvas::new(1, 1, 0x00123456);
        let image = canvas.into_image();
        assert_eq!(image.get_pixel(0, 0), &Rgba([0x12, 0x34, 0x56, 0xFF]));
    }
}
