//! Drawing surfaces.
//!
//! [`Surface2D`] is the small slice of a 2D canvas API the render pass needs:
//! a global alpha, a translation stack of depth one, scaled image blits and
//! lines for debug markers. [`SoftwareSurface`] implements it on an in-memory
//! RGBA frame, which is what the headless binary and the tests draw into.

use image::{Rgba, RgbaImage};

/// Destination rectangle in surface units, before translation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DrawRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl DrawRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Raster sink used by the render pass.
pub trait Surface2D {
    /// Opacity applied to every subsequent image blit, in `[0, 1]`.
    fn set_global_alpha(&mut self, alpha: f32);
    /// Accumulate a translation applied to subsequent draws.
    fn translate(&mut self, dx: f32, dy: f32);
    /// Drop any accumulated translation.
    fn reset_transform(&mut self);
    /// Draw the whole of `image` stretched over `dst`.
    fn draw_image_scaled(&mut self, image: &RgbaImage, dst: DrawRect);
    /// Draw an opaque one-pixel line.
    fn draw_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: Rgba<u8>);
}

/// CPU frame buffer implementing [`Surface2D`].
///
/// Blits sample the image nearest-neighbor and blend source-over.
#[derive(Clone, Debug)]
pub struct SoftwareSurface {
    frame: RgbaImage,
    offset: (f32, f32),
    global_alpha: f32,
    image_draws: usize,
}

impl SoftwareSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            frame: RgbaImage::new(width, height),
            offset: (0.0, 0.0),
            global_alpha: 1.0,
            image_draws: 0,
        }
    }

    /// Fill the whole frame with `color` and reset the draw counter.
    pub fn clear(&mut self, color: Rgba<u8>) {
        for pixel in self.frame.pixels_mut() {
            *pixel = color;
        }
        self.image_draws = 0;
    }

    pub fn frame(&self) -> &RgbaImage {
        &self.frame
    }

    pub fn into_frame(self) -> RgbaImage {
        self.frame
    }

    /// Current accumulated translation.
    pub fn offset(&self) -> (f32, f32) {
        self.offset
    }

    /// Number of image blits since creation or the last [`clear`](Self::clear).
    pub fn image_draws(&self) -> usize {
        self.image_draws
    }

    fn blend(&mut self, x: u32, y: u32, src: Rgba<u8>) {
        let alpha = src[3] as f32 / 255.0 * self.global_alpha;
        if alpha <= 0.0 {
            return;
        }
        let dst = self.frame.get_pixel_mut(x, y);
        if alpha >= 1.0 {
            *dst = src;
            return;
        }
        let inv = 1.0 - alpha;
        for c in 0..3 {
            dst[c] = (src[c] as f32 * alpha + dst[c] as f32 * inv).round() as u8;
        }
        let out_a = alpha + (dst[3] as f32 / 255.0) * inv;
        dst[3] = (out_a * 255.0).round().min(255.0) as u8;
    }
}

impl Surface2D for SoftwareSurface {
    fn set_global_alpha(&mut self, alpha: f32) {
        self.global_alpha = alpha.clamp(0.0, 1.0);
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.offset.0 += dx;
        self.offset.1 += dy;
    }

    fn reset_transform(&mut self) {
        self.offset = (0.0, 0.0);
    }

    fn draw_image_scaled(&mut self, image: &RgbaImage, dst: DrawRect) {
        self.image_draws += 1;
        let (img_w, img_h) = image.dimensions();
        if dst.width <= 0.0 || dst.height <= 0.0 || img_w == 0 || img_h == 0 {
            return;
        }
        let (fw, fh) = self.frame.dimensions();
        let x0 = dst.x + self.offset.0;
        let y0 = dst.y + self.offset.1;
        let x1 = x0 + dst.width;
        let y1 = y0 + dst.height;

        let px_start = x0.floor().max(0.0) as u32;
        let py_start = y0.floor().max(0.0) as u32;
        let px_end = (x1.ceil().max(0.0) as u32).min(fw);
        let py_end = (y1.ceil().max(0.0) as u32).min(fh);

        for py in py_start..py_end {
            let cy = py as f32 + 0.5;
            if cy < y0 || cy >= y1 {
                continue;
            }
            let v = (((cy - y0) / dst.height) * img_h as f32) as u32;
            let v = v.min(img_h - 1);
            for px in px_start..px_end {
                let cx = px as f32 + 0.5;
                if cx < x0 || cx >= x1 {
                    continue;
                }
                let u = (((cx - x0) / dst.width) * img_w as f32) as u32;
                let u = u.min(img_w - 1);
                let src = *image.get_pixel(u, v);
                self.blend(px, py, src);
            }
        }
    }

    fn draw_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: Rgba<u8>) {
        let (ax, ay) = (x0 + self.offset.0, y0 + self.offset.1);
        let (bx, by) = (x1 + self.offset.0, y1 + self.offset.1);
        let steps = (bx - ax).abs().max((by - ay).abs()).ceil().max(1.0) as u32;
        let (fw, fh) = self.frame.dimensions();
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let x = (ax + (bx - ax) * t).round();
            let y = (ay + (by - ay) * t).round();
            if x >= 0.0 && y >= 0.0 && (x as u32) < fw && (y as u32) < fh {
                self.frame.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker() -> RgbaImage {
        let mut img = RgbaImage::new(2, 2);
        img.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        img.put_pixel(1, 0, Rgba([0, 255, 0, 255]));
        img.put_pixel(0, 1, Rgba([0, 0, 255, 255]));
        img.put_pixel(1, 1, Rgba([0, 0, 0, 0]));
        img
    }

    #[test]
    fn test_blit_one_to_one() {
        let mut s = SoftwareSurface::new(4, 4);
        s.draw_image_scaled(&checker(), DrawRect::new(1.0, 1.0, 2.0, 2.0));
        assert_eq!(*s.frame().get_pixel(1, 1), Rgba([255, 0, 0, 255]));
        assert_eq!(*s.frame().get_pixel(2, 1), Rgba([0, 255, 0, 255]));
        assert_eq!(*s.frame().get_pixel(1, 2), Rgba([0, 0, 255, 255]));
        // transparent source pixel leaves the frame untouched
        assert_eq!(*s.frame().get_pixel(2, 2), Rgba([0, 0, 0, 0]));
        assert_eq!(*s.frame().get_pixel(0, 0), Rgba([0, 0, 0, 0]));
        assert_eq!(s.image_draws(), 1);
    }

    #[test]
    fn test_blit_scaled_and_translated() {
        let mut s = SoftwareSurface::new(8, 8);
        s.translate(2.0, 0.0);
        s.draw_image_scaled(&checker(), DrawRect::new(0.0, 0.0, 4.0, 4.0));
        assert_eq!(*s.frame().get_pixel(2, 0), Rgba([255, 0, 0, 255]));
        assert_eq!(*s.frame().get_pixel(3, 1), Rgba([255, 0, 0, 255]));
        assert_eq!(*s.frame().get_pixel(4, 0), Rgba([0, 255, 0, 255]));
        assert_eq!(*s.frame().get_pixel(1, 0), Rgba([0, 0, 0, 0]));
        s.reset_transform();
        assert_eq!(s.offset(), (0.0, 0.0));
    }

    #[test]
    fn test_blit_clips_to_frame() {
        let mut s = SoftwareSurface::new(2, 2);
        s.draw_image_scaled(&checker(), DrawRect::new(-1.0, -1.0, 2.0, 2.0));
        assert_eq!(*s.frame().get_pixel(0, 0), Rgba([0, 0, 0, 0]));
        s.clear(Rgba([9, 9, 9, 255]));
        s.draw_image_scaled(&checker(), DrawRect::new(1.0, 1.0, 2.0, 2.0));
        assert_eq!(*s.frame().get_pixel(1, 1), Rgba([255, 0, 0, 255]));
        assert_eq!(*s.frame().get_pixel(0, 0), Rgba([9, 9, 9, 255]));
    }

    #[test]
    fn test_global_alpha_blends() {
        let mut s = SoftwareSurface::new(1, 1);
        s.clear(Rgba([0, 0, 0, 255]));
        s.set_global_alpha(0.5);
        let mut white = RgbaImage::new(1, 1);
        white.put_pixel(0, 0, Rgba([255, 255, 255, 255]));
        s.draw_image_scaled(&white, DrawRect::new(0.0, 0.0, 1.0, 1.0));
        let p = *s.frame().get_pixel(0, 0);
        assert_eq!(p, Rgba([128, 128, 128, 255]));
    }

    #[test]
    fn test_zero_alpha_draws_nothing() {
        let mut s = SoftwareSurface::new(2, 2);
        s.set_global_alpha(0.0);
        s.draw_image_scaled(&checker(), DrawRect::new(0.0, 0.0, 2.0, 2.0));
        assert_eq!(*s.frame().get_pixel(0, 0), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_draw_line() {
        let mut s = SoftwareSurface::new(11, 11);
        let green = Rgba([0, 255, 0, 255]);
        s.draw_line(0.0, 5.0, 10.0, 5.0, green);
        for x in 0..=10 {
            assert_eq!(*s.frame().get_pixel(x, 5), green);
        }
        assert_eq!(*s.frame().get_pixel(5, 4), Rgba([0, 0, 0, 0]));
    }
}
