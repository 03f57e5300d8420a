//! Raster surface backing every layer.
//!
//! A [`Surface`] is an RGBA8 pixel buffer behind an [`Arc`]. Cloning a surface
//! is cheap and shares the pixels; the first write after a clone copies them.
//! History snapshots rely on this so that untouched layers are never duplicated.

use crate::error::EditorResult;
use crate::export::ExportFormat;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use peniko::Color;
use std::io::Cursor;
use std::sync::Arc;

/// JPEG quality used for export (maximum).
const JPEG_QUALITY: u8 = 100;

/// Which axis a flip mirrors across.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipDirection {
    Horizontal,
    Vertical,
}

/// Reference-counted RGBA8 pixel buffer with copy-on-write semantics.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pixels: Arc<RgbaImage>,
}

impl Surface {
    /// Allocate a fully transparent surface.
    pub fn allocate(width: u32, height: u32) -> Self {
        Self::from_image(RgbaImage::new(width, height))
    }

    /// Allocate a surface filled with a solid color.
    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self::from_image(RgbaImage::from_pixel(
            width,
            height,
            Rgba([rgba.r, rgba.g, rgba.b, rgba.a]),
        ))
    }

    /// Wrap an existing pixel buffer.
    pub fn from_image(image: RgbaImage) -> Self {
        Self {
            pixels: Arc::new(image),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// True if the surface has no pixels.
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Get the pixel at (x, y), or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        self.pixels.get_pixel_checked(x, y).copied()
    }

    /// Whether two surfaces share the same pixel allocation.
    pub fn shares_pixels(&self, other: &Surface) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }

    fn pixels_mut(&mut self) -> &mut RgbaImage {
        Arc::make_mut(&mut self.pixels)
    }

    /// Copy a region out of the surface. The region is clipped to the surface.
    pub fn read_pixels(&self, x: u32, y: u32, width: u32, height: u32) -> RgbaImage {
        imageops::crop_imm(self.pixels.as_ref(), x, y, width, height).to_image()
    }

    /// Overwrite pixels at (x, y) without blending.
    pub fn write_pixels(&mut self, buffer: &RgbaImage, x: i64, y: i64) {
        imageops::replace(self.pixels_mut(), buffer, x, y);
    }

    /// Return a copy scaled to `width` x `height`.
    pub fn scaled(&self, width: u32, height: u32) -> Surface {
        if width == self.width() && height == self.height() {
            return self.clone();
        }
        if width == 0 || height == 0 || self.is_empty() {
            return Surface::allocate(width, height);
        }
        Surface::from_image(imageops::resize(
            self.pixels.as_ref(),
            width,
            height,
            FilterType::Triangle,
        ))
    }

    /// Draw this surface into `dst` at (x, y), scaled to `width` x `height`,
    /// using source-over blending with a uniform opacity multiplier.
    pub fn draw_into(&self, dst: &mut Surface, x: i64, y: i64, width: u32, height: u32, opacity: f64) {
        if width == 0 || height == 0 || self.is_empty() || opacity <= 0.0 {
            return;
        }
        let scaled = self.scaled(width, height);
        let src = scaled.as_image();
        let opacity = opacity.clamp(0.0, 1.0) as f32;
        let dst_w = dst.width() as i64;
        let dst_h = dst.height() as i64;

        // Clip to the destination.
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + width as i64).min(dst_w);
        let y1 = (y + height as i64).min(dst_h);
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        let out = dst.pixels_mut();
        for dy in y0..y1 {
            for dx in x0..x1 {
                let s = src.get_pixel((dx - x) as u32, (dy - y) as u32);
                let d = out.get_pixel_mut(dx as u32, dy as u32);
                *d = blend_over(*s, *d, opacity);
            }
        }
    }

    /// Mirror the pixels in place.
    pub fn flip(&mut self, direction: FlipDirection) {
        let pixels = self.pixels_mut();
        match direction {
            FlipDirection::Horizontal => imageops::flip_horizontal_in_place(pixels),
            FlipDirection::Vertical => imageops::flip_vertical_in_place(pixels),
        }
    }

    /// Rotated bounding box size for an angle in degrees.
    pub fn rotated_size(width: u32, height: u32, degrees: f64) -> (u32, u32) {
        let (sin, cos) = degrees.to_radians().sin_cos();
        let (w, h) = (width as f64, height as f64);
        let new_w = (w * cos.abs() + h * sin.abs()).floor();
        let new_h = (h * cos.abs() + w * sin.abs()).floor();
        (new_w.max(0.0) as u32, new_h.max(0.0) as u32)
    }

    /// Return a copy rotated clockwise by `degrees` about its center, painted
    /// onto the rotated bounding box with a transparent background.
    pub fn rotated(&self, degrees: f64) -> Surface {
        let (new_w, new_h) = Self::rotated_size(self.width(), self.height(), degrees);
        let mut out = RgbaImage::new(new_w, new_h);
        if self.is_empty() {
            return Surface::from_image(out);
        }

        let (sin, cos) = degrees.to_radians().sin_cos();
        let src_cx = self.width() as f64 / 2.0;
        let src_cy = self.height() as f64 / 2.0;
        let dst_cx = new_w as f64 / 2.0;
        let dst_cy = new_h as f64 / 2.0;

        for (px, py, pixel) in out.enumerate_pixels_mut() {
            let dx = px as f64 + 0.5 - dst_cx;
            let dy = py as f64 + 0.5 - dst_cy;
            // Inverse rotation back into source space.
            let sx = cos * dx + sin * dy + src_cx;
            let sy = -sin * dx + cos * dy + src_cy;
            *pixel = sample_bilinear(&self.pixels, sx - 0.5, sy - 0.5);
        }
        Surface::from_image(out)
    }

    /// Encode the surface in the given format.
    pub fn encode(&self, format: ExportFormat) -> EditorResult<Vec<u8>> {
        let mut bytes = Vec::new();
        match format {
            ExportFormat::Jpeg => {
                // JPEG has no alpha channel.
                let rgb = DynamicImage::ImageRgba8(self.pixels.as_ref().clone()).to_rgb8();
                let encoder = JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY);
                rgb.write_with_encoder(encoder)?;
            }
            ExportFormat::Png | ExportFormat::Webp => {
                let image_format = match format {
                    ExportFormat::Png => ImageFormat::Png,
                    _ => ImageFormat::WebP,
                };
                DynamicImage::ImageRgba8(self.pixels.as_ref().clone())
                    .write_to(&mut Cursor::new(&mut bytes), image_format)?;
            }
        }
        Ok(bytes)
    }
}

fn blend_over(src: Rgba<u8>, dst: Rgba<u8>, opacity: f32) -> Rgba<u8> {
    let sa = src[3] as f32 / 255.0 * opacity;
    if sa <= 0.0 {
        return dst;
    }
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    let mut out = [0u8; 4];
    for c in 0..3 {
        let sc = src[c] as f32 / 255.0;
        let dc = dst[c] as f32 / 255.0;
        let value = (sc * sa + dc * da * (1.0 - sa)) / out_a;
        out[c] = (value * 255.0).round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgba(out)
}

/// Bilinear sample with transparent edges, interpolating premultiplied color.
fn sample_bilinear(img: &RgbaImage, x: f64, y: f64) -> Rgba<u8> {
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let mut acc = [0.0f64; 4];
    let taps = [
        (x0, y0, (1.0 - fx) * (1.0 - fy)),
        (x0 + 1, y0, fx * (1.0 - fy)),
        (x0, y0 + 1, (1.0 - fx) * fy),
        (x0 + 1, y0 + 1, fx * fy),
    ];
    for (tx, ty, weight) in taps {
        if weight <= 0.0 || tx < 0 || ty < 0 || tx >= img.width() as i64 || ty >= img.height() as i64 {
            continue;
        }
        let p = img.get_pixel(tx as u32, ty as u32);
        let a = p[3] as f64 / 255.0;
        acc[0] += p[0] as f64 * a * weight;
        acc[1] += p[1] as f64 * a * weight;
        acc[2] += p[2] as f64 * a * weight;
        acc[3] += a * weight;
    }

    if acc[3] <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let unpremul = |v: f64| (v / acc[3]).round().clamp(0.0, 255.0) as u8;
    Rgba([
        unpremul(acc[0]),
        unpremul(acc[1]),
        unpremul(acc[2]),
        (acc[3] * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}
