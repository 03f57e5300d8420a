//! Glyph rasterization with `ab_glyph`.

use crate::{RenderError, RenderResult};
use ab_glyph::{Font, FontArc, GlyphId, PxScale, ScaleFont, point};
use image::{Rgba, RgbaImage, imageops};
use kurbo::Point;
use strata_core::{Surface, TextRasterizer, TextStyle};

const SHADOW_OFFSET: i64 = 3;
const SHADOW_SIGMA: f32 = 3.0;
const SHADOW_ALPHA: f32 = 0.7;

/// A single font face used for every text layer.
///
/// `TextStyle::font_family` is informational here: the face is whatever
/// was loaded.
#[derive(Clone)]
pub struct GlyphRasterizer {
    font: FontArc,
}

impl std::fmt::Debug for GlyphRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlyphRasterizer").finish_non_exhaustive()
    }
}

impl GlyphRasterizer {
    /// Load a TrueType/OpenType font from raw bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> RenderResult<Self> {
        let font = FontArc::try_from_vec(bytes).map_err(|e| RenderError::FontLoad(e.to_string()))?;
        Ok(Self { font })
    }

    /// Glyphs positioned along one line, with the baseline at `ascent`.
    fn layout(&self, text: &str, size: f32) -> (Vec<(GlyphId, f32)>, f32, f32) {
        let scaled = self.font.as_scaled(PxScale::from(size));
        let mut glyphs = Vec::new();
        let mut cursor = 0.0f32;
        let mut last: Option<GlyphId> = None;
        for ch in text.chars() {
            let id = self.font.glyph_id(ch);
            if let Some(prev) = last {
                cursor += scaled.kern(prev, id);
            }
            glyphs.push((id, cursor));
            cursor += scaled.h_advance(id);
            last = Some(id);
        }
        (glyphs, cursor, scaled.ascent())
    }

    /// Per-pixel coverage of `text` over a `width` x `height` buffer.
    fn coverage(&self, text: &str, style: &TextStyle, origin: Point, width: u32, height: u32) -> Vec<f32> {
        let mut buf = vec![0.0f32; width as usize * height as usize];
        let size = style.size as f32;
        let (glyphs, _, ascent) = self.layout(text, size);
        let baseline = origin.y as f32 + ascent;

        for (id, x) in glyphs {
            let glyph = id.with_scale_and_position(size, point(origin.x as f32 + x, baseline));
            let Some(outlined) = self.font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|px, py, cov| {
                let ix = bounds.min.x as i64 + px as i64;
                let iy = bounds.min.y as i64 + py as i64;
                if ix < 0 || iy < 0 || ix >= width as i64 || iy >= height as i64 {
                    return;
                }
                let idx = iy as usize * width as usize + ix as usize;
                buf[idx] = buf[idx].max(cov);
                if style.bold && ix + 1 < width as i64 {
                    buf[idx + 1] = buf[idx + 1].max(cov);
                }
            });
        }
        buf
    }
}

/// Paint `color` through a coverage mask.
fn mask_image(coverage: &[f32], width: u32, height: u32, rgb: [u8; 3], alpha: f32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        let cov = coverage[y as usize * width as usize + x as usize];
        let a = (cov * alpha * 255.0).round().clamp(0.0, 255.0) as u8;
        Rgba([rgb[0], rgb[1], rgb[2], a])
    })
}

impl TextRasterizer for GlyphRasterizer {
    fn measure(&self, text: &str, style: &TextStyle) -> f64 {
        let (_, width, _) = self.layout(text, style.size as f32);
        width as f64
    }

    fn draw(&self, surface: &mut Surface, origin: Point, text: &str, style: &TextStyle) {
        let (width, height) = (surface.width(), surface.height());
        if width == 0 || height == 0 || text.is_empty() {
            return;
        }
        let coverage = self.coverage(text, style, origin, width, height);

        if style.shadow {
            let shadow = mask_image(&coverage, width, height, [0, 0, 0], SHADOW_ALPHA);
            let blurred = Surface::from_image(imageops::blur(&shadow, SHADOW_SIGMA));
            blurred.draw_into(surface, SHADOW_OFFSET, SHADOW_OFFSET, width, height, 1.0);
        }

        let color = style.color.to_rgba8();
        let glyphs = mask_image(&coverage, width, height, [color.r, color.g, color.b], color.a as f32 / 255.0);
        Surface::from_image(glyphs).draw_into(surface, 0, 0, width, height, 1.0);
    }
}
