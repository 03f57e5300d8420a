//! Export formats, output naming and canvas presets.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Output format for the composited canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
}

impl ExportFormat {
    /// Get MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
            ExportFormat::Webp => "image/webp",
        }
    }

    /// File extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
            ExportFormat::Webp => "webp",
        }
    }

    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(ExportFormat::Png),
            "jpg" | "jpeg" => Some(ExportFormat::Jpeg),
            "webp" => Some(ExportFormat::Webp),
            _ => None,
        }
    }

    /// Cycle to the next format.
    pub fn next(self) -> Self {
        match self {
            ExportFormat::Png => ExportFormat::Jpeg,
            ExportFormat::Jpeg => ExportFormat::Webp,
            ExportFormat::Webp => ExportFormat::Png,
        }
    }
}

/// Timestamped output file name, e.g. `image_1700000000000.jpg`.
pub fn export_filename(format: ExportFormat, at: SystemTime) -> String {
    let millis = at.duration_since(UNIX_EPOCH).map(|d| d.as_millis()).unwrap_or(0);
    format!("image_{}.{}", millis, format.extension())
}

/// An encoded export ready to be written out.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedImage {
    pub filename: String,
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
}

/// Fixed canvas sizes offered as shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasPreset {
    /// 450x450.
    Square,
    /// 1600x500.
    Banner,
    /// 1080x1920 (9:16).
    Portrait,
    /// 16:9 at the given width.
    Widescreen { width: u32 },
}

impl CanvasPreset {
    pub fn size(&self) -> (u32, u32) {
        match *self {
            CanvasPreset::Square => (450, 450),
            CanvasPreset::Banner => (1600, 500),
            CanvasPreset::Portrait => (1080, 1920),
            CanvasPreset::Widescreen { width } => (width, widescreen_height(width)),
        }
    }

    /// Parse a preset name: `square`, `banner`, `portrait` (or `9:16`), or
    /// `16:9:<width>`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "square" => Some(CanvasPreset::Square),
            "banner" => Some(CanvasPreset::Banner),
            "portrait" | "9:16" => Some(CanvasPreset::Portrait),
            other => {
                let width = other.strip_prefix("16:9:")?.parse().ok()?;
                Some(CanvasPreset::Widescreen { width })
            }
        }
    }
}

/// Height for a 16:9 canvas of the given width.
pub fn widescreen_height(width: u32) -> u32 {
    (width as f64 / 16.0 * 9.0).round() as u32
}
