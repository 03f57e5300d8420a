//! Command-line arguments.

use clap::{Parser, ValueEnum};
use kurbo::{Point, Rect};
use peniko::Color;
use std::path::PathBuf;
use strata_core::{CanvasPreset, ExportFormat, FlipDirection};

/// Layer, crop, text and overlay edits on images from the command line.
///
/// Inputs are stacked bottom to top; the first one sets the canvas size.
/// Edits apply to the top layer in the order listed here, then the
/// composite is written to the output directory.
#[derive(Parser, Debug)]
#[command(name = "strata", author, version, about)]
pub struct Args {
    /// Images to stack (PNG, JPEG or WebP)
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Editor settings as JSON
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Canvas size: square, banner, portrait, 9:16 or 16:9:<width>
    #[arg(long, value_parser = parse_preset, conflicts_with = "size")]
    pub preset: Option<CanvasPreset>,

    /// Canvas size as WIDTHxHEIGHT
    #[arg(long, value_parser = parse_size)]
    pub size: Option<(u32, u32)>,

    /// Crop the top layer to X,Y,W,H in canvas pixels
    #[arg(long, value_parser = parse_rect)]
    pub crop: Option<Rect>,

    /// Apply --crop to the whole canvas instead of the top layer
    #[arg(long, requires = "crop")]
    pub crop_canvas: bool,

    /// Rotate the top layer by this many degrees
    #[arg(long, allow_hyphen_values = true)]
    pub rotate: Option<f64>,

    /// Mirror the top layer
    #[arg(long, value_enum)]
    pub flip: Option<Flip>,

    /// Opacity of the top layer, 0.0 to 1.0
    #[arg(long)]
    pub opacity: Option<f64>,

    /// Add a text layer
    #[arg(long, requires = "font")]
    pub text: Option<String>,

    /// TrueType/OpenType font used for --text
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Font size in canvas pixels
    #[arg(long, default_value_t = 32.0)]
    pub text_size: f64,

    /// Text color as #RRGGBB or #RRGGBBAA
    #[arg(long, value_parser = parse_color, default_value = "#ffffff")]
    pub text_color: Color,

    /// Top-left of the text as X,Y (defaults to near the center)
    #[arg(long, value_parser = parse_point)]
    pub text_at: Option<Point>,

    /// Bold text
    #[arg(long)]
    pub bold: bool,

    /// Drop shadow behind the text
    #[arg(long)]
    pub shadow: bool,

    /// Draw another image on top as an overlay layer
    #[arg(long)]
    pub overlay: Option<PathBuf>,

    /// Overlay opacity, 0.0 to 1.0
    #[arg(long, default_value_t = 1.0)]
    pub overlay_opacity: f64,

    /// Output format: png, jpeg or webp
    #[arg(long, value_parser = parse_format)]
    pub format: Option<ExportFormat>,

    /// Directory the result is written to
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Print the history as JSON when done
    #[arg(long)]
    pub history: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Flip {
    Horizontal,
    Vertical,
}

impl From<Flip> for FlipDirection {
    fn from(flip: Flip) -> Self {
        match flip {
            Flip::Horizontal => FlipDirection::Horizontal,
            Flip::Vertical => FlipDirection::Vertical,
        }
    }
}

fn parse_preset(s: &str) -> Result<CanvasPreset, String> {
    CanvasPreset::from_name(s).ok_or_else(|| format!("unknown preset '{}'", s))
}

fn parse_format(s: &str) -> Result<ExportFormat, String> {
    ExportFormat::from_extension(s).ok_or_else(|| format!("unsupported format '{}'", s))
}

fn parse_numbers(s: &str, count: usize) -> Result<Vec<f64>, String> {
    let values = s
        .split(',')
        .map(|part| part.trim().parse::<f64>().map_err(|e| format!("'{}': {}", part, e)))
        .collect::<Result<Vec<_>, _>>()?;
    if values.len() != count {
        return Err(format!("expected {} comma-separated numbers, got {}", count, values.len()));
    }
    Ok(values)
}

fn parse_rect(s: &str) -> Result<Rect, String> {
    let v = parse_numbers(s, 4)?;
    Ok(Rect::new(v[0], v[1], v[0] + v[2], v[1] + v[3]))
}

fn parse_point(s: &str) -> Result<Point, String> {
    let v = parse_numbers(s, 2)?;
    Ok(Point::new(v[0], v[1]))
}

fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
    let w = w.trim().parse().map_err(|e| format!("width: {}", e))?;
    let h = h.trim().parse().map_err(|e| format!("height: {}", e))?;
    Ok((w, h))
}

fn parse_color(s: &str) -> Result<Color, String> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    if !matches!(hex.len(), 6 | 8) || !hex.is_ascii() {
        return Err(format!("expected #RRGGBB or #RRGGBBAA, got '{}'", s));
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| format!("'{}': {}", s, e));
    let alpha = if hex.len() == 8 { byte(6)? } else { 255 };
    Ok(Color::from_rgba8(byte(0)?, byte(2)?, byte(4)?, alpha))
}
