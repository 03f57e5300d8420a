//! Runs one batch edit through an editor session.

use crate::args::Args;
use kurbo::{Point, Rect};
use std::path::{Path, PathBuf};
use strata_core::{EditorConfig, EditorError, EditorSession, PointerTarget, Surface};
use strata_render::{GlyphRasterizer, RenderError, decode_image};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}: {source}")]
    Render {
        path: PathBuf,
        #[source]
        source: RenderError,
    },
    #[error(transparent)]
    Editor(#[from] EditorError),
}

fn read(path: &Path) -> Result<Vec<u8>, CliError> {
    std::fs::read(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn decode(path: &Path) -> Result<Surface, CliError> {
    let bytes = read(path)?;
    pollster::block_on(decode_image(bytes)).map_err(|source| CliError::Render {
        path: path.to_path_buf(),
        source,
    })
}

fn load_config(path: Option<&Path>) -> Result<EditorConfig, CliError> {
    let Some(path) = path else {
        return Ok(EditorConfig::default());
    };
    let bytes = read(path)?;
    let json = String::from_utf8_lossy(&bytes);
    let config = EditorConfig::from_json(&json)?;
    log::debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// The display maps one to one onto the canvas, so every coordinate given on
/// the command line is already in canvas pixels.
fn display(session: &EditorSession) -> Rect {
    let doc = session.document();
    Rect::new(0.0, 0.0, doc.canvas_width as f64, doc.canvas_height as f64)
}

fn crop(session: &mut EditorSession, rect: Rect, all: bool) -> Result<(), CliError> {
    let display = display(session);
    session.enter_crop(display, all)?;
    session.pointer_down(rect.origin(), PointerTarget::Canvas)?;
    session.pointer_move(Point::new(rect.x1, rect.y1), display);
    session.pointer_up();
    session.commit_crop(display)?;
    Ok(())
}

fn add_text(session: &mut EditorSession, args: &Args, content: &str, font: &Path) -> Result<(), CliError> {
    let rasterizer = GlyphRasterizer::from_bytes(read(font)?).map_err(|source| CliError::Render {
        path: font.to_path_buf(),
        source,
    })?;
    let display = display(session);
    session.enter_text(display)?;
    if let Some(editor) = session.text_editor_mut() {
        editor.content = content.to_string();
        editor.style.size = args.text_size;
        editor.style.color = args.text_color;
        editor.style.bold = args.bold;
        editor.style.shadow = args.shadow;
        if let Some(at) = args.text_at {
            editor.position = at;
        }
    }
    session.commit_text(display, &rasterizer)?;
    Ok(())
}

fn add_overlay(session: &mut EditorSession, path: &Path, opacity: f64) -> Result<(), CliError> {
    let token = session.begin_overlay();
    let image = decode(path)?;
    let display = display(session);
    session.complete_overlay(token, image, display)?;
    if let Some(editor) = session.overlay_editor_mut() {
        editor.set_opacity(opacity);
    }
    session.commit_overlay(display)?;
    Ok(())
}

/// Apply every requested edit and write the composite. Returns the path
/// written.
pub fn run(args: &Args) -> Result<PathBuf, CliError> {
    let config = load_config(args.config.as_deref())?;
    let mut session = EditorSession::new(config);

    for path in &args.inputs {
        let token = session.begin_import();
        let image = decode(path)?;
        session.complete_import(token, image, None)?;
    }

    if let Some(preset) = args.preset {
        session.apply_preset(preset)?;
    } else if let Some((width, height)) = args.size {
        session.resize_canvas(width, height)?;
    }
    if let Some(rect) = args.crop {
        crop(&mut session, rect, args.crop_canvas)?;
    }
    if let Some(degrees) = args.rotate {
        session.rotate_selected(degrees);
    }
    if let Some(flip) = args.flip {
        session.flip_selected(flip.into());
    }
    if let Some(opacity) = args.opacity {
        let id = session.document().layers.selected_id().ok_or(EditorError::InvalidSelection(None))?;
        session.set_opacity(id, opacity)?;
    }
    if let (Some(content), Some(font)) = (&args.text, &args.font) {
        add_text(&mut session, args, content, font)?;
    }
    if let Some(path) = &args.overlay {
        add_overlay(&mut session, path, args.overlay_opacity)?;
    }

    if args.history {
        println!("{}", history_json(&session));
    }

    let exported = match args.format {
        Some(format) => session.export_as(format)?,
        None => session.export()?,
    };
    std::fs::create_dir_all(&args.output).map_err(|source| CliError::Io {
        path: args.output.clone(),
        source,
    })?;
    let out = args.output.join(&exported.filename);
    std::fs::write(&out, &exported.bytes).map_err(|source| CliError::Io {
        path: out.clone(),
        source,
    })?;
    log::info!("Wrote {} ({} bytes)", out.display(), exported.bytes.len());
    Ok(out)
}

fn history_json(session: &EditorSession) -> String {
    let history = session.history();
    let entries: Vec<_> = history
        .entries()
        .map(|entry| {
            serde_json::json!({
                "action": entry.action,
                "icon": entry.icon.glyph(),
                "canvas": [entry.canvas_width, entry.canvas_height],
                "layers": entry.layers.len(),
            })
        })
        .collect();
    let value = serde_json::json!({
        "current": history.current_index(),
        "entries": entries,
    });
    serde_json::to_string_pretty(&value).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let session = {
            let mut session = EditorSession::default();
            session
                .import_image(Surface::filled(width, height, peniko::Color::from_rgba8(200, 40, 40, 255)), None)
                .unwrap();
            session
        };
        let path = dir.join(name);
        std::fs::write(&path, session.export().unwrap().bytes).unwrap();
        path
    }

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("strata").chain(args.iter().copied())).unwrap()
    }

    fn output_size(path: &Path) -> (u32, u32) {
        let surface = pollster::block_on(decode_image(std::fs::read(path).unwrap())).unwrap();
        (surface.width(), surface.height())
    }

    #[test]
    fn test_rotate_and_export() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_png(dir.path(), "in.png", 100, 50);
        let out_dir = dir.path().join("out");
        let args = parse(&[
            input.to_str().unwrap(),
            "--rotate",
            "90",
            "--size",
            "50x100",
            "-o",
            out_dir.to_str().unwrap(),
        ]);

        let out = run(&args).unwrap();
        assert_eq!(out.extension().unwrap(), "png");
        assert_eq!(output_size(&out), (50, 100));
    }

    #[test]
    fn test_crop_canvas() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_png(dir.path(), "in.png", 200, 200);
        let args = parse(&[
            input.to_str().unwrap(),
            "--crop",
            "20,20,100,60",
            "--crop-canvas",
            "--format",
            "jpeg",
            "-o",
            dir.path().to_str().unwrap(),
        ]);

        let out = run(&args).unwrap();
        assert_eq!(out.extension().unwrap(), "jpg");
        assert_eq!(output_size(&out), (100, 60));
    }

    #[test]
    fn test_overlay_adds_layer() {
        let dir = tempfile::tempdir().unwrap();
        let base = write_png(dir.path(), "base.png", 300, 200);
        let overlay = write_png(dir.path(), "logo.png", 40, 20);
        let args = parse(&[
            base.to_str().unwrap(),
            "--overlay",
            overlay.to_str().unwrap(),
            "--overlay-opacity",
            "0.5",
            "-o",
            dir.path().to_str().unwrap(),
        ]);
        let out = run(&args).unwrap();
        assert_eq!(output_size(&out), (300, 200));
    }

    #[test]
    fn test_missing_input_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.png");
        let args = parse(&[missing.to_str().unwrap()]);
        let err = run(&args).unwrap_err();
        assert!(matches!(err, CliError::Io { .. }));
        assert!(err.to_string().contains("nope.png"));
    }

    #[test]
    fn test_config_file_applied() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("strata.json");
        std::fs::write(&config, r#"{ "crop_min_size": 500 }"#).unwrap();
        let input = write_png(dir.path(), "in.png", 200, 200);
        let args = parse(&[
            input.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
            "--crop",
            "0,0,100,100",
        ]);
        let err = run(&args).unwrap_err();
        assert!(matches!(err, CliError::Editor(EditorError::DegenerateGeometry { .. })));
    }

    #[test]
    fn test_bad_config_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("strata.json");
        std::fs::write(&config, "{ not json").unwrap();
        let err = load_config(Some(&config)).unwrap_err();
        assert!(matches!(err, CliError::Editor(EditorError::Config(_))));
    }
}
