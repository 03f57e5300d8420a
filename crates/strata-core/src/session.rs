//! The editing session: document, history and the active editor.
//!
//! [`EditorSession`] is the single entry point a front end drives. Every
//! operation either commits fully (recording at most one history entry) or
//! leaves the session unchanged and returns an error.

use crate::config::EditorConfig;
use crate::editors::{
    Commit, CropEditor, CropTarget, MoveEditor, MoveOptions, OverlayEditor, PointerTarget, TextEditor,
};
use crate::error::{EditorError, EditorResult};
use crate::export::{CanvasPreset, ExportFormat, ExportedImage, export_filename};
use crate::handles::Handle;
use crate::history::{HistoryIcon, HistoryStore};
use crate::layer::{LayerId, LayerKind};
use crate::pending::{PendingSlot, PendingToken};
use crate::snap::{SnapEngine, SnapGuide};
use crate::stack::Document;
use crate::surface::{FlipDirection, Surface};
use crate::text::TextRasterizer;
use kurbo::{Point, Rect};
use peniko::Color;
use std::time::SystemTime;

/// Fill for a new blank layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BlankFill {
    Color(Color),
    Transparent,
}

impl BlankFill {
    pub const WHITE: BlankFill = BlankFill::Color(Color::WHITE);

    fn layer_name(&self) -> &'static str {
        match self {
            BlankFill::Color(_) => "Blank layer",
            BlankFill::Transparent => "Transparent layer",
        }
    }
}

/// The active interactive editor, if any.
#[derive(Debug, Clone, Default)]
pub enum EditMode {
    #[default]
    None,
    Crop(CropEditor),
    Move(MoveEditor),
    Text(TextEditor),
    Overlay(OverlayEditor),
}

impl EditMode {
    pub fn name(&self) -> &'static str {
        match self {
            EditMode::None => "none",
            EditMode::Crop(_) => "crop",
            EditMode::Move(_) => "move",
            EditMode::Text(_) => "text",
            EditMode::Overlay(_) => "overlay",
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, EditMode::None)
    }
}

/// Log a rejection and return it.
fn reject<T>(err: EditorError) -> EditorResult<T> {
    log::warn!("{}", err);
    Err(err)
}

/// An open editing session.
#[derive(Debug)]
pub struct EditorSession {
    config: EditorConfig,
    document: Document,
    history: HistoryStore,
    mode: EditMode,
    snap: SnapEngine,
    snap_enabled: bool,
    deform: bool,
    format: ExportFormat,
    pending_import: PendingSlot<Surface>,
    pending_overlay: PendingSlot<Surface>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EditorSession {
    pub fn new(config: EditorConfig) -> Self {
        let (width, height) = config.default_canvas;
        Self {
            document: Document::new(width, height),
            history: HistoryStore::new(config.max_history),
            mode: EditMode::None,
            snap: SnapEngine::new(config.snap_threshold),
            snap_enabled: config.snap_enabled,
            deform: config.deform,
            format: ExportFormat::default(),
            pending_import: PendingSlot::new(),
            pending_overlay: PendingSlot::new(),
            config,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn mode(&self) -> &EditMode {
        &self.mode
    }

    pub fn format(&self) -> ExportFormat {
        self.format
    }

    pub fn set_format(&mut self, format: ExportFormat) {
        self.format = format;
    }

    pub fn snap_enabled(&self) -> bool {
        self.snap_enabled
    }

    pub fn deform(&self) -> bool {
        self.deform
    }

    fn record(&mut self, commit: Commit) {
        self.history.record(commit.action, commit.icon, &self.document);
    }

    // --- Layers ---

    /// Add a decoded image as a new top layer.
    ///
    /// The first image imported into an empty document sets the canvas size
    /// and the original resolution.
    pub fn import_image(&mut self, image: Surface, name: Option<&str>) -> EditorResult<LayerId> {
        if image.is_empty() {
            return reject(EditorError::DegenerateGeometry {
                width: image.width() as f64,
                height: image.height() as f64,
                min: 1.0,
            });
        }
        let doc = &mut self.document;
        if doc.layers.is_empty() {
            doc.canvas_width = image.width();
            doc.canvas_height = image.height();
            doc.original_width = image.width();
            doc.original_height = image.height();
        }

        let name = match name {
            Some(name) => name.to_string(),
            None => format!("Image {}", doc.layers.len() + 1),
        };
        log::info!("Imported {} ({}x{})", name, image.width(), image.height());
        let id = doc.layers.add_layer(name, LayerKind::Image, image);
        self.record(Commit::new("Load image", HistoryIcon::Image));
        Ok(id)
    }

    /// Start an asynchronous import. A later call supersedes this one.
    pub fn begin_import(&mut self) -> PendingToken {
        self.pending_import.begin()
    }

    /// Finish an import started with [`EditorSession::begin_import`].
    ///
    /// Returns `Ok(None)` if the request was superseded.
    pub fn complete_import(&mut self, token: PendingToken, image: Surface, name: Option<&str>) -> EditorResult<Option<LayerId>> {
        if !self.pending_import.complete(token, image) {
            return Ok(None);
        }
        match self.pending_import.take() {
            Some(image) => self.import_image(image, name).map(Some),
            None => Ok(None),
        }
    }

    /// Add a canvas-sized layer, filled or transparent.
    pub fn add_blank_layer(&mut self, fill: BlankFill) -> LayerId {
        let (w, h) = (self.document.canvas_width, self.document.canvas_height);
        let surface = match fill {
            BlankFill::Color(color) => Surface::filled(w, h, color),
            BlankFill::Transparent => Surface::allocate(w, h),
        };
        let name = fill.layer_name();
        let id = self.document.layers.add_layer(name, LayerKind::Image, surface);
        self.record(Commit::new(format!("Create {}", name), HistoryIcon::Layer));
        id
    }

    pub fn delete_selected(&mut self) -> EditorResult<()> {
        match self.document.layers.delete_selected() {
            Ok(removed) => {
                log::debug!("Deleted layer {}", removed.id());
                self.exit_edit_mode();
                self.record(Commit::new("Delete layer", HistoryIcon::Delete));
                Ok(())
            }
            Err(err) => reject(err),
        }
    }

    /// Move a layer towards the top. Not recorded in history.
    pub fn move_layer_up(&mut self, id: LayerId) -> bool {
        self.document.layers.move_up(id)
    }

    /// Move a layer towards the bottom. Not recorded in history.
    pub fn move_layer_down(&mut self, id: LayerId) -> bool {
        self.document.layers.move_down(id)
    }

    /// Not recorded in history.
    pub fn set_visibility(&mut self, id: LayerId, visible: bool) -> EditorResult<()> {
        self.document.layers.set_visibility(id, visible).or_else(reject)
    }

    /// Flip visibility and return the new value. Not recorded in history.
    pub fn toggle_visibility(&mut self, id: LayerId) -> EditorResult<bool> {
        let Some(layer) = self.document.layers.get_mut(id) else {
            return reject(EditorError::InvalidSelection(Some(id)));
        };
        layer.visible = !layer.visible;
        Ok(layer.visible)
    }

    /// Not recorded in history. A move or single-layer crop bound to
    /// another layer is closed, reverting any gesture in progress.
    pub fn select(&mut self, id: LayerId) -> EditorResult<()> {
        if self.document.layers.get(id).is_none() {
            return reject(EditorError::InvalidSelection(Some(id)));
        }
        let bound = match &self.mode {
            EditMode::Move(editor) => Some(editor.layer),
            EditMode::Crop(editor) => match editor.target {
                CropTarget::Layer(layer) => Some(layer),
                CropTarget::Canvas => None,
            },
            _ => None,
        };
        if bound.is_some_and(|layer| layer != id) {
            self.exit_edit_mode();
        }
        self.document.layers.select(id).or_else(reject)
    }

    /// Set a layer's opacity (clamped to [0, 1]).
    pub fn set_opacity(&mut self, id: LayerId, opacity: f64) -> EditorResult<()> {
        let Some(layer) = self.document.layers.get_mut(id) else {
            return reject(EditorError::InvalidSelection(Some(id)));
        };
        layer.set_opacity(opacity);
        let percent = (layer.opacity() * 100.0).round();
        self.record(Commit::new(format!("Opacity {}%", percent), HistoryIcon::Opacity));
        Ok(())
    }

    // --- Canvas ---

    /// Change the canvas size. Layers are untouched.
    pub fn resize_canvas(&mut self, width: u32, height: u32) -> EditorResult<()> {
        if width == 0 || height == 0 {
            return reject(EditorError::DegenerateGeometry {
                width: width as f64,
                height: height as f64,
                min: 1.0,
            });
        }
        self.document.canvas_width = width;
        self.document.canvas_height = height;
        self.record(Commit::new(format!("Resolution {}×{}", width, height), HistoryIcon::Resolution));
        Ok(())
    }

    pub fn apply_preset(&mut self, preset: CanvasPreset) -> EditorResult<()> {
        let (width, height) = preset.size();
        self.resize_canvas(width, height)
    }

    /// Flatten the document at canvas size.
    pub fn composite(&self) -> Surface {
        self.document.composite()
    }

    /// Export the composited canvas in the current format.
    pub fn export(&self) -> EditorResult<ExportedImage> {
        self.export_as(self.format)
    }

    pub fn export_as(&self, format: ExportFormat) -> EditorResult<ExportedImage> {
        if self.document.layers.is_empty() {
            return reject(EditorError::EmptyDocument);
        }
        let bytes = self.composite().encode(format)?;
        let filename = export_filename(format, SystemTime::now());
        log::info!("Exported {} ({} bytes, {})", filename, bytes.len(), format.mime_type());
        Ok(ExportedImage { filename, format, bytes })
    }

    // --- History ---

    /// Step back one history entry. Returns false if there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        self.exit_edit_mode();
        self.history.undo(&mut self.document)
    }

    /// Step forward one history entry. Returns false if there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        self.exit_edit_mode();
        self.history.redo(&mut self.document)
    }

    /// Jump to a history entry, discarding everything after it. Out-of-range
    /// indices are ignored.
    pub fn restore(&mut self, index: usize) -> bool {
        if index >= self.history.len() {
            return false;
        }
        self.exit_edit_mode();
        self.history.restore(index, &mut self.document)
    }

    /// Collapse history to one entry of the current layers, with the canvas
    /// back at its original size. Does nothing with fewer than two entries.
    pub fn clear_history(&mut self) -> bool {
        if self.history.len() <= 1 {
            return false;
        }
        self.exit_edit_mode();
        self.history.clear("History cleared", &mut self.document)
    }

    /// Drop everything and start over with an empty document.
    pub fn reset(&mut self) {
        let (width, height) = self.config.default_canvas;
        self.mode = EditMode::None;
        self.document = Document::new(width, height);
        self.history.reset();
        self.pending_import.cancel();
        self.pending_overlay.cancel();
        log::info!("Editor reset");
    }

    // --- Edit modes ---

    /// Start cropping the selected layer, or the whole canvas if `all`.
    pub fn enter_crop(&mut self, display: Rect, all: bool) -> EditorResult<()> {
        let target = if all {
            if self.document.layers.is_empty() {
                return reject(EditorError::EmptyDocument);
            }
            CropTarget::Canvas
        } else {
            match self.document.layers.selected() {
                Some(layer) => CropTarget::Layer(layer.id()),
                None => return reject(EditorError::InvalidSelection(self.document.layers.selected_id())),
            }
        };
        let editor = CropEditor::new(target, display, &self.document, &self.config).or_else(reject)?;
        self.switch_mode(EditMode::Crop(editor));
        Ok(())
    }

    /// Start moving/resizing the selected layer.
    pub fn enter_move(&mut self) -> EditorResult<()> {
        let selected = self.document.layers.selected_id();
        let Some(id) = selected else {
            return reject(EditorError::InvalidSelection(None));
        };
        let editor = MoveEditor::new(id, &self.document).or_else(reject)?;
        self.switch_mode(EditMode::Move(editor));
        Ok(())
    }

    pub fn enter_text(&mut self, display: Rect) -> EditorResult<()> {
        if self.document.layers.is_empty() {
            return reject(EditorError::EmptyDocument);
        }
        self.switch_mode(EditMode::Text(TextEditor::new(display)));
        Ok(())
    }

    pub fn enter_overlay(&mut self, image: Surface, display: Rect) -> EditorResult<()> {
        if self.document.layers.is_empty() {
            return reject(EditorError::EmptyDocument);
        }
        let editor = OverlayEditor::new(image, display).or_else(reject)?;
        self.switch_mode(EditMode::Overlay(editor));
        Ok(())
    }

    /// Start decoding an overlay image. A later call supersedes this one.
    pub fn begin_overlay(&mut self) -> PendingToken {
        self.pending_overlay.begin()
    }

    /// Finish an overlay decode and enter overlay mode with it.
    ///
    /// Returns `Ok(false)` if the request was superseded.
    pub fn complete_overlay(&mut self, token: PendingToken, image: Surface, display: Rect) -> EditorResult<bool> {
        if !self.pending_overlay.complete(token, image) {
            return Ok(false);
        }
        match self.pending_overlay.take() {
            Some(image) => self.enter_overlay(image, display).map(|_| true),
            None => Ok(false),
        }
    }

    fn switch_mode(&mut self, mode: EditMode) {
        self.exit_edit_mode();
        log::debug!("Entering {} mode", mode.name());
        self.mode = mode;
    }

    /// Leave the current edit mode without committing. A move or resize in
    /// progress is reverted.
    pub fn exit_edit_mode(&mut self) {
        if let EditMode::Move(editor) = &mut self.mode {
            editor.cancel(&mut self.document);
        }
        self.mode = EditMode::None;
    }

    pub fn text_editor_mut(&mut self) -> Option<&mut TextEditor> {
        match &mut self.mode {
            EditMode::Text(editor) => Some(editor),
            _ => None,
        }
    }

    pub fn overlay_editor_mut(&mut self) -> Option<&mut OverlayEditor> {
        match &mut self.mode {
            EditMode::Overlay(editor) => Some(editor),
            _ => None,
        }
    }

    /// Work out what a pointer at `point` would grab in the active editor.
    pub fn hit_test(&self, point: Point, display: Rect) -> PointerTarget {
        let (rect, handles): (Rect, &[Handle]) = match &self.mode {
            EditMode::None => return PointerTarget::Canvas,
            EditMode::Crop(editor) => (editor.rect, &Handle::CORNERS),
            EditMode::Move(editor) => match editor.bounds(display, &self.document) {
                Some(rect) => (rect, &Handle::ALL),
                None => return PointerTarget::Canvas,
            },
            EditMode::Overlay(editor) => (editor.rect, &[Handle::SE]),
            // The text box has no fixed extent before rasterizing.
            EditMode::Text(_) => return PointerTarget::Body,
        };
        if let Some(handle) = Handle::hit_test(rect, point, handles) {
            PointerTarget::Handle(handle)
        } else if rect.contains(point) {
            PointerTarget::Body
        } else {
            PointerTarget::Canvas
        }
    }

    pub fn pointer_down(&mut self, point: Point, target: PointerTarget) -> EditorResult<()> {
        match &mut self.mode {
            EditMode::None => Err(EditorError::NoActiveEdit),
            EditMode::Crop(editor) => {
                editor.pointer_down(point, target);
                Ok(())
            }
            EditMode::Move(editor) => editor.pointer_down(point, target, &self.document).or_else(reject),
            EditMode::Text(editor) => {
                editor.pointer_down(point, target);
                Ok(())
            }
            EditMode::Overlay(editor) => {
                editor.pointer_down(point, target);
                Ok(())
            }
        }
    }

    pub fn pointer_move(&mut self, point: Point, display: Rect) {
        match &mut self.mode {
            EditMode::None => {}
            EditMode::Crop(editor) => editor.pointer_move(point, display),
            EditMode::Move(editor) => {
                let options = MoveOptions {
                    snap: self.snap_enabled.then_some(&self.snap),
                    deform: self.deform,
                    min_size: self.config.resize_min,
                };
                editor.pointer_move(point, display, &mut self.document, options);
            }
            EditMode::Text(editor) => editor.pointer_move(point, display),
            EditMode::Overlay(editor) => editor.pointer_move(point, display),
        }
    }

    /// End the current gesture. A finished move or resize is recorded;
    /// returns true if a history entry was added.
    pub fn pointer_up(&mut self) -> bool {
        let commit = match &mut self.mode {
            EditMode::None => None,
            EditMode::Crop(editor) => {
                editor.pointer_up();
                None
            }
            EditMode::Move(editor) => editor.pointer_up(),
            EditMode::Text(editor) => {
                editor.pointer_up();
                None
            }
            EditMode::Overlay(editor) => {
                editor.pointer_up();
                None
            }
        };
        match commit {
            Some(commit) => {
                self.record(commit);
                true
            }
            None => false,
        }
    }

    /// Guides for the drag in progress.
    pub fn snap_guides(&self) -> &[SnapGuide] {
        match &self.mode {
            EditMode::Move(editor) => editor.guides(),
            _ => &[],
        }
    }

    /// Apply the crop box. On failure the session stays in crop mode.
    pub fn commit_crop(&mut self, display: Rect) -> EditorResult<()> {
        let EditMode::Crop(editor) = &self.mode else {
            return reject(EditorError::NoActiveEdit);
        };
        let commit = editor.commit(&mut self.document, display).or_else(reject)?;
        self.mode = EditMode::None;
        self.record(commit);
        Ok(())
    }

    /// Rasterize the text box into a new layer.
    pub fn commit_text(&mut self, display: Rect, rasterizer: &dyn TextRasterizer) -> EditorResult<LayerId> {
        let EditMode::Text(editor) = &self.mode else {
            return reject(EditorError::NoActiveEdit);
        };
        let commit = editor
            .commit(&mut self.document, display, rasterizer, self.config.text_padding)
            .or_else(reject)?;
        self.mode = EditMode::None;
        self.record(commit);
        self.document.layers.selected_id().ok_or(EditorError::InvalidSelection(None))
    }

    /// Insert the overlay image as a new layer.
    pub fn commit_overlay(&mut self, display: Rect) -> EditorResult<LayerId> {
        let EditMode::Overlay(editor) = &self.mode else {
            return reject(EditorError::NoActiveEdit);
        };
        let commit = editor.commit(&mut self.document, display).or_else(reject)?;
        self.mode = EditMode::None;
        self.record(commit);
        self.document.layers.selected_id().ok_or(EditorError::InvalidSelection(None))
    }

    // --- Transforms ---

    /// Rotate the selected layer clockwise. No-op without a selection.
    pub fn rotate_selected(&mut self, degrees: f64) -> bool {
        if !degrees.is_finite() {
            log::warn!("Ignoring rotation by {}", degrees);
            return false;
        }
        let Some(layer) = self.document.layers.selected_mut() else {
            return false;
        };
        layer.rotate(degrees);
        self.record(Commit::new(format!("Rotate {}°", degrees), HistoryIcon::Rotate));
        true
    }

    /// Mirror the selected layer. No-op without a selection.
    pub fn flip_selected(&mut self, direction: FlipDirection) -> bool {
        let Some(layer) = self.document.layers.selected_mut() else {
            return false;
        };
        layer.flip(direction);
        let label = match direction {
            FlipDirection::Horizontal => "Flip horizontal",
            FlipDirection::Vertical => "Flip vertical",
        };
        self.record(Commit::new(label, HistoryIcon::Flip));
        true
    }

    // --- View options ---

    pub fn toggle_snap(&mut self) -> bool {
        self.snap_enabled = !self.snap_enabled;
        self.snap_enabled
    }

    pub fn toggle_deform(&mut self) -> bool {
        self.deform = !self.deform;
        self.deform
    }

    pub fn cycle_format(&mut self) -> ExportFormat {
        self.format = self.format.next();
        self.format
    }
}
