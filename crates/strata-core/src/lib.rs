//! Strata Core Library
//!
//! Layer model, compositor, snapshot history and the interactive geometry
//! editors (crop, move/resize, text, overlay) of the Strata raster editor.
//! Font rasterization and image decoding are supplied by the caller.

pub mod config;
pub mod editors;
pub mod error;
pub mod export;
pub mod handles;
pub mod history;
pub mod layer;
pub mod mapper;
pub mod pending;
pub mod session;
pub mod snap;
pub mod stack;
pub mod surface;
pub mod text;

pub use config::EditorConfig;
pub use editors::{Commit, CropEditor, CropTarget, MoveEditor, OverlayEditor, PointerTarget, TextEditor};
pub use error::{EditorError, EditorResult};
pub use export::{CanvasPreset, ExportFormat, ExportedImage};
pub use handles::Handle;
pub use history::{HistoryIcon, HistorySnapshot, HistoryStore};
pub use layer::{Layer, LayerId, LayerKind, TextData};
pub use mapper::CoordinateMapper;
pub use pending::{PendingSlot, PendingToken};
pub use session::{BlankFill, EditMode, EditorSession};
pub use snap::{GuideAxis, SnapEngine, SnapGuide, SnapResult};
pub use stack::{Document, LayerStack};
pub use surface::{FlipDirection, Surface};
pub use text::{TextRasterizer, TextStyle};
