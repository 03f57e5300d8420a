//! Linear undo/redo history of full document snapshots.
//!
//! Each snapshot holds a copy of every layer. Layer surfaces are reference
//! counted, so a snapshot only owns new pixels for layers that changed since
//! the previous one.

use crate::layer::{Layer, LayerId};
use crate::stack::Document;
use std::collections::VecDeque;
use std::time::SystemTime;

/// Category of a history entry, used for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryIcon {
    Image,
    Layer,
    Delete,
    Resolution,
    Opacity,
    Clear,
    Move,
    Crop,
    CropAll,
    Text,
    Overlay,
    Rotate,
    Flip,
}

impl HistoryIcon {
    /// Glyph shown next to the entry label.
    pub fn glyph(&self) -> &'static str {
        match self {
            HistoryIcon::Image => "🖼️",
            HistoryIcon::Layer => "📄",
            HistoryIcon::Delete => "🗑️",
            HistoryIcon::Resolution => "📐",
            HistoryIcon::Opacity => "🌓",
            HistoryIcon::Clear => "🧹",
            HistoryIcon::Move => "✋",
            HistoryIcon::Crop => "✂️",
            HistoryIcon::CropAll => "🔲",
            HistoryIcon::Text => "📝",
            HistoryIcon::Overlay => "🎴",
            HistoryIcon::Rotate => "🔄",
            HistoryIcon::Flip => "↔️",
        }
    }
}

/// Immutable copy of the document at one point in time.
#[derive(Debug, Clone)]
pub struct HistorySnapshot {
    pub action: String,
    pub icon: HistoryIcon,
    pub timestamp: SystemTime,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub selected: Option<LayerId>,
    pub layers: Vec<Layer>,
}

impl HistorySnapshot {
    fn capture(action: impl Into<String>, icon: HistoryIcon, doc: &Document) -> Self {
        Self {
            action: action.into(),
            icon,
            timestamp: SystemTime::now(),
            canvas_width: doc.canvas_width,
            canvas_height: doc.canvas_height,
            selected: doc.layers.selected_id(),
            layers: doc.layers.layers().to_vec(),
        }
    }

    fn apply(&self, doc: &mut Document) {
        doc.canvas_width = self.canvas_width;
        doc.canvas_height = self.canvas_height;
        doc.layers.replace(self.layers.clone(), self.selected);
    }
}

/// Bounded linear history with a movable "present".
#[derive(Debug, Clone)]
pub struct HistoryStore {
    entries: VecDeque<HistorySnapshot>,
    current: Option<usize>,
    capacity: usize,
}

impl HistoryStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            current: None,
            capacity: capacity.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn get(&self, index: usize) -> Option<&HistorySnapshot> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistorySnapshot> {
        self.entries.iter()
    }

    /// Whether the entry at `index` lies in the undone future.
    pub fn is_undone(&self, index: usize) -> bool {
        self.current.is_some_and(|current| index > current)
    }

    pub fn can_undo(&self) -> bool {
        self.current.is_some_and(|current| current > 0)
    }

    pub fn can_redo(&self) -> bool {
        self.current.is_some_and(|current| current + 1 < self.entries.len())
    }

    /// Record the current document state as a new entry.
    ///
    /// Any undone future is discarded first. When over capacity the oldest
    /// entry is evicted.
    pub fn record(&mut self, action: impl Into<String>, icon: HistoryIcon, doc: &Document) {
        let keep = self.current.map_or(0, |current| current + 1);
        self.entries.truncate(keep);

        let snapshot = HistorySnapshot::capture(action, icon, doc);
        log::debug!("History: {} ({} layers)", snapshot.action, snapshot.layers.len());
        self.entries.push_back(snapshot);

        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.current = Some(self.entries.len() - 1);
    }

    /// Jump to `index`, discarding every entry after it.
    ///
    /// Returns false (and changes nothing) if `index` is out of range.
    pub fn restore(&mut self, index: usize, doc: &mut Document) -> bool {
        if !self.seek(index, doc) {
            return false;
        }
        self.entries.truncate(index + 1);
        log::info!("Restored history entry {}", index);
        true
    }

    /// Move the present to `index` without discarding the future.
    pub fn seek(&mut self, index: usize, doc: &mut Document) -> bool {
        let Some(snapshot) = self.entries.get(index) else {
            return false;
        };
        snapshot.apply(doc);
        self.current = Some(index);
        true
    }

    /// Step back one entry. Returns false if there is nothing to undo.
    pub fn undo(&mut self, doc: &mut Document) -> bool {
        match self.current {
            Some(current) if current > 0 => self.seek(current - 1, doc),
            _ => false,
        }
    }

    /// Step forward one entry. Returns false if there is nothing to redo.
    pub fn redo(&mut self, doc: &mut Document) -> bool {
        match self.current {
            Some(current) => self.seek(current + 1, doc),
            None => false,
        }
    }

    /// Drop all entries and start over from the current layers with the
    /// canvas back at its original size. Returns false, changing nothing,
    /// when there is at most one entry.
    pub fn clear(&mut self, label: &str, doc: &mut Document) -> bool {
        if self.entries.len() <= 1 {
            return false;
        }
        doc.canvas_width = doc.original_width;
        doc.canvas_height = doc.original_height;
        self.entries.clear();
        self.current = None;
        self.record(label, HistoryIcon::Clear, doc);
        log::info!("History cleared");
        true
    }

    /// Drop all entries without recording anything.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.current = None;
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_MAX_HISTORY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::LayerKind;
    use crate::surface::Surface;

    fn doc_with_layer() -> Document {
        let mut doc = Document::new(100, 100);
        doc.layers.add_layer("Base", LayerKind::Image, Surface::allocate(10, 10));
        doc
    }

    #[test]
    fn test_record_sets_current() {
        let doc = doc_with_layer();
        let mut history = HistoryStore::new(30);
        history.record("Load image", HistoryIcon::Image, &doc);
        history.record("Move layer", HistoryIcon::Move, &doc);
        assert_eq!(history.len(), 2);
        assert_eq!(history.current_index(), Some(1));
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_record_truncates_future() {
        let mut doc = doc_with_layer();
        let mut history = HistoryStore::new(30);
        for i in 0..5 {
            history.record(format!("Action {i}"), HistoryIcon::Move, &doc);
        }
        assert!(history.seek(1, &mut doc));
        history.record("New", HistoryIcon::Move, &doc);
        // old current index + 2
        assert_eq!(history.len(), 3);
        assert_eq!(history.get(2).unwrap().action, "New");
    }

    #[test]
    fn test_capacity_eviction() {
        let doc = doc_with_layer();
        let mut history = HistoryStore::new(3);
        for i in 0..5 {
            history.record(format!("Action {i}"), HistoryIcon::Move, &doc);
        }
        let labels: Vec<&str> = history.entries().map(|e| e.action.as_str()).collect();
        assert_eq!(labels, vec!["Action 2", "Action 3", "Action 4"]);
        assert_eq!(history.current_index(), Some(2));
    }

    #[test]
    fn test_restore_out_of_range_is_ignored() {
        let mut doc = doc_with_layer();
        let mut history = HistoryStore::new(30);
        history.record("Load image", HistoryIcon::Image, &doc);
        assert!(!history.restore(4, &mut doc));
        assert_eq!(history.len(), 1);
        assert_eq!(history.current_index(), Some(0));
    }

    #[test]
    fn test_restore_truncates_and_applies() {
        let mut doc = doc_with_layer();
        let mut history = HistoryStore::new(30);
        history.record("Load image", HistoryIcon::Image, &doc);
        doc.canvas_width = 450;
        doc.layers.add_layer("Second", LayerKind::Image, Surface::allocate(5, 5));
        history.record("Resolution", HistoryIcon::Resolution, &doc);

        assert!(history.restore(0, &mut doc));
        assert_eq!(history.len(), 1);
        assert_eq!(doc.canvas_width, 100);
        assert_eq!(doc.layers.len(), 1);
        // id counter stays ahead of the discarded layer
        assert_eq!(doc.layers.next_id(), 3);
    }

    #[test]
    fn test_undo_redo_keep_future() {
        let mut doc = doc_with_layer();
        let mut history = HistoryStore::new(30);
        history.record("Load image", HistoryIcon::Image, &doc);
        doc.layers.selected_mut().unwrap().x = 42;
        history.record("Move layer", HistoryIcon::Move, &doc);

        assert!(history.undo(&mut doc));
        assert_eq!(doc.layers.selected().unwrap().x, 0);
        assert!(history.is_undone(1));
        assert!(history.redo(&mut doc));
        assert_eq!(doc.layers.selected().unwrap().x, 42);
        assert!(!history.redo(&mut doc));
    }

    #[test]
    fn test_snapshots_share_untouched_pixels() {
        let mut doc = doc_with_layer();
        let mut history = HistoryStore::new(30);
        history.record("Load image", HistoryIcon::Image, &doc);
        doc.layers.selected_mut().unwrap().x = 5;
        history.record("Move layer", HistoryIcon::Move, &doc);

        let a = &history.get(0).unwrap().layers[0];
        let b = &history.get(1).unwrap().layers[0];
        assert!(a.surface().shares_pixels(b.surface()));
    }

    #[test]
    fn test_clear_resets_canvas() {
        let mut doc = doc_with_layer();
        let mut history = HistoryStore::new(30);
        history.record("Load image", HistoryIcon::Image, &doc);
        doc.canvas_width = 1600;
        doc.canvas_height = 500;
        history.record("Resolution", HistoryIcon::Resolution, &doc);

        assert!(history.clear("History cleared", &mut doc));
        assert_eq!(history.len(), 1);
        assert_eq!((doc.canvas_width, doc.canvas_height), (100, 100));
        assert_eq!(history.get(0).unwrap().canvas_width, 100);
    }

    #[test]
    fn test_clear_ignored_with_single_entry() {
        let mut doc = doc_with_layer();
        let mut history = HistoryStore::new(30);
        assert!(!history.clear("History cleared", &mut doc));
        assert!(history.is_empty());

        history.record("Load image", HistoryIcon::Image, &doc);
        doc.canvas_width = 640;
        assert!(!history.clear("History cleared", &mut doc));
        assert_eq!(history.get(0).unwrap().action, "Load image");
        assert_eq!(doc.canvas_width, 640);
    }
}
