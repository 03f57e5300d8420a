//! Layer stack, document and compositor.

use crate::error::{EditorError, EditorResult};
use crate::layer::{Layer, LayerId, LayerKind};
use crate::surface::Surface;
use kurbo::Size;
use uuid::Uuid;

/// Ordered collection of layers, back to front (index 0 is the bottom).
#[derive(Debug, Clone, Default)]
pub struct LayerStack {
    layers: Vec<Layer>,
    selected: Option<LayerId>,
    /// Last assigned id.
    id_counter: LayerId,
}

impl LayerStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Layers in paint order.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut [Layer] {
        &mut self.layers
    }

    pub fn get(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id() == id)
    }

    pub fn get_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id() == id)
    }

    pub fn index_of(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id() == id)
    }

    pub fn selected_id(&self) -> Option<LayerId> {
        self.selected
    }

    pub fn selected(&self) -> Option<&Layer> {
        self.selected.and_then(|id| self.get(id))
    }

    pub fn selected_mut(&mut self) -> Option<&mut Layer> {
        let id = self.selected?;
        self.get_mut(id)
    }

    pub fn id_counter(&self) -> LayerId {
        self.id_counter
    }

    /// Reserve the next layer id.
    pub fn next_id(&mut self) -> LayerId {
        self.id_counter += 1;
        self.id_counter
    }

    /// Append a new layer on top and select it.
    pub fn add_layer(&mut self, name: impl Into<String>, kind: LayerKind, surface: Surface) -> LayerId {
        let id = self.next_id();
        self.push(Layer::with_surface(id, name, kind, surface));
        id
    }

    /// Append a prepared layer on top and select it.
    ///
    /// The layer's id should come from [`LayerStack::next_id`].
    pub fn push(&mut self, layer: Layer) {
        let id = layer.id();
        self.id_counter = self.id_counter.max(id);
        self.layers.push(layer);
        self.selected = Some(id);
    }

    /// Delete the selected layer and select the one below it.
    ///
    /// Rejected when it is the only layer left.
    pub fn delete_selected(&mut self) -> EditorResult<Layer> {
        if self.layers.len() <= 1 {
            return Err(EditorError::LastLayerDeletion);
        }
        let index = self
            .selected
            .and_then(|id| self.index_of(id))
            .ok_or(EditorError::InvalidSelection(self.selected))?;

        let removed = self.layers.remove(index);
        self.selected = Some(self.layers[index.saturating_sub(1)].id());
        Ok(removed)
    }

    /// Move a layer one step towards the top.
    /// Returns true if the layer was moved, false if already on top.
    pub fn move_up(&mut self, id: LayerId) -> bool {
        if let Some(pos) = self.index_of(id) {
            if pos + 1 < self.layers.len() {
                self.layers.swap(pos, pos + 1);
                return true;
            }
        }
        false
    }

    /// Move a layer one step towards the bottom.
    /// Returns true if the layer was moved, false if already at the bottom.
    pub fn move_down(&mut self, id: LayerId) -> bool {
        if let Some(pos) = self.index_of(id) {
            if pos > 0 {
                self.layers.swap(pos, pos - 1);
                return true;
            }
        }
        false
    }

    pub fn set_visibility(&mut self, id: LayerId, visible: bool) -> EditorResult<()> {
        let layer = self.get_mut(id).ok_or(EditorError::InvalidSelection(Some(id)))?;
        layer.visible = visible;
        Ok(())
    }

    pub fn select(&mut self, id: LayerId) -> EditorResult<()> {
        if self.get(id).is_none() {
            return Err(EditorError::InvalidSelection(Some(id)));
        }
        self.selected = Some(id);
        Ok(())
    }

    /// Replace the whole stack, e.g. when restoring a snapshot.
    ///
    /// The id counter never moves backwards, so ids stay unique across
    /// restores.
    pub fn replace(&mut self, layers: Vec<Layer>, selected: Option<LayerId>) {
        let max_id = layers.iter().map(Layer::id).max().unwrap_or(0);
        self.id_counter = self.id_counter.max(max_id);
        self.layers = layers;
        self.selected = selected;
    }

    /// Remove every layer and reset id assignment.
    pub fn clear(&mut self) {
        self.layers.clear();
        self.selected = None;
        self.id_counter = 0;
    }

    /// Flatten visible layers with area into a canvas-sized surface.
    pub fn composite(&self, width: u32, height: u32) -> Surface {
        let mut out = Surface::allocate(width, height);
        for layer in self.layers.iter().filter(|l| l.visible && l.has_area()) {
            layer.surface().draw_into(
                &mut out,
                layer.x as i64,
                layer.y as i64,
                layer.width(),
                layer.height(),
                layer.opacity(),
            );
        }
        out
    }
}

/// An editable document: layers plus canvas dimensions.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: Uuid,
    pub layers: LayerStack,
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Canvas size at first import; history clear returns to it.
    pub original_width: u32,
    pub original_height: u32,
}

impl Document {
    pub fn new(canvas_width: u32, canvas_height: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            layers: LayerStack::new(),
            canvas_width,
            canvas_height,
            original_width: canvas_width,
            original_height: canvas_height,
        }
    }

    pub fn canvas_size(&self) -> Size {
        Size::new(self.canvas_width as f64, self.canvas_height as f64)
    }

    pub fn composite(&self) -> Surface {
        self.layers.composite(self.canvas_width, self.canvas_height)
    }
}
