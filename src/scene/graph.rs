use super::shape::Shape;
use super::types::{DVec2, ShapeStyle};
use crate::error::{CanvasError, Result};
use std::collections::HashMap;

/// Binary payload referenced by image shapes
#[derive(Clone, Debug, PartialEq)]
pub struct BinaryFile {
    pub id: String,
    pub mime_type: String,
    pub data_url: String,
    /// Milliseconds since the Unix epoch
    pub created: f64,
}

/// The document shape API the ghost lifecycle is written against.
///
/// Treated as an opaque ordered collection: read the current shapes, build the
/// next list, hand it back in one replace.
pub trait SceneApi {
    /// Current shapes in z-order (bottom first)
    fn shapes(&self) -> &[Shape];

    /// Replace the whole shape list
    fn update_scene(&mut self, shapes: Vec<Shape>);

    /// Register binary files referenced by image shapes
    fn add_files(&mut self, files: Vec<BinaryFile>);
}

/// Canvas document: ordered shapes plus the file table
#[derive(Clone, Debug, Default)]
pub struct SceneGraph {
    /// All shapes in the scene
    shapes: Vec<Shape>,
    /// Files keyed by id
    files: HashMap<String, BinaryFile>,
    /// Whether the scene needs re-rendering
    dirty: bool,
}

impl SceneGraph {
    /// Create a new empty scene graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a shape by ID
    pub fn get_shape(&self, id: &str) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id == id)
    }

    pub fn file(&self, id: &str) -> Option<&BinaryFile> {
        self.files.get(id)
    }

    /// Get number of shapes
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Check if scene is empty
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear the dirty flag after rendering
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    // === User edit path ===
    //
    // Everything below goes through the lock check. Locked placeholders can
    // only leave the scene via `update_scene`.

    fn unlocked_mut(&mut self, id: &str) -> Result<&mut Shape> {
        let shape = self
            .shapes
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| CanvasError::ShapeNotFound(id.to_string()))?;
        if shape.locked {
            return Err(CanvasError::ShapeLocked(id.to_string()));
        }
        Ok(shape)
    }

    /// Delete a shape on behalf of the user
    pub fn delete_shape(&mut self, id: &str) -> Result<Shape> {
        self.unlocked_mut(id)?;
        let pos = self
            .shapes
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| CanvasError::ShapeNotFound(id.to_string()))?;
        self.dirty = true;
        Ok(self.shapes.remove(pos))
    }

    /// Move a shape by a scene-space delta
    pub fn move_shape(&mut self, id: &str, delta: DVec2) -> Result<()> {
        let shape = self.unlocked_mut(id)?;
        shape.bounds = shape.bounds.translate(delta);
        shape.touch();
        self.dirty = true;
        Ok(())
    }

    /// Update a shape's style
    pub fn set_style(&mut self, id: &str, style: ShapeStyle) -> Result<()> {
        let shape = self.unlocked_mut(id)?;
        shape.style = style;
        shape.touch();
        self.dirty = true;
        Ok(())
    }

    /// Find shape at point (returns topmost shape)
    pub fn hit_test(&self, point: DVec2) -> Option<&Shape> {
        self.shapes.iter().rev().find(|s| s.contains_point(point))
    }
}

impl SceneApi for SceneGraph {
    fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    fn update_scene(&mut self, shapes: Vec<Shape>) {
        self.shapes = shapes;
        self.dirty = true;
    }

    fn add_files(&mut self, files: Vec<BinaryFile>) {
        for file in files {
            self.files.insert(file.id.clone(), file);
        }
        self.dirty = true;
    }
}
