//! Procedural geometry
//!
//! Used for the fallback cloth when no model file is available, and by tests.

pub mod primitives;

pub use primitives::*;

use crate::simulation::{ClothError, ClothMesh};

/// Generated triangle geometry
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    pub vertices: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    /// Counter-clockwise when viewed against the normals
    pub indices: Vec<u32>,
}

impl GeometryData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn into_cloth_mesh(self, name: &str) -> Result<ClothMesh, ClothError> {
        ClothMesh::new(name, self.vertices, self.normals, self.indices)
    }
}
