use std::path::Path;

use crate::gfx::camera::camera_utils::CameraManager;
use crate::simulation::{ClothError, ClothMesh};

use super::mesh::{calculate_vertex_normals, to_triples, Mesh};

#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("failed to load '{path}': {source}")]
    Load {
        path: String,
        #[source]
        source: tobj::LoadError,
    },

    #[error(transparent)]
    Cloth(#[from] ClothError),
}

/// Models whose name contains "cloth" (any case) are simulated
pub fn is_cloth_name(name: &str) -> bool {
    name.to_lowercase().contains("cloth")
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SceneStatistics {
    pub static_meshes: usize,
    pub cloth_meshes: usize,
    pub vertices: usize,
    pub triangles: usize,
}

/// Static meshes to draw, cloth meshes to simulate, and the camera looking at them
pub struct Scene {
    pub camera_manager: CameraManager,
    pub meshes: Vec<Mesh>,
    pub cloth_meshes: Vec<ClothMesh>,
}

impl Scene {
    pub fn new(camera_manager: CameraManager) -> Self {
        Self {
            camera_manager,
            meshes: Vec::new(),
            cloth_meshes: Vec::new(),
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.camera_manager.update(dt);
    }

    /// Loads every model of an OBJ file, sorting them into cloth and static meshes
    pub fn load_obj(&mut self, path: impl AsRef<Path>) -> Result<(), SceneError> {
        let path = path.as_ref();
        let (models, _materials) = tobj::load_obj(
            path,
            &tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ..Default::default()
            },
        )
        .map_err(|source| SceneError::Load {
            path: path.display().to_string(),
            source,
        })?;

        for model in models {
            let mesh = model.mesh;
            let positions = to_triples(&mesh.positions);
            let normals = if mesh.normals.len() == mesh.positions.len() {
                to_triples(&mesh.normals)
            } else {
                log::debug!("'{}' has no usable normals, computing them", model.name);
                calculate_vertex_normals(&positions, &mesh.indices)
            };

            if is_cloth_name(&model.name) {
                self.add_cloth(ClothMesh::new(model.name, positions, normals, mesh.indices)?);
            } else {
                self.meshes
                    .push(Mesh::new(model.name, &positions, &normals, mesh.indices));
            }
        }

        let stats = self.statistics();
        log::info!(
            "Loaded {}: {} static meshes, {} cloth meshes, {} vertices, {} triangles",
            path.display(),
            stats.static_meshes,
            stats.cloth_meshes,
            stats.vertices,
            stats.triangles
        );
        Ok(())
    }

    pub fn add_cloth(&mut self, mesh: ClothMesh) {
        self.cloth_meshes.push(mesh);
    }

    pub fn init_gpu_resources(&mut self, device: &wgpu::Device) {
        for mesh in &mut self.meshes {
            mesh.init_gpu_resources(device);
        }
    }

    pub fn statistics(&self) -> SceneStatistics {
        let static_vertices: usize = self.meshes.iter().map(|m| m.vertices.len()).sum();
        let static_triangles: usize = self.meshes.iter().map(|m| m.indices.len() / 3).sum();
        let cloth_vertices: usize = self.cloth_meshes.iter().map(|m| m.vertex_count()).sum();
        let cloth_triangles: usize = self.cloth_meshes.iter().map(|m| m.triangle_count()).sum();

        SceneStatistics {
            static_meshes: self.meshes.len(),
            cloth_meshes: self.cloth_meshes.len(),
            vertices: static_vertices + cloth_vertices,
            triangles: static_triangles + cloth_triangles,
        }
    }
}
