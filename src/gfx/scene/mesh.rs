//! Static (non-simulated) scene meshes

use cgmath::{InnerSpace, Vector3, Zero};
use wgpu::util::DeviceExt;

use super::vertex::Vertex3D;

/// Area-weighted vertex normals of an indexed triangle list, normalized
///
/// Vertices that touch no triangle get a zero normal.
pub fn calculate_vertex_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut normals = vec![Vector3::<f32>::zero(); positions.len()];

    for triangle in indices.chunks_exact(3) {
        let [i0, i1, i2] = [triangle[0], triangle[1], triangle[2]].map(|i| i as usize);
        let (v0, v1, v2) = (
            Vector3::from(positions[i0]),
            Vector3::from(positions[i1]),
            Vector3::from(positions[i2]),
        );
        // Unnormalized: length is twice the triangle area
        let face_normal = (v1 - v0).cross(v2 - v0);
        for index in [i0, i1, i2] {
            normals[index] += face_normal;
        }
    }

    normals
        .into_iter()
        .map(|normal| {
            if normal.magnitude2() > 0.0 {
                normal.normalize().into()
            } else {
                [0.0; 3]
            }
        })
        .collect()
}

/// Splits a flat `[x, y, z, x, y, z, ...]` array into triples
pub fn to_triples(flat: &[f32]) -> Vec<[f32; 3]> {
    flat.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect()
}

pub struct Mesh {
    pub name: String,
    pub vertices: Vec<Vertex3D>,
    pub indices: Vec<u32>,
    pub vertex_buffer: Option<wgpu::Buffer>,
    pub index_buffer: Option<wgpu::Buffer>,
}

impl Mesh {
    pub fn new(
        name: impl Into<String>,
        positions: &[[f32; 3]],
        normals: &[[f32; 3]],
        indices: Vec<u32>,
    ) -> Self {
        let vertices = positions
            .iter()
            .zip(normals)
            .map(|(&position, &normal)| Vertex3D { position, normal })
            .collect();

        Self {
            name: name.into(),
            vertices,
            indices,
            vertex_buffer: None,
            index_buffer: None,
        }
    }

    pub fn init_gpu_resources(&mut self, device: &wgpu::Device) {
        self.vertex_buffer = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", self.name)),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        }));
        self.index_buffer = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Index Buffer", self.name)),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        }));
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }
}

pub trait DrawMesh {
    fn draw_mesh(&mut self, mesh: &Mesh);
}

impl DrawMesh for wgpu::RenderPass<'_> {
    fn draw_mesh(&mut self, mesh: &Mesh) {
        let (Some(vertex_buffer), Some(index_buffer)) = (&mesh.vertex_buffer, &mesh.index_buffer)
        else {
            return; // not uploaded yet
        };
        self.set_vertex_buffer(0, vertex_buffer.slice(..));
        self.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.index_count(), 0, 0..1);
    }
}
