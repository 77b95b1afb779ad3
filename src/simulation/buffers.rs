//! GPU-resident mirror of a cloth store

use super::constraint::Constraint;
use super::context::ClothUniforms;
use super::error::ClothError;
use super::store::{ClothStore, Particle};
use crate::wgpu_utils::{ArrayBuffer, UniformBuffer};

/// Runs `create` inside validation and out-of-memory error scopes
///
/// The first captured error is returned as [`ClothError::Gpu`], prefixed with `label`.
pub fn capture_gpu_errors<T>(
    device: &wgpu::Device,
    label: &str,
    create: impl FnOnce() -> T,
) -> Result<T, ClothError> {
    device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = create();
    let validation = pollster::block_on(device.pop_error_scope());
    let out_of_memory = pollster::block_on(device.pop_error_scope());

    match validation.or(out_of_memory) {
        Some(error) => {
            log::error!("{}: {}", label, error);
            Err(ClothError::Gpu(format!("{}: {}", label, error)))
        }
        None => Ok(value),
    }
}

/// Particle, constraint, triangle, index and uniform buffers of one cloth
///
/// The particle buffer is written by the integration step and read as a
/// vertex buffer by the render pass; the rest never change after upload.
pub struct ClothBuffers {
    particles: ArrayBuffer<Particle>,
    constraints: ArrayBuffer<Constraint>,
    triangles: ArrayBuffer<[u32; 4]>,
    indices: ArrayBuffer<u32>,
    uniforms: UniformBuffer<ClothUniforms>,
}

impl ClothBuffers {
    pub fn new(device: &wgpu::Device, store: &ClothStore) -> Result<Self, ClothError> {
        let name = store.name();
        let triangles = store.triangles();
        // Storage bindings need at least one element even for a cloth without constraints
        let placeholder = [Constraint::new(0, 0, 0.0)];
        let constraints = if store.constraints().is_empty() {
            &placeholder[..]
        } else {
            store.constraints()
        };

        capture_gpu_errors(device, &format!("Creating buffers for cloth '{}'", name), || {
            ClothBuffers {
                particles: ArrayBuffer::new_with_data(
                    device,
                    store.particles(),
                    wgpu::BufferUsages::STORAGE
                        | wgpu::BufferUsages::VERTEX
                        | wgpu::BufferUsages::COPY_SRC,
                    &format!("{} particles", name),
                ),
                constraints: ArrayBuffer::new_with_data(
                    device,
                    constraints,
                    wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
                    &format!("{} constraints", name),
                ),
                triangles: ArrayBuffer::new_with_data(
                    device,
                    &triangles,
                    wgpu::BufferUsages::STORAGE,
                    &format!("{} triangles", name),
                ),
                indices: ArrayBuffer::new_with_data(
                    device,
                    store.indices(),
                    wgpu::BufferUsages::INDEX,
                    &format!("{} indices", name),
                ),
                uniforms: UniformBuffer::new(device),
            }
        })
    }

    /// Writes this frame's counts, force and parameters
    pub fn write_uniforms(&mut self, queue: &wgpu::Queue, uniforms: ClothUniforms) {
        self.uniforms.update_content(queue, uniforms);
    }

    /// Restores the initial particle snapshot
    pub fn reset(&self, queue: &wgpu::Queue, store: &ClothStore) {
        self.particles.update_data(queue, store.particles());
    }

    /// Copies the particle buffer back to the CPU and blocks until it is mapped
    pub fn read_particles(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> Result<Vec<Particle>, ClothError> {
        read_back(device, queue, &self.particles, "Particle Read-back Encoder")
    }

    /// Copies the constraint buffer back to the CPU
    ///
    /// A cloth without constraints reads back its single placeholder record.
    pub fn read_constraints(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> Result<Vec<Constraint>, ClothError> {
        read_back(device, queue, &self.constraints, "Constraint Read-back Encoder")
    }

    pub fn particles(&self) -> &ArrayBuffer<Particle> {
        &self.particles
    }

    pub fn constraints(&self) -> &ArrayBuffer<Constraint> {
        &self.constraints
    }

    pub fn triangles(&self) -> &ArrayBuffer<[u32; 4]> {
        &self.triangles
    }

    pub fn indices(&self) -> &ArrayBuffer<u32> {
        &self.indices
    }

    pub fn uniforms(&self) -> &UniformBuffer<ClothUniforms> {
        &self.uniforms
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }
}

fn read_back<T: bytemuck::Pod>(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    source: &ArrayBuffer<T>,
    label: &str,
) -> Result<Vec<T>, ClothError> {
    let staging = ArrayBuffer::<T>::new_staging(device, source.len());

    let mut encoder =
        device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some(label) });
    encoder.copy_buffer_to_buffer(source.buffer(), 0, staging.buffer(), 0, source.byte_size());
    queue.submit(std::iter::once(encoder.finish()));

    let slice = staging.buffer().slice(..);
    let (sender, receiver) = futures::channel::oneshot::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = sender.send(result);
    });
    device
        .poll(wgpu::PollType::Wait)
        .map_err(|e| ClothError::ReadBack(e.to_string()))?;

    pollster::block_on(receiver)
        .map_err(|_| ClothError::ReadBack("map callback was dropped".to_string()))?
        .map_err(|e| ClothError::ReadBack(e.to_string()))?;

    let contents = {
        let data = slice.get_mapped_range();
        bytemuck::cast_slice::<u8, T>(&data).to_vec()
    };
    staging.buffer().unmap();
    Ok(contents)
}
