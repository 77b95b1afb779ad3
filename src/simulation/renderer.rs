//! Render pass side of the cloth: pipeline description, material and draw call
//!
//! The particle buffer the integration step writes is bound directly as
//! vertex buffer 0; nothing is copied back to the CPU.

use bytemuck::{Pod, Zeroable};

use super::buffers::ClothBuffers;
use super::store::Particle;
use crate::gfx::rendering::PipelineConfig;
use crate::wgpu_utils::{
    binding_types, BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc,
    UniformBuffer,
};

pub const CLOTH_SHADER: &str = include_str!("shaders/cloth.wgsl");

/// Matches `ClothMaterial` in `cloth.wgsl`, padded to the struct's 16-byte alignment
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ClothMaterial {
    pub base_color: [f32; 4],
    pub show_normals: u32,
    _padding: [u32; 3],
}

impl Default for ClothMaterial {
    fn default() -> Self {
        Self {
            base_color: [0.75, 0.22, 0.2, 1.0],
            show_normals: 0,
            _padding: [0; 3],
        }
    }
}

const PARTICLE_ATTRIBUTES: [wgpu::VertexAttribute; 2] = [
    wgpu::VertexAttribute {
        offset: std::mem::offset_of!(Particle, position) as wgpu::BufferAddress,
        shader_location: 0,
        format: wgpu::VertexFormat::Float32x4,
    },
    wgpu::VertexAttribute {
        offset: std::mem::offset_of!(Particle, accumulated_normal) as wgpu::BufferAddress,
        shader_location: 1,
        format: wgpu::VertexFormat::Float32x4,
    },
];

/// The particle record read as a vertex: position at location 0, normal at location 1
pub fn particle_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Particle>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &PARTICLE_ATTRIBUTES,
    }
}

/// Shared material state for every cloth draw
pub struct ClothRenderer {
    material: ClothMaterial,
    material_buffer: UniformBuffer<ClothMaterial>,
    material_layout: BindGroupLayoutWithDesc,
    material_bind_group: wgpu::BindGroup,
}

impl ClothRenderer {
    pub fn new(device: &wgpu::Device) -> Self {
        let material = ClothMaterial::default();
        let material_buffer = UniformBuffer::new_with_data(device, &material);
        let material_layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::uniform_sized::<ClothMaterial>())
            .create(device, "Cloth Material Bind Group Layout");
        let material_bind_group = BindGroupBuilder::new(&material_layout)
            .resource(material_buffer.binding_resource())
            .create(device, "Cloth Material Bind Group");

        Self {
            material,
            material_buffer,
            material_layout,
            material_bind_group,
        }
    }

    /// Pipeline for the `cloth` shader: group 0 globals, group 1 material, no culling
    pub fn pipeline_config(
        &self,
        global_layout: &wgpu::BindGroupLayout,
        color_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
    ) -> PipelineConfig {
        PipelineConfig::default_with_shader("cloth")
            .with_label("Cloth Pipeline")
            .with_bind_group_layouts(vec![
                global_layout.clone(),
                self.material_layout.layout.clone(),
            ])
            .with_vertex_buffers(vec![particle_vertex_layout()])
            .with_cull_mode(None)
            .with_depth_format(depth_format)
            .with_color_format(color_format)
    }

    pub fn show_normals(&self) -> bool {
        self.material.show_normals != 0
    }

    pub fn set_show_normals(&mut self, queue: &wgpu::Queue, show: bool) {
        self.material.show_normals = show as u32;
        self.material_buffer.update_content(queue, self.material);
    }

    /// Binds the material and issues one indexed draw over the cloth's particles
    ///
    /// The caller sets the cloth pipeline and the global bind group first.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>, buffers: &ClothBuffers) {
        render_pass.set_bind_group(1, &self.material_bind_group, &[]);
        render_pass.set_vertex_buffer(0, buffers.particles().buffer().slice(..));
        render_pass.set_index_buffer(
            buffers.indices().buffer().slice(..),
            wgpu::IndexFormat::Uint32,
        );
        render_pass.draw_indexed(0..buffers.index_count(), 0, 0..1);
    }
}
