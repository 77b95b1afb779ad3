//! Per-frame camera and light uniforms shared by every render pipeline
//!
//! Bound at group 0 in both `mesh.wgsl` and `cloth.wgsl`.

use crate::{
    gfx::camera::camera_utils::CameraUniform,
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

/// Must match `GlobalUniform` in the shaders
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUBOContent {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
    light_direction: [f32; 4],
    light_color: [f32; 4],
}

/// Single directional light
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LightConfig {
    /// Direction the light travels in
    pub direction: [f32; 3],
    pub color: [f32; 3],
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            direction: [-0.4, -1.0, -0.6],
            color: [1.0, 1.0, 1.0],
        }
    }
}

pub type GlobalUBO = UniformBuffer<GlobalUBOContent>;

pub fn update_global_ubo(
    ubo: &mut GlobalUBO,
    queue: &wgpu::Queue,
    camera: CameraUniform,
    light: LightConfig,
) {
    let [dx, dy, dz] = light.direction;
    let [r, g, b] = light.color;
    ubo.update_content(
        queue,
        GlobalUBOContent {
            view_position: camera.view_position,
            view_proj: camera.view_proj,
            light_direction: [dx, dy, dz, 0.0],
            light_color: [r, g, b, 1.0],
        },
    );
}

pub struct GlobalBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: wgpu::BindGroup,
}

impl GlobalBindings {
    pub fn new(device: &wgpu::Device, ubo: &GlobalUBO) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform_sized::<GlobalUBOContent>())
            .create(device, "Globals Bind Group Layout");
        let bind_group = BindGroupBuilder::new(&bind_group_layout)
            .resource(ubo.binding_resource())
            .create(device, "Global Bind Group");

        GlobalBindings {
            bind_group_layout,
            bind_group,
        }
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}
