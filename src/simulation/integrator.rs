//! Compute pipeline for the per-frame cloth step
//!
//! Bind group 0 of `cloth_step.wgsl`:
//!
//! | binding | resource    | access     |
//! |---------|-------------|------------|
//! | 0       | uniforms    | uniform    |
//! | 1       | particles   | read_write |
//! | 2       | constraints | read       |
//! | 3       | triangles   | read       |

use super::buffers::{capture_gpu_errors, ClothBuffers};
use super::constraint::Constraint;
use super::context::ClothUniforms;
use super::error::ClothError;
use super::store::Particle;
use crate::wgpu_utils::{binding_types, BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc};

/// Invocations in the single workgroup each dispatch launches
pub const WORKGROUP_SIZE: u32 = 256;

pub struct ClothIntegrator {
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: BindGroupLayoutWithDesc,
}

impl ClothIntegrator {
    pub fn new(device: &wgpu::Device) -> Result<Self, ClothError> {
        capture_gpu_errors(device, "Creating cloth step pipeline", || {
            let bind_group_layout = BindGroupLayoutBuilder::new()
                .next_binding_compute(binding_types::uniform_sized::<ClothUniforms>())
                .next_binding_compute(binding_types::storage_array_sized::<Particle>(false))
                .next_binding_compute(binding_types::storage_array_sized::<Constraint>(true))
                .next_binding_compute(binding_types::storage_array_sized::<[u32; 4]>(true))
                .create(device, "Cloth Step Bind Group Layout");

            let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Cloth Step Shader"),
                source: wgpu::ShaderSource::Wgsl(include_str!("shaders/cloth_step.wgsl").into()),
            });

            let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Cloth Step Pipeline Layout"),
                bind_group_layouts: &[&bind_group_layout.layout],
                push_constant_ranges: &[],
            });

            let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some("Cloth Step Pipeline"),
                layout: Some(&pipeline_layout),
                module: &shader,
                entry_point: Some("main"),
                compilation_options: Default::default(),
                cache: None,
            });

            ClothIntegrator {
                pipeline,
                bind_group_layout,
            }
        })
    }

    /// Bind group over one cloth's buffers, created once per cloth
    pub fn bind(&self, device: &wgpu::Device, buffers: &ClothBuffers) -> wgpu::BindGroup {
        BindGroupBuilder::new(&self.bind_group_layout)
            .resource(buffers.uniforms().binding_resource())
            .resource(buffers.particles().binding_resource())
            .resource(buffers.constraints().binding_resource())
            .resource(buffers.triangles().binding_resource())
            .create(device, "Cloth Step Bind Group")
    }

    /// Records one step into `encoder`
    ///
    /// The render pass recorded after this in the same encoder sees the
    /// finished step; wgpu orders the storage writes before the vertex reads.
    pub fn dispatch(&self, encoder: &mut wgpu::CommandEncoder, bind_group: &wgpu::BindGroup) {
        let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Cloth Step Pass"),
            timestamp_writes: None,
        });
        compute_pass.set_pipeline(&self.pipeline);
        compute_pass.set_bind_group(0, bind_group, &[]);
        compute_pass.dispatch_workgroups(1, 1, 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHADER: &str = include_str!("shaders/cloth_step.wgsl");

    #[test]
    fn test_shader_workgroup_size_matches() {
        assert!(SHADER.contains(&format!("@workgroup_size({}, 1, 1)", WORKGROUP_SIZE)));
        assert!(SHADER.contains(&format!("const WORKGROUP_SIZE: u32 = {}u;", WORKGROUP_SIZE)));
    }

    #[test]
    fn test_workgroup_fits_downlevel_limits() {
        let limits = wgpu::Limits::downlevel_defaults();
        assert!(WORKGROUP_SIZE <= limits.max_compute_workgroup_size_x);
        assert!(WORKGROUP_SIZE <= limits.max_compute_invocations_per_workgroup);
    }
}
