//! Frame-loop owned simulation state shared by every cloth

use bytemuck::{Pod, Zeroable};
use cgmath::{Vector3, Zero};

use super::config::Axis;
use super::store::ClothStore;

/// Tunable integration parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationParams {
    /// Seconds advanced per frame
    pub time_step: f32,
    /// Fraction of the previous frame's displacement carried over
    pub damping: f32,
    pub gravity: [f32; 3],
    /// Constraint sweeps per frame
    pub relaxation_passes: u32,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            time_step: 1.0 / 60.0,
            damping: 0.99,
            gravity: [0.0, -0.98, 0.0],
            relaxation_passes: 1,
        }
    }
}

impl SimulationParams {
    pub fn with_time_step(mut self, time_step: f32) -> Self {
        self.time_step = time_step;
        self
    }

    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping;
        self
    }

    pub fn with_gravity(mut self, gravity: [f32; 3]) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_relaxation_passes(mut self, passes: u32) -> Self {
        self.relaxation_passes = passes;
        self
    }
}

/// Per-dispatch uniform block, laid out to match `ClothUniforms` in WGSL
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct ClothUniforms {
    pub particle_count: u32,
    pub triangle_count: u32,
    pub constraint_count: u32,
    pub relaxation_passes: u32,
    pub force: [f32; 3],
    pub time_step: f32,
    pub gravity: [f32; 3],
    pub damping: f32,
}

/// External force and parameters applied to every cloth each frame
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationContext {
    pub force: Vector3<f32>,
    pub params: SimulationParams,
}

impl Default for SimulationContext {
    fn default() -> Self {
        Self::new(SimulationParams::default())
    }
}

impl SimulationContext {
    pub fn new(params: SimulationParams) -> Self {
        Self {
            force: Vector3::zero(),
            params,
        }
    }

    pub fn nudge_force(&mut self, axis: Axis, delta: f32) {
        self.force[axis.index()] += delta;
        log::debug!("Force is now {:?}", self.force);
    }

    pub fn reset_force(&mut self) {
        self.force = Vector3::zero();
    }

    pub fn uniforms(&self, store: &ClothStore) -> ClothUniforms {
        ClothUniforms {
            particle_count: store.particles().len() as u32,
            triangle_count: store.triangle_count() as u32,
            constraint_count: store.constraints().len() as u32,
            relaxation_passes: self.params.relaxation_passes,
            force: self.force.into(),
            time_step: self.params.time_step,
            gravity: self.params.gravity,
            damping: self.params.damping,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::config::ClothConfig;
    use crate::simulation::store::ClothMesh;
    use std::mem::{offset_of, size_of};

    #[test]
    fn test_uniform_layout_matches_wgsl() {
        assert_eq!(size_of::<ClothUniforms>(), 48);
        assert_eq!(offset_of!(ClothUniforms, force), 16);
        assert_eq!(offset_of!(ClothUniforms, time_step), 28);
        assert_eq!(offset_of!(ClothUniforms, gravity), 32);
        assert_eq!(offset_of!(ClothUniforms, damping), 44);
    }

    #[test]
    fn test_nudge_and_reset_force() {
        let mut ctx = SimulationContext::default();
        ctx.nudge_force(Axis::Y, 0.1);
        ctx.nudge_force(Axis::Y, 0.1);
        ctx.nudge_force(Axis::X, -0.1);
        assert!((ctx.force.y - 0.2).abs() < 1e-6);
        assert!((ctx.force.x + 0.1).abs() < 1e-6);
        assert_eq!(ctx.force.z, 0.0);

        ctx.reset_force();
        assert_eq!(ctx.force, Vector3::zero());
    }

    #[test]
    fn test_uniforms_reflect_store_and_params() {
        let mesh = ClothMesh::new(
            "cloth",
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            vec![[0.0, 0.0, 1.0]; 3],
            vec![0, 1, 2],
        )
        .unwrap();
        let store = ClothStore::new(&mesh, &ClothConfig::default());
        let mut ctx = SimulationContext::new(SimulationParams::default().with_relaxation_passes(4));
        ctx.nudge_force(Axis::Z, 0.5);

        let uniforms = ctx.uniforms(&store);
        assert_eq!(uniforms.particle_count, 3);
        assert_eq!(uniforms.triangle_count, 1);
        assert_eq!(uniforms.constraint_count, 3);
        assert_eq!(uniforms.relaxation_passes, 4);
        assert_eq!(uniforms.force, [0.0, 0.0, 0.5]);
        assert_eq!(uniforms.gravity, [0.0, -0.98, 0.0]);
    }
}
