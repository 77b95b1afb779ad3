//! One simulated cloth: its initial state, GPU buffers and step bind group

use super::buffers::ClothBuffers;
use super::config::ClothConfig;
use super::constraint::Constraint;
use super::context::SimulationContext;
use super::error::ClothError;
use super::integrator::ClothIntegrator;
use super::renderer::ClothRenderer;
use super::store::{ClothMesh, ClothStats, ClothStore, Particle};

pub struct ClothSimulation {
    store: ClothStore,
    buffers: ClothBuffers,
    bind_group: wgpu::BindGroup,
}

impl ClothSimulation {
    pub fn new(
        device: &wgpu::Device,
        integrator: &ClothIntegrator,
        mesh: &ClothMesh,
        config: &ClothConfig,
    ) -> Result<Self, ClothError> {
        let store = ClothStore::new(mesh, config);
        let buffers = ClothBuffers::new(device, &store)?;
        let bind_group = integrator.bind(device, &buffers);

        Ok(Self {
            store,
            buffers,
            bind_group,
        })
    }

    /// Uploads this frame's uniforms and records the step dispatch
    pub fn step(
        &mut self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        integrator: &ClothIntegrator,
        ctx: &SimulationContext,
    ) {
        self.buffers.write_uniforms(queue, ctx.uniforms(&self.store));
        integrator.dispatch(encoder, &self.bind_group);
    }

    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>, renderer: &ClothRenderer) {
        renderer.draw(render_pass, &self.buffers);
    }

    /// Puts every particle back at its initial position with zero velocity
    pub fn reset(&self, queue: &wgpu::Queue) {
        log::info!("Resetting cloth '{}'", self.store.name());
        self.buffers.reset(queue, &self.store);
    }

    /// Blocking copy of the current particle state, for diagnostics and tests
    pub fn read_particles(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> Result<Vec<Particle>, ClothError> {
        self.buffers.read_particles(device, queue)
    }

    /// Blocking copy of the constraint buffer as the step shader sees it
    pub fn read_constraints(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> Result<Vec<Constraint>, ClothError> {
        self.buffers.read_constraints(device, queue)
    }

    pub fn name(&self) -> &str {
        self.store.name()
    }

    pub fn store(&self) -> &ClothStore {
        &self.store
    }

    pub fn stats(&self) -> ClothStats {
        self.store.stats()
    }
}
