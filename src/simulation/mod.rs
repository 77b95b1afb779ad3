// src/simulation/mod.rs
//! Mass-spring cloth simulation
//!
//! A cloth mesh becomes a set of particles joined by structural and bending
//! distance constraints ([`topology`], [`store`]). The particles live in a
//! GPU buffer that a single compute dispatch advances each frame
//! ([`integrator`]) and the render pass then draws in place ([`renderer`]).
//! [`reference`] evaluates the same step on the CPU.

pub mod buffers;
pub mod cloth;
pub mod config;
pub mod constraint;
pub mod context;
pub mod error;
pub mod integrator;
pub mod reference;
pub mod renderer;
pub mod store;
pub mod topology;

pub use cloth::ClothSimulation;
pub use config::{AdjacencyStrategy, Axis, ClothConfig, PinRule};
pub use context::{ClothUniforms, SimulationContext, SimulationParams};
pub use error::ClothError;
pub use integrator::ClothIntegrator;
pub use renderer::ClothRenderer;
pub use store::{ClothMesh, ClothStats, ClothStore, Particle};
