//! Small typed helpers over raw wgpu buffers and bind groups
//!
//! The cloth step, the cloth material and the global camera/light uniforms
//! all build their bindings through these.

pub mod binding_builder;
pub mod binding_types;
pub mod uniform_buffer;

pub use binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc};
pub use uniform_buffer::{ArrayBuffer, UniformBuffer};
