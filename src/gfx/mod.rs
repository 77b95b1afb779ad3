//! Viewer graphics: fly camera, scene loading, pipelines and frame rendering
//!
//! - [`camera`]: first-person camera and its input controller
//! - [`rendering`]: surface, pipeline registry and the per-frame [`RenderEngine`]
//! - [`resources`]: global camera/light uniforms and the depth attachment
//! - [`scene`]: OBJ loading into static meshes and cloth meshes
//! - [`geometry`]: procedural grids

pub mod camera;
pub mod geometry;
pub mod rendering;
pub mod resources;
pub mod scene;

pub use camera::FlyCamera;
pub use rendering::render_engine::RenderEngine;
