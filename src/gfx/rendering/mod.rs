// src/gfx/rendering/mod.rs
//! Surface, pipelines and per-frame command recording

pub mod pipeline_manager;
pub mod render_engine;

pub use pipeline_manager::{PipelineConfig, PipelineManager, PipelineStats};
pub use render_engine::RenderEngine;
