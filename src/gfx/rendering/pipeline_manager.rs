//! Render pipeline registry
//!
//! Pipelines are described by a [`PipelineConfig`], registered by name and
//! created in one batch once every shader they reference is loaded.

use std::{collections::HashMap, sync::Arc};
use wgpu::*;

use crate::gfx::scene::vertex::Vertex3D;

/// Everything needed to build one render pipeline
///
/// Shaders are looked up by name and must expose `vs_main` and `fs_main`.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub label: String,
    pub shader: String,
    pub bind_group_layouts: Vec<BindGroupLayout>,
    pub vertex_buffers: Vec<VertexBufferLayout<'static>>,
    pub primitive_topology: PrimitiveTopology,
    pub cull_mode: Option<Face>,
    pub polygon_mode: PolygonMode,
    pub depth_format: Option<TextureFormat>,
    pub color_targets: Vec<Option<ColorTargetState>>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            label: "Default Pipeline".to_string(),
            shader: "mesh".to_string(),
            bind_group_layouts: Vec::new(),
            vertex_buffers: vec![Vertex3D::desc()],
            primitive_topology: PrimitiveTopology::TriangleList,
            cull_mode: Some(Face::Back),
            polygon_mode: PolygonMode::Fill,
            depth_format: None,
            color_targets: vec![Some(ColorTargetState {
                format: TextureFormat::Bgra8Unorm,
                blend: Some(BlendState::REPLACE),
                write_mask: ColorWrites::ALL,
            })],
        }
    }
}

impl PipelineConfig {
    pub fn default_with_shader(shader: &str) -> Self {
        Self {
            shader: shader.to_string(),
            ..Default::default()
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_owned();
        self
    }

    pub fn with_cull_mode(mut self, face: Option<Face>) -> Self {
        self.cull_mode = face;
        self
    }

    /// `PolygonMode::Line` requires `Features::POLYGON_MODE_LINE`
    pub fn with_polygon_mode(mut self, mode: PolygonMode) -> Self {
        self.polygon_mode = mode;
        self
    }

    pub fn with_bind_group_layouts(mut self, layouts: Vec<BindGroupLayout>) -> Self {
        self.bind_group_layouts = layouts;
        self
    }

    pub fn with_vertex_buffers(mut self, buffers: Vec<VertexBufferLayout<'static>>) -> Self {
        self.vertex_buffers = buffers;
        self
    }

    pub fn with_depth_format(mut self, format: TextureFormat) -> Self {
        self.depth_format = Some(format);
        self
    }

    /// Single opaque color target in `format`
    pub fn with_color_format(mut self, format: TextureFormat) -> Self {
        self.color_targets = vec![Some(ColorTargetState {
            format,
            blend: Some(BlendState::REPLACE),
            write_mask: ColorWrites::ALL,
        })];
        self
    }
}

impl PipelineConfig {
    fn primitive_state(&self) -> PrimitiveState {
        PrimitiveState {
            topology: self.primitive_topology,
            front_face: FrontFace::Ccw,
            cull_mode: self.cull_mode,
            polygon_mode: self.polygon_mode,
            ..Default::default()
        }
    }

    fn depth_stencil_state(&self) -> Option<DepthStencilState> {
        self.depth_format.map(|format| DepthStencilState {
            format,
            depth_write_enabled: true,
            depth_compare: CompareFunction::Less,
            stencil: StencilState::default(),
            bias: DepthBiasState::default(),
        })
    }
}

/// Named shaders and the pipelines built from them
pub struct PipelineManager {
    device: Arc<Device>,
    shaders: HashMap<String, ShaderModule>,
    pipelines: HashMap<String, RenderPipeline>,
    pending: Vec<(String, PipelineConfig)>,
}

impl PipelineManager {
    pub fn new(device: Arc<Device>) -> Self {
        Self {
            device,
            shaders: HashMap::new(),
            pipelines: HashMap::new(),
            pending: Vec::new(),
        }
    }

    pub fn load_shader(&mut self, name: &str, source: &str) {
        let module = self.device.create_shader_module(ShaderModuleDescriptor {
            label: Some(name),
            source: ShaderSource::Wgsl(source.into()),
        });
        self.shaders.insert(name.to_string(), module);
    }

    /// Queues a pipeline; it is built by [`create_all_pipelines`](Self::create_all_pipelines)
    pub fn register_pipeline(&mut self, name: &str, config: PipelineConfig) {
        self.pending.push((name.to_string(), config));
    }

    /// Builds every queued pipeline
    ///
    /// Pipelines whose shader was never loaded are reported, one message each.
    pub fn create_all_pipelines(&mut self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        for (name, config) in std::mem::take(&mut self.pending) {
            let Some(shader) = self.shaders.get(&config.shader) else {
                errors.push(format!(
                    "Pipeline '{}': shader '{}' not loaded",
                    name, config.shader
                ));
                continue;
            };
            let pipeline = build_pipeline(&self.device, &name, &config, shader);
            log::debug!("Created pipeline '{}'", name);
            self.pipelines.insert(name, pipeline);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn pipeline(&self, name: &str) -> Option<&RenderPipeline> {
        self.pipelines.get(name)
    }

    pub fn get_stats(&self) -> PipelineStats {
        PipelineStats {
            total_pipelines: self.pipelines.len(),
            pending_pipelines: self.pending.len(),
            loaded_shaders: self.shaders.len(),
        }
    }
}

fn build_pipeline(
    device: &Device,
    name: &str,
    config: &PipelineConfig,
    shader: &ShaderModule,
) -> RenderPipeline {
    let layouts: Vec<&BindGroupLayout> = config.bind_group_layouts.iter().collect();
    let layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
        label: Some(&format!("{} Layout", name)),
        bind_group_layouts: &layouts,
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some(&config.label),
        layout: Some(&layout),
        vertex: VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &config.vertex_buffers,
            compilation_options: Default::default(),
        },
        fragment: Some(FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &config.color_targets,
            compilation_options: Default::default(),
        }),
        primitive: config.primitive_state(),
        depth_stencil: config.depth_stencil_state(),
        multisample: MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineStats {
    pub total_pipelines: usize,
    pub pending_pipelines: usize,
    pub loaded_shaders: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = PipelineConfig::default_with_shader("cloth")
            .with_label("Cloth")
            .with_cull_mode(None)
            .with_polygon_mode(PolygonMode::Line)
            .with_depth_format(TextureFormat::Depth32Float)
            .with_color_format(TextureFormat::Rgba8Unorm);

        assert_eq!(config.shader, "cloth");
        assert_eq!(config.cull_mode, None);
        assert_eq!(config.polygon_mode, PolygonMode::Line);
        assert_eq!(config.depth_format, Some(TextureFormat::Depth32Float));
        assert_eq!(
            config.color_targets[0].as_ref().map(|t| t.format),
            Some(TextureFormat::Rgba8Unorm)
        );
        assert_eq!(config.vertex_buffers.len(), 1);

        let primitive = config.primitive_state();
        assert_eq!(primitive.polygon_mode, PolygonMode::Line);
        assert_eq!(primitive.front_face, FrontFace::Ccw);
        let depth = config.depth_stencil_state().unwrap();
        assert_eq!(depth.depth_compare, CompareFunction::Less);
        assert!(PipelineConfig::default().depth_stencil_state().is_none());
    }
}
