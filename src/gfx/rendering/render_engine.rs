//! Frame rendering: cloth dispatches, scene and cloth draws, UI overlay

use std::sync::Arc;
use wgpu::TextureFormat;

use crate::error::AppError;
use crate::gfx::{
    camera::camera_utils::CameraUniform,
    resources::{
        global_bindings::{update_global_ubo, GlobalBindings, GlobalUBO, LightConfig},
        texture_resource::TextureResource,
    },
    scene::{DrawMesh, Scene},
};
use crate::simulation::{
    buffers::capture_gpu_errors, ClothConfig, ClothError, ClothIntegrator, ClothMesh,
    ClothRenderer, ClothSimulation, SimulationContext,
};

use super::pipeline_manager::{PipelineConfig, PipelineManager};

const MESH_PIPELINE: &str = "Mesh";
const MESH_WIREFRAME_PIPELINE: &str = "MeshWireframe";
const CLOTH_PIPELINE: &str = "Cloth";
const CLOTH_WIREFRAME_PIPELINE: &str = "ClothWireframe";

pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_texture: TextureResource,
    format: TextureFormat,
    pub pipeline_manager: PipelineManager,
    global_ubo: GlobalUBO,
    global_bindings: GlobalBindings,
    light_config: LightConfig,
    integrator: ClothIntegrator,
    cloth_renderer: ClothRenderer,
    wireframe_supported: bool,
    wireframe: bool,
}

impl RenderEngine {
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        vsync: bool,
    ) -> Result<RenderEngine, AppError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .map_err(|e| AppError::Surface(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| AppError::Adapter(e.to_string()))?;
        log::info!("Using adapter: {:?}", adapter.get_info());

        let wireframe_supported = adapter
            .features()
            .contains(wgpu::Features::POLYGON_MODE_LINE);
        let required_features = if wireframe_supported {
            wgpu::Features::POLYGON_MODE_LINE
        } else {
            wgpu::Features::empty()
        };

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features,
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: 4096,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| AppError::Device(e.to_string()))?;
        device.on_uncaptured_error(Box::new(|error: wgpu::Error| {
            log::error!("Uncaptured wgpu error: {}", error);
        }));
        let device = Arc::new(device);
        let queue = Arc::new(queue);

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .ok_or_else(|| AppError::Surface("surface reports no formats".to_string()))?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: present_mode(vsync),
            alpha_mode: surface_capabilities
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture =
            TextureResource::create_depth_texture(&device, &config, "depth_texture");

        let mut global_ubo = GlobalUBO::new(&device);
        let light_config = LightConfig::default();
        update_global_ubo(&mut global_ubo, &queue, CameraUniform::default(), light_config);
        let global_bindings = GlobalBindings::new(&device, &global_ubo);

        let integrator = ClothIntegrator::new(&device)?;
        let cloth_renderer = ClothRenderer::new(&device);

        let mut pipeline_manager = PipelineManager::new(device.clone());
        pipeline_manager.load_shader("mesh", include_str!("shaders/mesh.wgsl"));
        pipeline_manager.load_shader("cloth", crate::simulation::renderer::CLOTH_SHADER);

        let global_layout = global_bindings.bind_group_layout();
        let mesh_config = PipelineConfig::default_with_shader("mesh")
            .with_label("Mesh Pipeline")
            .with_bind_group_layouts(vec![global_layout.clone()])
            .with_depth_format(TextureResource::DEPTH_FORMAT)
            .with_color_format(format);
        let cloth_config = cloth_renderer.pipeline_config(
            global_layout,
            format,
            TextureResource::DEPTH_FORMAT,
        );
        if wireframe_supported {
            pipeline_manager.register_pipeline(
                MESH_WIREFRAME_PIPELINE,
                mesh_config
                    .clone()
                    .with_label("Mesh Wireframe Pipeline")
                    .with_cull_mode(None)
                    .with_polygon_mode(wgpu::PolygonMode::Line),
            );
            pipeline_manager.register_pipeline(
                CLOTH_WIREFRAME_PIPELINE,
                cloth_config
                    .clone()
                    .with_label("Cloth Wireframe Pipeline")
                    .with_polygon_mode(wgpu::PolygonMode::Line),
            );
        }
        pipeline_manager.register_pipeline(MESH_PIPELINE, mesh_config);
        pipeline_manager.register_pipeline(CLOTH_PIPELINE, cloth_config);

        capture_gpu_errors(&device, "Creating render pipelines", || {
            pipeline_manager.create_all_pipelines()
        })?
        .map_err(|errors| AppError::Device(errors.join("; ")))?;
        log::debug!("{:?}", pipeline_manager.get_stats());

        Ok(RenderEngine {
            surface,
            device,
            queue,
            config,
            depth_texture,
            format,
            pipeline_manager,
            global_ubo,
            global_bindings,
            light_config,
            integrator,
            cloth_renderer,
            wireframe_supported,
            wireframe: false,
        })
    }

    /// Builds the store, GPU buffers and step bind group for one cloth mesh
    pub fn create_cloth(
        &self,
        mesh: &ClothMesh,
        config: &ClothConfig,
    ) -> Result<ClothSimulation, ClothError> {
        ClothSimulation::new(&self.device, &self.integrator, mesh, config)
    }

    pub fn update_camera(&mut self, camera: CameraUniform) {
        update_global_ubo(&mut self.global_ubo, &self.queue, camera, self.light_config);
    }

    /// Records and submits one frame
    ///
    /// Every cloth is stepped before the render pass in the same command
    /// encoder, so the draws read this frame's particle positions.
    pub fn render_frame<F>(
        &mut self,
        scene: &Scene,
        cloths: &mut [ClothSimulation],
        ctx: &SimulationContext,
        ui_callback: Option<F>,
    ) -> Result<(), wgpu::SurfaceError>
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        let surface_texture = self.surface.get_current_texture()?;
        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        for cloth in cloths.iter_mut() {
            cloth.step(&self.queue, &mut encoder, &self.integrator, ctx);
        }

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.1,
                            g: 0.2,
                            b: 0.3,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_bind_group(0, self.global_bindings.bind_group(), &[]);

            let (mesh_pipeline, cloth_pipeline) = if self.wireframe {
                (MESH_WIREFRAME_PIPELINE, CLOTH_WIREFRAME_PIPELINE)
            } else {
                (MESH_PIPELINE, CLOTH_PIPELINE)
            };

            if let Some(pipeline) = self.pipeline_manager.pipeline(mesh_pipeline) {
                render_pass.set_pipeline(pipeline);
                for mesh in &scene.meshes {
                    render_pass.draw_mesh(mesh);
                }
            }

            if let Some(pipeline) = self.pipeline_manager.pipeline(cloth_pipeline) {
                render_pass.set_pipeline(pipeline);
                for cloth in cloths.iter() {
                    cloth.draw(&mut render_pass, &self.cloth_renderer);
                }
            }
        }

        if let Some(ui_callback) = ui_callback {
            ui_callback(
                &self.device,
                &self.queue,
                &mut encoder,
                &surface_texture_view,
            );
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
    }

    /// Reconfigures the surface at its current size, after it was lost or outdated
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    pub fn vsync(&self) -> bool {
        self.config.present_mode == present_mode(true)
    }

    pub fn set_vsync(&mut self, enable: bool) {
        self.config.present_mode = present_mode(enable);
        self.surface.configure(&self.device, &self.config);
    }

    /// Returns whether wireframe is now on; stays off when the adapter cannot draw lines
    pub fn set_wireframe(&mut self, enable: bool) -> bool {
        if enable && !self.wireframe_supported {
            log::warn!("Wireframe rendering needs POLYGON_MODE_LINE, which this adapter lacks");
            self.wireframe = false;
        } else {
            self.wireframe = enable;
        }
        self.wireframe
    }

    pub fn wireframe(&self) -> bool {
        self.wireframe
    }

    pub fn set_show_normals(&mut self, show: bool) {
        self.cloth_renderer.set_show_normals(&self.queue, show);
    }

    pub fn show_normals(&self) -> bool {
        self.cloth_renderer.show_normals()
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }
}

fn present_mode(vsync: bool) -> wgpu::PresentMode {
    if vsync {
        wgpu::PresentMode::AutoVsync
    } else {
        wgpu::PresentMode::AutoNoVsync
    }
}
