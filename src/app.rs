//! Window, event loop and the per-frame cloth viewer loop

use cgmath::{Deg, Point3};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{DeviceEvent, DeviceId, ElementState, Event, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::config::ViewerConfig;
use crate::error::AppError;
use crate::gfx::{
    camera::{CameraController, CameraManager, FlyCamera},
    geometry::primitives::generate_plane,
    scene::Scene,
    RenderEngine,
};
use crate::simulation::{Axis, ClothSimulation, ClothStats, SimulationContext};
use crate::ui::{cloth_panel, DisplayToggles, PanelActions, UiManager};

const CAMERA_START: [f32; 3] = [0.0, -2.0, 15.0];
const CAMERA_SPEED: f32 = 4.0;
const CAMERA_SENSITIVITY: f32 = 0.003;

pub struct ClothViewerApp {
    event_loop: EventLoop<()>,
    state: AppState,
}

struct AppState {
    config: ViewerConfig,
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    ui_manager: Option<UiManager>,
    scene: Scene,
    cloths: Vec<ClothSimulation>,
    cloth_stats: Vec<ClothStats>,
    ctx: SimulationContext,
    toggles: DisplayToggles,
    last_frame: Instant,
    error: Option<AppError>,
}

impl ClothViewerApp {
    /// Loads the scene named by `config`; GPU setup waits for the window
    pub fn new(config: ViewerConfig) -> Result<Self, AppError> {
        let event_loop = EventLoop::new().map_err(|e| AppError::EventLoop(e.to_string()))?;

        let (width, height) = config.window_size;
        let camera = FlyCamera::new(
            Point3::from(CAMERA_START),
            Deg(-90.0),
            Deg(0.0),
            width as f32 / height.max(1) as f32,
        );
        let controller = CameraController::new(CAMERA_SPEED, CAMERA_SENSITIVITY);
        let mut scene = Scene::new(CameraManager::new(camera, controller));
        load_scene(&mut scene, &config.model_path)?;

        let ctx = SimulationContext::new(config.simulation);
        let toggles = DisplayToggles {
            vsync: config.vsync,
            ..Default::default()
        };

        Ok(Self {
            event_loop,
            state: AppState {
                config,
                window: None,
                render_engine: None,
                ui_manager: None,
                scene,
                cloths: Vec::new(),
                cloth_stats: Vec::new(),
                ctx,
                toggles,
                last_frame: Instant::now(),
                error: None,
            },
        })
    }

    /// Runs until the window closes. Errors raised inside the loop are returned here.
    pub fn run(self) -> Result<(), AppError> {
        let Self {
            event_loop,
            mut state,
        } = self;
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop
            .run_app(&mut state)
            .map_err(|e| AppError::EventLoop(e.to_string()))?;

        match state.error.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// Loads `path` into the scene, or a procedural cloth when the file is missing
fn load_scene(scene: &mut Scene, path: &Path) -> Result<(), AppError> {
    if path.exists() {
        scene.load_obj(path)?;
        if scene.cloth_meshes.is_empty() {
            log::warn!(
                "{} has no model named 'cloth'; nothing will be simulated",
                path.display()
            );
        }
    } else {
        log::warn!(
            "Model {} not found, simulating a generated 3x3 cloth instead",
            path.display()
        );
        scene.add_cloth(generate_plane(3.0, 3.0, 24, 24).into_cloth_mesh("cloth")?);
    }
    Ok(())
}

impl AppState {
    fn init_graphics(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let (width, height) = self.config.window_size;
        let window = event_loop
            .create_window(
                WindowAttributes::default()
                    .with_title(self.config.title.as_str())
                    .with_inner_size(LogicalSize::new(width, height)),
            )
            .map_err(|e| AppError::Window(e.to_string()))?;
        let window = Arc::new(window);

        let (width, height) = window.inner_size().into();
        let engine = pollster::block_on(RenderEngine::new(
            window.clone(),
            width,
            height,
            self.config.vsync,
        ))?;

        self.scene.camera_manager.camera.resize_projection(width, height);
        self.scene.init_gpu_resources(engine.device());

        self.cloths = self
            .scene
            .cloth_meshes
            .iter()
            .map(|mesh| engine.create_cloth(mesh, &self.config.cloth))
            .collect::<Result<Vec<_>, _>>()?;
        self.cloth_stats = self.cloths.iter().map(ClothSimulation::stats).collect();

        self.toggles = DisplayToggles {
            show_normals: engine.show_normals(),
            wireframe: engine.wireframe(),
            vsync: engine.vsync(),
        };

        let ui_manager = UiManager::new(
            engine.device(),
            engine.queue(),
            engine.surface_format(),
            &window,
        );

        self.ui_manager = Some(ui_manager);
        self.render_engine = Some(engine);
        self.window = Some(window);
        self.last_frame = Instant::now();
        Ok(())
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        if self.scene.camera_manager.process_keyboard_event(event) {
            return;
        }
        if event.state != ElementState::Pressed {
            return;
        }
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };

        let step = self.config.force_step;
        match code {
            KeyCode::Escape => event_loop.exit(),
            KeyCode::KeyI => self.ctx.nudge_force(Axis::Y, step),
            KeyCode::KeyK => self.ctx.nudge_force(Axis::Y, -step),
            KeyCode::KeyJ => self.ctx.nudge_force(Axis::X, -step),
            KeyCode::KeyL => self.ctx.nudge_force(Axis::X, step),
            KeyCode::KeyU => self.ctx.nudge_force(Axis::Z, step),
            KeyCode::KeyO => self.ctx.nudge_force(Axis::Z, -step),
            KeyCode::Enter | KeyCode::NumpadEnter if !event.repeat => {
                self.toggles.show_normals = !self.toggles.show_normals;
                self.apply_display();
            }
            KeyCode::Tab if !event.repeat => {
                self.toggles.wireframe = !self.toggles.wireframe;
                self.apply_display();
            }
            KeyCode::KeyR if !event.repeat => self.reset_cloths(),
            _ => return,
        }
        log::debug!("Key {:?}, force now {:?}", code, self.ctx.force);
    }

    /// Pushes the display toggles to the engine, reverting any it refuses
    fn apply_display(&mut self) {
        let Some(engine) = self.render_engine.as_mut() else {
            return;
        };
        if engine.show_normals() != self.toggles.show_normals {
            engine.set_show_normals(self.toggles.show_normals);
        }
        if engine.wireframe() != self.toggles.wireframe {
            self.toggles.wireframe = engine.set_wireframe(self.toggles.wireframe);
        }
        if engine.vsync() != self.toggles.vsync {
            engine.set_vsync(self.toggles.vsync);
        }
    }

    fn reset_cloths(&mut self) {
        if let Some(engine) = self.render_engine.as_ref() {
            for cloth in &self.cloths {
                cloth.reset(engine.queue());
            }
        }
        self.ctx.reset_force();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop, window: &Window) {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;
        log::trace!("Frame time {:.3} ms", dt * 1000.0);

        self.scene.update(dt);

        let actions = match self.ui_manager.as_mut() {
            Some(ui_manager) => ui_manager
                .update_logic(window, |ui| {
                    cloth_panel(
                        ui,
                        &mut self.ctx,
                        &self.cloth_stats,
                        &mut self.toggles,
                        dt,
                    )
                })
                .unwrap_or_default(),
            None => PanelActions::default(),
        };
        if actions.reset {
            self.reset_cloths();
        }
        if actions.display_changed {
            self.apply_display();
        }

        let (Some(engine), Some(ui_manager)) =
            (self.render_engine.as_mut(), self.ui_manager.as_mut())
        else {
            return;
        };
        engine.update_camera(self.scene.camera_manager.camera.uniform);

        let result = engine.render_frame(
            &self.scene,
            &mut self.cloths,
            &self.ctx,
            Some(
                |device: &wgpu::Device,
                 queue: &wgpu::Queue,
                 encoder: &mut wgpu::CommandEncoder,
                 view: &wgpu::TextureView| {
                    ui_manager.render_display_only(device, queue, encoder, view);
                },
            ),
        );

        match result {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface lost or outdated, reconfiguring");
                engine.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Surface out of memory, exiting");
                event_loop.exit();
            }
            Err(e) => log::warn!("Dropped frame: {}", e),
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(error) = self.init_graphics(event_loop) {
            log::error!("Failed to initialise graphics: {}", error);
            self.error = Some(error);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.clone() else {
            return;
        };

        if let Some(ui_manager) = self.ui_manager.as_mut() {
            let ui_event: Event<()> = Event::WindowEvent {
                window_id,
                event: event.clone(),
            };
            if ui_manager.handle_input(&window, &ui_event) {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event: key_event, ..
            } => self.handle_key(event_loop, &key_event),
            WindowEvent::MouseInput { state, button, .. } => {
                self.scene
                    .camera_manager
                    .process_mouse_button(button, state);
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                self.scene
                    .camera_manager
                    .camera
                    .resize_projection(width, height);
                if let Some(engine) = self.render_engine.as_mut() {
                    engine.resize(width, height);
                }
                if let Some(ui_manager) = self.ui_manager.as_mut() {
                    ui_manager.update_display_size(width, height);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop, &window),
            _ => (),
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if self
            .ui_manager
            .as_ref()
            .is_some_and(|ui_manager| ui_manager.wants_input())
        {
            return;
        }
        self.scene.camera_manager.process_device_event(&event);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }
}
