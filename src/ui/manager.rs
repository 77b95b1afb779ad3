// src/ui/manager.rs
//! ImGui context, winit glue and wgpu renderer for the overlay

use imgui::{FontConfig, FontSource, MouseCursor};
use imgui_wgpu::{Renderer, RendererConfig};
use imgui_winit_support::{HiDpiMode, WinitPlatform};
use std::time::Instant;
use winit::{
    event::{Event, WindowEvent},
    window::Window,
};

const FONT_SIZE: f32 = 20.0;

pub struct UiManager {
    imgui: imgui::Context,
    platform: WinitPlatform,
    renderer: Renderer,
    last_frame: Instant,
    cursor: Option<MouseCursor>,
    wants_input: bool,
    frame: FrameGate,
}

/// Tracks whether an ImGui frame was begun and not yet rendered
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct FrameGate {
    open: bool,
}

impl FrameGate {
    fn open(&mut self) {
        self.open = true;
    }

    fn abandon(&mut self) {
        self.open = false;
    }

    /// Closes the gate, returning whether a frame was waiting to be drawn
    fn take(&mut self) -> bool {
        std::mem::take(&mut self.open)
    }
}

impl UiManager {
    /// DPI is locked to 1.0; the surface is sized in physical pixels
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        window: &Window,
    ) -> Self {
        let mut imgui = imgui::Context::create();
        imgui.set_ini_filename(None);

        let mut platform = WinitPlatform::new(&mut imgui);
        platform.attach_window(imgui.io_mut(), window, HiDpiMode::Locked(1.0));

        imgui.fonts().add_font(&[FontSource::DefaultFontData {
            config: Some(FontConfig {
                size_pixels: FONT_SIZE,
                oversample_h: 1,
                pixel_snap_h: true,
                ..Default::default()
            }),
        }]);

        let renderer = Renderer::new(
            &mut imgui,
            device,
            queue,
            RendererConfig {
                texture_format: surface_format,
                ..Default::default()
            },
        );

        Self {
            imgui,
            platform,
            renderer,
            last_frame: Instant::now(),
            cursor: None,
            wants_input: false,
            frame: FrameGate::default(),
        }
    }

    pub fn update_display_size(&mut self, width: u32, height: u32) {
        self.imgui.io_mut().display_size = [width as f32, height as f32];
    }

    /// Feeds a window event to ImGui. Returns true when the UI captured it
    /// and it should not reach the camera or the cloth key bindings.
    pub fn handle_input<T>(&mut self, window: &Window, event: &Event<T>) -> bool {
        let Event::WindowEvent {
            event: window_event,
            ..
        } = event
        else {
            return false;
        };

        let keyboard = match window_event {
            WindowEvent::KeyboardInput { .. } => true,
            WindowEvent::CursorMoved { .. }
            | WindowEvent::MouseInput { .. }
            | WindowEvent::MouseWheel { .. } => false,
            WindowEvent::Focused(_) => {
                self.platform.handle_event(self.imgui.io_mut(), window, event);
                return false;
            }
            _ => return false,
        };

        self.platform.handle_event(self.imgui.io_mut(), window, event);
        let io = self.imgui.io();
        if keyboard {
            io.want_capture_keyboard
        } else {
            io.want_capture_mouse
        }
    }

    /// Whether the last built frame wanted mouse or keyboard input
    pub fn wants_input(&self) -> bool {
        self.wants_input
    }

    /// Starts a new ImGui frame and builds it with `build`
    ///
    /// Returns `None` when the platform could not prepare the frame.
    pub fn update_logic<F, R>(&mut self, window: &Window, build: F) -> Option<R>
    where
        F: FnOnce(&imgui::Ui) -> R,
    {
        let now = Instant::now();
        self.imgui.io_mut().update_delta_time(now - self.last_frame);
        self.last_frame = now;

        if let Err(e) = self.platform.prepare_frame(self.imgui.io_mut(), window) {
            log::error!("Failed to prepare UI frame: {}", e);
            self.frame.abandon();
            return None;
        }

        let ui = self.imgui.frame();
        let output = build(&*ui);

        let cursor = ui.mouse_cursor();
        if self.cursor != cursor {
            self.cursor = cursor;
            self.platform.prepare_render(&*ui, window);
        }

        let io = self.imgui.io();
        self.wants_input = io.want_capture_mouse || io.want_capture_keyboard;
        self.frame.open();
        Some(output)
    }

    /// Draws the frame built by the last [`update_logic`](Self::update_logic)
    /// over the already rendered scene in `target`. Does nothing when no
    /// frame was begun since the last call.
    pub fn render_display_only(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
    ) {
        if !self.frame.take() {
            return;
        }
        let draw_data = self.imgui.render();
        let [width, height] = draw_data.display_size;
        if width <= 0.0 || height <= 0.0 {
            return;
        }

        let mut overlay_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("UI Overlay Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        if let Err(e) = self
            .renderer
            .render(draw_data, queue, device, &mut overlay_pass)
        {
            log::error!("Failed to render UI: {:?}", e);
        }
    }
}
