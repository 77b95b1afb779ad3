// src/ui/panel.rs
//! The "Cloth" control panel

use crate::simulation::{ClothStats, SimulationContext};

/// Display switches the panel can flip; the app applies them to the engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayToggles {
    pub show_normals: bool,
    pub wireframe: bool,
    pub vsync: bool,
}

/// What the user asked for this frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PanelActions {
    pub reset: bool,
    pub display_changed: bool,
}

/// Draws the panel, editing `ctx` and `toggles` in place
pub fn cloth_panel(
    ui: &imgui::Ui,
    ctx: &mut SimulationContext,
    cloths: &[ClothStats],
    toggles: &mut DisplayToggles,
    frame_time: f32,
) -> PanelActions {
    let mut actions = PanelActions::default();
    let display_size = ui.io().display_size;
    if display_size[0] <= 0.0 || display_size[1] <= 0.0 {
        return actions;
    }

    ui.window("Cloth")
        .size([340.0, 460.0], imgui::Condition::FirstUseEver)
        .position([20.0, 20.0], imgui::Condition::FirstUseEver)
        .resizable(true)
        .collapsible(true)
        .build(|| {
            render_force_controls(ui, ctx, &mut actions);
            ui.separator();
            render_parameters(ui, ctx);
            ui.separator();
            render_display_toggles(ui, toggles, &mut actions);
            ui.separator();
            render_cloth_stats(ui, cloths);
            ui.separator();
            let fps = if frame_time > 0.0 { 1.0 / frame_time } else { 0.0 };
            ui.text(format!("Frame: {:.2} ms ({:.0} fps)", frame_time * 1000.0, fps));
        });

    actions
}

fn render_force_controls(ui: &imgui::Ui, ctx: &mut SimulationContext, actions: &mut PanelActions) {
    ui.text("Force");
    let mut force: [f32; 3] = ctx.force.into();
    if ui.input_float3("xyz", &mut force).build() {
        ctx.force = force.into();
    }
    ui.text_disabled("I/K: y  J/L: x  U/O: z");

    if ui.button("Zero force") {
        ctx.reset_force();
    }
    ui.same_line();
    if ui.button("Reset cloth (R)") {
        actions.reset = true;
    }
}

fn render_parameters(ui: &imgui::Ui, ctx: &mut SimulationContext) {
    let params = &mut ctx.params;
    ui.slider("Time step", 1.0 / 240.0, 1.0 / 30.0, &mut params.time_step);
    ui.slider("Damping", 0.9, 1.0, &mut params.damping);
    ui.input_float3("Gravity", &mut params.gravity).build();
    ui.slider("Relaxation passes", 1u32, 32u32, &mut params.relaxation_passes);
}

fn render_display_toggles(ui: &imgui::Ui, toggles: &mut DisplayToggles, actions: &mut PanelActions) {
    let mut changed = ui.checkbox("Show normals (Enter)", &mut toggles.show_normals);
    changed |= ui.checkbox("Wireframe (Tab)", &mut toggles.wireframe);
    changed |= ui.checkbox("VSync", &mut toggles.vsync);
    actions.display_changed |= changed;
}

fn render_cloth_stats(ui: &imgui::Ui, cloths: &[ClothStats]) {
    if cloths.is_empty() {
        ui.text_disabled("No cloth meshes loaded");
        return;
    }

    for stats in cloths {
        if ui.collapsing_header(&stats.name, imgui::TreeNodeFlags::DEFAULT_OPEN) {
            ui.text(format!("Particles:   {} ({} pinned)", stats.particles, stats.pinned));
            ui.text(format!("Structural:  {}", stats.structural));
            ui.text(format!("Bending:     {}", stats.bending));
            ui.text(format!("Triangles:   {}", stats.triangles));
        }
    }
}
