//! Dear ImGui overlay
//!
//! [`UiManager`] wires ImGui into winit and wgpu; [`panel`] builds the
//! cloth control panel drawn on top of the scene each frame.

pub mod manager;
pub mod panel;

pub use manager::UiManager;
pub use panel::{cloth_panel, DisplayToggles, PanelActions};
