//! Application-level errors

use crate::gfx::scene::SceneError;
use crate::simulation::ClothError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Load(#[from] SceneError),

    #[error(transparent)]
    Cloth(#[from] ClothError),

    #[error("failed to create surface: {0}")]
    Surface(String),

    #[error("no suitable GPU adapter: {0}")]
    Adapter(String),

    #[error("failed to create device: {0}")]
    Device(String),

    #[error("failed to create window: {0}")]
    Window(String),

    #[error("event loop error: {0}")]
    EventLoop(String),
}
