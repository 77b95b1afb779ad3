// src/lib.rs
//! drapery: a wgpu viewer that simulates cloth meshes on the GPU
//!
//! Models whose name contains "cloth" become mass-spring systems stepped by a
//! single compute dispatch per frame; everything else is drawn as static
//! geometry. See [`simulation`] for the cloth core and [`app`] for the viewer.

pub mod app;
pub mod config;
pub mod error;
pub mod gfx;
pub mod simulation;
pub mod ui;
pub mod wgpu_utils;

pub use app::ClothViewerApp;
pub use config::ViewerConfig;
pub use error::AppError;
