//! Viewer configuration

use std::path::PathBuf;

use crate::simulation::{ClothConfig, SimulationParams};

/// Environment variable consulted when no model path is given on the command line
pub const MODEL_ENV_VAR: &str = "DRAPERY_MODEL";
pub const DEFAULT_MODEL_PATH: &str = "data/cloth.obj";

#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub title: String,
    pub window_size: (u32, u32),
    pub model_path: PathBuf,
    pub vsync: bool,
    /// Force change per key press
    pub force_step: f32,
    pub cloth: ClothConfig,
    pub simulation: SimulationParams,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "drapery".to_string(),
            window_size: (1200, 800),
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            vsync: true,
            force_step: 0.1,
            cloth: ClothConfig::default(),
            simulation: SimulationParams::default(),
        }
    }
}

impl ViewerConfig {
    /// Default configuration with the model path taken from the first
    /// argument, then [`MODEL_ENV_VAR`], then [`DEFAULT_MODEL_PATH`]
    pub fn from_args(args: impl IntoIterator<Item = String>) -> Self {
        let path = resolve_model_path(args.into_iter().next(), std::env::var(MODEL_ENV_VAR).ok());
        Self::default().with_model_path(path)
    }

    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = (width, height);
        self
    }

    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = path.into();
        self
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    pub fn with_force_step(mut self, step: f32) -> Self {
        self.force_step = step;
        self
    }

    pub fn with_cloth(mut self, cloth: ClothConfig) -> Self {
        self.cloth = cloth;
        self
    }

    pub fn with_simulation(mut self, params: SimulationParams) -> Self {
        self.simulation = params;
        self
    }
}

pub fn resolve_model_path(arg: Option<String>, env: Option<String>) -> PathBuf {
    arg.or(env)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::AdjacencyStrategy;

    #[test]
    fn test_model_path_precedence() {
        assert_eq!(
            resolve_model_path(Some("a.obj".into()), Some("b.obj".into())),
            PathBuf::from("a.obj")
        );
        assert_eq!(
            resolve_model_path(None, Some("b.obj".into())),
            PathBuf::from("b.obj")
        );
        assert_eq!(resolve_model_path(None, None), PathBuf::from(DEFAULT_MODEL_PATH));
        assert_eq!(
            resolve_model_path(None, Some(String::new())),
            PathBuf::from(DEFAULT_MODEL_PATH)
        );
    }

    #[test]
    fn test_builders() {
        let config = ViewerConfig::default()
            .with_window_size(640, 480)
            .with_vsync(false)
            .with_force_step(0.5)
            .with_cloth(ClothConfig::default().with_adjacency(AdjacencyStrategy::EdgeMap))
            .with_simulation(SimulationParams::default().with_relaxation_passes(3));

        assert_eq!(config.window_size, (640, 480));
        assert!(!config.vsync);
        assert_eq!(config.force_step, 0.5);
        assert_eq!(config.cloth.adjacency, AdjacencyStrategy::EdgeMap);
        assert_eq!(config.simulation.relaxation_passes, 3);
    }
}
