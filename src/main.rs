use anyhow::Context;
use drapery::{ClothViewerApp, ViewerConfig};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("drapery=info,wgpu_core=warn,wgpu_hal=warn"),
    )
    .init();

    let config = ViewerConfig::from_args(std::env::args().skip(1));
    log::info!("Starting drapery with model {}", config.model_path.display());

    let app = ClothViewerApp::new(config).context("failed to set up the viewer")?;
    app.run().context("viewer exited with an error")?;
    Ok(())
}
