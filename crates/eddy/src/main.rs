use std::path::Path;
use std::process;

use eddy::{app, KernelCatalog, VisualizerConfig};

fn main() {
    env_logger::init();
    log::info!("eddy {}", env!("CARGO_PKG_VERSION"));

    let config = VisualizerConfig::load_or_default(Path::new("eddy.json"));
    let catalog = KernelCatalog::load(Path::new(&config.shaders_dir));

    if let Err(error) = app::run(config, catalog) {
        log::error!("event loop error: {error}");
        process::exit(1);
    }
}
