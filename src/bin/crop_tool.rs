use std::path::Path;

use image_curate::{cropper, Config, CONFIG_FILE};

fn main() -> eframe::Result {
    env_logger::init();
    let config = Config::load(Path::new(CONFIG_FILE))
        .map_err(|e| eframe::Error::AppCreation(Box::new(e)))?
        .with_args(std::env::args());
    cropper::run_native(config)
}
