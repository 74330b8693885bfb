pub mod annotation;
pub mod annotator;
pub mod config;
pub mod crop;
pub mod cropper;
pub mod error;
pub mod folder;
pub mod geometry;
pub mod preview;
pub mod session;

pub use config::{Config, CONFIG_FILE};
pub use error::{Error, Result};
