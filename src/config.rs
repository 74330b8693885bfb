use std::{
    io,
    path::{Path, PathBuf},
};

use crate::error::{Error, Result};

pub const CONFIG_FILE: &str = "config.json";

#[derive(serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub viewport: [f32; 2],
    pub image_dir: Option<PathBuf>,
    pub extensions: Vec<String>,
    pub crop_prefix: String,
    /// Shorter drags are treated as clicks and ignored.
    pub min_drag_distance: f32,
    pub default_label: String,
    pub advance_after_annotate: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            viewport: [1200.0, 800.0],
            image_dir: None,
            extensions: ["jpg", "jpeg", "png", "bmp"]
                .into_iter()
                .map(String::from)
                .collect(),
            crop_prefix: "crop_".into(),
            min_drag_distance: 5.0,
            default_label: "object".into(),
            advance_after_annotate: true,
        }
    }
}

impl Config {
    /// A missing file yields the defaults, anything unreadable is an error.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::File::open(path) {
            Ok(f) => serde_json::from_reader(io::BufReader::new(f)).map_err(|source| {
                Error::Config {
                    path: path.to_path_buf(),
                    source,
                }
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(Error::io(path)(e)),
        }
    }

    /// The first command line argument wins over `image_dir`.
    pub fn with_args(mut self, mut args: impl Iterator<Item = String>) -> Self {
        if let Some(dir) = args.nth(1) {
            self.image_dir = Some(dir.into());
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, r#"{ "crop_prefix": "cut_", "viewport": [640, 480] }"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.crop_prefix, "cut_");
        assert_eq!(config.viewport, [640.0, 480.0]);
        assert_eq!(config.extensions, Config::default().extensions);
        assert!(config.advance_after_annotate);
    }

    #[test]
    fn malformed_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(Config::load(&path), Err(Error::Config { .. })));
    }

    #[test]
    fn first_argument_overrides_image_dir() {
        let config = Config {
            image_dir: Some("from-config".into()),
            ..Default::default()
        };
        let args = ["crop-tool", "/tmp/shots"].into_iter().map(String::from);
        assert_eq!(
            config.with_args(args).image_dir,
            Some(PathBuf::from("/tmp/shots"))
        );

        let kept = Config::default().with_args(std::iter::once("crop-tool".to_string()));
        assert_eq!(kept.image_dir, None);
    }
}
