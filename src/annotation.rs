use std::{
    io,
    path::{Path, PathBuf},
};

use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    geometry::PixelRect,
};

/// One labelled bounding box, stored as JSON next to its image.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxAnnotation {
    /// File name of the annotated image.
    pub image: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub label: String,
    pub bbox: PixelRect,
}

impl BoxAnnotation {
    pub fn new(
        image_path: &Path,
        size: [u32; 2],
        label: impl Into<String>,
        bbox: PixelRect,
    ) -> Self {
        Self {
            image: image_path
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .into_owned(),
            width: size[0],
            height: size[1],
            label: label.into(),
            bbox,
        }
    }
}

/// `cat.png` -> `cat.png.json`
pub fn sidecar_path(image_path: &Path) -> PathBuf {
    let mut name = image_path.file_name().unwrap_or_default().to_os_string();
    name.push(".json");
    image_path.with_file_name(name)
}

pub fn exists(image_path: &Path) -> bool {
    sidecar_path(image_path).is_file()
}

pub fn load(image_path: &Path) -> Result<Option<BoxAnnotation>> {
    let path = sidecar_path(image_path);
    let data = match std::fs::read_to_string(&path) {
        Ok(data) => data,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(Error::io(&path)(e)),
    };
    serde_json::from_str(&data)
        .map(Some)
        .map_err(Error::json(&path))
}

pub fn save(image_path: &Path, annotation: &BoxAnnotation) -> Result<PathBuf> {
    let path = sidecar_path(image_path);
    let data = serde_json::to_string_pretty(annotation).map_err(Error::json(&path))?;
    std::fs::write(&path, data).map_err(Error::io(&path))?;
    info!("Saved {:?} to {}", annotation.bbox, path.display());
    Ok(path)
}

/// Returns whether there was anything to remove.
pub fn remove(image_path: &Path) -> Result<bool> {
    let path = sidecar_path(image_path);
    match std::fs::remove_file(&path) {
        Ok(()) => {
            info!("Removed {}", path.display());
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io(&path)(e)),
    }
}
