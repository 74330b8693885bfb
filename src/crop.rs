use std::path::{Path, PathBuf};

use log::info;

use crate::{
    error::{Error, Result},
    geometry::PixelRect,
};

/// `dir/cat.png` -> `dir/{prefix}cat.png`
pub fn crop_path(image_path: &Path, prefix: &str) -> PathBuf {
    let name = image_path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy();
    image_path.with_file_name(format!("{prefix}{name}"))
}

/// Writes `rect` of the image next to it and returns the new file. The
/// format follows the original extension.
pub fn crop_to_sibling(image_path: &Path, rect: PixelRect, prefix: &str) -> Result<PathBuf> {
    let img = image::open(image_path).map_err(Error::image(image_path))?;
    let rect = rect
        .clamp_to(img.width(), img.height())
        .ok_or(Error::EmptySelection)?;

    let cropped = img.crop_imm(rect.x, rect.y, rect.width, rect.height);
    let out_path = crop_path(image_path, prefix);
    cropped.save(&out_path).map_err(Error::image(&out_path))?;
    info!(
        "Cropped {} ({}x{}+{}+{}) to {}",
        image_path.display(),
        rect.width,
        rect.height,
        rect.x,
        rect.y,
        out_path.display()
    );
    Ok(out_path)
}
