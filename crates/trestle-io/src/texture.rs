use anyhow::{Context, Result};
use image::RgbaImage;
use std::path::Path;
use tracing::info;

pub fn load_texture(path: impl AsRef<Path>) -> Result<RgbaImage> {
    let path = path.as_ref();
    let image = image::open(path).with_context(|| format!("decode texture {}", path.display()))?;
    let image = image.to_rgba8();
    info!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        "texture loaded"
    );
    Ok(image)
}
