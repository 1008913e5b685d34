use anyhow::{Context, Result};
use image::RgbImage;
use std::path::{Path, PathBuf};

/// Create the output directory if needed.
/// Safe to call from several workers at once for the same directory.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))
}

/// Save an image under `dir/filename`, replacing any existing file.
/// The encoder is picked from the file extension.
pub fn save_image(dir: &Path, filename: &str, img: &RgbImage) -> Result<PathBuf> {
    ensure_dir(dir)?;

    let output_path = dir.join(filename);
    img.save(&output_path)
        .with_context(|| format!("Failed to save image: {}", output_path.display()))?;

    Ok(output_path)
}
