use anyhow::{Context, Result};
use image::{imageops, ImageReader, RgbImage};
use std::path::Path;

/// Crop box in source pixel coordinates (right/bottom exclusive).
/// Centers the face of a 178x218 aligned CelebA frame.
pub const CROP_LEFT: u32 = 15;
pub const CROP_TOP: u32 = 40;
pub const CROP_RIGHT: u32 = 178 - 15;
pub const CROP_BOTTOM: u32 = 218 - 30;

pub const CROP_WIDTH: u32 = CROP_RIGHT - CROP_LEFT;
pub const CROP_HEIGHT: u32 = CROP_BOTTOM - CROP_TOP;

/// Load an image, drop alpha/palette information and crop the face box.
/// The decoder is chosen from the file contents, not the extension.
pub fn read_and_crop(input_path: &Path) -> Result<RgbImage> {
    let img = ImageReader::open(input_path)
        .and_then(|reader| reader.with_guessed_format())
        .with_context(|| format!("Failed to open image: {}", input_path.display()))?
        .decode()
        .with_context(|| format!("Failed to decode image: {}", input_path.display()))?;

    Ok(crop_face(&img.to_rgb8()))
}

/// Cut the fixed crop box out of an RGB image.
///
/// The result is always `CROP_WIDTH` x `CROP_HEIGHT`. If the source frame is
/// smaller than the box, the uncovered area stays black.
pub fn crop_face(img: &RgbImage) -> RgbImage {
    if img.width() >= CROP_RIGHT && img.height() >= CROP_BOTTOM {
        return imageops::crop_imm(img, CROP_LEFT, CROP_TOP, CROP_WIDTH, CROP_HEIGHT).to_image();
    }

    let mut cropped = RgbImage::new(CROP_WIDTH, CROP_HEIGHT);
    imageops::replace(
        &mut cropped,
        img,
        -(CROP_LEFT as i64),
        -(CROP_TOP as i64),
    );
    cropped
}
