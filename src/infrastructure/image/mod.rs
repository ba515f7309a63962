// ============================================================
// IMAGE INFRASTRUCTURE LAYER
// ============================================================
// Crop and resize image files in place

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, info};

use crate::domain::error::{FileError, Result};
use crate::infrastructure::file::FileHandle;

/// Largest side `resize` will produce.
pub const MAX_SIDE: u32 = 65_535;

/// Largest pixel count `resize` will produce.
pub const MAX_PIXELS: u64 = 64 * 1024 * 1024;

/// Image file on top of a [`FileHandle`]. Edits are written back to the same
/// path in the same format.
#[derive(Debug)]
pub struct ImageHandle {
    handle: FileHandle,
}

impl ImageHandle {
    pub fn new(handle: FileHandle) -> Self {
        Self { handle }
    }

    /// Open `path` in `rb` mode
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(FileHandle::open(path)?))
    }

    pub fn handle(&self) -> &FileHandle {
        &self.handle
    }

    pub fn handle_mut(&mut self) -> &mut FileHandle {
        &mut self.handle
    }

    pub fn into_inner(self) -> FileHandle {
        self.handle
    }

    pub fn path(&self) -> &Path {
        self.handle.path()
    }

    /// Mime type of the file, e.g. `image/png`
    pub fn format(&self) -> Result<&str> {
        self.handle.mime_type()
    }

    /// `(width, height)` in pixels
    pub fn dimensions(&self) -> Result<(u32, u32)> {
        let image = self.decode()?;
        Ok((image.width(), image.height()))
    }

    /// Keep the rectangle between corners `(x1, y1)` and `(x2, y2)`.
    ///
    /// Needs `x1 < x2` and `y1 < y2` with the far corner inside the image.
    pub fn crop(&mut self, x1: u32, y1: u32, x2: u32, y2: u32) -> Result<()> {
        if x1 >= x2 || y1 >= y2 {
            return Err(FileError::image(
                self.path(),
                format!("Invalid crop rectangle ({x1}, {y1})-({x2}, {y2})"),
            ));
        }

        let image = self.decode()?;
        if x2 > image.width() || y2 > image.height() {
            return Err(FileError::image(
                self.path(),
                format!(
                    "Crop rectangle ({x1}, {y1})-({x2}, {y2}) exceeds {}x{} image",
                    image.width(),
                    image.height()
                ),
            ));
        }

        let cropped = image.crop_imm(x1, y1, x2 - x1, y2 - y1);
        self.write_back(&cropped)
    }

    /// Scale both sides by `scale`. Each side stays at least one pixel and at
    /// most [`MAX_SIDE`], with no more than [`MAX_PIXELS`] in total.
    pub fn resize(&mut self, scale: f64) -> Result<()> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(FileError::image(
                self.path(),
                format!("Scale must be a positive number, got {scale}"),
            ));
        }

        let image = self.decode()?;
        let target = match (scaled(image.width(), scale), scaled(image.height(), scale)) {
            (Some(width), Some(height)) if width as u64 * height as u64 <= MAX_PIXELS => {
                Some((width, height))
            }
            _ => None,
        };
        let Some((width, height)) = target else {
            return Err(FileError::image(
                self.path(),
                format!(
                    "Scaling {}x{} by {scale} exceeds the size limit",
                    image.width(),
                    image.height()
                ),
            ));
        };
        let resized = image.resize_exact(width, height, FilterType::Lanczos3);
        self.write_back(&resized)
    }

    fn image_format(&self) -> Result<ImageFormat> {
        if let Ok(format) = ImageFormat::from_path(self.path()) {
            return Ok(format);
        }
        let mime_type = self.handle.mime_type()?;
        ImageFormat::from_mime_type(mime_type).ok_or_else(|| {
            FileError::image(self.path(), format!("Unsupported image type '{}'", mime_type))
        })
    }

    fn decode(&self) -> Result<DynamicImage> {
        let format = self.image_format()?;
        let file = File::open(self.path())
            .map_err(|e| FileError::io(self.path(), format!("Could not open the image: {e}")))?;
        let image = image::load(BufReader::new(file), format)
            .map_err(|e| FileError::image(self.path(), format!("Could not decode image: {e}")))?;
        debug!(
            path = %self.path().display(),
            width = image.width(),
            height = image.height(),
            "Decoded image"
        );
        Ok(image)
    }

    fn write_back(&mut self, image: &DynamicImage) -> Result<()> {
        let format = self.image_format()?;
        // Drop any buffered reads of the old bytes.
        self.handle.close()?;
        image
            .save_with_format(self.path(), format)
            .map_err(|e| FileError::image(self.path(), format!("Could not write image: {e}")))?;
        info!(
            path = %self.path().display(),
            width = image.width(),
            height = image.height(),
            "Wrote image"
        );
        Ok(())
    }
}

fn scaled(side: u32, scale: f64) -> Option<u32> {
    let side = (side as f64 * scale).round();
    if side > MAX_SIDE as f64 {
        return None;
    }
    Some((side as u32).max(1))
}
