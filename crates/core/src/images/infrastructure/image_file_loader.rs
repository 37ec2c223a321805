use std::path::Path;

use image::imageops::FilterType;
use image::DynamicImage;

use crate::grouping::domain::group_checker::LoadOptions;
use crate::images::domain::image_loader::{ImageLoader, LoadError};
use crate::shared::frame::Frame;

/// Loads images from the filesystem using the `image` crate.
///
/// References are paths, resolved against the working directory.
pub struct ImageFileLoader;

impl ImageFileLoader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageLoader for ImageFileLoader {
    fn load(&self, reference: &str, options: LoadOptions) -> Result<Frame, LoadError> {
        if !(options.scale > 0.0 && options.scale <= 1.0) {
            return Err(LoadError::InvalidScale(options.scale));
        }
        let path = Path::new(reference);
        if !path.is_file() {
            return Err(LoadError::NotFound(reference.to_string()));
        }

        let decoded = image::open(path).map_err(|e| LoadError::Decode {
            reference: reference.to_string(),
            message: e.to_string(),
        })?;
        let resized = rescale(decoded, options.scale);

        let frame = if options.grayscale {
            let img = resized.to_luma8();
            Frame::new(img.as_raw().clone(), img.width(), img.height(), 1, 0)
        } else {
            let img = resized.to_rgb8();
            Frame::new(img.as_raw().clone(), img.width(), img.height(), 3, 0)
        };
        Ok(frame)
    }
}

fn rescale(image: DynamicImage, scale: f64) -> DynamicImage {
    if scale == 1.0 {
        return image;
    }
    let w = ((image.width() as f64 * scale).round() as u32).max(1);
    let h = ((image.height() as f64 * scale).round() as u32).max(1);
    image.resize_exact(w, h, FilterType::Triangle)
}
