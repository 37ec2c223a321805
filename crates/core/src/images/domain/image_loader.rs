use thiserror::Error;

use crate::grouping::domain::group_checker::LoadOptions;
use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("image not found: {0}")]
    NotFound(String),
    #[error("failed to decode {reference}: {message}")]
    Decode { reference: String, message: String },
    #[error("scale must be in (0, 1], got {0}")]
    InvalidScale(f64),
}

/// Turns an image reference into a decoded, rescaled frame.
pub trait ImageLoader: Send + Sync {
    fn load(&self, reference: &str, options: LoadOptions) -> Result<Frame, LoadError>;
}
