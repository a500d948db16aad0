//! Error type shared by the recolor pipeline.
//!
//! Everything fallible in the crate returns [`RecolorError`]. The draw step
//! never surfaces [`RecolorError::MissingImage`]; it logs it and skips the
//! sprite for the frame instead.

use crate::raster::PixelRect;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecolorError {
    /// A color channel outside `0..=255`.
    #[error("invalid color value {value} for channel {channel} (expected 0-255)")]
    InvalidColorValue { channel: char, value: i64 },

    /// The crop rectangle does not fit inside the source image.
    #[error(
        "source region {region} exceeds image bounds ({image_width}x{image_height})"
    )]
    OutOfBoundsRegion {
        region: PixelRect,
        image_width: u32,
        image_height: u32,
    },

    /// A zero-sized source region or destination raster.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// The selector names an image that is not in the store.
    #[error("image '{0}' is not loaded")]
    MissingImage(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid recolor rules: {0}")]
    Rules(#[from] serde_json::Error),
}
