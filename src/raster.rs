//! Raster crop, scale and color substitution.
//!
//! [`remap_region`] is the pure transform behind the sprite cache: it crops a
//! region out of a source image, scales it to the destination size and then
//! rewrites every pixel whose RGB matches a rule of the [`ColorMap`].
//!
//! Exact matching is only meaningful when scaling introduces no new colors, so
//! [`SamplingMode::Nearest`] is the default. [`SamplingMode::Smooth`] is kept
//! for hosts that want filtered output and accept that blended edge pixels will
//! not be substituted.

use crate::colormap::{AlphaPolicy, ColorMap, ColorTriple};
use crate::error::RecolorError;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use std::fmt;

/// Integer rectangle inside an image, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The full extent of `image`.
    pub fn of_image(image: &RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self::new(0, 0, width, height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// True if the rectangle lies entirely inside a `width` x `height` image.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        let right = self.x.checked_add(self.width);
        let bottom = self.y.checked_add(self.height);
        matches!((right, bottom), (Some(r), Some(b)) if r <= width && b <= height)
    }
}

impl fmt::Display for PixelRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

/// Interpolation used when the source region and destination differ in size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SamplingMode {
    /// Nearest-neighbor; output pixels are always copies of source pixels.
    #[default]
    Nearest,
    /// Bilinear filtering.
    Smooth,
}

impl SamplingMode {
    /// Parse the configuration spelling (`nearest`/`pixelated`, `smooth`/`bilinear`).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "nearest" | "pixelated" => Some(SamplingMode::Nearest),
            "smooth" | "bilinear" => Some(SamplingMode::Smooth),
            _ => None,
        }
    }

    fn filter(self) -> FilterType {
        match self {
            SamplingMode::Nearest => FilterType::Nearest,
            SamplingMode::Smooth => FilterType::Triangle,
        }
    }
}

/// Copy `region` out of `source` into a new `dest_width` x `dest_height` raster.
pub fn crop_and_scale(
    source: &RgbaImage,
    region: PixelRect,
    dest_width: u32,
    dest_height: u32,
    sampling: SamplingMode,
) -> Result<RgbaImage, RecolorError> {
    if dest_width == 0 || dest_height == 0 {
        return Err(RecolorError::InvalidDimensions {
            width: dest_width,
            height: dest_height,
        });
    }
    if region.is_empty() {
        return Err(RecolorError::InvalidDimensions {
            width: region.width,
            height: region.height,
        });
    }
    let (image_width, image_height) = source.dimensions();
    if !region.fits_within(image_width, image_height) {
        return Err(RecolorError::OutOfBoundsRegion {
            region,
            image_width,
            image_height,
        });
    }

    let cropped =
        imageops::crop_imm(source, region.x, region.y, region.width, region.height).to_image();
    if cropped.dimensions() == (dest_width, dest_height) {
        return Ok(cropped);
    }
    Ok(imageops::resize(
        &cropped,
        dest_width,
        dest_height,
        sampling.filter(),
    ))
}

/// Rewrite every pixel of `raster` that matches a rule in `map`.
///
/// Returns the number of substituted pixels.
pub fn apply_color_map(raster: &mut RgbaImage, map: &ColorMap, policy: AlphaPolicy) -> usize {
    if map.is_empty() {
        return 0;
    }
    let mut substituted = 0;
    for pixel in raster.pixels_mut() {
        let Rgba([r, g, b, a]) = *pixel;
        if let Some(to) = map.lookup(ColorTriple::new(r, g, b)) {
            *pixel = Rgba([to.r, to.g, to.b, policy.resolve(a)]);
            substituted += 1;
        }
    }
    substituted
}

/// Crop, scale and recolor in one step. Same inputs always give the same bytes.
pub fn remap_region(
    source: &RgbaImage,
    region: PixelRect,
    dest_width: u32,
    dest_height: u32,
    map: &ColorMap,
    policy: AlphaPolicy,
    sampling: SamplingMode,
) -> Result<RgbaImage, RecolorError> {
    let mut raster = crop_and_scale(source, region, dest_width, dest_height, sampling)?;
    apply_color_map(&mut raster, map, policy);
    Ok(raster)
}
