use bevy_ecs::prelude::Component;
use image::RgbaImage;

use crate::components::recolor::SourceSelector;
use crate::raster::PixelRect;

/// Sprite is identified by an image key, an optional region inside that image
/// and the size of the raster drawn for it.
///
/// `region: None` selects the whole image. `size: None` is resolved to the
/// image's native size on the first draw and written back.
/// The origin is a fraction of the sprite's own size; it shifts the sprite
/// relative to its centered placement around [`MapPosition`](crate::components::mapposition::MapPosition).
#[derive(Component, Clone, Debug)]
pub struct Sprite {
    pub image_key: String,
    pub region: Option<PixelRect>,
    pub size: Option<(u32, u32)>,
    pub origin_x: f32,
    pub origin_y: f32,
}

impl Sprite {
    pub fn new(image_key: impl Into<String>) -> Self {
        Self {
            image_key: image_key.into(),
            region: None,
            size: None,
            origin_x: 0.0,
            origin_y: 0.0,
        }
    }

    pub fn with_region(mut self, region: PixelRect) -> Self {
        self.region = Some(region);
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = Some((width, height));
        self
    }

    pub fn with_origin(mut self, x: f32, y: f32) -> Self {
        self.origin_x = x;
        self.origin_y = y;
        self
    }

    /// Destination size, defaulting to the native size of `image`.
    pub fn resolve_size(&mut self, image: &RgbaImage) -> (u32, u32) {
        *self.size.get_or_insert_with(|| image.dimensions())
    }

    /// Selector for the current frame. Resolves the size as a side effect.
    pub fn selector(&mut self, image: &RgbaImage) -> SourceSelector {
        let (width, height) = self.resolve_size(image);
        SourceSelector {
            image_key: self.image_key.clone(),
            region: self.region.unwrap_or_else(|| PixelRect::of_image(image)),
            width,
            height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_defaults_to_image() {
        let img = RgbaImage::new(16, 8);
        let mut sprite = Sprite::new("hero").with_region(PixelRect::new(0, 0, 4, 4));
        assert_eq!(sprite.resolve_size(&img), (16, 8));
        assert_eq!(sprite.size, Some((16, 8)));
    }

    #[test]
    fn test_explicit_size_is_kept() {
        let img = RgbaImage::new(16, 8);
        let mut sprite = Sprite::new("hero").with_size(32, 32);
        assert_eq!(sprite.resolve_size(&img), (32, 32));
    }

    #[test]
    fn test_selector_defaults_to_whole_image() {
        let img = RgbaImage::new(3, 5);
        let mut sprite = Sprite::new("hero");
        let sel = sprite.selector(&img);
        assert_eq!(sel.image_key, "hero");
        assert_eq!(sel.region, PixelRect::new(0, 0, 3, 5));
        assert_eq!((sel.width, sel.height), (3, 5));
    }
}
