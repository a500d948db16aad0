//! Named source images.
//!
//! [`ImageStore`] is the lookup service sprites resolve their `image_key`
//! against. Images are decoded to RGBA once at load time and shared by every
//! sprite that names them; recolored copies live in each entity's
//! [`Recolor`](crate::components::recolor::Recolor) cache, never here.

use crate::error::RecolorError;
use bevy_ecs::prelude::Resource;
use image::RgbaImage;
use log::info;
use rustc_hash::FxHashMap;
use std::path::Path;

#[derive(Resource, Debug, Default)]
pub struct ImageStore {
    map: FxHashMap<String, RgbaImage>,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an image under `id`.
    pub fn insert(&mut self, id: impl Into<String>, image: RgbaImage) {
        self.map.insert(id.into(), image);
    }

    /// Decode an image file and store it under `id`.
    pub fn load_png(
        &mut self,
        id: impl Into<String>,
        path: impl AsRef<Path>,
    ) -> Result<(u32, u32), RecolorError> {
        let path = path.as_ref();
        let image = image::open(path)?.to_rgba8();
        let dims = image.dimensions();
        let id = id.into();
        info!(
            "Loaded image '{}' from {} ({}x{})",
            id,
            path.display(),
            dims.0,
            dims.1
        );
        self.map.insert(id, image);
        Ok(dims)
    }

    pub fn get(&self, id: impl AsRef<str>) -> Option<&RgbaImage> {
        self.map.get(id.as_ref())
    }

    /// Like [`get`](Self::get), but a missing image is a [`RecolorError::MissingImage`].
    pub fn require(&self, id: &str) -> Result<&RgbaImage, RecolorError> {
        self.map
            .get(id)
            .ok_or_else(|| RecolorError::MissingImage(id.to_string()))
    }

    pub fn remove(&mut self, id: impl AsRef<str>) -> Option<RgbaImage> {
        self.map.remove(id.as_ref())
    }

    pub fn contains(&self, id: impl AsRef<str>) -> bool {
        self.map.contains_key(id.as_ref())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_insert_get_remove() {
        let mut store = ImageStore::new();
        store.insert("a", RgbaImage::new(2, 3));
        assert!(store.contains("a"));
        assert_eq!(store.get("a").map(|i| i.dimensions()), Some((2, 3)));
        assert!(store.get("b").is_none());
        assert!(store.remove("a").is_some());
        assert!(store.is_empty());
    }

    #[test]
    fn test_require_reports_missing_key() {
        let mut store = ImageStore::new();
        store.insert("a", RgbaImage::new(1, 1));
        assert!(store.require("a").is_ok());
        match store.require("b") {
            Err(RecolorError::MissingImage(key)) => assert_eq!(key, "b"),
            other => panic!("expected MissingImage, got {:?}", other),
        }
    }

    #[test]
    fn test_load_png_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tile.png");
        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(0, 0, Rgba([1, 2, 3, 255]));
        img.put_pixel(1, 0, Rgba([4, 5, 6, 0]));
        img.save(&path).unwrap();

        let mut store = ImageStore::new();
        assert_eq!(store.load_png("tile", &path).unwrap(), (2, 1));
        let loaded = store.get("tile").unwrap();
        assert_eq!(*loaded.get_pixel(0, 0), Rgba([1, 2, 3, 255]));
        assert_eq!(*loaded.get_pixel(1, 0), Rgba([4, 5, 6, 0]));
    }

    #[test]
    fn test_load_missing_file_fails() {
        let mut store = ImageStore::new();
        assert!(store.load_png("nope", "/definitely/not/here.png").is_err());
        assert!(!store.contains("nope"));
    }
}
