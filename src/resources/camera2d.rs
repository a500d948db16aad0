//! Shared 2D camera resource.
//!
//! The camera is a plain translation: everything drawn in world space is
//! shifted by `-(x, y)` before it reaches the surface.

use bevy_ecs::prelude::Resource;

/// ECS resource that holds the active camera offset.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq)]
pub struct CameraOffset {
    pub x: f32,
    pub y: f32,
}

impl CameraOffset {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Convert a world position to surface coordinates.
    pub fn to_screen(&self, x: f32, y: f32) -> (f32, f32) {
        (x - self.x, y - self.y)
    }
}
