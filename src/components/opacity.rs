//! Per-entity opacity.
//!
//! [`Opacity`] multiplies into the surface's global alpha when the sprite is
//! drawn. It does not touch the pixels of the cached raster.

use bevy_ecs::prelude::Component;

#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Opacity(pub f32);

impl Opacity {
    /// Create an opacity clamped to `[0, 1]`.
    pub fn new(alpha: f32) -> Self {
        Self(alpha.clamp(0.0, 1.0))
    }
}

impl Default for Opacity {
    fn default() -> Self {
        Self(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps() {
        assert_eq!(Opacity::new(2.0).0, 1.0);
        assert_eq!(Opacity::new(-1.0).0, 0.0);
        assert_eq!(Opacity::new(0.25).0, 0.25);
    }

    #[test]
    fn test_default_is_opaque() {
        assert_eq!(Opacity::default().0, 1.0);
    }
}
