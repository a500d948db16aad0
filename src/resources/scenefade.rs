//! Scene-wide opacity.
//!
//! While a scene fades in or out the host sets `opacity_mode` and animates
//! `alpha`; every sprite's own opacity is then multiplied by it.

use bevy_ecs::prelude::Resource;

#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct SceneFade {
    /// When false, `alpha` is ignored.
    pub opacity_mode: bool,
    pub alpha: f32,
}

impl Default for SceneFade {
    fn default() -> Self {
        Self {
            opacity_mode: false,
            alpha: 1.0,
        }
    }
}

impl SceneFade {
    /// Global alpha for an entity with the given opacity.
    pub fn blend(&self, entity_alpha: f32) -> f32 {
        let scene = if self.opacity_mode { self.alpha } else { 1.0 };
        (entity_alpha * scene).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_ignores_alpha_outside_opacity_mode() {
        let fade = SceneFade {
            opacity_mode: false,
            alpha: 0.2,
        };
        assert_eq!(fade.blend(0.5), 0.5);
    }

    #[test]
    fn test_blend_multiplies_in_opacity_mode() {
        let fade = SceneFade {
            opacity_mode: true,
            alpha: 0.5,
        };
        assert_eq!(fade.blend(0.5), 0.25);
    }
}
