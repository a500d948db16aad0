use bevy_ecs::prelude::Component;

#[derive(Component, Clone, Debug, Copy, PartialEq)]
pub struct Scale {
    pub x: f32,
    pub y: f32,
}
impl Scale {
    pub fn new(sx: f32, sy: f32) -> Self {
        Self { x: sx, y: sy }
    }
}
impl Default for Scale {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}
