//! Recolor sprite library.
//!
//! Sprites whose pixels are selectively recolored before drawing. A sprite
//! entity carries a [`Recolor`](components::recolor::Recolor) component with
//! exact-color substitution rules; the render pass crops the sprite's region
//! from a shared source image, applies the rules, caches the result per entity
//! and blits it with camera-relative placement.

pub mod colormap;
pub mod components;
pub mod error;
pub mod events;
pub mod raster;
pub mod resources;
pub mod rules;
pub mod surface;
pub mod systems;
