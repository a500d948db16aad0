//! ECS components for sprite entities.
//!
//! Submodules overview:
//! - [`mapposition`] – world-space position of an entity
//! - [`opacity`] – per-entity alpha multiplied into the draw
//! - [`recolor`] – color substitution rules and the per-entity render cache
//! - [`scale`] – 2D scale factor for sprites
//! - [`sprite`] – image key, source region, size and origin
//! - [`zindex`] – rendering order hint for 2D drawing

pub mod mapposition;
pub mod opacity;
pub mod recolor;
pub mod scale;
pub mod sprite;
pub mod zindex;
