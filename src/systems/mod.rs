//! Frame systems.
//!
//! - [`render`] – draws recolorable sprites onto a [`Surface2D`](crate::surface::Surface2D)
pub mod render;
