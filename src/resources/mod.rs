//! ECS resources made available to the render pass.
//!
//! Overview
//! - `camera2d` – camera offset applied to world positions
//! - `debugmode` – presence toggles the anchor markers
//! - `imagestore` – loaded source images keyed by string IDs
//! - `renderconfig` – sampling and removal settings loaded from INI
//! - `scenefade` – scene-wide opacity blend
pub mod camera2d;
pub mod debugmode;
pub mod imagestore;
pub mod renderconfig;
pub mod scenefade;
