//! Render configuration resource.
//!
//! Holds the injected settings of the recolor pipeline, loaded from an INI
//! file. Defaults are safe for startup; a missing or unreadable file simply
//! keeps them.
//!
//! # Configuration File Format
//!
//! ```ini
//! [render]
//! sampling = nearest
//! canvas_width = 320
//! canvas_height = 240
//!
//! [recolor]
//! removal = exact
//! ```

use crate::colormap::RemovalMode;
use crate::raster::SamplingMode;
use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::{info, warn};
use std::path::PathBuf;

/// Default safe values for startup
const DEFAULT_CANVAS_WIDTH: u32 = 320;
const DEFAULT_CANVAS_HEIGHT: u32 = 240;
const DEFAULT_CONFIG_PATH: &str = "./config.ini";

/// Render configuration resource.
#[derive(Resource, Debug, Clone)]
pub struct RenderConfig {
    /// Sampling used when a sprite's region is scaled to its destination size.
    pub sampling: SamplingMode,
    /// How `remove_mapping` matches rules on newly configured sprites.
    pub removal: RemovalMode,
    /// Width of the output surface in pixels.
    pub canvas_width: u32,
    /// Height of the output surface in pixels.
    pub canvas_height: u32,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            sampling: SamplingMode::default(),
            removal: RemovalMode::default(),
            canvas_width: DEFAULT_CANVAS_WIDTH,
            canvas_height: DEFAULT_CANVAS_HEIGHT,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current values; unrecognized ones are
    /// logged and ignored. Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;

        // [render] section
        if let Some(sampling) = config.get("render", "sampling") {
            match SamplingMode::parse(&sampling) {
                Some(mode) => self.sampling = mode,
                None => warn!("Unknown sampling mode '{}', keeping {:?}", sampling, self.sampling),
            }
        }
        if let Some(width) = config.getuint("render", "canvas_width").ok().flatten() {
            match u32::try_from(width) {
                Ok(width) => self.canvas_width = width,
                Err(_) => warn!("canvas_width {} out of range, keeping {}", width, self.canvas_width),
            }
        }
        if let Some(height) = config.getuint("render", "canvas_height").ok().flatten() {
            match u32::try_from(height) {
                Ok(height) => self.canvas_height = height,
                Err(_) => warn!("canvas_height {} out of range, keeping {}", height, self.canvas_height),
            }
        }

        // [recolor] section
        if let Some(removal) = config.get("recolor", "removal") {
            match RemovalMode::parse(&removal) {
                Some(mode) => self.removal = mode,
                None => warn!("Unknown removal mode '{}', keeping {:?}", removal, self.removal),
            }
        }

        info!(
            "Loaded config: sampling={:?}, removal={:?}, canvas={}x{}",
            self.sampling, self.removal, self.canvas_width, self.canvas_height
        );

        Ok(())
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();

        let sampling = match self.sampling {
            SamplingMode::Nearest => "nearest",
            SamplingMode::Smooth => "smooth",
        };
        let removal = match self.removal {
            RemovalMode::Exact => "exact",
            RemovalMode::Legacy => "legacy",
        };

        // [render] section
        config.set("render", "sampling", Some(sampling.to_string()));
        config.set("render", "canvas_width", Some(self.canvas_width.to_string()));
        config.set("render", "canvas_height", Some(self.canvas_height.to_string()));

        // [recolor] section
        config.set("recolor", "removal", Some(removal.to_string()));

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }
}
