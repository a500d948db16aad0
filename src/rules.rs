//! JSON recolor rule files.
//!
//! ```json
//! {
//!   "keep_alpha": false,
//!   "alpha": 128,
//!   "mappings": [
//!     { "from": [10, 20, 30], "to": [200, 200, 200] }
//!   ]
//! }
//! ```
//!
//! Channel values outside `0..=255` are rejected while parsing.

use crate::colormap::ColorTriple;
use crate::components::recolor::Recolor;
use crate::error::RecolorError;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ColorRule {
    pub from: ColorTriple,
    pub to: ColorTriple,
}

/// Structure representing a recolor rule file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RecolorRules {
    #[serde(default = "default_keep_alpha")]
    pub keep_alpha: bool,
    #[serde(default = "default_alpha")]
    pub alpha: u8,
    #[serde(default)]
    pub mappings: Vec<ColorRule>,
}

fn default_keep_alpha() -> bool {
    true
}

fn default_alpha() -> u8 {
    u8::MAX
}

impl Default for RecolorRules {
    fn default() -> Self {
        Self {
            keep_alpha: default_keep_alpha(),
            alpha: default_alpha(),
            mappings: Vec::new(),
        }
    }
}

impl RecolorRules {
    pub fn from_json(text: &str) -> Result<Self, RecolorError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Loads rules from a JSON file at the specified path.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, RecolorError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Apply alpha policy and mappings to `recolor`, on top of existing rules.
    pub fn apply_to(&self, recolor: &mut Recolor) {
        recolor.keep_alpha(self.keep_alpha).set_alpha(self.alpha);
        for rule in &self.mappings {
            recolor.set_mapping(rule.from, rule.to);
        }
    }
}
