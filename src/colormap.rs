//! Exact-color substitution table.
//!
//! A [`ColorMap`] holds `source -> target` rules keyed by [`ColorTriple`].
//! Matching is exact on all three channels; there is no tolerance. Alpha is
//! not part of the key, it is governed by the [`AlphaPolicy`] that travels
//! with the map.
//!
//! # Removal semantics
//!
//! [`RemovalMode::Exact`] removes the single rule whose source triple equals
//! the given one. [`RemovalMode::Legacy`] reproduces an older channel-wise
//! predicate that keeps only the rules whose source differs from the given
//! triple in *every* channel; any rule sharing at least one channel value is
//! dropped as well. Legacy mode exists for content authored against that
//! behavior and is opt-in through configuration.

use crate::error::RecolorError;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque RGB color used as both key and value of a [`ColorMap`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "[i64; 3]", into = "[u8; 3]")]
pub struct ColorTriple {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl ColorTriple {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build a triple from untyped host values, rejecting anything outside `0..=255`.
    pub fn try_from_ints(r: i64, g: i64, b: i64) -> Result<Self, RecolorError> {
        Ok(Self {
            r: channel('r', r)?,
            g: channel('g', g)?,
            b: channel('b', b)?,
        })
    }
}

fn channel(name: char, value: i64) -> Result<u8, RecolorError> {
    u8::try_from(value).map_err(|_| RecolorError::InvalidColorValue {
        channel: name,
        value,
    })
}

impl TryFrom<[i64; 3]> for ColorTriple {
    type Error = RecolorError;

    fn try_from(value: [i64; 3]) -> Result<Self, Self::Error> {
        Self::try_from_ints(value[0], value[1], value[2])
    }
}

impl From<[u8; 3]> for ColorTriple {
    fn from(value: [u8; 3]) -> Self {
        Self::new(value[0], value[1], value[2])
    }
}

impl From<ColorTriple> for [u8; 3] {
    fn from(value: ColorTriple) -> Self {
        [value.r, value.g, value.b]
    }
}

impl fmt::Display for ColorTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.r, self.g, self.b)
    }
}

/// How [`ColorMap::remove`] selects the rules to drop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RemovalMode {
    /// Remove the rule whose source equals the given triple.
    #[default]
    Exact,
    /// Keep only rules whose source differs in every channel.
    Legacy,
}

impl RemovalMode {
    /// Parse the configuration spelling (`exact` / `legacy`).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "exact" => Some(RemovalMode::Exact),
            "legacy" => Some(RemovalMode::Legacy),
            _ => None,
        }
    }
}

/// What happens to the alpha channel of a substituted pixel.
///
/// Pixels that match no rule are never touched, whatever the policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AlphaPolicy {
    /// Leave the source alpha in place.
    pub keep_original: bool,
    /// Alpha written to substituted pixels when `keep_original` is false.
    pub override_alpha: u8,
}

impl Default for AlphaPolicy {
    fn default() -> Self {
        Self {
            keep_original: true,
            override_alpha: u8::MAX,
        }
    }
}

impl AlphaPolicy {
    /// Alpha for a substituted pixel whose source alpha was `original`.
    #[inline]
    pub fn resolve(&self, original: u8) -> u8 {
        if self.keep_original {
            original
        } else {
            self.override_alpha
        }
    }
}

/// Source-to-target color rules with unique, value-compared keys.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColorMap {
    rules: FxHashMap<ColorTriple, ColorTriple>,
}

impl ColorMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a rule, replacing any existing target for `from`.
    pub fn insert(&mut self, from: ColorTriple, to: ColorTriple) {
        self.rules.insert(from, to);
    }

    /// Remove rules matching `from` under `mode`. Returns how many were dropped.
    pub fn remove(&mut self, from: ColorTriple, mode: RemovalMode) -> usize {
        let before = self.rules.len();
        match mode {
            RemovalMode::Exact => {
                self.rules.remove(&from);
            }
            RemovalMode::Legacy => {
                self.rules
                    .retain(|k, _| k.r != from.r && k.g != from.g && k.b != from.b);
            }
        }
        before - self.rules.len()
    }

    /// Target color for an exact match on `pixel`, if any.
    #[inline]
    pub fn lookup(&self, pixel: ColorTriple) -> Option<ColorTriple> {
        self.rules.get(&pixel).copied()
    }

    pub fn clear(&mut self) {
        self.rules.clear();
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ColorTriple, &ColorTriple)> {
        self.rules.iter()
    }
}
