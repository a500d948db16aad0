//! Per-entity color substitution with a cached result.
//!
//! The [`Recolor`] component sits next to a [`Sprite`](crate::components::sprite::Sprite)
//! and owns three things:
//! - the [`ColorMap`] and [`AlphaPolicy`] describing the substitution,
//! - a mapping version, bumped by every mutation,
//! - a [`RenderCache`] with the last transformed raster.
//!
//! The cached raster is reused as long as the [`SourceSelector`], the
//! [`SamplingMode`] and the mapping version it was built from are unchanged. Otherwise it is rebuilt
//! with [`remap_region`] and replaced as a whole; a cached raster is never
//! modified in place and is never shared between entities.
//!
//! [`SharedRecolor`] wraps the same state in a mutex for hosts that mutate
//! rules from other threads. Its clones are handles to one cache and belong
//! to a single entity.

use crate::colormap::{AlphaPolicy, ColorMap, ColorTriple, RemovalMode};
use crate::error::RecolorError;
use crate::raster::{PixelRect, SamplingMode, remap_region};
use bevy_ecs::prelude::Component;
use image::RgbaImage;
use log::debug;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Which pixels feed the transform and how large the output is.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SourceSelector {
    pub image_key: String,
    pub region: PixelRect,
    pub width: u32,
    pub height: u32,
}

type CacheKey = (SourceSelector, SamplingMode, u64);

/// Most recent transform output and the inputs that produced it.
#[derive(Clone, Debug, Default)]
pub struct RenderCache {
    key: Option<CacheKey>,
    raster: Option<Arc<RgbaImage>>,
    recomputes: u64,
}

impl RenderCache {
    /// True if the stored raster was built from `selector` with `sampling` at `version`.
    pub fn is_fresh(
        &self,
        selector: &SourceSelector,
        sampling: SamplingMode,
        version: u64,
    ) -> bool {
        self.raster.is_some()
            && matches!(
                &self.key,
                Some((s, m, v)) if *v == version && *m == sampling && s == selector
            )
    }

    fn fresh_raster(
        &self,
        selector: &SourceSelector,
        sampling: SamplingMode,
        version: u64,
    ) -> Option<Arc<RgbaImage>> {
        if !self.is_fresh(selector, sampling, version) {
            return None;
        }
        debug!(
            "recolor cache reused for '{}' {} at version {}",
            selector.image_key, selector.region, version
        );
        self.raster.clone()
    }

    /// Return the cached raster when fresh, otherwise build, store and return a new one.
    ///
    /// A failing `compute` leaves the cache untouched.
    pub fn ensure_fresh<F>(
        &mut self,
        selector: &SourceSelector,
        sampling: SamplingMode,
        version: u64,
        compute: F,
    ) -> Result<Arc<RgbaImage>, RecolorError>
    where
        F: FnOnce() -> Result<RgbaImage, RecolorError>,
    {
        if let Some(raster) = self.fresh_raster(selector, sampling, version) {
            return Ok(raster);
        }
        let raster = Arc::new(compute()?);
        self.store(selector.clone(), sampling, version, Arc::clone(&raster));
        Ok(raster)
    }

    fn store(
        &mut self,
        selector: SourceSelector,
        sampling: SamplingMode,
        version: u64,
        raster: Arc<RgbaImage>,
    ) {
        debug!(
            "recolor cache rebuilt for '{}' {} ({:?}) at version {}",
            selector.image_key, selector.region, sampling, version
        );
        self.key = Some((selector, sampling, version));
        self.raster = Some(raster);
        self.recomputes += 1;
    }

    pub fn raster(&self) -> Option<&RgbaImage> {
        self.raster.as_deref()
    }

    /// How many times a raster has been stored since creation.
    pub fn recompute_count(&self) -> u64 {
        self.recomputes
    }
}

/// Color substitution rules, alpha policy and render cache of one sprite entity.
#[derive(Component, Clone, Debug, Default)]
pub struct Recolor {
    map: ColorMap,
    alpha: AlphaPolicy,
    removal: RemovalMode,
    version: u64,
    cache: RenderCache,
}

impl Recolor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a rule.
    pub fn with_mapping(mut self, from: ColorTriple, to: ColorTriple) -> Self {
        self.set_mapping(from, to);
        self
    }

    /// Builder: keep or override the alpha of substituted pixels.
    pub fn with_keep_alpha(mut self, keep: bool) -> Self {
        self.keep_alpha(keep);
        self
    }

    /// Builder: alpha written to substituted pixels when not keeping alpha.
    pub fn with_alpha(mut self, alpha: u8) -> Self {
        self.set_alpha(alpha);
        self
    }

    pub fn with_removal_mode(mut self, mode: RemovalMode) -> Self {
        self.removal = mode;
        self
    }

    /// Insert or overwrite the rule `from -> to`.
    pub fn set_mapping(&mut self, from: ColorTriple, to: ColorTriple) -> &mut Self {
        self.map.insert(from, to);
        self.bump();
        self
    }

    /// Remove rules for `from` according to the configured [`RemovalMode`].
    ///
    /// Always bumps the mapping version, even when nothing matched.
    pub fn remove_mapping(&mut self, from: ColorTriple) -> usize {
        let removed = self.map.remove(from, self.removal);
        self.bump();
        removed
    }

    pub fn clear_mappings(&mut self) -> &mut Self {
        self.map.clear();
        self.bump();
        self
    }

    pub fn keep_alpha(&mut self, keep: bool) -> &mut Self {
        self.alpha.keep_original = keep;
        self.bump();
        self
    }

    pub fn set_alpha(&mut self, alpha: u8) -> &mut Self {
        self.alpha.override_alpha = alpha;
        self.bump();
        self
    }

    pub fn alpha(&self) -> u8 {
        self.alpha.override_alpha
    }

    pub fn keeps_alpha(&self) -> bool {
        self.alpha.keep_original
    }

    pub fn alpha_policy(&self) -> AlphaPolicy {
        self.alpha
    }

    pub fn color_map(&self) -> &ColorMap {
        &self.map
    }

    pub fn removal_mode(&self) -> RemovalMode {
        self.removal
    }

    pub fn set_removal_mode(&mut self, mode: RemovalMode) {
        self.removal = mode;
    }

    pub fn mapping_version(&self) -> u64 {
        self.version
    }

    /// Force a rebuild on the next draw without touching the rules.
    pub fn invalidate(&mut self) {
        self.bump();
    }

    pub fn recompute_count(&self) -> u64 {
        self.cache.recompute_count()
    }

    /// The last transformed raster, whether or not it is still fresh.
    pub fn cached(&self) -> Option<&RgbaImage> {
        self.cache.raster()
    }

    pub fn is_fresh(&self, selector: &SourceSelector, sampling: SamplingMode) -> bool {
        self.cache.is_fresh(selector, sampling, self.version)
    }

    /// Transformed raster for `selector`, rebuilt from `source` only when stale.
    pub fn render(
        &mut self,
        source: &RgbaImage,
        selector: &SourceSelector,
        sampling: SamplingMode,
    ) -> Result<Arc<RgbaImage>, RecolorError> {
        let map = &self.map;
        let alpha = self.alpha;
        self.cache.ensure_fresh(selector, sampling, self.version, || {
            remap_region(
                source,
                selector.region,
                selector.width,
                selector.height,
                map,
                alpha,
                sampling,
            )
        })
    }

    fn bump(&mut self) {
        self.version = self.version.wrapping_add(1);
    }
}

/// Anything the draw step can ask for a cached, recolored raster.
pub trait CachedRecolor {
    fn render_cached(
        &mut self,
        source: &RgbaImage,
        selector: &SourceSelector,
        sampling: SamplingMode,
    ) -> Result<Arc<RgbaImage>, RecolorError>;

    fn recompute_count(&self) -> u64;
}

impl CachedRecolor for Recolor {
    fn render_cached(
        &mut self,
        source: &RgbaImage,
        selector: &SourceSelector,
        sampling: SamplingMode,
    ) -> Result<Arc<RgbaImage>, RecolorError> {
        self.render(source, selector, sampling)
    }

    fn recompute_count(&self) -> u64 {
        Recolor::recompute_count(self)
    }
}

impl CachedRecolor for SharedRecolor {
    fn render_cached(
        &mut self,
        source: &RgbaImage,
        selector: &SourceSelector,
        sampling: SamplingMode,
    ) -> Result<Arc<RgbaImage>, RecolorError> {
        self.render(source, selector, sampling)
    }

    fn recompute_count(&self) -> u64 {
        SharedRecolor::recompute_count(self)
    }
}

/// [`Recolor`] behind a mutex, for rules mutated from several threads.
///
/// Rendering takes a consistent snapshot of rules and version under the lock,
/// releases it while the transform runs, and stores the result only if no
/// mutation happened in between.
///
/// Cloning yields another handle to the same rules and cache, for a thread
/// that edits rules. Attach a `SharedRecolor` to one entity only: two sprites
/// behind one cache evict each other every frame. Give each entity its own
/// [`SharedRecolor::new`].
#[derive(Component, Clone, Debug, Default)]
pub struct SharedRecolor(Arc<Mutex<Recolor>>);

impl SharedRecolor {
    pub fn new(recolor: Recolor) -> Self {
        Self(Arc::new(Mutex::new(recolor)))
    }

    fn lock(&self) -> MutexGuard<'_, Recolor> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` with exclusive access to the inner state.
    pub fn with<R>(&self, f: impl FnOnce(&mut Recolor) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn set_mapping(&self, from: ColorTriple, to: ColorTriple) {
        self.lock().set_mapping(from, to);
    }

    pub fn remove_mapping(&self, from: ColorTriple) -> usize {
        self.lock().remove_mapping(from)
    }

    pub fn keep_alpha(&self, keep: bool) {
        self.lock().keep_alpha(keep);
    }

    pub fn set_alpha(&self, alpha: u8) {
        self.lock().set_alpha(alpha);
    }

    pub fn mapping_version(&self) -> u64 {
        self.lock().mapping_version()
    }

    pub fn recompute_count(&self) -> u64 {
        self.lock().recompute_count()
    }

    pub fn render(
        &self,
        source: &RgbaImage,
        selector: &SourceSelector,
        sampling: SamplingMode,
    ) -> Result<Arc<RgbaImage>, RecolorError> {
        self.render_with(selector, sampling, |map, policy| {
            remap_region(
                source,
                selector.region,
                selector.width,
                selector.height,
                map,
                policy,
                sampling,
            )
        })
    }

    /// Snapshot, run `transform` with the lock released, then store if still current.
    fn render_with<F>(
        &self,
        selector: &SourceSelector,
        sampling: SamplingMode,
        transform: F,
    ) -> Result<Arc<RgbaImage>, RecolorError>
    where
        F: FnOnce(&ColorMap, AlphaPolicy) -> Result<RgbaImage, RecolorError>,
    {
        let (map, policy, version) = {
            let guard = self.lock();
            if let Some(raster) = guard.cache.fresh_raster(selector, sampling, guard.version) {
                return Ok(raster);
            }
            (guard.map.clone(), guard.alpha, guard.version)
        };

        let raster = Arc::new(transform(&map, policy)?);

        let mut guard = self.lock();
        if guard.version == version {
            guard
                .cache
                .store(selector.clone(), sampling, version, Arc::clone(&raster));
        } else {
            debug!(
                "recolor rules changed during transform of '{}', result not cached",
                selector.image_key
            );
        }
        Ok(raster)
    }
}
