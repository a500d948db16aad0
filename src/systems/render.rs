use bevy_ecs::prelude::*;
use image::Rgba;
use log::{error, warn};

use crate::components::mapposition::MapPosition;
use crate::components::opacity::Opacity;
use crate::components::recolor::{CachedRecolor, Recolor, SharedRecolor};
use crate::components::scale::Scale;
use crate::components::sprite::Sprite;
use crate::components::zindex::ZIndex;
use crate::error::RecolorError;
use crate::raster::SamplingMode;
use crate::resources::camera2d::CameraOffset;
use crate::resources::debugmode::DebugMode;
use crate::resources::imagestore::ImageStore;
use crate::resources::renderconfig::RenderConfig;
use crate::resources::scenefade::SceneFade;
use crate::surface::{DrawRect, Surface2D};

const DEBUG_CROSS_HALF: f32 = 5.0;
const DEBUG_CROSS_COLOR: Rgba<u8> = Rgba([0, 255, 0, 255]);

/// Scene state shared by every sprite drawn in one frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameContext {
    pub camera: CameraOffset,
    pub fade: SceneFade,
    pub debug: bool,
    pub sampling: SamplingMode,
}

impl FrameContext {
    /// Snapshot the frame-wide resources, falling back to defaults for absent ones.
    pub fn from_world(world: &World) -> Self {
        Self {
            camera: world
                .get_resource::<CameraOffset>()
                .copied()
                .unwrap_or_default(),
            fade: world.get_resource::<SceneFade>().copied().unwrap_or_default(),
            debug: world.contains_resource::<DebugMode>(),
            sampling: world
                .get_resource::<RenderConfig>()
                .map(|c| c.sampling)
                .unwrap_or_default(),
        }
    }
}

/// Placement of one sprite in world space.
#[derive(Clone, Copy, Debug, Default)]
pub struct Placement {
    pub position: MapPosition,
    pub scale: Scale,
    pub opacity: Opacity,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawOutcome {
    /// The raster was blitted; `recomputed` tells whether the cache was rebuilt.
    Drawn { recomputed: bool },
    /// The image is not loaded; nothing was drawn.
    Skipped,
}

/// Draw one recolorable sprite.
///
/// Rebuilds the recolored raster only when the sprite's selector or rules
/// changed, then blits it so the sprite's centre, shifted by its origin
/// fraction, lands at `placement.position` minus the camera offset.
/// A missing image is a no-op; transform errors propagate and leave both the
/// cache and the surface untouched.
pub fn draw_recolor_sprite<S, R>(
    surface: &mut S,
    images: &ImageStore,
    sprite: &mut Sprite,
    recolor: &mut R,
    placement: Placement,
    ctx: &FrameContext,
) -> Result<DrawOutcome, RecolorError>
where
    S: Surface2D + ?Sized,
    R: CachedRecolor + ?Sized,
{
    let (screen_x, screen_y) = ctx
        .camera
        .to_screen(placement.position.x, placement.position.y);

    let outcome = match images.require(&sprite.image_key) {
        Ok(image) => {
            let selector = sprite.selector(image);
            let before = recolor.recompute_count();
            let raster = recolor.render_cached(image, &selector, ctx.sampling)?;
            let recomputed = recolor.recompute_count() != before;

            let width = selector.width as f32 * placement.scale.x;
            let height = selector.height as f32 * placement.scale.y;

            surface.set_global_alpha(ctx.fade.blend(placement.opacity.0));
            surface.translate(-width / 2.0, -height / 2.0);
            surface.translate(width * sprite.origin_x, height * sprite.origin_y);
            surface.draw_image_scaled(
                &raster,
                DrawRect::new(screen_x, screen_y, width, height),
            );
            surface.reset_transform();
            DrawOutcome::Drawn { recomputed }
        }
        Err(e) => {
            warn!("{}, skipping sprite", e);
            DrawOutcome::Skipped
        }
    };

    if ctx.debug {
        draw_debug_cross(surface, screen_x, screen_y);
    }
    Ok(outcome)
}

/// Draw a small cross centered on `(x, y)`.
pub fn draw_debug_cross<S: Surface2D + ?Sized>(surface: &mut S, x: f32, y: f32) {
    surface.draw_line(
        x - DEBUG_CROSS_HALF,
        y,
        x + DEBUG_CROSS_HALF,
        y,
        DEBUG_CROSS_COLOR,
    );
    surface.draw_line(
        x,
        y - DEBUG_CROSS_HALF,
        x,
        y + DEBUG_CROSS_HALF,
        DEBUG_CROSS_COLOR,
    );
}

/// What happened during one [`render_pass`].
#[derive(Debug, Default)]
pub struct RenderReport {
    pub drawn: usize,
    pub recomputed: usize,
    pub skipped: usize,
    pub failed: Vec<(Entity, RecolorError)>,
}

impl RenderReport {
    pub fn is_ok(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Draw every recolorable sprite in the world, lowest [`ZIndex`] first.
///
/// Entities need a [`Sprite`], a [`MapPosition`] and either a [`Recolor`] or
/// a [`SharedRecolor`]. [`Scale`], [`Opacity`] and [`ZIndex`] are optional.
/// A sprite that fails to render is logged and reported; the pass continues
/// with the next one.
pub fn render_pass<S: Surface2D + ?Sized>(world: &mut World, surface: &mut S) -> RenderReport {
    let mut report = RenderReport::default();
    if !world.contains_resource::<ImageStore>() {
        warn!("render_pass called without an ImageStore resource");
        return report;
    }
    let ctx = FrameContext::from_world(world);

    let mut to_draw: Vec<(Entity, ZIndex)> = {
        let mut q = world.query_filtered::<
            (Entity, Option<&ZIndex>),
            (
                With<Sprite>,
                With<MapPosition>,
                Or<(With<Recolor>, With<SharedRecolor>)>,
            ),
        >();
        q.iter(world)
            .map(|(e, z)| (e, z.copied().unwrap_or_default()))
            .collect()
    };
    to_draw.sort_by_key(|(_, z)| *z);

    world.resource_scope(|world, images: Mut<ImageStore>| {
        let mut q = world.query::<(
            &mut Sprite,
            &MapPosition,
            Option<&Scale>,
            Option<&Opacity>,
            Option<&mut Recolor>,
            Option<&mut SharedRecolor>,
        )>();
        for (entity, _) in to_draw {
            let Ok((mut sprite, position, scale, opacity, recolor, shared)) =
                q.get_mut(world, entity)
            else {
                continue;
            };
            let placement = Placement {
                position: *position,
                scale: scale.copied().unwrap_or_default(),
                opacity: opacity.copied().unwrap_or_default(),
            };
            let result = match (recolor, shared) {
                (Some(mut recolor), _) => draw_recolor_sprite(
                    surface,
                    &images,
                    &mut *sprite,
                    &mut *recolor,
                    placement,
                    &ctx,
                ),
                (None, Some(mut shared)) => draw_recolor_sprite(
                    surface,
                    &images,
                    &mut *sprite,
                    &mut *shared,
                    placement,
                    &ctx,
                ),
                (None, None) => continue,
            };
            match result {
                Ok(DrawOutcome::Drawn { recomputed }) => {
                    report.drawn += 1;
                    if recomputed {
                        report.recomputed += 1;
                    }
                }
                Ok(DrawOutcome::Skipped) => report.skipped += 1,
                Err(e) => {
                    error!("Failed to draw sprite {:?} ('{}'): {}", entity, sprite.image_key, e);
                    report.failed.push((entity, e));
                }
            }
        }
    });

    report
}
