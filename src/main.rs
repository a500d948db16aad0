//! Recolor sprite renderer entry point.
//!
//! A headless host for the recolor pipeline:
//! - **bevy_ecs** holds the sprite entity, its components and the world resources
//! - **image** decodes the source PNG and encodes the rendered frame
//! - a [`SoftwareSurface`] stands in for the on-screen canvas
//!
//! The program loads one image, attaches color rules to a sprite, runs the
//! render pass for a number of frames and writes the last frame to disk.
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --input hero.png --map 10,20,30=200,200,200 --output out.png
//! ```

use bevy_ecs::observer::Observer;
use bevy_ecs::prelude::*;
use clap::Parser;
use image::Rgba;
use log::{error, info, warn};
use std::path::PathBuf;

use recolorsprite::colormap::ColorTriple;
use recolorsprite::components::mapposition::MapPosition;
use recolorsprite::components::recolor::Recolor;
use recolorsprite::components::scale::Scale;
use recolorsprite::components::sprite::Sprite;
use recolorsprite::events::switchdebug::{SwitchDebugEvent, switch_debug_observer};
use recolorsprite::raster::PixelRect;
use recolorsprite::resources::camera2d::CameraOffset;
use recolorsprite::resources::imagestore::ImageStore;
use recolorsprite::resources::renderconfig::RenderConfig;
use recolorsprite::resources::scenefade::SceneFade;
use recolorsprite::rules::RecolorRules;
use recolorsprite::surface::SoftwareSurface;
use recolorsprite::systems::render::render_pass;

/// Recolor Sprite
#[derive(Parser)]
#[command(version, about = "Render a sprite with exact-color substitution into a PNG frame.")]
struct Cli {
    /// Source image (PNG).
    #[arg(long, value_name = "PNG")]
    input: PathBuf,

    /// Key the source image is stored under.
    #[arg(long, default_value = "sprite")]
    name: String,

    /// JSON rule file with alpha policy and mappings.
    #[arg(long, value_name = "JSON")]
    rules: Option<PathBuf>,

    /// Extra mapping `r,g,b=r,g,b`; may be repeated.
    #[arg(long = "map", value_name = "FROM=TO", value_parser = parse_mapping)]
    mappings: Vec<(ColorTriple, ColorTriple)>,

    /// Source region `x,y,w,h` inside the image.
    #[arg(long, value_parser = parse_region)]
    region: Option<PixelRect>,

    /// Destination raster size `WxH`.
    #[arg(long, value_parser = parse_size)]
    size: Option<(u32, u32)>,

    /// Scale `sx,sy`.
    #[arg(long, value_parser = parse_pair, default_value = "1,1")]
    scale: (f32, f32),

    /// World position `x,y`. Defaults to the canvas centre.
    #[arg(long, value_parser = parse_pair)]
    position: Option<(f32, f32)>,

    /// Origin fraction `ox,oy`.
    #[arg(long, value_parser = parse_pair, default_value = "0,0")]
    origin: (f32, f32),

    /// Camera offset `x,y`.
    #[arg(long, value_parser = parse_pair, default_value = "0,0")]
    camera: (f32, f32),

    /// Number of frames to render.
    #[arg(long, default_value_t = 1)]
    frames: u32,

    /// Draw anchor markers.
    #[arg(long)]
    debug: bool,

    /// INI configuration file.
    #[arg(long, value_name = "INI", default_value = "./config.ini")]
    config: PathBuf,

    /// Output image (PNG).
    #[arg(long, value_name = "PNG", default_value = "frame.png")]
    output: PathBuf,
}

fn parse_numbers<T: std::str::FromStr>(s: &str, sep: char, n: usize) -> Result<Vec<T>, String> {
    let parts: Vec<T> = s
        .split(sep)
        .map(|p| p.trim().parse::<T>())
        .collect::<Result<_, _>>()
        .map_err(|_| format!("'{}' is not a list of {} numbers", s, n))?;
    if parts.len() != n {
        return Err(format!("expected {} values in '{}'", n, s));
    }
    Ok(parts)
}

fn parse_triple(s: &str) -> Result<ColorTriple, String> {
    let v = parse_numbers::<i64>(s, ',', 3)?;
    ColorTriple::try_from_ints(v[0], v[1], v[2]).map_err(|e| e.to_string())
}

fn parse_mapping(s: &str) -> Result<(ColorTriple, ColorTriple), String> {
    let (from, to) = s
        .split_once('=')
        .ok_or_else(|| format!("mapping '{}' must look like r,g,b=r,g,b", s))?;
    Ok((parse_triple(from)?, parse_triple(to)?))
}

fn parse_region(s: &str) -> Result<PixelRect, String> {
    let v = parse_numbers::<u32>(s, ',', 4)?;
    Ok(PixelRect::new(v[0], v[1], v[2], v[3]))
}

fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let v = parse_numbers::<u32>(s, 'x', 2)?;
    Ok((v[0], v[1]))
}

fn parse_pair(s: &str) -> Result<(f32, f32), String> {
    let v = parse_numbers::<f32>(s, ',', 2)?;
    Ok((v[0], v[1]))
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = RenderConfig::with_path(&cli.config);
    if let Err(e) = config.load_from_file() {
        warn!("{} ({}), using defaults", e, cli.config.display());
    }

    // --------------- Assets ---------------
    let mut images = ImageStore::new();
    if let Err(e) = images.load_png(cli.name.clone(), &cli.input) {
        error!("Failed to load {}: {}", cli.input.display(), e);
        std::process::exit(1);
    }

    let mut recolor = Recolor::new().with_removal_mode(config.removal);
    if let Some(path) = &cli.rules {
        match RecolorRules::load_from_file(path) {
            Ok(rules) => rules.apply_to(&mut recolor),
            Err(e) => {
                error!("Failed to load rules {}: {}", path.display(), e);
                std::process::exit(1);
            }
        }
    }
    for (from, to) in &cli.mappings {
        recolor.set_mapping(*from, *to);
    }
    info!("{} color rule(s) active", recolor.color_map().len());

    // --------------- ECS world + resources ---------------
    let (canvas_w, canvas_h) = (config.canvas_width, config.canvas_height);
    let mut world = World::new();
    world.insert_resource(images);
    world.insert_resource(CameraOffset::new(cli.camera.0, cli.camera.1));
    world.insert_resource(SceneFade::default());
    world.insert_resource(config);
    world.spawn(Observer::new(switch_debug_observer));
    world.flush();
    if cli.debug {
        world.trigger(SwitchDebugEvent {});
        world.flush();
    }

    let mut sprite = Sprite::new(cli.name.clone()).with_origin(cli.origin.0, cli.origin.1);
    sprite.region = cli.region;
    sprite.size = cli.size;
    let (x, y) = cli
        .position
        .unwrap_or((canvas_w as f32 / 2.0, canvas_h as f32 / 2.0));
    world.spawn((
        sprite,
        recolor,
        MapPosition::new(x, y),
        Scale::new(cli.scale.0, cli.scale.1),
    ));

    // --------------- Frames ---------------
    let mut surface = SoftwareSurface::new(canvas_w, canvas_h);
    let mut recomputed = 0;
    for frame in 0..cli.frames.max(1) {
        surface.clear(Rgba([0, 0, 0, 0]));
        let report = render_pass(&mut world, &mut surface);
        recomputed += report.recomputed;
        if let Some((_, e)) = report.failed.first() {
            error!("Frame {} failed: {}", frame, e);
            std::process::exit(1);
        }
    }
    info!(
        "Rendered {} frame(s), {} recolor rebuild(s)",
        cli.frames.max(1),
        recomputed
    );

    if let Err(e) = surface.frame().save(&cli.output) {
        error!("Failed to write {}: {}", cli.output.display(), e);
        std::process::exit(1);
    }
    info!("Frame written to {}", cli.output.display());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mapping() {
        let (from, to) = parse_mapping("10,20,30=200, 200, 200").unwrap();
        assert_eq!(from, ColorTriple::new(10, 20, 30));
        assert_eq!(to, ColorTriple::new(200, 200, 200));
        assert!(parse_mapping("10,20,30").is_err());
        assert!(parse_mapping("10,20,300=0,0,0").is_err());
    }

    #[test]
    fn test_parse_region_and_size() {
        assert_eq!(parse_region("1,2,3,4").unwrap(), PixelRect::new(1, 2, 3, 4));
        assert!(parse_region("1,2,3").is_err());
        assert_eq!(parse_size("16x8").unwrap(), (16, 8));
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
