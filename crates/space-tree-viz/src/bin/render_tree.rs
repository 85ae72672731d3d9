//! Headless renderer: writes one frame of a bounded tree to a PNG file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use space_tree_viz::{FsSource, OrbitCamera, RenderOptions, SceneCache, logging, render_frame};

#[derive(Parser, Debug)]
#[command(name = "render_tree")]
#[command(about = "Render a bounded space tree to a PNG image", long_about = None)]
struct Args {
    /// Bounded solid tree
    model: PathBuf,
    /// Output PNG file
    output: PathBuf,
    /// Optional normal field used for shading
    #[arg(long)]
    normals: Option<PathBuf>,
    /// Image edge length in pixels
    #[arg(long, default_value_t = 512)]
    size: usize,
    /// Render the crossing heat map, saturating at this count
    #[arg(long)]
    heat_map: Option<usize>,
    /// Camera yaw about the z axis, in radians
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    yaw: f32,
    /// Camera pitch, in radians
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pitch: f32,
    /// Camera distance from the model center
    #[arg(long, default_value_t = 3.0)]
    distance: f32,
}

fn main() -> Result<()> {
    logging::init();
    let args = Args::parse();

    let model = args.model.to_str().context("model path is not valid UTF-8")?;
    let normals = args
        .normals
        .as_deref()
        .map(|path| path.to_str().context("normals path is not valid UTF-8"))
        .transpose()?;

    log::info!("Loading tree...");
    let mut cache = SceneCache::new(FsSource::new(""));
    let scene = cache.load(model, normals)?;

    log::info!("Rendering...");
    let camera = OrbitCamera::new(args.distance, args.yaw, args.pitch).to_camera();
    let options = RenderOptions {
        use_normals: normals.is_some(),
        max_changes: args.heat_map,
        export_image: true,
        size: args.size,
    };
    let frame = render_frame(&scene, &camera, &options)?;
    frame
        .save_png(&args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    log::info!("Wrote {}", args.output.display());
    Ok(())
}
