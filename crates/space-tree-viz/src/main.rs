//! Interactive space tree viewer.
//!
//! Renders the selected catalog model on a background worker and shows the
//! latest frame. Drag or use the arrow keys to orbit, scroll to zoom,
//! N toggles the normal field, H the crossing heat map, E exports a PNG and
//! Tab cycles through the catalog.

use std::path::PathBuf;

use anyhow::{Context, Result, ensure};
use clap::Parser;
use macroquad::prelude::*;
use space_tree_viz::{
    Catalog, FsSource, ModelEntry, OrbitCamera, RenderOptions, RenderRequest, RenderResponse,
    RenderWorker, logging,
};

#[derive(Parser, Debug)]
#[command(name = "space-tree-viz")]
#[command(about = "Interactive viewer for space tree models", long_about = None)]
struct Args {
    /// Catalog JSON file (the bundled catalog is used if omitted)
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Directory that catalog asset paths are relative to
    #[arg(long, default_value = ".")]
    assets: PathBuf,
    /// Edge length of rendered frames in pixels
    #[arg(long, default_value_t = 256, value_parser = clap::value_parser!(u16).range(1..=8192))]
    size: u16,
    /// Crossing count at which the heat map saturates
    #[arg(long, default_value_t = 32)]
    heat_max: usize,
}

fn request_for(model: &ModelEntry, orbit: &OrbitCamera, options: RenderOptions) -> RenderRequest {
    let camera = orbit.to_camera_with(&model.rotation_matrix());
    RenderRequest::new(model.model_path(), &camera)
        .with_normals(model.normals_path())
        .with_options(options)
}

async fn run() -> Result<()> {
    let args = Args::parse();
    let catalog = match &args.catalog {
        Some(path) => Catalog::load(path)
            .with_context(|| format!("failed to load catalog {}", path.display()))?,
        None => Catalog::default(),
    };
    ensure!(!catalog.is_empty(), "catalog lists no models");

    let worker =
        RenderWorker::spawn(FsSource::new(&args.assets)).context("failed to start render worker")?;
    let mut orbit = OrbitCamera::default();
    let mut options = RenderOptions {
        size: usize::from(args.size),
        ..RenderOptions::default()
    };
    let mut model_index = 0;
    let mut dirty = true;
    let mut texture: Option<(u64, Texture2D)> = None;
    let mut exports = 0;
    let mut status = String::new();

    loop {
        if orbit.update() {
            dirty = true;
        }
        if is_key_pressed(KeyCode::N) {
            options.use_normals = !options.use_normals;
            dirty = true;
        }
        if is_key_pressed(KeyCode::H) {
            options.max_changes = match options.max_changes {
                Some(_) => None,
                None => Some(args.heat_max),
            };
            dirty = true;
        }
        if is_key_pressed(KeyCode::Tab) {
            model_index = (model_index + 1) % catalog.len();
            dirty = true;
        }

        let model = &catalog.models[model_index];
        if is_key_pressed(KeyCode::E) {
            let export = RenderOptions {
                export_image: true,
                ..options
            };
            worker.request(request_for(model, &orbit, export));
        }
        if dirty {
            worker.request(request_for(model, &orbit, options));
            status.clear();
            dirty = false;
        }

        while let Some(response) = worker.try_recv() {
            match response {
                RenderResponse::Rendered {
                    image: Some(png), ..
                } => {
                    exports += 1;
                    let path = format!("export_{exports}.png");
                    match std::fs::write(&path, png) {
                        Ok(()) => log::info!("exported {path}"),
                        Err(err) => log::error!("failed to write {path}: {err}"),
                    }
                }
                RenderResponse::Rendered { .. } => {}
                RenderResponse::Failed { error } => {
                    log::error!("render failed: {error}");
                    status = error;
                }
            }
        }

        if let Some(canvas) = worker.canvas() {
            if texture.as_ref().map(|(generation, _)| *generation) != Some(canvas.generation) {
                // Frame sizes come from a u16 argument.
                let side = canvas.frame.size() as u16;
                let image = Texture2D::from_rgba8(side, side, canvas.frame.pixels());
                image.set_filter(FilterMode::Nearest);
                texture = Some((canvas.generation, image));
            }
        }

        clear_background(BLACK);
        if let Some((_, image)) = &texture {
            let side = screen_width().min(screen_height());
            draw_texture_ex(
                image,
                (screen_width() - side) / 2.0,
                (screen_height() - side) / 2.0,
                WHITE,
                DrawTextureParams {
                    dest_size: Some(vec2(side, side)),
                    ..Default::default()
                },
            );
        }

        draw_text(&model.name, 10.0, 25.0, 20.0, WHITE);
        draw_text(
            &format!(
                "normals: {} | heat map: {} | {}",
                if options.use_normals { "on" } else { "off" },
                if options.max_changes.is_some() { "on" } else { "off" },
                if worker.is_busy() { "rendering" } else { "idle" },
            ),
            10.0,
            45.0,
            18.0,
            GRAY,
        );
        if !status.is_empty() {
            draw_text(&status, 10.0, 65.0, 16.0, RED);
        }
        draw_text(
            "Drag to rotate, scroll to zoom | N normals | H heat map | E export | Tab next model",
            10.0,
            screen_height() - 15.0,
            16.0,
            DARKGRAY,
        );

        next_frame().await
    }
}

#[macroquad::main("Space Tree Viewer")]
async fn main() {
    logging::init();
    if let Err(err) = run().await {
        log::error!("{err:#}");
    }
}
