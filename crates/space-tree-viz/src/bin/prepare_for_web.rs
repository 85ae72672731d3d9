//! Normalizes a model and its normal field and writes them, with metadata,
//! into a directory the viewer can load.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use space_tree::codec;
use space_tree::{NormalField, Normalization};
use space_tree_viz::catalog::{FULL_TREE_FILE, METADATA_FILE, NORMALS_FILE};
use space_tree_viz::{Metadata, TreeInfo, logging};

#[derive(Parser, Debug)]
#[command(name = "prepare_for_web")]
#[command(about = "Package a model and normal map for the viewer", long_about = None)]
struct Args {
    /// Bounded solid tree
    #[arg(long)]
    model: PathBuf,
    /// Normal map tree or ensemble
    #[arg(long)]
    normals: PathBuf,
    /// Output directory
    #[arg(long)]
    output: PathBuf,
}

fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

fn write_tree(path: &Path, bytes: &[u8], num_leaves: usize) -> Result<TreeInfo> {
    fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(TreeInfo {
        num_leaves,
        filename: path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
        file_size: bytes.len() as u64,
    })
}

fn main() -> Result<()> {
    logging::init();
    let args = Args::parse();

    log::info!("Loading input tree...");
    let model = codec::decode_bounded(&read(&args.model)?)
        .with_context(|| format!("failed to decode {}", args.model.display()))?;

    log::info!("Loading normal map...");
    let trees = codec::decode_many(&read(&args.normals)?)
        .with_context(|| format!("failed to decode {}", args.normals.display()))?;
    let normals = NormalField::new(trees).context("normal map holds no trees")?;

    let normalization =
        Normalization::for_tree(&model).context("model has an empty bounding box")?;
    log::info!(
        "Normalizing with scale {:.4} and offset {:?}",
        normalization.scale(),
        normalization.translate()
    );

    log::info!("Writing outputs...");
    fs::create_dir_all(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;

    let normals = normalization.apply_field(&normals);
    let normals_info = write_tree(
        &args.output.join(NORMALS_FILE),
        &codec::encode_many(normals.trees())?,
        normals.num_leaves(),
    )?;

    let full = normalization.apply_bounded(&model);
    let full_info = write_tree(
        &args.output.join(FULL_TREE_FILE),
        &codec::encode_bounded(&full)?,
        full.inner().num_leaves(),
    )?;

    log::info!("Saving metadata...");
    let metadata = Metadata {
        normals: normals_info,
        lods: vec![full_info],
    };
    let path = args.output.join(METADATA_FILE);
    fs::write(&path, metadata.to_json()?)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
