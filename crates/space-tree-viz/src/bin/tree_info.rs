//! Prints summary statistics for a tree file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use nalgebra::Vector3;
use space_tree::codec::{self, DecodedTree};
use space_tree::{PayloadKind, SpaceTree};
use space_tree_viz::logging;

#[derive(Parser, Debug)]
#[command(name = "tree_info")]
#[command(about = "Print leaf count, depth and bounds of a tree file", long_about = None)]
struct Args {
    /// Tree file
    input: PathBuf,
    /// Payload kind: bool, coord or bounded
    #[arg(long, default_value = "bounded")]
    kind: PayloadKind,
}

fn main() -> Result<()> {
    logging::init();
    let args = Args::parse();

    log::info!("Loading tree...");
    let bytes = std::fs::read(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;

    if args.kind == PayloadKind::Coord {
        let trees = codec::decode_many::<Vector3<f64>>(&bytes)?;
        let leaves: usize = trees.iter().map(SpaceTree::num_leaves).sum();
        let depth = trees.iter().map(SpaceTree::depth).max().unwrap_or(0);
        println!("Number of trees: {}", trees.len());
        println!("Number of leaves: {leaves}");
        println!("Max depth: {depth}");
        return Ok(());
    }

    let tree = codec::decode(&bytes, args.kind)?;
    println!("Number of leaves: {}", tree.num_leaves());
    println!("Depth: {}", tree.depth());
    if let DecodedTree::Bounded(bounded) = &tree {
        println!("Min: {}", bounded.min());
        println!("Max: {}", bounded.max());
    }
    Ok(())
}
