use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use iss_core::io::manifest::{load_stack, StackManifest};

#[derive(Args)]
pub struct InfoArgs {
    /// Stack manifest (TOML)
    pub manifest: PathBuf,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let manifest = StackManifest::from_file(&args.manifest)
        .with_context(|| format!("Failed to read {}", args.manifest.display()))?;
    let (rounds, chs, zplanes) = manifest.extent();

    println!("Manifest:    {}", args.manifest.display());
    println!("Tiles:       {}", manifest.tiles.len());
    println!("Rounds:      {}", rounds);
    println!("Channels:    {}", chs);
    println!("Z-planes:    {}", zplanes);

    let stack = load_stack(&args.manifest)?;
    let (h, w) = stack.plane_shape();
    println!("Dimensions:  {}x{}", w, h);
    let total_mb = (stack.data().len() * std::mem::size_of::<f32>()) as f64 / (1024.0 * 1024.0);
    println!("Data size:   {:.1} MB", total_mb);

    Ok(())
}
