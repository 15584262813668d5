use std::collections::HashMap;
use std::path::{Path, PathBuf};

use ndarray::{s, Array2, Array5};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{IssError, Result};
use crate::stack::ImageStack;

use super::image_io::load_plane;

/// One image file holding a single (round, ch, z) plane.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileEntry {
    pub round: usize,
    pub ch: usize,
    #[serde(default)]
    pub z: usize,
    /// Relative paths resolve against the manifest's directory.
    pub path: PathBuf,
}

/// TOML description of an image stack as a list of plane files.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StackManifest {
    #[serde(default)]
    pub tiles: Vec<TileEntry>,
}

impl StackManifest {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// `(rounds, chs, zplanes)` implied by the highest indices listed.
    pub fn extent(&self) -> (usize, usize, usize) {
        self.tiles.iter().fold((0, 0, 0), |(r, c, z), t| {
            (r.max(t.round + 1), c.max(t.ch + 1), z.max(t.z + 1))
        })
    }

    /// Load every tile into an [`ImageStack`].
    ///
    /// Every (round, ch, z) in the extent must be listed exactly once and
    /// all planes must share one shape.
    pub fn load(&self, base_dir: &Path) -> Result<ImageStack> {
        let (n_rounds, n_chs, n_z) = self.extent();
        if self.tiles.is_empty() {
            return Err(IssError::InvalidStack("manifest lists no tiles".into()));
        }

        let mut seen = HashMap::new();
        for tile in &self.tiles {
            if let Some(previous) = seen.insert((tile.round, tile.ch, tile.z), &tile.path) {
                return Err(IssError::InvalidStack(format!(
                    "tile (r={}, c={}, z={}) listed twice: {} and {}",
                    tile.round,
                    tile.ch,
                    tile.z,
                    previous.display(),
                    tile.path.display()
                )));
            }
        }
        let expected = n_rounds * n_chs * n_z;
        if seen.len() != expected {
            return Err(IssError::InvalidStack(format!(
                "expected {expected} tiles for {n_rounds} rounds x {n_chs} channels x {n_z} planes, found {}",
                seen.len()
            )));
        }

        info!(
            rounds = n_rounds,
            chs = n_chs,
            zplanes = n_z,
            "Loading image stack"
        );

        let mut data: Option<Array5<f32>> = None;
        for tile in &self.tiles {
            let path = resolve(base_dir, &tile.path);
            debug!(path = %path.display(), "Loading tile");
            let plane: Array2<f32> = load_plane(&path)?;
            let (h, w) = plane.dim();

            let stack = data.get_or_insert_with(|| Array5::zeros((n_rounds, n_chs, n_z, h, w)));
            let (sh, sw) = (stack.shape()[3], stack.shape()[4]);
            if (sh, sw) != (h, w) {
                return Err(IssError::InvalidStack(format!(
                    "{} is {h}x{w}, expected {sh}x{sw}",
                    path.display()
                )));
            }
            stack
                .slice_mut(s![tile.round, tile.ch, tile.z, .., ..])
                .assign(&plane);
        }

        let data = data.ok_or_else(|| IssError::InvalidStack("manifest lists no tiles".into()))?;
        ImageStack::new(data)
    }
}

/// Read a manifest file and load the stack it describes.
pub fn load_stack(manifest_path: &Path) -> Result<ImageStack> {
    let manifest = StackManifest::from_file(manifest_path)?;
    let base_dir = manifest_path.parent().unwrap_or(Path::new("."));
    manifest.load(base_dir)
}

fn resolve(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}
