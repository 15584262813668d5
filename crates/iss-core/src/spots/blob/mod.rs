mod dog;
mod doh;
mod laplacian;
mod peaks;
mod prune;

use std::fmt;
use std::str::FromStr;

use ndarray::{ArrayView3, Axis};

use crate::error::{IssError, Result};

pub use dog::blob_dog;
pub use doh::{blob_doh, hessian_determinant, integral_image};
pub use laplacian::blob_log;
pub use peaks::{find_scale_space_peaks, ScalePeak};
pub use prune::{blob_overlap, prune_blobs};

/// A blob as reported by a detection kernel: voxel position and the kernel
/// scale it responded to most strongly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawBlob {
    pub plane: usize,
    pub y: usize,
    pub x: usize,
    pub sigma: f64,
}

/// Scale-space search parameters shared by every kernel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlobParams {
    pub min_sigma: f64,
    pub max_sigma: f64,
    pub num_sigma: usize,
    pub threshold: f64,
    pub overlap: f64,
    /// Difference of Gaussian only.
    pub sigma_ratio: f64,
}

/// The supported blob detection kernels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DetectorMethod {
    /// Laplacian of Gaussian.
    #[default]
    Log,
    /// Difference of Gaussian.
    Dog,
    /// Determinant of Hessian; single planes only.
    Doh,
}

impl DetectorMethod {
    pub const ALL: [DetectorMethod; 3] = [Self::Log, Self::Dog, Self::Doh];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Log => "blob_log",
            Self::Dog => "blob_dog",
            Self::Doh => "blob_doh",
        }
    }

    /// Run the kernel over one `(z, y, x)` slice.
    pub fn detect(&self, image: &ArrayView3<f32>, params: &BlobParams) -> Result<Vec<RawBlob>> {
        match self {
            Self::Log => blob_log(image, params),
            Self::Dog => blob_dog(image, params),
            Self::Doh => blob_doh(image, params),
        }
    }
}

impl FromStr for DetectorMethod {
    type Err = IssError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| IssError::UnsupportedDetectorMethod(s.to_string()))
    }
}

impl fmt::Display for DetectorMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// `n` evenly spaced values from `start` to `stop` inclusive.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

/// Axes the kernels filter along: z is skipped for single-plane slices.
fn spatial_axes(image: &ArrayView3<f32>) -> Vec<Axis> {
    if image.len_of(Axis(0)) > 1 {
        vec![Axis(0), Axis(1), Axis(2)]
    } else {
        vec![Axis(1), Axis(2)]
    }
}

fn to_blobs(peaks: &[ScalePeak], sigmas: &[f64]) -> Vec<RawBlob> {
    peaks
        .iter()
        .map(|p| RawBlob {
            plane: p.plane,
            y: p.y,
            x: p.x,
            sigma: sigmas[p.scale],
        })
        .collect()
}
