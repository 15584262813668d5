use ndarray::{Array3, ArrayView3};
use rayon::prelude::*;

use crate::error::Result;
use crate::filters::gaussian::{gaussian_laplace, BoundaryMode};

use super::peaks::find_scale_space_peaks;
use super::prune::prune_blobs;
use super::{linspace, spatial_axes, to_blobs, BlobParams, RawBlob};

/// Laplacian of Gaussian blob detection.
///
/// Each scale's response is the negated, scale-normalised Laplacian
/// `-sigma^2 * LoG(image)`, so bright blobs give positive maxima.
pub fn blob_log(image: &ArrayView3<f32>, params: &BlobParams) -> Result<Vec<RawBlob>> {
    let axes = spatial_axes(image);
    let sigmas = linspace(params.min_sigma, params.max_sigma, params.num_sigma);

    let cube: Vec<Array3<f32>> = sigmas
        .par_iter()
        .map(|&sigma| {
            let norm = (sigma * sigma) as f32;
            let mut response = gaussian_laplace(image, sigma, &axes, BoundaryMode::Reflect);
            response.mapv_inplace(|v| -v * norm);
            response
        })
        .collect();

    let peaks = find_scale_space_peaks(&cube, params.threshold as f32);
    Ok(prune_blobs(to_blobs(&peaks, &sigmas), params.overlap, axes.len()))
}
