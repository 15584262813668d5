use ndarray::{Array3, ArrayView3};
use rayon::prelude::*;

use crate::error::Result;
use crate::filters::gaussian::{gaussian_filter, BoundaryMode};

use super::peaks::find_scale_space_peaks;
use super::prune::prune_blobs;
use super::{spatial_axes, to_blobs, BlobParams, RawBlob};

/// Difference of Gaussian blob detection.
///
/// Scales grow geometrically from `min_sigma` by `sigma_ratio` until they
/// pass `max_sigma`; each response is the difference between two successive
/// blurs, weighted by the smaller scale.
pub fn blob_dog(image: &ArrayView3<f32>, params: &BlobParams) -> Result<Vec<RawBlob>> {
    let axes = spatial_axes(image);
    let sigmas = dog_sigmas(params.min_sigma, params.max_sigma, params.sigma_ratio);

    let blurred: Vec<Array3<f32>> = sigmas
        .par_iter()
        .map(|&sigma| gaussian_filter(image, sigma, &axes, BoundaryMode::Nearest))
        .collect();

    let cube: Vec<Array3<f32>> = blurred
        .windows(2)
        .zip(&sigmas)
        .map(|(pair, &sigma)| (&pair[0] - &pair[1]) * sigma as f32)
        .collect();

    let peaks = find_scale_space_peaks(&cube, params.threshold as f32);
    Ok(prune_blobs(to_blobs(&peaks, &sigmas), params.overlap, axes.len()))
}

/// `min * ratio^i` for `i in 0..=k` with `k = floor(ln(max / min) / ln(ratio)) + 1`.
fn dog_sigmas(min_sigma: f64, max_sigma: f64, ratio: f64) -> Vec<f64> {
    let k = ((max_sigma / min_sigma).ln() / ratio.ln()) as usize + 1;
    (0..=k).map(|i| min_sigma * ratio.powi(i as i32)).collect()
}
