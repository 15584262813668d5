#![allow(dead_code)]

use ndarray::{Array2, Array3};

use iss_core::spots::BlobDetectorConfig;
use iss_core::stack::ImageStack;

/// Add an isotropic 2D Gaussian blob peaking at `amplitude` on `(cy, cx)`.
pub fn add_blob_2d(data: &mut Array2<f32>, cy: usize, cx: usize, sigma: f64, amplitude: f32) {
    let s2 = 2.0 * sigma * sigma;
    for ((row, col), v) in data.indexed_iter_mut() {
        let dy = row as f64 - cy as f64;
        let dx = col as f64 - cx as f64;
        *v += amplitude * (-(dy * dy + dx * dx) / s2).exp() as f32;
    }
}

/// A `h x w` plane with a single blob.
pub fn blob_plane(h: usize, w: usize, cy: usize, cx: usize, sigma: f64) -> Array2<f32> {
    let mut data = Array2::<f32>::zeros((h, w));
    add_blob_2d(&mut data, cy, cx, sigma, 1.0);
    data
}

/// A `(d, h, w)` volume with a single isotropic blob.
pub fn blob_volume(
    (d, h, w): (usize, usize, usize),
    (cz, cy, cx): (usize, usize, usize),
    sigma: f64,
) -> Array3<f32> {
    let s2 = 2.0 * sigma * sigma;
    Array3::from_shape_fn((d, h, w), |(z, y, x)| {
        let dz = z as f64 - cz as f64;
        let dy = y as f64 - cy as f64;
        let dx = x as f64 - cx as f64;
        (-(dz * dz + dy * dy + dx * dx) / s2).exp() as f32
    })
}

/// Wrap planes indexed `[round][ch]` into a single-plane-per-slice stack.
pub fn stack_from_planes(planes: Vec<Vec<Array2<f32>>>) -> ImageStack {
    let volumes = planes
        .into_iter()
        .map(|chs| chs.into_iter().map(|p| p.insert_axis(ndarray::Axis(0))).collect())
        .collect();
    ImageStack::from_volumes(volumes).expect("valid stack")
}

/// 2 rounds x 2 channels of 32x32 planes, one sigma-2 blob per slice, and
/// the blob centre used for each `[round][ch]`.
pub fn two_by_two_stack() -> (ImageStack, Vec<Vec<(usize, usize)>>) {
    let centres = vec![vec![(8, 9), (20, 11)], vec![(12, 22), (23, 24)]];
    let planes = centres
        .iter()
        .map(|chs| chs.iter().map(|&(y, x)| blob_plane(32, 32, y, x, 2.0)).collect())
        .collect();
    (stack_from_planes(planes), centres)
}

/// LoG config tuned to sigma-2 blobs of unit amplitude.
pub fn log_config() -> BlobDetectorConfig {
    BlobDetectorConfig::new(1.0, 4.0, 7, 0.1)
}
