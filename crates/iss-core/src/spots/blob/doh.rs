use ndarray::{s, Array2, Array3, ArrayView2, ArrayView3, Axis};
use rayon::prelude::*;

use crate::consts::HESSIAN_DXY_WEIGHT;
use crate::error::{IssError, Result};

use super::peaks::find_scale_space_peaks;
use super::prune::prune_blobs;
use super::{linspace, to_blobs, BlobParams, RawBlob};

/// Determinant of Hessian blob detection on a single plane.
///
/// The Hessian is approximated with box filters over an integral image, so
/// cost per scale does not grow with sigma. Volumetric slices are rejected.
pub fn blob_doh(image: &ArrayView3<f32>, params: &BlobParams) -> Result<Vec<RawBlob>> {
    let depth = image.len_of(Axis(0));
    if depth != 1 {
        return Err(IssError::UnsupportedDimensionality {
            method: "blob_doh",
            depth,
        });
    }

    let integral = integral_image(&image.slice(s![0, .., ..]));
    let sigmas = linspace(params.min_sigma, params.max_sigma, params.num_sigma);

    let cube: Vec<Array3<f32>> = sigmas
        .par_iter()
        .map(|&sigma| hessian_determinant(&integral, sigma).insert_axis(Axis(0)))
        .collect();

    let peaks = find_scale_space_peaks(&cube, params.threshold as f32);
    Ok(prune_blobs(to_blobs(&peaks, &sigmas), params.overlap, 2))
}

/// Summed-area table: each entry is the sum of all pixels above and to the
/// left of it, inclusive.
pub fn integral_image(image: &ArrayView2<f32>) -> Array2<f64> {
    let (h, w) = image.dim();
    let mut out = Array2::<f64>::zeros((h, w));
    for row in 0..h {
        let mut row_sum = 0.0f64;
        for col in 0..w {
            row_sum += image[[row, col]] as f64;
            out[[row, col]] = row_sum + if row > 0 { out[[row - 1, col]] } else { 0.0 };
        }
    }
    out
}

/// Box-filter approximation of the Hessian determinant at scale `sigma`,
/// `Dxx * Dyy - 0.81 * Dxy^2`.
pub fn hessian_determinant(integral: &Array2<f64>, sigma: f64) -> Array2<f32> {
    let (h, w) = integral.dim();
    let size = ((3.0 * sigma) as isize).max(1);
    let s2 = (size - 1) / 2;
    let s3 = size / 3;
    let weight = 1.0 / (size * size) as f64;

    let mut out = Array2::<f32>::zeros((h, w));
    for r in 0..h as isize {
        for c in 0..w as isize {
            let tl = box_sum(integral, r - s3, c - s3, s3, s3);
            let br = box_sum(integral, r + 1, c + 1, s3, s3);
            let bl = box_sum(integral, r - s3, c + 1, s3, s3);
            let tr = box_sum(integral, r + 1, c - s3, s3, s3);
            let dxy = -(bl + tr - tl - br) * weight;

            let mid = box_sum(integral, r - s3 + 1, c - s2, 2 * s3 - 1, size);
            let side = box_sum(integral, r - s3 + 1, c - s3 / 2, 2 * s3 - 1, s3);
            let dxx = -(mid - 3.0 * side) * weight;

            let mid = box_sum(integral, r - s2, c - s3 + 1, size, 2 * s3 - 1);
            let side = box_sum(integral, r - s3 / 2, c - s3 + 1, s3, 2 * s3 - 1);
            let dyy = -(mid - 3.0 * side) * weight;

            out[[r as usize, c as usize]] = (dxx * dyy - HESSIAN_DXY_WEIGHT * dxy * dxy) as f32;
        }
    }
    out
}

/// Sum of the box spanning `rows` x `cols` from `(r, c)`, clipped to the
/// image and floored at zero.
fn box_sum(integral: &Array2<f64>, r: isize, c: isize, rows: isize, cols: isize) -> f64 {
    let (h, w) = integral.dim();
    let clip_r = |v: isize| v.clamp(0, h as isize - 1) as usize;
    let clip_c = |v: isize| v.clamp(0, w as isize - 1) as usize;

    let (r1, c1) = (clip_r(r), clip_c(c));
    let (r2, c2) = (clip_r(r1 as isize + rows), clip_c(c1 as isize + cols));
    let sum = integral[[r1, c1]] + integral[[r2, c2]] - integral[[r1, c2]] - integral[[r2, c1]];
    sum.max(0.0)
}
