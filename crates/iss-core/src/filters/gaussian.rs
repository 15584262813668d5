use ndarray::{Array3, ArrayView1, ArrayView3, ArrayViewMut1, Axis, Zip};
use serde::{Deserialize, Serialize};

use crate::consts::{GAUSSIAN_TRUNCATE, PARALLEL_PIXEL_THRESHOLD};

/// How samples outside the image are synthesised during correlation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundaryMode {
    /// Mirror about the edge, repeating the edge sample: `d c b a | a b c d`.
    #[default]
    Reflect,
    /// Repeat the edge sample: `a a a a | a b c d`.
    Nearest,
}

/// Derivative order of a 1D Gaussian kernel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GaussianOrder {
    Smooth,
    SecondDerivative,
}

/// Build a normalised 1D Gaussian kernel (or its second derivative) with
/// radius `floor(4 * sigma + 0.5)`.
pub fn gaussian_kernel(sigma: f64, order: GaussianOrder) -> Vec<f32> {
    let radius = (GAUSSIAN_TRUNCATE * sigma + 0.5) as isize;
    let s2 = sigma * sigma;

    let phi: Vec<f64> = (-radius..=radius)
        .map(|x| (-0.5 * (x * x) as f64 / s2).exp())
        .collect();
    let sum: f64 = phi.iter().sum();

    (-radius..=radius)
        .zip(phi)
        .map(|(x, p)| {
            let p = p / sum;
            let v = match order {
                GaussianOrder::Smooth => p,
                GaussianOrder::SecondDerivative => p * ((x * x) as f64 - s2) / (s2 * s2),
            };
            v as f32
        })
        .collect()
}

/// Correlate every lane of `data` along `axis` with a symmetric 1D kernel.
pub fn correlate_axis(
    data: &ArrayView3<f32>,
    kernel: &[f32],
    axis: Axis,
    mode: BoundaryMode,
) -> Array3<f32> {
    let mut out = Array3::<f32>::zeros(data.raw_dim());
    let zip = Zip::from(out.lanes_mut(axis)).and(data.lanes(axis));

    if data.len() >= PARALLEL_PIXEL_THRESHOLD {
        zip.par_for_each(|o, i| correlate_lane(i, o, kernel, mode));
    } else {
        zip.for_each(|o, i| correlate_lane(i, o, kernel, mode));
    }
    out
}

fn correlate_lane(
    input: ArrayView1<f32>,
    mut output: ArrayViewMut1<f32>,
    kernel: &[f32],
    mode: BoundaryMode,
) {
    let n = input.len();
    let radius = (kernel.len() / 2) as isize;

    for (i, o) in output.iter_mut().enumerate() {
        let mut sum = 0.0f32;
        for (ki, &kv) in kernel.iter().enumerate() {
            let src = boundary_index(i as isize + ki as isize - radius, n, mode);
            sum += input[src] * kv;
        }
        *o = sum;
    }
}

fn boundary_index(i: isize, n: usize, mode: BoundaryMode) -> usize {
    let n = n as isize;
    if (0..n).contains(&i) {
        return i as usize;
    }
    match mode {
        BoundaryMode::Nearest => i.clamp(0, n - 1) as usize,
        BoundaryMode::Reflect => {
            let period = 2 * n;
            let m = i.rem_euclid(period);
            (if m >= n { period - 1 - m } else { m }) as usize
        }
    }
}

/// Separable Gaussian smoothing over the given axes.
pub fn gaussian_filter(
    data: &ArrayView3<f32>,
    sigma: f64,
    axes: &[Axis],
    mode: BoundaryMode,
) -> Array3<f32> {
    let kernel = gaussian_kernel(sigma, GaussianOrder::Smooth);
    let mut result = data.to_owned();
    for &axis in axes {
        result = correlate_axis(&result.view(), &kernel, axis, mode);
    }
    result
}

/// Laplacian of Gaussian: the sum over `axes` of the second Gaussian
/// derivative along one axis combined with smoothing along the others.
pub fn gaussian_laplace(
    data: &ArrayView3<f32>,
    sigma: f64,
    axes: &[Axis],
    mode: BoundaryMode,
) -> Array3<f32> {
    let smooth = gaussian_kernel(sigma, GaussianOrder::Smooth);
    let second = gaussian_kernel(sigma, GaussianOrder::SecondDerivative);

    let mut total = Array3::<f32>::zeros(data.raw_dim());
    for &deriv_axis in axes {
        let mut term = data.to_owned();
        for &axis in axes {
            let kernel = if axis == deriv_axis { &second } else { &smooth };
            term = correlate_axis(&term.view(), kernel, axis, mode);
        }
        total += &term;
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflect_index() {
        assert_eq!(boundary_index(-1, 4, BoundaryMode::Reflect), 0);
        assert_eq!(boundary_index(-2, 4, BoundaryMode::Reflect), 1);
        assert_eq!(boundary_index(4, 4, BoundaryMode::Reflect), 3);
        assert_eq!(boundary_index(5, 4, BoundaryMode::Reflect), 2);
        assert_eq!(boundary_index(-3, 1, BoundaryMode::Reflect), 0);
    }

    #[test]
    fn test_nearest_index() {
        assert_eq!(boundary_index(-5, 4, BoundaryMode::Nearest), 0);
        assert_eq!(boundary_index(9, 4, BoundaryMode::Nearest), 3);
    }

    #[test]
    fn test_kernel_sums() {
        let smooth = gaussian_kernel(2.0, GaussianOrder::Smooth);
        assert_eq!(smooth.len(), 17);
        assert!((smooth.iter().sum::<f32>() - 1.0).abs() < 1e-5);

        // The second derivative of a normalised Gaussian integrates to ~0.
        let second = gaussian_kernel(2.0, GaussianOrder::SecondDerivative);
        assert!(second.iter().sum::<f32>().abs() < 1e-3);
        assert!(second[second.len() / 2] < 0.0);
    }
}
