use ndarray::Array3;
use rayon::prelude::*;

/// A local maximum in a scale-space cube.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScalePeak {
    pub scale: usize,
    pub plane: usize,
    pub y: usize,
    pub x: usize,
    pub response: f32,
}

/// Find local maxima of a scale-space cube, one `(z, y, x)` response per scale.
///
/// A voxel is a peak when its response is strictly above `threshold` and no
/// smaller than any neighbour in the 3x3x3x3 window spanning adjacent scales.
/// Out-of-range neighbours repeat the edge voxel. A constant cube has no
/// peaks. Peaks come back sorted by response, strongest first.
pub fn find_scale_space_peaks(cube: &[Array3<f32>], threshold: f32) -> Vec<ScalePeak> {
    let Some(first) = cube.first().and_then(|c| c.iter().next().copied()) else {
        return Vec::new();
    };
    if cube.iter().all(|c| c.iter().all(|&v| v == first)) {
        return Vec::new();
    }

    let n_scales = cube.len();
    let mut peaks: Vec<ScalePeak> = (0..n_scales)
        .into_par_iter()
        .flat_map_iter(|scale| {
            let (nz, ny, nx) = cube[scale].dim();
            let mut found = Vec::new();
            for z in 0..nz {
                for y in 0..ny {
                    for x in 0..nx {
                        let v = cube[scale][[z, y, x]];
                        if v > threshold && is_local_max(cube, scale, z, y, x, v) {
                            found.push(ScalePeak {
                                scale,
                                plane: z,
                                y,
                                x,
                                response: v,
                            });
                        }
                    }
                }
            }
            found
        })
        .collect();

    peaks.sort_by(|a, b| {
        b.response
            .total_cmp(&a.response)
            .then_with(|| (a.scale, a.plane, a.y, a.x).cmp(&(b.scale, b.plane, b.y, b.x)))
    });
    peaks
}

fn is_local_max(cube: &[Array3<f32>], scale: usize, z: usize, y: usize, x: usize, v: f32) -> bool {
    let (nz, ny, nx) = cube[scale].dim();
    for s in neighbours(scale, cube.len()) {
        for zi in neighbours(z, nz) {
            for yi in neighbours(y, ny) {
                for xi in neighbours(x, nx) {
                    if cube[s][[zi, yi, xi]] > v {
                        return false;
                    }
                }
            }
        }
    }
    true
}

fn neighbours(i: usize, n: usize) -> std::ops::RangeInclusive<usize> {
    i.saturating_sub(1)..=(i + 1).min(n - 1)
}
