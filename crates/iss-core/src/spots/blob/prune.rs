use std::collections::HashMap;
use std::f64::consts::PI;

use super::RawBlob;

/// Drop the smaller of every pair of blobs whose overlap exceeds `overlap`.
///
/// `ndim` is the number of spatial dimensions the blobs live in (2 or 3);
/// with 2 the plane coordinate is ignored. The surviving blobs keep their
/// input order.
pub fn prune_blobs(blobs: Vec<RawBlob>, overlap: f64, ndim: usize) -> Vec<RawBlob> {
    let Some(sigma_max) = blobs.iter().map(|b| b.sigma).reduce(f64::max) else {
        return blobs;
    };
    let reach = 2.0 * sigma_max * (ndim as f64).sqrt();
    if reach <= 0.0 {
        return blobs;
    }
    let mut keep = vec![true; blobs.len()];

    for (i, j) in neighbour_pairs(&blobs, reach, ndim) {
        if !keep[i] || !keep[j] {
            continue;
        }
        let (a, b) = (&blobs[i], &blobs[j]);
        if blob_overlap(a, b, ndim) > overlap {
            if a.sigma > b.sigma {
                keep[j] = false;
            } else {
                keep[i] = false;
            }
        }
    }

    blobs
        .into_iter()
        .zip(keep)
        .filter_map(|(b, k)| k.then_some(b))
        .collect()
}

/// Index pairs `(i, j)` with `i < j` of blobs at most `reach` apart, in
/// ascending order.
///
/// Blobs are bucketed into a grid of `reach`-sized cells, so only blobs in
/// the same or an adjacent cell are compared.
fn neighbour_pairs(blobs: &[RawBlob], reach: f64, ndim: usize) -> Vec<(usize, usize)> {
    let cell_of = |p: &[f64; 3]| p.map(|c| (c / reach).floor() as i64);

    let positions: Vec<[f64; 3]> = blobs.iter().map(|b| position(b, ndim)).collect();
    let mut grid: HashMap<[i64; 3], Vec<usize>> = HashMap::new();
    for (i, p) in positions.iter().enumerate() {
        grid.entry(cell_of(p)).or_default().push(i);
    }

    let mut pairs = Vec::new();
    for (i, p) in positions.iter().enumerate() {
        let [cz, cy, cx] = cell_of(p);
        for dz in -1..=1 {
            for dy in -1..=1 {
                for dx in -1..=1 {
                    let Some(members) = grid.get(&[cz + dz, cy + dy, cx + dx]) else {
                        continue;
                    };
                    pairs.extend(
                        members
                            .iter()
                            .filter(|&&j| j > i && distance(p, &positions[j]) <= reach)
                            .map(|&j| (i, j)),
                    );
                }
            }
        }
    }
    pairs.sort_unstable();
    pairs
}

/// Fraction of the smaller blob covered by the larger one, with blob radii
/// `sigma * sqrt(ndim)`.
pub fn blob_overlap(a: &RawBlob, b: &RawBlob, ndim: usize) -> f64 {
    if a.sigma == 0.0 && b.sigma == 0.0 {
        return 0.0;
    }
    let (max_sigma, r1, r2) = if a.sigma > b.sigma {
        (a.sigma, 1.0, b.sigma / a.sigma)
    } else {
        (b.sigma, a.sigma / b.sigma, 1.0)
    };

    // Rescale so the larger blob has unit radius.
    let unit = max_sigma * (ndim as f64).sqrt();
    let scaled = |blob: &RawBlob| position(blob, ndim).map(|c| c / unit);
    let d = distance(&scaled(a), &scaled(b));

    if d > r1 + r2 {
        0.0
    } else if d <= (r1 - r2).abs() {
        1.0
    } else if ndim == 2 {
        disk_overlap(d, r1, r2)
    } else {
        sphere_overlap(d, r1, r2)
    }
}

/// `(plane, y, x)`; the plane is pinned to 0 for 2-D blobs.
fn position(blob: &RawBlob, ndim: usize) -> [f64; 3] {
    let plane = if ndim == 2 { 0.0 } else { blob.plane as f64 };
    [plane, blob.y as f64, blob.x as f64]
}

fn distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(p, q)| (p - q).powi(2))
        .sum::<f64>()
        .sqrt()
}

fn disk_overlap(d: f64, r1: f64, r2: f64) -> f64 {
    let ratio1 = ((d * d + r1 * r1 - r2 * r2) / (2.0 * d * r1)).clamp(-1.0, 1.0);
    let ratio2 = ((d * d + r2 * r2 - r1 * r1) / (2.0 * d * r2)).clamp(-1.0, 1.0);
    let a = -d + r2 + r1;
    let b = d - r2 + r1;
    let c = d + r2 - r1;
    let e = d + r2 + r1;
    let area = r1 * r1 * ratio1.acos() + r2 * r2 * ratio2.acos() - 0.5 * (a * b * c * e).abs().sqrt();
    area / (PI * r1.min(r2).powi(2))
}

fn sphere_overlap(d: f64, r1: f64, r2: f64) -> f64 {
    let vol = PI / (12.0 * d)
        * (r1 + r2 - d).powi(2)
        * (d * d + 2.0 * d * (r1 + r2) - 3.0 * (r1 * r1 + r2 * r2) + 6.0 * r1 * r2);
    vol / (4.0 / 3.0 * PI * r1.min(r2).powi(3))
}
