use std::fmt;
use std::str::FromStr;

use ndarray::ArrayView3;

use crate::error::IssError;

/// Statistic used to reduce the voxels of a spot to one intensity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MeasurementType {
    #[default]
    Max,
    Mean,
}

impl FromStr for MeasurementType {
    type Err = IssError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "max" => Ok(Self::Max),
            "mean" => Ok(Self::Mean),
            other => Err(IssError::UnsupportedMeasurement(other.to_string())),
        }
    }
}

impl fmt::Display for MeasurementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Max => write!(f, "max"),
            Self::Mean => write!(f, "mean"),
        }
    }
}

impl MeasurementType {
    /// Reduce a set of values. An empty set measures 0.
    pub fn reduce<I: IntoIterator<Item = f32>>(&self, values: I) -> f32 {
        let reduced = match self {
            Self::Max => values.into_iter().fold(None, |acc: Option<f32>, v| {
                Some(acc.map_or(v, |a| a.max(v)))
            }),
            Self::Mean => {
                let (sum, n) = values
                    .into_iter()
                    .fold((0.0f64, 0usize), |(s, n), v| (s + v as f64, n + 1));
                (n > 0).then(|| (sum / n as f64) as f32)
            }
        };
        reduced.unwrap_or(0.0)
    }
}

/// Measure the intensity of a spot centred at `(plane, y, x)` over every
/// voxel within `radius`.
///
/// Volumes use a sphere; single-plane slices use a disk on that plane.
pub fn measure_spot_intensity(
    image: &ArrayView3<f32>,
    (plane, y, x): (usize, usize, usize),
    radius: f64,
    measurement: MeasurementType,
) -> f32 {
    let (nz, ny, nx) = image.dim();
    let r = radius.max(0.0);
    let reach = r.floor() as usize;
    let r2 = r * r;

    let z_range = if nz > 1 {
        plane.saturating_sub(reach)..(plane + reach + 1).min(nz)
    } else {
        0..1
    };
    let y_range = y.saturating_sub(reach)..(y + reach + 1).min(ny);
    let x_range = x.saturating_sub(reach)..(x + reach + 1).min(nx);

    let mut values = Vec::new();
    for zi in z_range {
        let dz = if nz > 1 { zi as f64 - plane as f64 } else { 0.0 };
        for yi in y_range.clone() {
            let dy = yi as f64 - y as f64;
            for xi in x_range.clone() {
                let dx = xi as f64 - x as f64;
                if dz * dz + dy * dy + dx * dx <= r2 {
                    values.push(image[[zi, yi, xi]]);
                }
            }
        }
    }
    measurement.reduce(values)
}
