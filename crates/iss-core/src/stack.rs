use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use ndarray::{s, Array3, Array5, ArrayView3};
use num_traits::PrimInt;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{IssError, Result};
use crate::progress::{NoOpReporter, ProgressReporter};

/// Axes of an [`ImageStack`], in storage order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axes {
    Round,
    Ch,
    ZPlane,
    Y,
    X,
}

impl fmt::Display for Axes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Round => write!(f, "r"),
            Self::Ch => write!(f, "c"),
            Self::ZPlane => write!(f, "z"),
            Self::Y => write!(f, "y"),
            Self::X => write!(f, "x"),
        }
    }
}

/// Identifies the group a slice was taken from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SliceIndex {
    pub round: usize,
    pub ch: usize,
    /// Set when the stack was also grouped by z-plane.
    pub z: Option<usize>,
}

/// A multi-round, multi-channel image volume.
///
/// Data is stored as `(round, ch, z, y, x)` with f32 intensities, typically
/// in [0.0, 1.0].
#[derive(Clone, Debug)]
pub struct ImageStack {
    data: Array5<f32>,
}

impl ImageStack {
    pub fn new(data: Array5<f32>) -> Result<Self> {
        if data.is_empty() {
            return Err(IssError::InvalidStack(format!(
                "stack has an empty axis: {:?}",
                data.shape()
            )));
        }
        Ok(Self { data })
    }

    /// Build a stack from one `(z, y, x)` volume per (round, ch).
    ///
    /// `volumes` is indexed `[round][ch]`; every volume must share one shape.
    pub fn from_volumes(volumes: Vec<Vec<Array3<f32>>>) -> Result<Self> {
        let n_rounds = volumes.len();
        let n_chs = volumes.first().map_or(0, Vec::len);
        let shape = volumes
            .first()
            .and_then(|chs| chs.first())
            .map(|v| v.dim())
            .ok_or_else(|| IssError::InvalidStack("no volumes supplied".into()))?;

        let (nz, ny, nx) = shape;
        let mut data = Array5::<f32>::zeros((n_rounds, n_chs, nz, ny, nx));
        for (r, chs) in volumes.iter().enumerate() {
            if chs.len() != n_chs {
                return Err(IssError::InvalidStack(format!(
                    "round {r} has {} channels, expected {n_chs}",
                    chs.len()
                )));
            }
            for (c, volume) in chs.iter().enumerate() {
                if volume.dim() != shape {
                    return Err(IssError::InvalidStack(format!(
                        "volume (r={r}, c={c}) has shape {:?}, expected {:?}",
                        volume.dim(),
                        shape
                    )));
                }
                data.slice_mut(s![r, c, .., .., ..]).assign(volume);
            }
        }
        Self::new(data)
    }

    /// Build a stack from integer samples, scaling by the type's maximum so
    /// that values land in [0.0, 1.0] for unsigned data.
    pub fn from_integer<T: PrimInt>(data: Array5<T>) -> Result<Self> {
        let scale = T::max_value().to_f32().unwrap_or(1.0);
        Self::new(data.mapv(|v| v.to_f32().unwrap_or(0.0) / scale))
    }

    pub fn data(&self) -> &Array5<f32> {
        &self.data
    }

    pub fn num_rounds(&self) -> usize {
        self.data.shape()[0]
    }

    pub fn num_chs(&self) -> usize {
        self.data.shape()[1]
    }

    pub fn num_zplanes(&self) -> usize {
        self.data.shape()[2]
    }

    /// `(y, x)` size of each plane.
    pub fn plane_shape(&self) -> (usize, usize) {
        (self.data.shape()[3], self.data.shape()[4])
    }

    /// Size along one axis.
    pub fn axis_len(&self, axis: Axes) -> usize {
        let i = match axis {
            Axes::Round => 0,
            Axes::Ch => 1,
            Axes::ZPlane => 2,
            Axes::Y => 3,
            Axes::X => 4,
        };
        self.data.shape()[i]
    }

    /// The `(z, y, x)` sub-volume for one group. A z-grouped index yields a
    /// single-plane view.
    pub fn slice(&self, index: SliceIndex) -> ArrayView3<'_, f32> {
        match index.z {
            Some(z) => self.data.slice(s![index.round, index.ch, z..z + 1, .., ..]),
            None => self.data.slice(s![index.round, index.ch, .., .., ..]),
        }
    }

    /// Enumerate every group index for the given `group_by` axes.
    ///
    /// Round and channel are always grouped; grouping by z additionally
    /// splits each volume into single planes. Y and X cannot be grouped.
    pub fn group_indices(&self, group_by: &[Axes]) -> Result<Vec<SliceIndex>> {
        if group_by.iter().any(|a| matches!(a, Axes::Y | Axes::X)) {
            return Err(IssError::InvalidParameter {
                name: "group_by",
                reason: "only round, ch and z axes can be grouped".into(),
            });
        }
        if !group_by.contains(&Axes::Round) || !group_by.contains(&Axes::Ch) {
            return Err(IssError::InvalidParameter {
                name: "group_by",
                reason: "round and ch must both be grouped".into(),
            });
        }
        let by_z = group_by.contains(&Axes::ZPlane);

        let mut indices = Vec::new();
        for round in 0..self.num_rounds() {
            for ch in 0..self.num_chs() {
                if by_z {
                    indices.extend((0..self.num_zplanes()).map(|z| SliceIndex {
                        round,
                        ch,
                        z: Some(z),
                    }));
                } else {
                    indices.push(SliceIndex { round, ch, z: None });
                }
            }
        }
        Ok(indices)
    }

    /// Apply `func` to every slice selected by `group_by`.
    ///
    /// With `n_processes = None` slices are processed one after the other on
    /// the calling thread; with `Some(n)` they are spread over a dedicated
    /// pool of `n` worker threads. Results come back paired with their group
    /// index, in no guaranteed order. The first error aborts the call.
    pub fn transform<F, R>(
        &self,
        func: F,
        group_by: &[Axes],
        n_processes: Option<usize>,
    ) -> Result<Vec<(R, SliceIndex)>>
    where
        F: Fn(ArrayView3<'_, f32>) -> Result<R> + Sync,
        R: Send,
    {
        self.transform_reported(func, group_by, n_processes, &NoOpReporter)
    }

    /// Like [`ImageStack::transform`], reporting each finished slice.
    pub fn transform_reported<F, R>(
        &self,
        func: F,
        group_by: &[Axes],
        n_processes: Option<usize>,
        reporter: &dyn ProgressReporter,
    ) -> Result<Vec<(R, SliceIndex)>>
    where
        F: Fn(ArrayView3<'_, f32>) -> Result<R> + Sync,
        R: Send,
    {
        let indices = self.group_indices(group_by)?;
        let done = AtomicUsize::new(0);
        info!(
            slices = indices.len(),
            n_processes = ?n_processes,
            "Transforming image stack"
        );
        reporter.begin(indices.len());

        let apply = |index: SliceIndex| -> Result<(R, SliceIndex)> {
            debug!(round = index.round, ch = index.ch, z = ?index.z, "Processing slice");
            let result = func(self.slice(index))?;
            reporter.advance(done.fetch_add(1, Ordering::Relaxed) + 1);
            Ok((result, index))
        };

        let results = match n_processes {
            None => indices.into_iter().map(apply).collect::<Result<Vec<_>>>(),
            Some(n) => {
                let pool = rayon::ThreadPoolBuilder::new().num_threads(n).build()?;
                pool.install(|| indices.into_par_iter().map(apply).collect::<Result<Vec<_>>>())
            }
        }?;

        reporter.finish();
        Ok(results)
    }
}
