use ndarray::ArrayView3;
use tracing::{debug, info};

use crate::consts::SIGMA_TO_RADIUS;
use crate::error::{IssError, Result};
use crate::progress::{NoOpReporter, ProgressReporter};
use crate::stack::{Axes, ImageStack, SliceIndex};

use super::attributes::{Spot, SpotAttributes};
use super::blob::{BlobParams, DetectorMethod};
use super::config::BlobDetectorConfig;
use super::measure::{measure_spot_intensity, MeasurementType};

/// Multi-dimensional Gaussian blob spot detector.
///
/// Wraps one of the [`DetectorMethod`] kernels and applies it independently
/// to every (round, channel) slice of an [`ImageStack`].
#[derive(Clone, Debug)]
pub struct BlobDetector {
    config: BlobDetectorConfig,
    method: DetectorMethod,
    measurement: MeasurementType,
    params: BlobParams,
}

impl BlobDetector {
    /// Validate `config` and resolve its kernel and measurement names.
    pub fn new(config: BlobDetectorConfig) -> Result<Self> {
        let measurement: MeasurementType = config.measurement_type.parse()?;
        let method: DetectorMethod = config.detector_method.parse()?;
        validate(&config)?;

        let params = BlobParams {
            min_sigma: config.min_sigma,
            max_sigma: config.max_sigma,
            num_sigma: config.num_sigma,
            threshold: config.threshold,
            overlap: config.overlap,
            sigma_ratio: config.sigma_ratio,
        };

        Ok(Self {
            config,
            method,
            measurement,
            params,
        })
    }

    pub fn config(&self) -> &BlobDetectorConfig {
        &self.config
    }

    pub fn method(&self) -> DetectorMethod {
        self.method
    }

    pub fn measurement(&self) -> MeasurementType {
        self.measurement
    }

    /// Axes each stack is split along before detection.
    pub fn group_by(&self) -> Vec<Axes> {
        if self.config.is_volume {
            vec![Axes::Round, Axes::Ch]
        } else {
            vec![Axes::Round, Axes::Ch, Axes::ZPlane]
        }
    }

    /// Find spots in one `(z, y, x)` slice.
    ///
    /// Returns an empty table when the kernel finds nothing.
    pub fn image_to_spots(&self, image: ArrayView3<'_, f32>) -> Result<SpotAttributes> {
        let blobs = self.method.detect(&image, &self.params)?;
        if blobs.is_empty() {
            return Ok(SpotAttributes::empty());
        }

        let spots = blobs
            .iter()
            .enumerate()
            .map(|(spot_id, blob)| {
                let radius = sigma_to_radius(blob.sigma);
                let intensity = measure_spot_intensity(
                    &image,
                    (blob.plane, blob.y, blob.x),
                    radius,
                    self.measurement,
                );
                Spot {
                    plane: blob.plane,
                    y: blob.y,
                    x: blob.x,
                    radius,
                    intensity,
                    spot_id,
                }
            })
            .collect();

        Ok(SpotAttributes::from_spots(spots))
    }

    /// Detect spots in every slice and return one table per slice, paired
    /// with the slice it came from.
    pub fn run_grouped(
        &self,
        stack: &ImageStack,
        n_processes: Option<usize>,
    ) -> Result<Vec<(SpotAttributes, SliceIndex)>> {
        self.run_grouped_reported(stack, n_processes, &NoOpReporter)
    }

    /// Detect spots across the whole stack.
    ///
    /// Every (round, ch) slice is processed independently, on up to
    /// `n_processes` worker threads when given. The combined table has no
    /// guaranteed row order; a failure on any slice fails the whole call.
    pub fn run(&self, stack: &ImageStack, n_processes: Option<usize>) -> Result<SpotAttributes> {
        self.run_reported(stack, n_processes, &NoOpReporter)
    }

    pub fn run_reported(
        &self,
        stack: &ImageStack,
        n_processes: Option<usize>,
        reporter: &dyn ProgressReporter,
    ) -> Result<SpotAttributes> {
        let grouped = self.run_grouped_reported(stack, n_processes, reporter)?;
        let spots = SpotAttributes::concat(grouped.into_iter().map(|(table, _)| table));
        info!(spots = spots.len(), "Spot detection complete");
        Ok(spots)
    }

    pub fn run_grouped_reported(
        &self,
        stack: &ImageStack,
        n_processes: Option<usize>,
        reporter: &dyn ProgressReporter,
    ) -> Result<Vec<(SpotAttributes, SliceIndex)>> {
        info!(
            method = %self.method,
            measurement = %self.measurement,
            is_volume = self.config.is_volume,
            "Detecting spots"
        );

        let results = stack.transform_reported(
            |image| self.image_to_spots(image),
            &self.group_by(),
            n_processes,
            reporter,
        )?;

        Ok(results
            .into_iter()
            .map(|(table, index)| {
                debug!(
                    round = index.round,
                    ch = index.ch,
                    z = ?index.z,
                    spots = table.len(),
                    "Slice done"
                );
                (place_on_plane(table, index), index)
            })
            .collect())
    }
}

/// Spot radius for a kernel scale: `round(sigma * sqrt(3))`.
pub fn sigma_to_radius(sigma: f64) -> f64 {
    (sigma * SIGMA_TO_RADIUS).round()
}

/// Single-plane slices report plane 0; move their spots to the plane the
/// slice was cut from.
fn place_on_plane(table: SpotAttributes, index: SliceIndex) -> SpotAttributes {
    match index.z {
        Some(z) => SpotAttributes::from_spots(
            table
                .into_spots()
                .into_iter()
                .map(|spot| Spot { plane: z, ..spot })
                .collect(),
        ),
        None => table,
    }
}

fn validate(config: &BlobDetectorConfig) -> Result<()> {
    let invalid = |name: &'static str, reason: String| -> Result<()> {
        Err(IssError::InvalidParameter { name, reason })
    };

    if !(config.min_sigma > 0.0) {
        return invalid("min_sigma", format!("must be positive, got {}", config.min_sigma));
    }
    if !(config.max_sigma >= config.min_sigma) {
        return invalid(
            "max_sigma",
            format!("{} is below min_sigma {}", config.max_sigma, config.min_sigma),
        );
    }
    if config.num_sigma == 0 {
        return invalid("num_sigma", "must be at least 1".into());
    }
    if !(0.0..=1.0).contains(&config.overlap) {
        return invalid("overlap", format!("must lie in [0, 1], got {}", config.overlap));
    }
    if !(config.sigma_ratio > 1.0) {
        return invalid("sigma_ratio", format!("must exceed 1, got {}", config.sigma_ratio));
    }
    Ok(())
}

