use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_DETECTOR_METHOD, DEFAULT_MAX_SIGMA, DEFAULT_MEASUREMENT_TYPE, DEFAULT_MIN_SIGMA,
    DEFAULT_NUM_SIGMA, DEFAULT_OVERLAP, DEFAULT_SIGMA_RATIO, DEFAULT_THRESHOLD,
};

/// Parameters of the blob spot detector.
///
/// `measurement_type` and `detector_method` are kept as names so that a
/// config file with an unknown value still loads; they are validated when a
/// [`BlobDetector`](super::BlobDetector) is built from it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlobDetectorConfig {
    /// Smallest Gaussian kernel standard deviation. Keep low to find small blobs.
    #[serde(default = "default_min_sigma")]
    pub min_sigma: f64,
    /// Largest Gaussian kernel standard deviation.
    #[serde(default = "default_max_sigma")]
    pub max_sigma: f64,
    /// Number of scales considered between `min_sigma` and `max_sigma`.
    #[serde(default = "default_num_sigma")]
    pub num_sigma: usize,
    /// Absolute lower bound for scale-space maxima.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Blobs overlapping by more than this fraction are merged, in [0, 1].
    #[serde(default = "default_overlap")]
    pub overlap: f64,
    /// `max` or `mean`.
    #[serde(default = "default_measurement_type")]
    pub measurement_type: String,
    /// Detect on whole (z, y, x) volumes rather than per z-plane.
    #[serde(default = "default_is_volume")]
    pub is_volume: bool,
    /// `blob_log`, `blob_dog` or `blob_doh`.
    #[serde(default = "default_detector_method")]
    pub detector_method: String,
    /// Ratio between successive scales; difference of Gaussian only.
    #[serde(default = "default_sigma_ratio")]
    pub sigma_ratio: f64,
}

fn default_min_sigma() -> f64 {
    DEFAULT_MIN_SIGMA
}
fn default_max_sigma() -> f64 {
    DEFAULT_MAX_SIGMA
}
fn default_num_sigma() -> usize {
    DEFAULT_NUM_SIGMA
}
fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}
fn default_overlap() -> f64 {
    DEFAULT_OVERLAP
}
fn default_measurement_type() -> String {
    DEFAULT_MEASUREMENT_TYPE.to_string()
}
fn default_is_volume() -> bool {
    true
}
fn default_detector_method() -> String {
    DEFAULT_DETECTOR_METHOD.to_string()
}
fn default_sigma_ratio() -> f64 {
    DEFAULT_SIGMA_RATIO
}

impl Default for BlobDetectorConfig {
    fn default() -> Self {
        Self {
            min_sigma: DEFAULT_MIN_SIGMA,
            max_sigma: DEFAULT_MAX_SIGMA,
            num_sigma: DEFAULT_NUM_SIGMA,
            threshold: DEFAULT_THRESHOLD,
            overlap: DEFAULT_OVERLAP,
            measurement_type: default_measurement_type(),
            is_volume: true,
            detector_method: default_detector_method(),
            sigma_ratio: DEFAULT_SIGMA_RATIO,
        }
    }
}

impl BlobDetectorConfig {
    pub fn new(min_sigma: f64, max_sigma: f64, num_sigma: usize, threshold: f64) -> Self {
        Self {
            min_sigma,
            max_sigma,
            num_sigma,
            threshold,
            ..Default::default()
        }
    }

    pub fn with_overlap(mut self, overlap: f64) -> Self {
        self.overlap = overlap;
        self
    }

    pub fn with_measurement_type(mut self, name: impl Into<String>) -> Self {
        self.measurement_type = name.into();
        self
    }

    pub fn with_is_volume(mut self, is_volume: bool) -> Self {
        self.is_volume = is_volume;
        self
    }

    pub fn with_detector_method(mut self, name: impl Into<String>) -> Self {
        self.detector_method = name.into();
        self
    }

    pub fn with_sigma_ratio(mut self, ratio: f64) -> Self {
        self.sigma_ratio = ratio;
        self
    }
}
