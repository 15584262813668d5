/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Gaussian kernels are truncated at this many standard deviations.
pub const GAUSSIAN_TRUNCATE: f64 = 4.0;

/// Conversion from kernel scale (sigma) to spot radius: radius = round(sigma * sqrt(3)).
pub const SIGMA_TO_RADIUS: f64 = 1.732_050_807_568_877_2;

/// Weight of the mixed derivative in the box-filter Hessian determinant (SURF).
pub const HESSIAN_DXY_WEIGHT: f64 = 0.81;

/// Default minimum kernel scale.
pub const DEFAULT_MIN_SIGMA: f64 = 1.0;

/// Default maximum kernel scale.
pub const DEFAULT_MAX_SIGMA: f64 = 50.0;

/// Default number of scales between min and max sigma.
pub const DEFAULT_NUM_SIGMA: usize = 10;

/// Default absolute threshold for scale-space maxima.
pub const DEFAULT_THRESHOLD: f64 = 0.1;

/// Default overlap fraction above which the smaller blob is discarded.
pub const DEFAULT_OVERLAP: f64 = 0.5;

/// Default ratio between successive scales for difference of Gaussian.
pub const DEFAULT_SIGMA_RATIO: f64 = 1.6;

/// Default intensity measurement.
pub const DEFAULT_MEASUREMENT_TYPE: &str = "max";

/// Default blob detection kernel.
pub const DEFAULT_DETECTOR_METHOD: &str = "blob_log";
