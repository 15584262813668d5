use thiserror::Error;

#[derive(Error, Debug)]
pub enum IssError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid manifest: {0}")]
    Manifest(#[from] toml::de::Error),

    #[error("Detector method must be one of {{blob_log, blob_dog, blob_doh}}, got {0:?}")]
    UnsupportedDetectorMethod(String),

    #[error("Measurement type must be one of {{max, mean}}, got {0:?}")]
    UnsupportedMeasurement(String),

    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("{method} does not support {depth}-plane volumes")]
    UnsupportedDimensionality { method: &'static str, depth: usize },

    #[error("Invalid image stack: {0}")]
    InvalidStack(String),

    #[error("Worker pool error: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, IssError>;
