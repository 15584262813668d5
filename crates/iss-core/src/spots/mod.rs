pub mod attributes;
pub mod blob;
pub mod config;
pub mod detector;
pub mod measure;

pub use attributes::{Spot, SpotAttributes};
pub use blob::DetectorMethod;
pub use config::BlobDetectorConfig;
pub use detector::BlobDetector;
pub use measure::MeasurementType;
