use iss_core::error::IssError;
use iss_core::spots::{BlobDetector, BlobDetectorConfig, DetectorMethod, MeasurementType};

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

#[test]
fn test_supported_names_construct() {
    for method in ["blob_log", "blob_dog", "blob_doh"] {
        for measurement in ["max", "mean"] {
            let config = BlobDetectorConfig::new(1.0, 4.0, 5, 0.1)
                .with_detector_method(method)
                .with_measurement_type(measurement);
            let detector = BlobDetector::new(config).unwrap();
            assert_eq!(detector.method().name(), method);
            assert_eq!(detector.measurement().to_string(), measurement);
        }
    }
}

#[test]
fn test_unsupported_method_fails() {
    let config = BlobDetectorConfig::default().with_detector_method("blob_magic");
    match BlobDetector::new(config) {
        Err(IssError::UnsupportedDetectorMethod(name)) => assert_eq!(name, "blob_magic"),
        other => panic!("expected UnsupportedDetectorMethod, got {other:?}"),
    }
}

#[test]
fn test_unsupported_measurement_fails() {
    let config = BlobDetectorConfig::default().with_measurement_type("median");
    match BlobDetector::new(config) {
        Err(IssError::UnsupportedMeasurement(name)) => assert_eq!(name, "median"),
        other => panic!("expected UnsupportedMeasurement, got {other:?}"),
    }
}

#[test]
fn test_error_message_lists_supported_methods() {
    let err = BlobDetector::new(BlobDetectorConfig::default().with_detector_method("x"))
        .unwrap_err()
        .to_string();
    assert!(err.contains("blob_log"), "got: {err}");
    assert!(err.contains("blob_doh"), "got: {err}");
}

#[test]
fn test_invalid_numeric_parameters_fail() {
    let bad = [
        BlobDetectorConfig::new(0.0, 4.0, 5, 0.1),
        BlobDetectorConfig::new(4.0, 2.0, 5, 0.1),
        BlobDetectorConfig::new(1.0, 4.0, 0, 0.1),
        BlobDetectorConfig::new(1.0, 4.0, 5, 0.1).with_overlap(1.5),
        BlobDetectorConfig::new(1.0, 4.0, 5, 0.1).with_sigma_ratio(1.0),
    ];
    for config in bad {
        assert!(
            matches!(BlobDetector::new(config.clone()), Err(IssError::InvalidParameter { .. })),
            "{config:?} should be rejected"
        );
    }
}

#[test]
fn test_group_by_follows_is_volume() {
    use iss_core::stack::Axes;
    let volume = BlobDetector::new(BlobDetectorConfig::default()).unwrap();
    assert_eq!(volume.group_by(), vec![Axes::Round, Axes::Ch]);
    let planes = BlobDetector::new(BlobDetectorConfig::default().with_is_volume(false)).unwrap();
    assert_eq!(planes.group_by(), vec![Axes::Round, Axes::Ch, Axes::ZPlane]);
}

// ---------------------------------------------------------------------------
// Names
// ---------------------------------------------------------------------------

#[test]
fn test_method_parse() {
    assert_eq!("blob_dog".parse::<DetectorMethod>().unwrap(), DetectorMethod::Dog);
    assert_eq!(DetectorMethod::default(), DetectorMethod::Log);
}

#[test]
fn test_measurement_parse() {
    assert_eq!("mean".parse::<MeasurementType>().unwrap(), MeasurementType::Mean);
    assert!("MAX".parse::<MeasurementType>().is_err());
}

// ---------------------------------------------------------------------------
// Serialization
// ---------------------------------------------------------------------------

#[test]
fn test_toml_defaults_fill_missing_fields() {
    let config: BlobDetectorConfig = toml::from_str("min_sigma = 4.0\nmax_sigma = 6.0").unwrap();
    assert_eq!(config.min_sigma, 4.0);
    assert_eq!(config.max_sigma, 6.0);
    assert_eq!(config.num_sigma, 10);
    assert_eq!(config.overlap, 0.5);
    assert_eq!(config.measurement_type, "max");
    assert_eq!(config.detector_method, "blob_log");
    assert!(config.is_volume);
}

#[test]
fn test_unknown_method_survives_deserialization() {
    let config: BlobDetectorConfig = toml::from_str("detector_method = \"blob_xyz\"").unwrap();
    assert!(BlobDetector::new(config).is_err());
}

#[test]
fn test_toml_round_trip() {
    let config = BlobDetectorConfig::new(4.0, 6.0, 20, 0.01)
        .with_measurement_type("mean")
        .with_detector_method("blob_dog");
    let text = toml::to_string_pretty(&config).unwrap();
    let back: BlobDetectorConfig = toml::from_str(&text).unwrap();
    assert_eq!(back, config);
}
