use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use iss_core::io::manifest::load_stack;
use iss_core::spots::{BlobDetector, BlobDetectorConfig, SpotAttributes};
use tracing::info;

use crate::progress::BarReporter;
use crate::summary::{print_detection_summary, print_slice_counts};

#[derive(Clone, Copy, ValueEnum)]
pub enum MethodArg {
    Log,
    Dog,
    Doh,
}

impl MethodArg {
    fn name(self) -> &'static str {
        match self {
            Self::Log => "blob_log",
            Self::Dog => "blob_dog",
            Self::Doh => "blob_doh",
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum MeasurementArg {
    Max,
    Mean,
}

impl MeasurementArg {
    fn name(self) -> &'static str {
        match self {
            Self::Max => "max",
            Self::Mean => "mean",
        }
    }
}

#[derive(Args)]
pub struct DetectArgs {
    /// Stack manifest (TOML) listing one image per round/channel/plane
    pub manifest: PathBuf,

    /// Detector config file (TOML); flags below override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Blob detection kernel
    #[arg(long, value_enum)]
    pub method: Option<MethodArg>,

    /// Minimum kernel sigma
    #[arg(long)]
    pub min_sigma: Option<f64>,

    /// Maximum kernel sigma
    #[arg(long)]
    pub max_sigma: Option<f64>,

    /// Number of sigmas between min and max
    #[arg(long)]
    pub num_sigma: Option<usize>,

    /// Absolute threshold for scale-space maxima
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Overlap fraction above which blobs are merged
    #[arg(long)]
    pub overlap: Option<f64>,

    /// Ratio between successive DoG sigmas
    #[arg(long)]
    pub sigma_ratio: Option<f64>,

    /// Spot intensity statistic
    #[arg(long, value_enum)]
    pub measurement: Option<MeasurementArg>,

    /// Detect on each z-plane separately instead of whole volumes
    #[arg(long)]
    pub per_plane: bool,

    /// Worker threads; sequential when omitted
    #[arg(short = 'j', long)]
    pub n_processes: Option<usize>,

    /// Output CSV path
    #[arg(short, long, default_value = "spots.csv")]
    pub output: PathBuf,
}

pub fn run(args: &DetectArgs) -> Result<()> {
    let config = build_config(args)?;
    let detector = BlobDetector::new(config).context("Invalid detector config")?;

    let stack = load_stack(&args.manifest)
        .with_context(|| format!("Failed to load stack {}", args.manifest.display()))?;

    print_detection_summary(&detector, &stack, args.n_processes);

    let reporter = BarReporter::new()?;
    let grouped = detector.run_grouped_reported(&stack, args.n_processes, &reporter)?;
    print_slice_counts(&grouped);

    let spots = SpotAttributes::concat(grouped.into_iter().map(|(t, _)| t));
    info!(spots = spots.len(), output = %args.output.display(), "Writing spot table");
    let file = File::create(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;
    spots.write_csv(BufWriter::new(file))?;
    println!("\nWrote {} spots to {}", spots.len(), args.output.display());

    Ok(())
}

fn build_config(args: &DetectArgs) -> Result<BlobDetectorConfig> {
    let mut config: BlobDetectorConfig = if let Some(ref path) = args.config {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        toml::from_str(&contents).context("Invalid detector config")?
    } else {
        BlobDetectorConfig::default()
    };

    if let Some(method) = args.method {
        config.detector_method = method.name().to_string();
    }
    if let Some(v) = args.min_sigma {
        config.min_sigma = v;
    }
    if let Some(v) = args.max_sigma {
        config.max_sigma = v;
    }
    if let Some(v) = args.num_sigma {
        config.num_sigma = v;
    }
    if let Some(v) = args.threshold {
        config.threshold = v;
    }
    if let Some(v) = args.overlap {
        config.overlap = v;
    }
    if let Some(v) = args.sigma_ratio {
        config.sigma_ratio = v;
    }
    if let Some(m) = args.measurement {
        config.measurement_type = m.name().to_string();
    }
    if args.per_plane {
        config.is_volume = false;
    }
    Ok(config)
}
