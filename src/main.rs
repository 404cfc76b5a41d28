use anyhow::Context;
use clap::Parser;
use log::{info, warn};
use std::path::PathBuf;

use hormone_calibration::output::save_results;
use hormone_calibration::{calibrate, CalibrationSnapshot, InterpolationMethod};

#[derive(Parser)]
#[command(name = "hormone-calibration")]
#[command(about = "Convert optical-density readings to hormone concentrations using a standard curve")]
struct Cli {
    /// Calibration snapshot (JSON) path
    #[arg(short, long)]
    config: PathBuf,

    /// Output directory
    #[arg(short, long)]
    output: PathBuf,

    /// Interpolation method (linear, quadratic, spline or cubic); overrides the snapshot
    #[arg(short, long)]
    method: Option<InterpolationMethod>,

    /// Write the built-in TSH example snapshot to --config before calculating
    #[arg(long)]
    init_example: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    if cli.init_example {
        CalibrationSnapshot::example()
            .save(&cli.config)
            .with_context(|| format!("failed to write example snapshot {}", cli.config.display()))?;
        info!("Wrote example snapshot to {:?}", cli.config);
    }

    let mut snapshot = CalibrationSnapshot::from_file(&cli.config)
        .with_context(|| format!("failed to load snapshot {}", cli.config.display()))?;
    info!("Loaded {} snapshot from {:?}", snapshot.hormone_name, cli.config);

    if let Some(method) = cli.method {
        snapshot.interpolation_method = method;
    }

    let run = calibrate(&snapshot.standards, &snapshot.patients, snapshot.interpolation_method)?;
    if let Some(message) = &run.warning {
        warn!("{}", message);
        eprintln!("warning: {}", message);
    }

    std::fs::create_dir_all(&cli.output)
        .with_context(|| format!("failed to create output directory {}", cli.output.display()))?;

    save_results(&run, &snapshot, &cli.output)
        .with_context(|| format!("failed to write results to {}", cli.output.display()))?;

    for (label, count) in run.summary.rows() {
        println!("{:<16} {}", label, count);
    }

    Ok(())
}
