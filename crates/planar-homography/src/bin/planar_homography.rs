use std::{error::Error, fs, path::PathBuf, str::FromStr};

use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use planar_homography::{
    estimate_from_file, EstimationMethod, HomographyConfig, HomographyEstimate, RefineParams,
};

/// Estimate planar homographies from point correspondences.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// Log level: off, error, warn, info, debug or trace.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Estimate the homography mapping `source` onto `target` and print a JSON report.
    Estimate(EstimateArgs),
}

#[derive(Debug, clap::Args)]
struct EstimateArgs {
    /// JSON file with `source` and `target` point arrays.
    #[arg(long)]
    input: PathBuf,

    /// Optional JSON `HomographyConfig`. Defaults are used if omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Linear estimator, overrides the config file.
    #[arg(long, value_enum)]
    method: Option<MethodArg>,

    /// Refine with Levenberg-Marquardt (default solver settings unless the
    /// config file provides them).
    #[arg(long)]
    refine: bool,

    /// Write the report here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum MethodArg {
    Dlt,
    LeastSquares,
}

impl From<MethodArg> for EstimationMethod {
    fn from(m: MethodArg) -> Self {
        match m {
            MethodArg::Dlt => EstimationMethod::Dlt,
            MethodArg::LeastSquares => EstimationMethod::LeastSquares,
        }
    }
}

fn init_logging(level: LevelFilter) -> Result<(), Box<dyn Error>> {
    #[cfg(feature = "tracing")]
    {
        planar_homography::init_tracing_with_log_bridge(&level.to_string().to_lowercase());
        Ok(())
    }
    #[cfg(not(feature = "tracing"))]
    {
        planar_homography::init_with_level(level).map_err(|e| e.to_string())?;
        Ok(())
    }
}

fn resolve_config(args: &EstimateArgs) -> Result<HomographyConfig, Box<dyn Error>> {
    let mut config = match args.config.as_ref() {
        Some(path) => HomographyConfig::load_json(path)?,
        None => HomographyConfig::default(),
    };
    if let Some(method) = args.method {
        config.method = method.into();
    }
    if args.refine && config.refine.is_none() {
        config.refine = Some(RefineParams::default());
    }
    Ok(config)
}

fn run_estimate(args: &EstimateArgs) -> Result<HomographyEstimate, Box<dyn Error>> {
    let config = resolve_config(args)?;
    Ok(estimate_from_file(&args.input, &config)?)
}

fn main() {
    if let Err(err) = try_main() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let level = LevelFilter::from_str(&cli.log_level)
        .map_err(|_| format!("invalid log level: {}", cli.log_level))?;
    init_logging(level)?;

    match cli.command {
        Command::Estimate(args) => {
            let report = run_estimate(&args)?;
            let json = serde_json::to_string_pretty(&report)?;
            match args.output.as_ref() {
                Some(path) => fs::write(path, json)?,
                None => println!("{json}"),
            }
        }
    }
    Ok(())
}
