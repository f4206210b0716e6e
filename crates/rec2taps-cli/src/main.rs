//! rec2taps - print tap times from a stimulus/recording pair of WAV files.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use rec2taps::{ExtractConfig, PgmRenderer, TapExtractor};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "rec2taps")]
#[command(author, version, about = "Extract tap times from a stimulus and its recording", long_about = None)]
struct Cli {
    /// Stereo WAV file that was played to the participant
    #[arg(value_name = "STIMULUS")]
    stimulus: PathBuf,

    /// Stereo WAV recording holding the loopback and the tap sensor
    #[arg(value_name = "RECORDING")]
    recording: PathBuf,

    /// Minimum distance between taps in milliseconds [default: 100]
    #[arg(short, long, value_name = "MS")]
    distance: Option<f64>,

    /// Prominence threshold as a multiple of the sensor standard deviation [default: 2]
    #[arg(short, long, value_name = "MULT")]
    prominence: Option<f64>,

    /// Invert the sensor signal before detection
    #[arg(short, long)]
    invert: bool,

    /// Write a PGM image of the sensor waveform with tap markers
    #[arg(long, value_name = "PATH")]
    debug_plot: Option<PathBuf>,

    /// Read settings from this TOML file instead of the user config
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Settings from flags, then `--config` or the user file, then defaults.
    fn extract_config(&self) -> anyhow::Result<ExtractConfig> {
        let mut config = match &self.config {
            Some(path) => ExtractConfig::load(path)?,
            None => ExtractConfig::load_or_default()?,
        };

        if let Some(distance) = self.distance {
            config.min_distance_ms = distance;
        }
        if let Some(prominence) = self.prominence {
            config.prominence = prominence;
        }
        if self.invert {
            config.invert_sensor = true;
        }
        if let Some(path) = &self.debug_plot {
            config.debug_plot = Some(path.clone());
        }

        config.validate()?;
        Ok(config)
    }
}

fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<Vec<f64>> {
    let config = cli.extract_config()?;
    tracing::debug!(?config, "resolved settings");

    let taps = TapExtractor::new()
        .with_renderer(PgmRenderer::default())
        .extract(&cli.stimulus, &cli.recording, &config)?;
    Ok(taps)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(taps) => {
            for t in taps {
                println!("{t}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
