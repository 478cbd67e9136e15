//! conductor - drag markers across lanes to play MIDI
//!
//! Run with: cargo run --bin conductor -- --lanes 4 --scale dorian

mod app;
mod audio;
mod hands;
mod ui;

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use clap::Parser;
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use tracing_subscriber::EnvFilter;

use app::App;
use lane_conductor::{music::Scale, ConductorConfig};

#[derive(Debug, Parser)]
#[command(
    name = "conductor",
    about = "Terminal lane conductor: pointer or hand gestures to MIDI",
    version
)]
struct Cli {
    /// TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of lanes.
    #[arg(long)]
    lanes: Option<usize>,

    /// Scale name (chromatic, major, minor, dorian, lydian, mixolydian).
    #[arg(long)]
    scale: Option<Scale>,

    /// Root pitch class, 0 = C.
    #[arg(long)]
    root: Option<u8>,

    /// Preferred MIDI output port (name fragment).
    #[arg(long)]
    port: Option<String>,

    /// Audition pitch changes with a soft sine tone.
    #[arg(long)]
    preview: bool,

    /// Write logs here; without it logs are discarded.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Skip the audio device; buses still render for the scope.
    #[arg(long)]
    no_audio: bool,

    /// Read hand frames as JSON lines from stdin.
    #[arg(long)]
    hands_stdin: bool,
}

impl Cli {
    fn into_config(self) -> EyreResult<(ConductorConfig, Options)> {
        let mut config = match &self.config {
            Some(path) => ConductorConfig::from_toml_file(path)
                .wrap_err_with(|| format!("loading {}", path.display()))?,
            None => ConductorConfig::default(),
        };

        if let Some(lanes) = self.lanes {
            config.lane_count = lanes;
        }
        if let Some(scale) = self.scale {
            config.scale = scale;
        }
        if let Some(root) = self.root {
            config.root = root;
        }
        if let Some(port) = self.port {
            config.midi.output_hints.insert(0, port);
        }
        if self.preview {
            config.monitor.preview_tone = true;
        }

        let options = Options {
            audio: !self.no_audio,
            hands_stdin: self.hands_stdin,
        };
        Ok((config.sanitized(), options))
    }
}

/// Runtime switches that are not part of the session config.
#[derive(Debug, Clone, Copy)]
pub struct Options {
    pub audio: bool,
    pub hands_stdin: bool,
}

fn init_logging(path: Option<&PathBuf>) -> EyreResult<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lane_conductor=info,conductor=info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_ansi(false);

    // The TUI owns the terminal, so logs go to a file or nowhere.
    match path {
        Some(path) => {
            let file = File::create(path).wrap_err_with(|| format!("creating log file {}", path.display()))?;
            builder.with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::sink).init(),
    }
    Ok(())
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.log_file.as_ref())?;
    let (config, options) = cli.into_config()?;

    App::new(config, options)?.run()
}
