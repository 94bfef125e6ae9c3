use clap::{error::ErrorKind, CommandFactory, Parser};
use std::{
    error::Error,
    io::{self, Write},
    path::PathBuf,
    time::Duration,
};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use zen::{
    cancel::CancelToken,
    config::{Config, ConfigError, ConfigStore, FileConfigStore, SessionConfig},
    duration::{parse_duration, DurationParseError},
    guide, input,
    render::write_line,
    runtime::{FixedTicker, SystemClock},
    session::{write_interrupted, Session},
};

const COUNTDOWN_TICK_MS: u64 = 100;

/// terminal breathing and meditation guide with progress bars
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal breathing guide: follow the bar as it fills on the inhale, holds, and empties on the exhale. Run without arguments to pick a guided mode interactively.",
    after_help = "Examples:\n  zen                    # interactive mode selection\n  zen --duration 2m      # 2 minute session\n  zen -i 6 --hold1 3 -e 6 --hold2 2\n  zen --fps 20           # smoother bar"
)]
pub struct Cli {
    /// session duration, e.g. '60s', '2m', '1h' [default: 60s]
    #[clap(short = 'd', long)]
    duration: Option<String>,

    /// inhale duration in seconds [default: 4]
    #[clap(short = 'i', long)]
    inhale: Option<u64>,

    /// hold after inhale in seconds [default: 2]
    #[clap(long)]
    hold1: Option<u64>,

    /// exhale duration in seconds [default: 4]
    #[clap(short = 'e', long)]
    exhale: Option<u64>,

    /// hold after exhale in seconds [default: 2]
    #[clap(long)]
    hold2: Option<u64>,

    /// progress bar refresh rate, 1-60 [default: 10]
    #[clap(short = 'f', long)]
    fps: Option<u32>,

    /// read defaults from this file instead of the user config directory
    #[clap(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Duration(#[from] DurationParseError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Cli {
    fn config_store(&self) -> FileConfigStore {
        match &self.config {
            Some(path) => FileConfigStore::with_path(path),
            None => FileConfigStore::new(),
        }
    }

    /// Flags win over the config file, which wins over built-in defaults.
    fn session_config(&self, defaults: &Config) -> Result<SessionConfig, CliError> {
        let total = parse_duration(self.duration.as_deref().unwrap_or(&defaults.duration))?;
        Ok(SessionConfig::new(
            total,
            self.inhale.unwrap_or(defaults.inhale),
            self.hold1.unwrap_or(defaults.hold1),
            self.exhale.unwrap_or(defaults.exhale),
            self.hold2.unwrap_or(defaults.hold2),
            self.fps.unwrap_or(defaults.fps),
        )?)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    if std::env::args_os().len() <= 1 {
        return run_interactive();
    }

    let cli = Cli::parse();
    let config = match cli.session_config(&cli.config_store().load()) {
        Ok(config) => config,
        Err(err) => {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::ValueValidation, err).exit();
        }
    };
    run_session(&config, false)
}

fn run_interactive() -> Result<(), Box<dyn Error>> {
    let defaults = FileConfigStore::new().load();
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();

    let Some(mode) = guide::select_mode(&mut input, &mut out)? else {
        write_line(&mut out, "Goodbye!")?;
        return Ok(());
    };
    let config = mode.session_config(defaults.fps)?;
    guide::prepare(mode, &mut input, &mut out)?;
    drop(input);

    run_session(&config, true)
}

fn run_session(config: &SessionConfig, with_countdown: bool) -> Result<(), Box<dyn Error>> {
    let token = CancelToken::new();
    let _signals = token.install_signal_handlers()?;
    let clock = SystemClock::new();
    let mut out = io::stdout();

    guide::write_header(&mut out, config)?;

    // raw mode lasts as long as the poller
    let mut poller = input::terminal_poller();

    if with_countdown {
        let ticker = FixedTicker::new(Duration::from_millis(COUNTDOWN_TICK_MS));
        if !guide::countdown(&clock, &ticker, &token, &mut *poller, &mut out)? {
            write_interrupted(&mut out)?;
            return Ok(());
        }
    }

    let mut session = Session::new(*config, &clock, &mut poller, out.lock(), token);
    session.run()?;
    drop(session);
    drop(poller);

    io::stdout().flush()?;
    Ok(())
}
