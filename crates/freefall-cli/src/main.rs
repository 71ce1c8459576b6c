use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use freefall_cli::{run_session, Config, Console, JsonLines, Presenter, Prompter, RunOptions};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Animated falling-object simulation with drag and wind.
#[derive(Parser, Debug)]
#[command(name = "freefall", version, about, long_about = None)]
struct Args {
    /// TOML file with body, display, limits and an optional scenario
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for the random wind direction (entropy if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Do not sleep between frames
    #[arg(long)]
    no_pace: bool,

    /// Emit JSON lines instead of the animation
    #[arg(long)]
    json: bool,

    /// Plain output without ANSI colours or screen clearing
    #[arg(long)]
    no_color: bool,

    /// Give up on an object after this many ticks
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Debug logging on stderr (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => {
            info!(path = %path.display(), "loading config");
            Config::load(path).with_context(|| format!("loading {}", path.display()))?
        }
        None => Config::default(),
    };

    if args.no_pace || args.json {
        config.display.frame_delay_ms = 0;
    }
    if args.no_color {
        config.display.color = false;
    }
    if let Some(max_ticks) = args.max_ticks {
        config.limits.max_ticks = max_ticks;
    }
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = load_config(&args)?;
    let options = RunOptions {
        seed: args.seed,
        frame_delay: Duration::from_millis(config.display.frame_delay_ms),
    };

    let stdin = io::stdin().lock();
    let summaries = if args.json {
        // keep stdout clean for the JSON stream
        let mut prompter = Prompter::new(stdin, io::stderr());
        let mut presenter = JsonLines::new(io::stdout().lock());
        session(&config, options, &mut prompter, &mut presenter)?
    } else {
        let mut prompter = Prompter::new(stdin, io::stdout());
        let mut presenter = Console::new(io::stdout(), config.display.rows, config.display.color);
        session(&config, options, &mut prompter, &mut presenter)?
    };

    info!(objects = summaries, "session finished");
    Ok(())
}

fn session<R, W, P>(
    config: &Config,
    options: RunOptions,
    prompter: &mut Prompter<R, W>,
    presenter: &mut P,
) -> Result<usize>
where
    R: io::BufRead,
    W: io::Write,
    P: Presenter,
{
    let summaries = run_session(config, options, prompter, presenter).context("simulation session failed")?;
    Ok(summaries.len())
}
