use std::process::ExitCode;

use anyhow::{Context, Result};
use pendulum_anim::{
    cli::{Args, Command, USAGE},
    pipeline,
};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

/// Exit status for malformed arguments.
const USAGE_ERROR: u8 = 2;

fn main() -> ExitCode {
    let args = match Args::parse_from(std::env::args().skip(1)) {
        Ok(Command::Run(args)) => args,
        Ok(Command::Help) => {
            print!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprint!("{USAGE}");
            eprintln!("pendulum-anim: error: {e}");
            return ExitCode::from(USAGE_ERROR);
        }
    };

    if let Err(e) = run(args) {
        eprintln!("Pendulum animation failed: {e:#}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

#[tracing::instrument(level = "info")]
fn run(args: Args) -> Result<()> {
    setup_logging().context("Failed to set up logging")?;
    info!("Starting pendulum-anim {}", env!("CARGO_PKG_VERSION"));

    let summary = pipeline::run(&args.into_config())?;
    info!(
        "Wrote {} frames at {} fps to {}",
        summary.frames,
        summary.frame_rate,
        summary.output.display()
    );
    Ok(())
}

/// Logs go to stderr so stdout only carries the progress lines.
/// `RUST_LOG` overrides the default `info` level.
fn setup_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    let subscriber = tracing_subscriber::registry().with(filter).with(
        fmt::Layer::new()
            .with_writer(std::io::stderr)
            .with_thread_names(true)
            .with_ansi(false),
    );

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set global tracing subscriber")?;
    Ok(())
}
