//! santa CLI - draw a Secret Santa and tell everyone who they got

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{ArgAction, Parser};
use santa_core::Error;
use santa_core::commands::draw::{self, DrawOptions, DrawSummary};
use santa_core::config::Config;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "santa")]
#[command(author, version, about = "A Secret Santa that emails recipients", long_about = None)]
struct Cli {
    /// File that contains the list of people (JSON)
    list: PathBuf,

    /// File that contains the message to be sent (^ = giver, * = receiver)
    message: PathBuf,

    /// Send the letters by email as well as writing them to files
    #[arg(short, long)]
    email: bool,

    /// Show diagnostics (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (minimal output)
    #[arg(short, long)]
    quiet: bool,

    /// Directory for the per-person letters (overrides output.dir)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Seed for a reproducible draw
    #[arg(long)]
    seed: Option<u64>,

    /// Shuffles to try before giving up (overrides draw.max_attempts)
    #[arg(long)]
    max_attempts: Option<usize>,

    /// Configuration file (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn init_tracing(verbose: u8) -> anyhow::Result<()> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("santa={}", level).parse()?)
                .add_directive(format!("santa_core={}", level).parse()?),
        )
        .init();
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; the mail key can also come from the shell
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.verbose)?;

    info!("Starting Secret Santa");

    for path in [&cli.list, &cli.message] {
        if !path.is_file() {
            bail!("File {} not found", path.display());
        }
    }

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load().context("Failed to load configuration")?,
    };
    debug!(?config, "Configuration loaded");

    let options = DrawOptions {
        list: cli.list.clone(),
        message: cli.message.clone(),
        send_email: cli.email,
        output_dir: cli.output_dir.clone(),
        seed: cli.seed,
        max_attempts: cli.max_attempts,
    };

    let summary = draw::run(&options, &config).await.map_err(stage_error)?;
    print_summary(&summary, cli.quiet);

    let failures = summary.report.failure_count();
    if failures > 0 {
        bail!(
            "{} of {} deliveries failed",
            failures,
            summary.report.outcomes().len()
        );
    }

    Ok(())
}

/// Attach the failed stage, error code and hint to a core error
fn stage_error(err: Error) -> anyhow::Error {
    let mut headline = format!("{} stage failed [{}]", err.stage(), err.code());
    if let Some(hint) = err.suggestion() {
        headline.push_str(&format!(". Hint: {}", hint));
    }
    anyhow::Error::new(err).context(headline)
}

fn print_summary(summary: &DrawSummary, quiet: bool) {
    if !quiet {
        println!("Draw complete for {} participants.", summary.participants);
        println!("Letters written to: {}", summary.output_dir.display());

        if summary.emailed {
            println!("\nEmail delivery:");
            for outcome in summary.report.for_channel("mail") {
                println!("  {}", outcome);
            }
        }
    }

    let failures: Vec<_> = summary.report.failures().collect();
    if !failures.is_empty() {
        eprintln!("\nDelivery failures:");
        for outcome in failures {
            eprintln!("  {}", outcome);
        }
    }
}
