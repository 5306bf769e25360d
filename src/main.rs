//! Binary entrypoint: stacks two images onto one A3 portrait JPEG.

use std::path::PathBuf;

use a3_merge::config::Configuration;
use a3_merge::decode::write_preview;
use a3_merge::tasks::merge::{self, MergeStatus, MergeTrigger, Merger, Selection};
use a3_merge::Slot;
use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing::{Level, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "a3-merge",
    version,
    about = "Stack two images onto an A3 portrait JPEG"
)]
struct Args {
    /// Path to YAML config
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Image placed above the midline
    #[arg(long, value_name = "FILE")]
    top: Option<PathBuf>,
    /// Image placed below the midline
    #[arg(long, value_name = "FILE")]
    bottom: Option<PathBuf>,
    /// Directory the merged JPEG is written to (overrides config)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,
    /// File name prefix (overrides config)
    #[arg(long, value_name = "TEXT")]
    prefix: Option<String>,
    /// Write PNG thumbnails of both inputs here before merging
    #[arg(long, value_name = "DIR")]
    preview_dir: Option<PathBuf>,
    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"))
        .add_directive(
            format!("a3_merge={level}")
                .parse()
                .context("invalid log directive")?,
        );
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
    Ok(())
}

fn load_config(args: &Args) -> Result<Configuration> {
    let mut cfg = match &args.config {
        Some(path) => Configuration::from_yaml_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => Configuration::default(),
    };
    if let Some(dir) = &args.output_dir {
        cfg.output_dir = dir.clone();
    }
    if let Some(prefix) = &args.prefix {
        cfg.file_prefix = prefix.clone();
    }
    cfg.validated().context("invalid configuration values")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose)?;

    let cfg = load_config(&args)?;
    tracing::debug!("configuration: {:#?}", cfg);

    let selection = Selection::new(args.top.clone(), args.bottom.clone());
    for slot in Slot::ALL {
        let status = selection.status(slot);
        info!(slot = %slot, "{}", status.message());
        if let (Some(dir), Some(path)) = (&args.preview_dir, selection.get(slot)) {
            if status.is_ready() {
                if let Err(err) =
                    write_preview(slot, path.to_path_buf(), cfg.preview_max_edge, dir).await
                {
                    warn!(slot = %slot, "preview failed: {err}");
                }
            }
        }
    }

    let merger = Merger::from_config(&cfg);
    let mut trigger = MergeTrigger::default();
    info!(
        enabled = trigger.is_enabled(&selection),
        width = merger.canvas().width,
        height = merger.canvas().height,
        "merge to {}",
        merger.output_dir().display()
    );

    let (status, result) = merge::run(&merger, &selection, &mut trigger).await;
    match result {
        Ok(_) => {
            println!("{}", status.message());
            Ok(())
        }
        Err(err) => {
            let message = match &status {
                MergeStatus::Failed(msg) => *msg,
                _ => err.user_message(),
            };
            Err(anyhow::Error::new(err).context(message))
        }
    }
}
