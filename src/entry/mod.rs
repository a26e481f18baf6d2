use std::ffi::OsString;
use std::path::Path;

use chrono::{DateTime, Utc};
use clap::{ArgMatches, CommandFactory, FromArgMatches};
use tokio::sync::mpsc;
use tracing::debug;

use chopper::{
    args::RunArgs,
    config::{apply_config, load_config},
    error::AppResult,
    runner::{RunConfig, RunController, RunReport},
};

use crate::app::{render_summary, setup_progress_indicator};
use crate::logger::init_logging;
use crate::shutdown_handlers::setup_signal_shutdown_handler;

/// Default config filenames checked when no CLI args are provided.
const DEFAULT_CONFIG_FILES: [&str; 2] = ["chopper.toml", "chopper.json"];

pub(crate) fn run() -> AppResult<()> {
    let (mut args, matches) = match parse_args()? {
        Some(parsed) => parsed,
        None => return Ok(()),
    };

    if let Some(config) = load_config(args.config.as_deref())? {
        apply_config(&mut args, &matches, &config)?;
    }

    init_logging(args.verbose, args.no_color);
    let config = RunConfig::from_args(&args)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let (report, started_at) = runtime.block_on(run_async(&config, &args))?;

    print!("{}", render_summary(&report, args.output_format, started_at)?);
    Ok(())
}

fn parse_args() -> AppResult<Option<(RunArgs, ArgMatches)>> {
    let mut cmd = RunArgs::command();
    let raw_args: Vec<OsString> = std::env::args_os().collect();

    if should_show_help(&raw_args) {
        cmd.print_help()?;
        println!();
        return Ok(None);
    }

    let matches = cmd.get_matches_from(raw_args);
    let args = RunArgs::from_arg_matches(&matches)?;

    Ok(Some((args, matches)))
}

fn should_show_help(raw_args: &[OsString]) -> bool {
    let treat_as_empty =
        matches!(raw_args, [] | [_]) || matches!(raw_args, [_, second] if second == "--");
    if !treat_as_empty {
        return false;
    }

    !has_default_config()
}

fn has_default_config() -> bool {
    DEFAULT_CONFIG_FILES
        .iter()
        .any(|path| Path::new(path).exists())
}

async fn run_async(config: &RunConfig, args: &RunArgs) -> AppResult<(RunReport, DateTime<Utc>)> {
    let started_at = Utc::now();
    let mut controller = RunController::new(config);

    let progress_handle = if args.no_progress {
        None
    } else {
        let (progress_tx, progress_rx) = mpsc::unbounded_channel();
        controller = controller.with_progress(progress_tx);
        Some(setup_progress_indicator(
            config.duration,
            config.concurrency.get(),
            args.no_color,
            progress_rx,
        ))
    };
    let signal_handle = setup_signal_shutdown_handler(&controller.shutdown_sender());

    let result = controller.run().await;
    signal_handle.abort();

    if let Some(handle) = progress_handle {
        handle.await?;
    }
    let report = result?;
    debug!(
        "Run report: {} outcomes, {} dropped, elapsed {:?}.",
        report.total_requests(),
        report.dropped_requests,
        report.elapsed
    );
    Ok((report, started_at))
}
