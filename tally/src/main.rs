//! # tally - Main Entry Point
//!
//! Load → resolve → attach once, then poll until SIGINT/SIGTERM or
//! `--duration` runs out. Setup failures exit non-zero with nothing left
//! attached.

use anyhow::{Context, Result};
use clap::Parser;
use log::warn;
use std::time::{Duration, Instant};
use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;

use tally::attach::establish;
use tally::cli::{Args, WatchConfig};
use tally::domain::SetupError;
use tally::image::LoadedImage;
use tally::poll::PollLoop;
use tally::preflight::run_preflight_checks;

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_USAGE: i32 = 2;
const EXIT_NOPERM: i32 = 77;

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e:#}");
            code
        }
    });
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    if let Some(setup) = err.downcast_ref::<SetupError>() {
        if setup.is_usage() {
            return EXIT_USAGE;
        }
    }
    let msg = format!("{err:#}").to_lowercase();
    if msg.contains("permission denied") || msg.contains("operation not permitted") {
        EXIT_NOPERM
    } else {
        EXIT_ERROR
    }
}

#[tokio::main]
async fn run() -> Result<()> {
    let config = WatchConfig::from(Args::parse());
    let quiet = config.quiet;

    run_preflight_checks(&config.image)?;

    let image = LoadedImage::open(&config.image)
        .with_context(|| format!("Failed to load {}", config.image.display()))?;
    let mut session = establish(image, &config.overrides)?;
    let target = session.target();

    if !quiet {
        println!("tally v{}", env!("CARGO_PKG_VERSION"));
        println!("image: {}", config.image.display());
        println!("attached: {} ({})", target.attach_point(), target.program);
        println!("map: {} ({:?})", target.table, session.selection.table.kind);
        println!(
            "every {:?}, top {}{}",
            config.poll.interval,
            config.poll.top_n,
            if config.poll.reset { ", reset after read" } else { "" }
        );
        println!("collecting... press Ctrl+C to stop\n");
    }

    let cancel = CancellationToken::new();
    let shutdown = tokio::spawn(wait_for_shutdown(cancel.clone(), config.duration));

    let started = Instant::now();
    let table = session.handle.table_mut().context("table was not opened")?;
    let renderer = config.format.renderer(std::io::stdout());
    let mut poll = PollLoop::new(table, renderer, config.poll, target, cancel.clone());
    let outcome = poll.run().await;
    let stats = poll.stats();
    drop(poll);

    let exit_reason = if cancel.is_cancelled() {
        shutdown.await.unwrap_or("interrupted")
    } else {
        shutdown.abort();
        "output failed"
    };

    session.handle.release();

    if !quiet {
        eprintln!(
            "\n{}: {:.1}s, {} ticks ({} rendered, {} failed reads)",
            exit_reason,
            started.elapsed().as_secs_f64(),
            stats.ticks,
            stats.rendered,
            stats.failed_reads,
        );
    }

    outcome.context("Polling stopped")?;
    Ok(())
}

/// Cancel `cancel` on SIGINT, SIGTERM or when `limit` elapses, and say which.
async fn wait_for_shutdown(cancel: CancellationToken, limit: Option<Duration>) -> &'static str {
    let reason = tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                warn!("Failed to listen for Ctrl+C: {e}");
            }
            "interrupted"
        }
        () = terminated() => "terminated",
        () = elapsed(limit) => "duration limit reached",
    };
    cancel.cancel();
    reason
}

async fn terminated() {
    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            warn!("Failed to listen for SIGTERM: {e}");
            std::future::pending::<()>().await;
        }
    }
}

async fn elapsed(limit: Option<Duration>) {
    match limit {
        Some(limit) => tokio::time::sleep(limit).await,
        None => std::future::pending().await,
    }
}
