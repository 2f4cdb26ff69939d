//! evision-dl: download the merged PDF of every applicant in an eVision folder
//!
//! Start it, log into eVision in the Firefox window it opens, bring up the
//! folder and open the first application. The robot takes over from there.

mod cli;
mod logging;

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use evision_core::robot::{close_quietly, ctrl_c};
use evision_core::{
    ApplicantLogger, DownloadPool, Downloader, EventBus, EvisionConfig, ExitStatus, FirefoxBrowser,
    Geckodriver, HttpFetcher, ReplayBuffer, Robot, Screen, Summarizer,
};
use logging::ReplayLogger;
use std::future::Future;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    if !cli.dest_dir.is_dir() {
        eprintln!("Directory '{}' does not exist", cli.dest_dir.display());
        std::process::exit(1);
    }

    let config = match EvisionConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let replay = (!cli.no_replay).then(|| ReplayBuffer::new(config.replay_capacity));
    if let Err(e) = ReplayLogger::new(cli.log_filter.as_deref(), replay.clone()).install() {
        eprintln!("Failed to set up logging: {}", e);
        std::process::exit(1);
    }

    let code = match run(&cli, config, replay).await {
        Ok(status) => status.code(),
        Err(e) => {
            log::error!("{:#}", e);
            ExitStatus::Crashed.code()
        }
    };
    std::process::exit(code);
}

async fn run(cli: &Cli, config: EvisionConfig, replay: Option<ReplayBuffer>) -> anyhow::Result<ExitStatus> {
    let interrupt = ctrl_c();
    tokio::pin!(interrupt);

    let fetcher = HttpFetcher::new(config.timeouts.download()).context("Failed to set up downloads")?;

    let (driver, webdriver_url) = match &cli.webdriver_url {
        Some(url) => (None, url.clone()),
        None => {
            let spawn = Geckodriver::spawn(&cli.geckodriver, cli.port, cli.webdriver_log.as_deref());
            let Some(spawned) = interruptible(spawn, &mut interrupt).await else {
                return Ok(interrupted());
            };
            let driver = spawned.context("Failed to start geckodriver")?;
            let url = driver.url().to_string();
            (Some(driver), url)
        }
    };

    let browser = match interruptible(FirefoxBrowser::connect(&webdriver_url), &mut interrupt).await {
        Some(Ok(browser)) => browser,
        Some(Err(e)) => {
            stop(driver).await;
            return Err(e).context("Failed to open Firefox");
        }
        None => {
            stop(driver).await;
            return Ok(interrupted());
        }
    };

    let (pool, completions) = DownloadPool::new(Arc::new(fetcher), config.download_workers);

    let mut bus = EventBus::new();
    bus.register(ApplicantLogger);
    bus.register(Downloader::new(cli.dest_dir.clone(), pool.clone()));
    bus.register(Summarizer::new(replay));

    // The browser is closed by `start` unless a robot comes back
    let mut robot = match Robot::start(browser, config, bus, pool, completions, &mut interrupt).await {
        Ok(Some(robot)) => robot,
        Ok(None) => {
            stop(driver).await;
            return Ok(interrupted());
        }
        Err(e) => {
            stop(driver).await;
            return Err(e).context("Failed to start the run");
        }
    };

    log::info!("Saving PDFs to {}", cli.dest_dir.display());
    let status = robot.run_until(Screen::initial(), &mut interrupt).await;

    close_quietly(robot.into_browser()).await;
    stop(driver).await;

    Ok(status)
}

/// `future`'s output, or `None` when `interrupt` completes first
async fn interruptible<T>(future: impl Future<Output = T>, interrupt: impl Future<Output = ()>) -> Option<T> {
    tokio::select! {
        biased;
        _ = interrupt => None,
        output = future => Some(output),
    }
}

fn interrupted() -> ExitStatus {
    log::error!("Interrupted before the run started");
    ExitStatus::Interrupted
}

async fn stop(driver: Option<Geckodriver>) {
    if let Some(driver) = driver {
        driver.shutdown().await;
    }
}
