use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use hiccup_monitor::{
    actors::{scheduler::SchedulerHandle, status_log::spawn_status_log},
    config::{Config, read_config_file},
    monitors::SystemPing,
    state::SharedState,
    util,
};
use tokio::sync::broadcast;
use tracing::{info, level_filters::LevelFilter, trace, warn};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Parser)]
#[command(about = "Continuously pings a target and records latency hiccups")]
struct Args {
    /// Config file (JSON), built-in defaults are used if omitted
    #[arg(short)]
    file: Option<String>,

    /// Target to probe, overrides the config file
    #[arg(long)]
    target: Option<String>,

    /// Log every tick
    #[arg(short, long)]
    verbose: bool,
}

fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::TRACE
    } else {
        LevelFilter::INFO
    };
    let filter = filter::Targets::new().with_targets(vec![
        ("hiccup_monitor", level),
        ("tower_http", LevelFilter::INFO),
    ]);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

fn load_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = match &args.file {
        Some(file) => read_config_file(file)?,
        None => Config::default(),
    };

    if let Some(target) = util::get_target() {
        config.target = target;
    }
    if let Some(target) = &args.target {
        config.target = target.clone();
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    init(args.verbose);
    trace!("started with args: {args:?}");

    let config = load_config(&args)?;

    let state = SharedState::from_config(&config);
    let (event_tx, event_rx) = broadcast::channel(64);
    let status_log = spawn_status_log(event_rx);
    let scheduler = SchedulerHandle::spawn(
        &config,
        Arc::new(SystemPing::new()),
        state.clone(),
        event_tx,
    );

    #[cfg(feature = "api")]
    {
        use hiccup_monitor::api::{ApiConfig, ApiState, spawn_api_server};

        let api_config = ApiConfig::from_http_config(&config.http);
        let addr = spawn_api_server(api_config, ApiState::new(state.clone())).await?;
        info!("network monitor running at http://{addr}");
    }

    info!(
        "monitoring target: {} every {} seconds",
        config.target,
        config.interval_ms as f64 / 1000.0
    );

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;

    info!("shutting down");
    scheduler.shutdown().await?;

    // the status log ends once the scheduler has dropped the event sender
    if let Err(e) = status_log.await {
        warn!("status log task failed: {e}");
    }

    Ok(())
}
