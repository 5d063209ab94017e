pub mod config;
pub mod controller;
pub mod mapping;
pub mod output;
pub mod session;

#[cfg(test)]
mod test_support;

use crate::config::BridgeConfig;
use crate::controller::{EventNormalizer, GilrsSource};
use crate::output::{open_virtual_pad, OutputSynchronizer};
use crate::session::{run_session, SessionController};
use color_eyre::{eyre::eyre, Result};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = setup().await?;

    info!("Joy-Con to Xbox controller bridge");
    info!("Press Ctrl+C to exit");

    let shutdown = CancellationToken::new();
    spawn_signal_listener(shutdown.clone());

    let mapping = config
        .mapping_table()
        .map_err(|e| eyre!("Invalid button mapping: {}", e))?;
    let source = GilrsSource::new(config.device_name_hints.clone())
        .map_err(|e| eyre!("Failed to initialize gamepad input: {}", e))?;

    let session = SessionController::create(
        config.session_settings(),
        EventNormalizer::new(mapping),
        OutputSynchronizer::new(config.deadzone, config.diagnostic_interval()),
        Box::new(source),
        shutdown,
    );

    let device_name = config.virtual_device_name.clone();
    let report = run_session(session, move || open_virtual_pad(&device_name)).await;

    info!(
        "Session ended after {} ticks, {} fault(s), {} reconnect(s), uptime {}s",
        report.ticks,
        report.faults,
        report.reconnects,
        report.uptime().num_seconds()
    );

    report.into_result().map_err(|e| {
        error!("{}", e);
        eyre!(e)
    })
}

async fn setup() -> Result<BridgeConfig> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;

    let config = BridgeConfig::load().await?;
    setup_logging(if config.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    });
    Ok(config)
}

fn setup_logging(level: Level) {
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}

fn spawn_signal_listener(shutdown: CancellationToken) {
    tokio::spawn(async move {
        wait_for_signal().await;
        info!("Stop signal received");
        shutdown.cancel();
    });
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(s) => Some(s),
        Err(e) => {
            warn!("Failed to install SIGTERM handler: {}", e);
            None
        }
    };

    tokio::select! {
        _ = ctrl_c() => {}
        _ = async {
            match terminate.as_mut() {
                Some(s) => { s.recv().await; }
                None => std::future::pending::<()>().await,
            }
        } => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    ctrl_c().await
}

// A failed listener must not look like a stop request
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await
    }
}
