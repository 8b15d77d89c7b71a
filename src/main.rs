use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use tf2rp_logger::config::Config;
use tf2rp_logger::logging::{LogSession, TracingReporter};

fn main() -> Result<()> {
    // Diagnostics from the logger itself go to stderr
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tf2rp_logger=info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::load()?;

    let mut log = LogSession::open(&config, None, Box::new(TracingReporter::new()))
        .context("Failed to open log session")?;

    log.info(format!("Starting with {}", log));
    log.debug(format!("Current log: {}", log.path().display()));
    log.debug(format!("Error reporting: {}", config.sentry_level));

    let report = log.cleanup(config.max_logs);
    tracing::info!(
        deleted = report.deleted.len(),
        compressed = report.compressed.len(),
        "Log cleanup finished"
    );

    log.close().context("Failed to close log file")?;
    Ok(())
}
