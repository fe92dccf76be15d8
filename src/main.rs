use env_logger::{Builder, WriteStyle};
use envmon::config::AppConfig;
use log::error;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration first (without logging)
    let path = std::env::args().nth(1).unwrap_or_else(|| "config.ini".to_string());
    let config = AppConfig::from_file(&path).map_err(|e| {
        eprintln!("Failed to load configuration from {path}: {e:#}");
        e
    })?;

    // Initialise logger with a configured log level
    Builder::new()
        .filter_level(config.get_log_level())
        .write_style(WriteStyle::Always)
        .format_timestamp_secs()
        .init();

    if let Err(e) = envmon::run(config).await {
        error!("Application error: {e:#}");
        return Err(e);
    }
    Ok(())
}
