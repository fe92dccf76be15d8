pub mod alerts;
pub mod client;
pub mod collectors;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod models;
pub mod scheduler;

mod renderer;

use crate::alerts::AlertDispatcher;
use crate::client::SmtpRelay;
use crate::collectors::SheetClient;
use crate::config::AppConfig;
use crate::dashboard::Presenter;
use crate::scheduler::Scheduler;
use anyhow::Context;
use log::{debug, error, info};

pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    info!("Starting application");

    let result = main_loop(config).await;
    if let Err(e) = &result {
        error!("Application error: {e:#}");
        // Print chain of error causes
        let mut source = e.source();
        while let Some(e) = source {
            error!("Caused by: {e}");
            source = e.source();
        }
    }
    result.context("Application failed to run")
}

async fn main_loop(config: AppConfig) -> anyhow::Result<()> {
    debug!("Building collaborators");
    let store = SheetClient::from_config(&config.sheet, config.scheduler.fetch_timeout())
        .context("Failed to set up sheet store")?;
    let relay = SmtpRelay::new(&config.mail).context("Failed to set up mail relay")?;
    let dispatcher = AlertDispatcher::new(relay, &config.mail, config.alerts.policy);

    let (scheduler, receiver) = Scheduler::new(
        store,
        dispatcher,
        config.thresholds,
        config.parser.meridiem,
        config.scheduler.interval(),
        config.scheduler.fetch_timeout(),
    );

    let presenter = Presenter::new(&config.dashboard);
    let presenter_task = tokio::spawn(presenter.run(receiver));

    scheduler
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {e}");
                std::future::pending::<()>().await;
            }
            info!("Shutdown requested");
        })
        .await;

    // The scheduler owned the sender; the presenter exits once it sees that.
    presenter_task.await.context("Presenter task panicked")?;
    info!("Application completed successfully");
    Ok(())
}
