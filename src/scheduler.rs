use crate::alerts::{evaluate, AlertDispatcher, DispatchOutcome};
use crate::client::MailRelay;
use crate::collectors::{parse_rows, SheetStore};
use crate::config::{MeridiemPolicy, ThresholdConfig};
use crate::dashboard::{build_snapshot, SnapshotReceiver};
use crate::error::{FetchError, PipelineError};
use crate::models::DashboardSnapshot;
use log::{debug, info, warn};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

/// Runs fetch, parse, alerting and view building once per interval.
///
/// Ticks run one at a time. Views are published only when a tick completes,
/// so a failed tick leaves the previous snapshot in place.
pub struct Scheduler<S, M> {
    store: S,
    dispatcher: AlertDispatcher<M>,
    thresholds: ThresholdConfig,
    meridiem: MeridiemPolicy,
    interval: Duration,
    fetch_timeout: Duration,
    publisher: watch::Sender<Option<Arc<DashboardSnapshot>>>,
}

impl<S: SheetStore, M: MailRelay> Scheduler<S, M> {
    pub fn new(
        store: S,
        dispatcher: AlertDispatcher<M>,
        thresholds: ThresholdConfig,
        meridiem: MeridiemPolicy,
        interval: Duration,
        fetch_timeout: Duration,
    ) -> (Self, SnapshotReceiver) {
        let (publisher, receiver) = watch::channel(None);
        let scheduler = Self {
            store,
            dispatcher,
            thresholds,
            meridiem,
            interval,
            fetch_timeout,
            publisher,
        };
        (scheduler, receiver)
    }

    pub fn subscribe(&self) -> SnapshotReceiver {
        self.publisher.subscribe()
    }

    pub fn dispatcher(&self) -> &AlertDispatcher<M> {
        &self.dispatcher
    }

    /// The snapshot of the last successful tick.
    pub fn current(&self) -> Option<Arc<DashboardSnapshot>> {
        self.publisher.borrow().clone()
    }

    pub async fn tick(&mut self) -> Result<Arc<DashboardSnapshot>, PipelineError> {
        let start = Instant::now();

        let rows = match tokio::time::timeout(self.fetch_timeout, self.store.fetch_all_rows()).await {
            Ok(rows) => rows?,
            Err(_) => return Err(FetchError::Timeout(self.fetch_timeout).into()),
        };
        debug!("fetch took: {} ms", start.elapsed().as_millis());

        let history = parse_rows(&rows, self.meridiem)?;
        debug!("Parsed {} readings", history.len());

        let alerts = evaluate(history.latest(), &self.thresholds);
        let outcome = self.dispatcher.dispatch(&alerts).await;
        if outcome == DispatchOutcome::Failed {
            warn!("Alert notification failed, views are still updated");
        }

        let snapshot = Arc::new(build_snapshot(&history, &self.thresholds, &alerts));
        self.publisher.send_replace(Some(snapshot.clone()));

        debug!("tick took: {} ms", start.elapsed().as_millis());
        Ok(snapshot)
    }

    /// Tick until `shutdown` resolves. A tick already underway is allowed to
    /// finish, including any mail it is sending.
    pub async fn run<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        info!("Scheduler started, refreshing every {:?}", self.interval);
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = interval.tick() => {}
            }

            match self.tick().await {
                Ok(snapshot) => info!(
                    "Refreshed {} readings, {} alert(s)",
                    snapshot.reading_count,
                    snapshot.alerts.len()
                ),
                Err(e) => warn!("Tick skipped, keeping previous views: {e}"),
            }
        }
        info!("Scheduler stopped");
    }
}
