use envmon::alerts::AlertDispatcher;
use envmon::client::{AlertMail, MailRelay};
use envmon::collectors::{RawRow, SheetStore};
use envmon::config::{AlertPolicy, MailConfig, MeridiemPolicy, ThresholdConfig};
use envmon::error::{FetchError, NotifyError, PipelineError};
use envmon::scheduler::Scheduler;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

enum Response {
    Rows(Vec<RawRow>),
    Unreachable,
    Hang,
}

/// Answers fetches from a script; an exhausted script repeats the last rows.
#[derive(Clone, Default)]
struct ScriptedStore {
    script: Arc<Mutex<VecDeque<Response>>>,
    last: Arc<Mutex<Vec<RawRow>>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedStore {
    fn new(script: Vec<Response>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            ..Self::default()
        }
    }
}

impl SheetStore for ScriptedStore {
    async fn fetch_all_rows(&self) -> Result<Vec<RawRow>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Response::Rows(rows)) => {
                *self.last.lock().unwrap() = rows.clone();
                Ok(rows)
            }
            Some(Response::Unreachable) => Err(FetchError::Status(503)),
            Some(Response::Hang) => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(Vec::new())
            }
            None => Ok(self.last.lock().unwrap().clone()),
        }
    }
}

#[derive(Clone, Default)]
struct CountingRelay {
    sent: Arc<Mutex<Vec<AlertMail>>>,
    fail: Arc<AtomicBool>,
}

impl CountingRelay {
    fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl MailRelay for CountingRelay {
    async fn send(&self, mail: &AlertMail) -> Result<(), NotifyError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(NotifyError::Timeout(Duration::from_millis(1)));
        }
        self.sent.lock().unwrap().push(mail.clone());
        Ok(())
    }
}

fn row(time: &str, temperature: &str, humidity: &str) -> RawRow {
    let mut row = RawRow::new();
    row.insert("Date".to_string(), "01/02/2024".to_string());
    row.insert("Time".to_string(), time.to_string());
    row.insert("Temperature".to_string(), temperature.to_string());
    row.insert("Humidity".to_string(), humidity.to_string());
    row
}

fn hot_rows() -> Vec<RawRow> {
    vec![row("10:00:00", "20", "50"), row("10:02:00", "26", "50")]
}

fn cool_rows() -> Vec<RawRow> {
    vec![row("10:00:00", "20", "50"), row("10:04:00", "21", "50")]
}

fn mail_config() -> MailConfig {
    MailConfig {
        relay_host: "smtp.example.com".to_string(),
        relay_port: 587,
        username: "monitor".to_string(),
        password: "secret".to_string(),
        sender: "sensor@example.com".to_string(),
        recipient: "ops@example.com".to_string(),
        subject: "Alert: Threshold Exceeded".to_string(),
        body: "Temperature/humidity have exceeded the threshold. Take action immediately!"
            .to_string(),
        timeout_ms: 100,
    }
}

type TestScheduler = Scheduler<ScriptedStore, CountingRelay>;

fn scheduler(
    script: Vec<Response>,
    policy: AlertPolicy,
) -> (TestScheduler, ScriptedStore, CountingRelay) {
    let store = ScriptedStore::new(script);
    let relay = CountingRelay::default();
    let dispatcher = AlertDispatcher::new(relay.clone(), &mail_config(), policy);
    let (scheduler, _receiver) = Scheduler::new(
        store.clone(),
        dispatcher,
        ThresholdConfig {
            temperature_limit: 25.0,
            humidity_limit: 60.0,
        },
        MeridiemPolicy::Convert,
        Duration::from_millis(10),
        Duration::from_millis(50),
    );
    (scheduler, store, relay)
}

#[tokio::test]
async fn test_latest_reading_triggers_temperature_alert_only() {
    let (mut scheduler, _store, relay) =
        scheduler(vec![Response::Rows(hot_rows())], AlertPolicy::EveryCycle);

    let snapshot = scheduler.tick().await.unwrap();

    assert_eq!(
        snapshot.alerts,
        vec!["Alert: The Temperature is above the threshold of 25°C!".to_string()]
    );
    assert_eq!(snapshot.temperature_gauge.value, Some(26.0));
    assert_eq!(relay.count(), 1);
    let sent = relay.sent.lock().unwrap();
    assert_eq!(sent[0].subject, "Alert: Threshold Exceeded");
    assert_eq!(sent[0].to, "ops@example.com");
}

#[tokio::test]
async fn test_latest_is_by_timestamp_not_row_order() {
    let rows = vec![row("10:02:00", "26", "50"), row("10:00:00", "20", "50")];
    let (mut scheduler, _store, relay) = scheduler(vec![Response::Rows(rows)], AlertPolicy::Edge);

    let snapshot = scheduler.tick().await.unwrap();

    assert_eq!(snapshot.temperature_gauge.value, Some(26.0));
    assert_eq!(snapshot.trend.points[0].temperature, Some(20.0));
    assert_eq!(relay.count(), 1);
}

#[tokio::test]
async fn test_empty_history_has_no_values_and_no_mail() {
    let (mut scheduler, _store, relay) =
        scheduler(vec![Response::Rows(Vec::new())], AlertPolicy::EveryCycle);

    let snapshot = scheduler.tick().await.unwrap();

    assert_eq!(snapshot.temperature_gauge.value_display, "N/A");
    assert_eq!(snapshot.humidity_gauge.value_display, "N/A");
    assert!(snapshot.alerts.is_empty());
    assert!(snapshot.temperature_distribution.bins.is_empty());
    assert_eq!(relay.count(), 0);
}

#[tokio::test]
async fn test_every_cycle_policy_mails_on_each_exceeded_tick() {
    let (mut scheduler, _store, relay) = scheduler(
        vec![Response::Rows(hot_rows()), Response::Rows(hot_rows())],
        AlertPolicy::EveryCycle,
    );

    scheduler.tick().await.unwrap();
    scheduler.tick().await.unwrap();

    assert_eq!(relay.count(), 2);
}

#[tokio::test]
async fn test_edge_policy_mails_once_per_streak() {
    let (mut scheduler, _store, relay) = scheduler(
        vec![
            Response::Rows(hot_rows()),
            Response::Rows(hot_rows()),
            Response::Rows(hot_rows()),
            Response::Rows(cool_rows()),
            Response::Rows(hot_rows()),
        ],
        AlertPolicy::Edge,
    );

    for _ in 0..3 {
        let snapshot = scheduler.tick().await.unwrap();
        // The banner keeps showing while the condition lasts.
        assert_eq!(snapshot.alerts.len(), 1);
    }
    assert_eq!(relay.count(), 1);

    scheduler.tick().await.unwrap();
    scheduler.tick().await.unwrap();
    assert_eq!(relay.count(), 2);
}

#[tokio::test]
async fn test_fetch_error_keeps_previous_views() {
    let (mut scheduler, _store, _relay) = scheduler(
        vec![Response::Rows(hot_rows()), Response::Unreachable],
        AlertPolicy::Edge,
    );
    let mut receiver = scheduler.subscribe();

    let before = scheduler.tick().await.unwrap();
    receiver.borrow_and_update();

    let result = scheduler.tick().await;

    assert!(matches!(
        result,
        Err(PipelineError::Fetch(FetchError::Status(503)))
    ));
    assert!(!receiver.has_changed().unwrap());
    let after = scheduler.current().unwrap();
    assert!(Arc::ptr_eq(&before, &after));
    assert_eq!(*before, *after);
}

#[tokio::test]
async fn test_parse_error_keeps_previous_views_and_sends_nothing() {
    let bad = vec![row("10:00:00", "30", "50"), row("not a time", "30", "50")];
    let (mut scheduler, _store, relay) = scheduler(
        vec![Response::Rows(cool_rows()), Response::Rows(bad)],
        AlertPolicy::EveryCycle,
    );

    let before = scheduler.tick().await.unwrap();
    let result = scheduler.tick().await;

    assert!(matches!(result, Err(PipelineError::Parse(_))));
    assert!(Arc::ptr_eq(&before, &scheduler.current().unwrap()));
    assert_eq!(relay.count(), 0);
}

#[tokio::test]
async fn test_first_tick_failure_publishes_nothing() {
    let (mut scheduler, _store, _relay) = scheduler(vec![Response::Unreachable], AlertPolicy::Edge);

    assert!(scheduler.tick().await.is_err());
    assert!(scheduler.current().is_none());
}

#[tokio::test]
async fn test_hanging_store_times_out() {
    let (mut scheduler, _store, _relay) = scheduler(vec![Response::Hang], AlertPolicy::Edge);

    let result = scheduler.tick().await;

    assert!(matches!(
        result,
        Err(PipelineError::Fetch(FetchError::Timeout(_)))
    ));
}

#[tokio::test]
async fn test_mail_failure_still_updates_views() {
    let (mut scheduler, _store, relay) =
        scheduler(vec![Response::Rows(hot_rows())], AlertPolicy::Edge);
    relay.fail.store(true, Ordering::SeqCst);

    let snapshot = scheduler.tick().await.unwrap();

    assert_eq!(snapshot.alerts.len(), 1);
    assert_eq!(relay.count(), 0);
    assert!(scheduler.current().is_some());
}

#[tokio::test]
async fn test_run_keeps_ticking_after_failures_until_shutdown() {
    let (scheduler, store, relay) = scheduler(
        vec![
            Response::Unreachable,
            Response::Rows(hot_rows()),
            Response::Unreachable,
        ],
        AlertPolicy::Edge,
    );
    let receiver = scheduler.subscribe();

    scheduler
        .run(tokio::time::sleep(Duration::from_millis(200)))
        .await;

    assert!(store.calls.load(Ordering::SeqCst) >= 4);
    assert_eq!(relay.count(), 1);
    let latest = receiver.borrow().clone().unwrap();
    assert_eq!(latest.reading_count, 2);
}
