use crate::config::ThresholdConfig;
use crate::models::{AlertPair, AlertState, Metric, Reading};

/// Strictly above the limit. An absent value never exceeds.
pub fn exceeded(value: Option<f64>, limit: f64) -> bool {
    value.is_some_and(|v| v > limit)
}

pub fn alert_message(metric: Metric, limit: f64) -> String {
    format!(
        "Alert: The {} is above the threshold of {}{}!",
        metric.name(),
        limit,
        metric.unit()
    )
}

pub fn limit_for(thresholds: &ThresholdConfig, metric: Metric) -> f64 {
    match metric {
        Metric::Temperature => thresholds.temperature_limit,
        Metric::Humidity => thresholds.humidity_limit,
    }
}

fn evaluate_metric(reading: Option<&Reading>, thresholds: &ThresholdConfig, metric: Metric) -> AlertState {
    let current_value = reading.and_then(|r| r.value(metric));
    let limit = limit_for(thresholds, metric);
    AlertState {
        metric,
        current_value,
        limit,
        exceeded: exceeded(current_value, limit),
        message: alert_message(metric, limit),
    }
}

/// Compare the most recent reading (if any) against the configured limits.
pub fn evaluate(latest: Option<&Reading>, thresholds: &ThresholdConfig) -> AlertPair {
    AlertPair {
        temperature: evaluate_metric(latest, thresholds, Metric::Temperature),
        humidity: evaluate_metric(latest, thresholds, Metric::Humidity),
    }
}
