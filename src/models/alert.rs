use crate::models::reading::Metric;
use serde::Serialize;

/// Outcome of comparing one metric of the latest reading to its limit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertState {
    pub metric: Metric,
    pub current_value: Option<f64>,
    pub limit: f64,
    pub exceeded: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertPair {
    pub temperature: AlertState,
    pub humidity: AlertState,
}

impl AlertPair {
    pub fn get(&self, metric: Metric) -> &AlertState {
        match metric {
            Metric::Temperature => &self.temperature,
            Metric::Humidity => &self.humidity,
        }
    }

    pub fn any_exceeded(&self) -> bool {
        self.temperature.exceeded || self.humidity.exceeded
    }

    /// Messages of the exceeded metrics, temperature first.
    pub fn messages(&self) -> Vec<String> {
        Metric::ALL
            .iter()
            .map(|m| self.get(*m))
            .filter(|state| state.exceeded)
            .map(|state| state.message.clone())
            .collect()
    }
}
