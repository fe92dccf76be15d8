use crate::models::reading::Metric;
use chrono::{DateTime, Local, NaiveDateTime};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Gauge {
    pub metric: Metric,
    pub title: String,
    pub value: Option<f64>,
    pub value_display: String,
    pub threshold: f64,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub timestamp: NaiveDateTime,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrendSeries {
    pub points: Vec<TrendPoint>,
}

/// Half-open bin `[start, end)`; the last bin of a distribution also holds `end`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    pub metric: Metric,
    pub bins: Vec<Bin>,
    /// Readings without a value for `metric`.
    pub excluded: usize,
}

impl Distribution {
    pub fn empty(metric: Metric) -> Self {
        Self {
            metric,
            bins: Vec::new(),
            excluded: 0,
        }
    }

    pub fn total(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }

    pub fn max_count(&self) -> usize {
        self.bins.iter().map(|b| b.count).max().unwrap_or(0)
    }
}

/// Everything the presentation layer draws for one tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub generated_at: DateTime<Local>,
    pub reading_count: usize,
    pub temperature_gauge: Gauge,
    pub humidity_gauge: Gauge,
    pub trend: TrendSeries,
    pub temperature_distribution: Distribution,
    pub humidity_distribution: Distribution,
    pub alerts: Vec<String>,
}
