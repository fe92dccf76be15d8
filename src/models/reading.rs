use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Metric {
    Temperature,
    Humidity,
}

impl Metric {
    pub const ALL: [Metric; 2] = [Metric::Temperature, Metric::Humidity];

    /// Column name in the sheet, also used as the display title.
    pub fn name(&self) -> &'static str {
        match self {
            Metric::Temperature => "Temperature",
            Metric::Humidity => "Humidity",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Metric::Temperature => "°C",
            Metric::Humidity => "%",
        }
    }
}

/// One sensor sample. Metrics that were missing or unparseable are `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub timestamp: NaiveDateTime,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
}

impl Reading {
    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Temperature => self.temperature,
            Metric::Humidity => self.humidity,
        }
    }
}

/// All readings of one fetch, in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadingHistory {
    readings: Vec<Reading>,
}

impl ReadingHistory {
    pub fn new(readings: Vec<Reading>) -> Self {
        Self { readings }
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Reading> {
        self.readings.iter()
    }

    /// Readings ordered by timestamp; equal timestamps keep source order.
    pub fn sorted(&self) -> Vec<&Reading> {
        let mut sorted: Vec<&Reading> = self.readings.iter().collect();
        sorted.sort_by_key(|r| r.timestamp);
        sorted
    }

    /// The last reading after sorting by timestamp.
    pub fn latest(&self) -> Option<&Reading> {
        // max_by_key keeps the last of equal maxima, matching sorted().last()
        self.readings.iter().max_by_key(|r| r.timestamp)
    }

    /// Present values of `metric`, in source order.
    pub fn values(&self, metric: Metric) -> impl Iterator<Item = f64> + '_ {
        self.readings.iter().filter_map(move |r| r.value(metric))
    }
}
