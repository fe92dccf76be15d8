use crate::models::{ReadingHistory, TrendPoint, TrendSeries};

/// Time-ordered (timestamp, temperature, humidity) triples. Absent values stay
/// absent so the plotted line shows a gap.
pub fn build(history: &ReadingHistory) -> TrendSeries {
    let points = history
        .sorted()
        .into_iter()
        .map(|r| TrendPoint {
            timestamp: r.timestamp,
            temperature: r.temperature,
            humidity: r.humidity,
        })
        .collect();
    TrendSeries { points }
}
