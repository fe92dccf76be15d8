use crate::models::{Gauge, Metric};

pub const NO_VALUE: &str = "N/A";

pub fn build(metric: Metric, value: Option<f64>, threshold: f64) -> Gauge {
    let value_display = match value {
        Some(v) => format!("{}{}", v, metric.unit()),
        None => NO_VALUE.to_string(),
    };
    Gauge {
        metric,
        title: metric.name().to_string(),
        value,
        value_display,
        threshold,
        unit: metric.unit().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gauge_display() {
        let gauge = build(Metric::Temperature, Some(23.5), 25.0);
        assert_eq!(gauge.title, "Temperature");
        assert_eq!(gauge.value_display, "23.5°C");
        assert_eq!(gauge.unit, "°C");
        assert_eq!(gauge.threshold, 25.0);
    }

    #[test]
    fn test_gauge_without_value() {
        let gauge = build(Metric::Humidity, None, 60.0);
        assert_eq!(gauge.value, None);
        assert_eq!(gauge.value_display, NO_VALUE);
    }
}
