pub mod distribution;
pub mod gauge;
pub mod trend;

use anyhow::{Context, Result};
use chrono::Local;
use image::{DynamicImage, ImageFormat, RgbaImage};
use log::{debug, error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

use crate::config::{DashboardConfig, ThresholdConfig};
use crate::models::{AlertPair, DashboardSnapshot, Metric, ReadingHistory};
use crate::renderer::colours::Colours;
use crate::renderer::fonts::{self, Fonts};
use crate::renderer::{drawing, widgets};

/// Receiving end of the scheduler's published views. `None` until the
/// first successful tick.
pub type SnapshotReceiver = watch::Receiver<Option<Arc<DashboardSnapshot>>>;

/// Assemble every view of one tick from the same history.
pub fn build_snapshot(
    history: &ReadingHistory,
    thresholds: &ThresholdConfig,
    alerts: &AlertPair,
) -> DashboardSnapshot {
    let latest = history.latest();
    let value = |metric: Metric| latest.and_then(|r| r.value(metric));

    DashboardSnapshot {
        generated_at: Local::now(),
        reading_count: history.len(),
        temperature_gauge: gauge::build(
            Metric::Temperature,
            value(Metric::Temperature),
            thresholds.temperature_limit,
        ),
        humidity_gauge: gauge::build(
            Metric::Humidity,
            value(Metric::Humidity),
            thresholds.humidity_limit,
        ),
        trend: trend::build(history),
        temperature_distribution: distribution::summarize(history, Metric::Temperature),
        humidity_distribution: distribution::summarize(history, Metric::Humidity),
        alerts: alerts.messages(),
    }
}

/// Writes each published snapshot out as a PNG and as JSON.
pub struct Presenter {
    config: DashboardConfig,
    fonts: Option<Fonts>,
}

impl Presenter {
    pub fn new(config: &DashboardConfig) -> Self {
        let fonts = config.font.as_deref().and_then(|path| match fonts::load(path) {
            Ok(fonts) => Some(fonts),
            Err(e) => {
                warn!("Rendering without labels: {e:#}");
                None
            }
        });

        Self {
            config: config.clone(),
            fonts,
        }
    }

    // Create a dashboard image from one snapshot
    pub fn create_image(&self, snapshot: &DashboardSnapshot) -> DynamicImage {
        let width = self.config.width;
        let height = self.config.height;
        let colours = Colours::default();

        let mut image = RgbaImage::from_pixel(width, height, colours.background);

        // Calculate layout dimensions
        let y_header = 0u32;
        let header_height = 36u32;
        let alert_height = 26 * snapshot.alerts.len() as u32;
        let y_alerts = y_header + header_height;
        let y_gauges = y_alerts + alert_height + 6;
        let gauge_height = 90u32;
        let y_trend = y_gauges + gauge_height + 6;
        let remaining = height.saturating_sub(y_trend);
        let trend_height = remaining * 55 / 100;
        let y_distributions = y_trend + trend_height + 6;
        let distribution_height = height.saturating_sub(y_distributions);

        let sections: [(u32, u32, fn(&mut widgets::RenderContext)); 5] = [
            (y_header, header_height, widgets::render_header),
            (y_alerts, alert_height, widgets::render_alerts),
            (y_gauges, gauge_height, widgets::render_gauges),
            (y_trend, trend_height, widgets::render_trend),
            (y_distributions, distribution_height, widgets::render_distributions),
        ];

        for (y, section_height, render) in sections {
            let mut ctx = widgets::RenderContext {
                fonts: self.fonts.as_ref(),
                snapshot,
                image: &mut image,
                x: 0,
                y,
                width,
                height: section_height,
            };
            render(&mut ctx);
        }

        // Separator lines between sections
        drawing::horizontal_line(&mut image, 0, y_alerts, width, colours.grid);
        drawing::horizontal_line(&mut image, 0, y_trend.saturating_sub(3), width, colours.grid);
        drawing::vertical_line(&mut image, width / 2, y_distributions, height, colours.grid);

        DynamicImage::ImageRgba8(image)
    }

    pub fn save_image(&self, image: &DynamicImage) -> Result<()> {
        let target = Path::new(&self.config.file);
        let staging = staging_path(target);
        image
            .save_with_format(&staging, ImageFormat::Png)
            .context(format!("Failed to save dashboard to {}", staging.display()))?;
        fs::rename(&staging, target)
            .context(format!("Failed to move dashboard into {}", target.display()))?;
        Ok(())
    }

    pub fn save_json(&self, snapshot: &DashboardSnapshot) -> Result<()> {
        let target = Path::new(&self.config.json_file);
        let staging = staging_path(target);
        let json = serde_json::to_string_pretty(snapshot).context("Failed to serialise snapshot")?;
        fs::write(&staging, json).context(format!("Failed to write {}", staging.display()))?;
        fs::rename(&staging, target).context(format!("Failed to move JSON into {}", target.display()))?;
        Ok(())
    }

    pub fn present(&self, snapshot: &DashboardSnapshot) -> Result<()> {
        if !self.config.save_to_file {
            return Ok(());
        }
        let start = Instant::now();
        self.save_json(snapshot)?;
        let image = self.create_image(snapshot);
        self.save_image(&image)?;
        debug!("present took: {} ms", start.elapsed().as_millis());
        Ok(())
    }

    /// Redraw whenever the scheduler publishes. Ends when the scheduler is dropped.
    pub async fn run(self, mut receiver: SnapshotReceiver) {
        info!("Presenter started");
        while receiver.changed().await.is_ok() {
            let snapshot = receiver.borrow_and_update().clone();
            if let Some(snapshot) = snapshot {
                if let Err(e) = self.present(&snapshot) {
                    error!("Failed to present dashboard: {e:#}");
                }
            }
        }
        info!("Presenter stopped");
    }
}

fn staging_path(target: &Path) -> PathBuf {
    let mut name = target.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    target.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::evaluate;
    use crate::models::Reading;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn history() -> ReadingHistory {
        let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        ReadingHistory::new(vec![
            Reading {
                timestamp: day.and_hms_opt(10, 2, 0).unwrap(),
                temperature: Some(26.0),
                humidity: Some(50.0),
            },
            Reading {
                timestamp: day.and_hms_opt(10, 0, 0).unwrap(),
                temperature: Some(20.0),
                humidity: Some(50.0),
            },
        ])
    }

    fn thresholds() -> ThresholdConfig {
        ThresholdConfig {
            temperature_limit: 25.0,
            humidity_limit: 60.0,
        }
    }

    #[test]
    fn test_build_snapshot_uses_latest_by_time() {
        let history = history();
        let alerts = evaluate(history.latest(), &thresholds());
        let snapshot = build_snapshot(&history, &thresholds(), &alerts);

        assert_eq!(snapshot.reading_count, 2);
        assert_eq!(snapshot.temperature_gauge.value, Some(26.0));
        assert_eq!(snapshot.humidity_gauge.value, Some(50.0));
        assert_eq!(snapshot.trend.points[0].temperature, Some(20.0));
        assert_eq!(snapshot.temperature_distribution.total(), 2);
        assert_eq!(
            snapshot.alerts,
            vec!["Alert: The Temperature is above the threshold of 25°C!".to_string()]
        );
    }

    #[test]
    fn test_build_snapshot_empty_history() {
        let history = ReadingHistory::default();
        let alerts = evaluate(history.latest(), &thresholds());
        let snapshot = build_snapshot(&history, &thresholds(), &alerts);

        assert_eq!(snapshot.temperature_gauge.value_display, "N/A");
        assert_eq!(snapshot.humidity_gauge.value_display, "N/A");
        assert!(snapshot.alerts.is_empty());
        assert!(snapshot.trend.points.is_empty());
        assert!(snapshot.humidity_distribution.bins.is_empty());
    }

    #[test]
    fn test_present_writes_png_and_json() {
        let dir = TempDir::new().unwrap();
        let config = DashboardConfig {
            file: dir.path().join("dash.png").to_string_lossy().into_owned(),
            json_file: dir.path().join("dash.json").to_string_lossy().into_owned(),
            save_to_file: true,
            width: 400,
            height: 300,
            font: None,
        };
        let presenter = Presenter::new(&config);

        let history = history();
        let alerts = evaluate(history.latest(), &thresholds());
        let snapshot = build_snapshot(&history, &thresholds(), &alerts);
        presenter.present(&snapshot).unwrap();

        let image = image::open(dir.path().join("dash.png")).unwrap();
        assert_eq!(image.width(), 400);
        assert_eq!(image.height(), 300);

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("dash.json")).unwrap()).unwrap();
        assert_eq!(json["reading_count"], 2);
        assert_eq!(json["temperature_gauge"]["value"], 26.0);
        assert!(!dir.path().join("dash.json.tmp").exists());
    }

    #[test]
    fn test_render_empty_snapshot_does_not_panic() {
        let config = DashboardConfig {
            width: 200,
            height: 150,
            ..DashboardConfig::default()
        };
        let presenter = Presenter::new(&config);
        let history = ReadingHistory::default();
        let alerts = evaluate(None, &thresholds());
        let image = presenter.create_image(&build_snapshot(&history, &thresholds(), &alerts));
        assert_eq!(image.width(), 200);
    }

    #[test]
    fn test_missing_font_falls_back() {
        let config = DashboardConfig {
            font: Some(PathBuf::from("/nonexistent/font.ttf")),
            ..DashboardConfig::default()
        };
        let presenter = Presenter::new(&config);
        assert!(presenter.fonts.is_none());
    }
}
