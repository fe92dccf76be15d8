use anyhow::{bail, Context, Result};
use config::{Config, File};
use log::{debug, LevelFilter};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

fn default_temperature_limit() -> f64 {
    25.0
}

fn default_humidity_limit() -> f64 {
    60.0
}

fn default_interval_ms() -> u64 {
    120_000
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_relay_port() -> u16 {
    587
}

fn default_subject() -> String {
    "Alert: Threshold Exceeded".to_string()
}

fn default_body() -> String {
    "Temperature/humidity have exceeded the threshold. Take action immediately!".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct ThresholdConfig {
    #[serde(default = "default_temperature_limit")]
    pub temperature_limit: f64,
    #[serde(default = "default_humidity_limit")]
    pub humidity_limit: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            temperature_limit: default_temperature_limit(),
            humidity_limit: default_humidity_limit(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SchedulerConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_timeout_ms")]
    pub fetch_timeout_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            fetch_timeout_ms: default_timeout_ms(),
        }
    }
}

impl SchedulerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SheetConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub token: Option<String>,
}

/// How a trailing `AM`/`PM` marker in the `Time` column is treated.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MeridiemPolicy {
    /// Parse `hh:mm:ss AM|PM` as 12-hour time.
    #[default]
    Convert,
    /// Remove `" AM"`/`" PM"` and read the rest as 24-hour time.
    Strip,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ParserConfig {
    #[serde(default)]
    pub meridiem: MeridiemPolicy,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AlertPolicy {
    /// Notify once when a metric goes from normal to exceeded.
    #[default]
    Edge,
    /// Notify on every tick while any metric is exceeded.
    EveryCycle,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AlertsConfig {
    #[serde(default)]
    pub policy: AlertPolicy,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MailConfig {
    pub relay_host: String,
    #[serde(default = "default_relay_port")]
    pub relay_port: u16,
    pub username: String,
    pub password: String,
    pub sender: String,
    pub recipient: String,
    #[serde(default = "default_subject")]
    pub subject: String,
    #[serde(default = "default_body")]
    pub body: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl MailConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DashboardConfig {
    pub file: String,
    pub json_file: String,
    pub save_to_file: bool,
    pub width: u32,
    pub height: u32,
    pub font: Option<PathBuf>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            file: "dashboard.png".to_string(),
            json_file: "dashboard.json".to_string(),
            save_to_file: true,
            width: 800,
            height: 600,
            font: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(rename = "THRESHOLDS", alias = "thresholds", default)]
    pub thresholds: ThresholdConfig,
    #[serde(rename = "SCHEDULER", alias = "scheduler", default)]
    pub scheduler: SchedulerConfig,
    #[serde(rename = "SHEET", alias = "sheet")]
    pub sheet: SheetConfig,
    #[serde(rename = "PARSER", alias = "parser", default)]
    pub parser: ParserConfig,
    #[serde(rename = "ALERTS", alias = "alerts", default)]
    pub alerts: AlertsConfig,
    #[serde(rename = "MAIL", alias = "mail")]
    pub mail: MailConfig,
    #[serde(rename = "DASHBOARD", alias = "dashboard", default)]
    pub dashboard: DashboardConfig,
    #[serde(rename = "LOGGING", alias = "logging", default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn new() -> Result<Self> {
        Self::from_file("config.ini")
    }

    pub fn get_log_level(&self) -> LevelFilter {
        match self.logging.level.to_lowercase().as_str() {
            "trace" => LevelFilter::Trace,
            "debug" => LevelFilter::Debug,
            "info" => LevelFilter::Info,
            "warn" => LevelFilter::Warn,
            "error" => LevelFilter::Error,
            "off" => LevelFilter::Off,
            _ => LevelFilter::Info, // Default to Info if invalid
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config_path = path.as_ref();
        debug!("Loading configuration from {}", config_path.display());

        let config = Config::builder()
            .add_source(File::from(config_path).format(config::FileFormat::Ini))
            .build()
            .context(format!("Failed to load config from {}", config_path.display()))?;

        let app_config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize config")?;

        app_config.validate()?;
        Ok(app_config)
    }

    pub fn validate(&self) -> Result<()> {
        match (&self.sheet.url, &self.sheet.path) {
            (None, None) => bail!("[SHEET] needs either 'url' or 'path'"),
            (Some(_), Some(_)) => bail!("[SHEET] 'url' and 'path' are mutually exclusive"),
            _ => {}
        }

        if self.mail.username.trim().is_empty() || self.mail.password.trim().is_empty() {
            bail!("[MAIL] 'username' and 'password' must not be blank");
        }

        if self.scheduler.interval_ms == 0 {
            bail!("[SCHEDULER] 'interval_ms' must be greater than zero");
        }

        if !self.thresholds.temperature_limit.is_finite()
            || !self.thresholds.humidity_limit.is_finite()
        {
            bail!("[THRESHOLDS] limits must be finite numbers");
        }

        Ok(())
    }
}
