use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsoleConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the admin API, e.g. `http://localhost:8000/api`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Activation runs OCR and embedding server-side, so this stays generous.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_request_timeout() -> u64 {
    300
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ApiConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// Number of trailing log lines fetched per poll.
    #[serde(default = "default_log_lines")]
    pub log_lines: usize,
    /// Delay between the terminal marker and automatic dismissal.
    #[serde(default = "default_grace_delay")]
    pub grace_delay_ms: u64,
    /// Percent shown before any marker has been seen.
    #[serde(default = "default_initial_percent")]
    pub initial_percent: u8,
}

fn default_poll_interval() -> u64 {
    1500
}

fn default_log_lines() -> usize {
    50
}

fn default_grace_delay() -> u64 {
    3000
}

fn default_initial_percent() -> u8 {
    5
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
            log_lines: default_log_lines(),
            grace_delay_ms: default_grace_delay(),
            initial_percent: default_initial_percent(),
        }
    }
}

impl MonitorConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn grace_delay(&self) -> Duration {
        Duration::from_millis(self.grace_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Pause between consecutive activation calls. `0` disables pacing.
    #[serde(default = "default_pacing")]
    pub pacing_ms: u64,
}

fn default_pacing() -> u64 {
    1000
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            pacing_ms: default_pacing(),
        }
    }
}

impl BatchConfig {
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when no environment override is set.
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}
