use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, bail};
use tracing::trace;

/// Top level configuration of the monitor
///
/// Every field has a default, so an empty JSON object (`{}`) is a valid
/// configuration file.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct Config {
    /// Host name or address that gets probed
    #[serde(default = "default_target")]
    pub target: String,

    /// Time between two probe ticks in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Number of history entries kept in memory
    #[serde(default = "default_history_length")]
    pub history_length: usize,

    /// Optional cap for the hiccup log (unbounded if absent)
    #[serde(default)]
    pub max_hiccups: Option<usize>,

    #[serde(default)]
    pub probe: ProbeConfig,

    #[serde(default)]
    pub thresholds: Thresholds,

    #[serde(default)]
    pub http: HttpConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target: default_target(),
            interval_ms: default_interval_ms(),
            history_length: default_history_length(),
            max_hiccups: None,
            probe: ProbeConfig::default(),
            thresholds: Thresholds::default(),
            http: HttpConfig::default(),
        }
    }
}

/// Policy handed to the prober on every tick
#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize)]
pub struct ProbeConfig {
    /// Seconds to wait for replies
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Number of echo requests sent per probe
    #[serde(default = "default_min_reply")]
    pub min_reply: u32,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            min_reply: default_min_reply(),
        }
    }
}

/// Warn/error pair for a single dimension
///
/// A value strictly greater than `error` is an error, otherwise a value
/// strictly greater than `warn` is a warning.
#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize)]
pub struct Limit {
    pub warn: f64,
    pub error: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize)]
pub struct Thresholds {
    /// Average round trip time in milliseconds
    #[serde(default = "default_latency_limit")]
    pub latency: Limit,

    /// Packet loss in percent
    #[serde(default = "default_packet_loss_limit")]
    pub packet_loss: Limit,

    /// Spread between min and max round trip time in milliseconds
    #[serde(default = "default_jitter_limit")]
    pub jitter: Limit,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            latency: default_latency_limit(),
            packet_loss: default_packet_loss_limit(),
            jitter: default_jitter_limit(),
        }
    }
}

/// Settings for the read API
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
pub struct HttpConfig {
    pub addr: Option<IpAddr>,
    pub port: Option<u16>,

    /// Directory with static dashboard assets served at `/`
    pub static_dir: Option<PathBuf>,
}

fn default_target() -> String {
    String::from("8.8.8.8")
}

fn default_interval_ms() -> u64 {
    5000
}

fn default_history_length() -> usize {
    100
}

fn default_timeout_secs() -> u64 {
    4
}

fn default_min_reply() -> u32 {
    3
}

fn default_latency_limit() -> Limit {
    Limit {
        warn: 150.0,
        error: 500.0,
    }
}

fn default_packet_loss_limit() -> Limit {
    Limit {
        warn: 5.0,
        error: 20.0,
    }
}

fn default_jitter_limit() -> Limit {
    Limit {
        warn: 50.0,
        error: 150.0,
    }
}

impl Config {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.target.trim().is_empty() {
            bail!("target must not be empty");
        }
        if self.target.starts_with('-') {
            bail!("target must not start with '-'");
        }
        if self.interval_ms == 0 {
            bail!("interval_ms must be greater than 0");
        }
        if self.history_length == 0 {
            bail!("history_length must be greater than 0");
        }
        if self.max_hiccups == Some(0) {
            bail!("max_hiccups must be greater than 0 when set");
        }
        if self.probe.timeout_secs == 0 {
            bail!("probe.timeout_secs must be greater than 0");
        }
        if self.probe.min_reply == 0 {
            bail!("probe.min_reply must be greater than 0");
        }

        let Thresholds {
            latency,
            packet_loss,
            jitter,
        } = self.thresholds;
        for (name, limit) in [
            ("latency", latency),
            ("packet_loss", packet_loss),
            ("jitter", jitter),
        ] {
            if !(limit.warn.is_finite() && limit.error.is_finite()) {
                bail!("thresholds.{name} must be finite numbers");
            }
            if limit.warn >= limit.error {
                bail!(
                    "thresholds.{name}: warn ({}) must be lower than error ({})",
                    limit.warn,
                    limit.error
                );
            }
        }

        Ok(())
    }
}

pub fn read_config_file(path: &str) -> anyhow::Result<Config> {
    let file_content =
        std::fs::read_to_string(path).with_context(|| format!("failed to read config file {path}"))?;
    serde_json::from_str(&file_content)
        .with_context(|| format!("invalid configuration file provided: {path}"))
        .inspect(|config| trace!("loaded config: {config:?}"))
}
