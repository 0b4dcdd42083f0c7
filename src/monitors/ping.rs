//! Probe adapter around the system `ping` binary
//!
//! The scheduler only talks to the [`Prober`] trait, so tests (and other
//! transports) can swap the implementation without touching the pipeline.
//!
//! ## Outcome mapping
//!
//! | situation                                   | result                           |
//! |---------------------------------------------|----------------------------------|
//! | summary printed, at least one reply          | `Ok`, alive, latencies if given  |
//! | summary printed, no replies                  | `Ok`, not alive                  |
//! | no summary, exit code 1 (no reply)           | `Ok`, not alive                  |
//! | no summary, unknown host on stderr           | `Ok`, not alive                  |
//! | no summary, any other non-zero exit          | `Err(ProbeError::Exited)`        |
//! | deadline elapsed                             | `Ok`, not alive                  |
//! | binary missing / cannot be spawned           | `Err(ProbeError::Spawn)`         |
//! | no summary despite a successful exit         | `Err(ProbeError::MalformedOutput)` |

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use tokio::process::Command;
use tracing::{debug, instrument, trace, warn};

use crate::{ProbeResult, config::ProbeConfig};

use super::error::ProbeError;

pub type ProbeOutcome = Result<ProbeResult, ProbeError>;

/// Extra time granted to the ping process on top of its own deadline
const DEFAULT_DEADLINE_SLACK: Duration = Duration::from_secs(2);

static TRANSMITTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+) packets transmitted, (\d+) (?:packets )?received").expect("valid regex")
});

/// Resolver failures as printed by iputils, BSD and busybox `ping`
static UNKNOWN_HOST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)name or service not known|unknown host|cannot resolve|temporary failure in name resolution|no address associated",
    )
    .expect("valid regex")
});

static PACKET_LOSS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([\d.]+)% packet loss").expect("valid regex"));

static ROUND_TRIP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:rtt|round-trip) min/avg/max(?:/\w+)? = ([\d.]+)/([\d.]+)/([\d.]+)")
        .expect("valid regex")
});

#[async_trait]
pub trait Prober: Send + Sync {
    /// Probe `target` once according to `policy`.
    ///
    /// Ordinary network failures must be reported as a not-alive
    /// [`ProbeResult`], only failures of the mechanism itself are errors.
    async fn probe(&self, target: &str, policy: &ProbeConfig) -> ProbeOutcome;
}

/// Prober that shells out to the platform's `ping`
#[derive(Debug, Clone)]
pub struct SystemPing {
    binary: PathBuf,
    deadline_slack: Duration,
}

impl Default for SystemPing {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemPing {
    pub fn new() -> Self {
        Self::with_binary("ping")
    }

    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            deadline_slack: DEFAULT_DEADLINE_SLACK,
        }
    }

    pub fn deadline_slack(mut self, slack: Duration) -> Self {
        self.deadline_slack = slack;
        self
    }
}

#[cfg(target_os = "macos")]
fn ping_args(target: &str, policy: &ProbeConfig) -> Vec<String> {
    vec![
        "-n".to_string(),
        "-c".to_string(),
        policy.min_reply.to_string(),
        "-t".to_string(),
        policy.timeout_secs.to_string(),
        target.to_string(),
    ]
}

#[cfg(not(target_os = "macos"))]
fn ping_args(target: &str, policy: &ProbeConfig) -> Vec<String> {
    vec![
        "-n".to_string(),
        "-c".to_string(),
        policy.min_reply.to_string(),
        "-w".to_string(),
        policy.timeout_secs.to_string(),
        target.to_string(),
    ]
}

#[async_trait]
impl Prober for SystemPing {
    #[instrument(skip(self, policy))]
    async fn probe(&self, target: &str, policy: &ProbeConfig) -> ProbeOutcome {
        let args = ping_args(target, policy);
        trace!("running {} {}", self.binary.display(), args.join(" "));

        let child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let deadline = Duration::from_secs(policy.timeout_secs) + self.deadline_slack;
        let output = match tokio::time::timeout(deadline, child.wait_with_output()).await {
            Ok(output) => output?,
            Err(_) => {
                warn!("ping did not finish within {deadline:?}, treating target as unreachable");
                return Ok(ProbeResult::unreachable());
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        match parse_ping_output(&stdout) {
            Some(result) => Ok(result),
            None if output.status.success() => {
                let first_line = stdout.lines().next().unwrap_or_default().to_string();
                Err(ProbeError::MalformedOutput(first_line))
            }
            None => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                let code = output.status.code();

                if is_unreachable_exit(code, &stderr) {
                    debug!("ping exited with {}: {}", output.status, stderr.trim());
                    return Ok(ProbeResult::unreachable());
                }

                let message = stderr
                    .lines()
                    .chain(stdout.lines())
                    .map(str::trim)
                    .find(|line| !line.is_empty())
                    .unwrap_or_default()
                    .to_string();
                Err(ProbeError::Exited { code, message })
            }
        }
    }
}

/// Whether a non-zero exit without summary means the target is unreachable
/// rather than `ping` itself being broken (missing privileges, bad flags, ..).
///
/// Exit code 1 is "no reply" on both iputils and BSD; resolver failures use
/// different codes per platform, so they are recognised by their message.
fn is_unreachable_exit(code: Option<i32>, stderr: &str) -> bool {
    code == Some(1) || UNKNOWN_HOST.is_match(stderr)
}

/// Parse the summary block printed by iputils and BSD `ping`.
///
/// Returns `None` if no transmit/receive summary is present.
pub fn parse_ping_output(output: &str) -> Option<ProbeResult> {
    let counts = TRANSMITTED.captures(output)?;
    let received: u64 = counts[2].parse().ok()?;

    let packet_loss = PACKET_LOSS
        .captures(output)
        .and_then(|caps| caps[1].parse::<f64>().ok());

    let (min_latency_ms, avg_latency_ms, max_latency_ms) = match ROUND_TRIP.captures(output) {
        Some(caps) => (
            caps[1].parse::<f64>().ok(),
            caps[2].parse::<f64>().ok(),
            caps[3].parse::<f64>().ok(),
        ),
        None => (None, None, None),
    };

    Some(ProbeResult {
        is_alive: received > 0,
        avg_latency_ms,
        min_latency_ms,
        max_latency_ms,
        packet_loss,
    })
}
