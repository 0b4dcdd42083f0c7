//! Classification of a single probe outcome
//!
//! [`evaluate`] is a pure function: the same outcome, thresholds and timestamp
//! always yield the same [`Evaluation`].
//!
//! Dimensions are checked in a fixed order (latency, packet loss, jitter). The
//! overall severity is `Error` as soon as any dimension is an error, but the
//! status text follows the order of evaluation:
//!
//! - latency and packet loss errors always overwrite the text with `"Error"`
//! - a jitter error only sets `"Error: High Jitter"` if no error was seen yet
//! - warnings only apply while the overall severity is still `Ok`

use chrono::{DateTime, Utc};

use crate::{
    HealthSnapshot, HiccupRecord, ProbeResult, Severity,
    config::{Limit, Thresholds},
};

use super::error::ProbeError;
use super::ping::ProbeOutcome;

/// Result of classifying one tick
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub snapshot: HealthSnapshot,

    /// Present if at least one condition reached error severity
    pub hiccup: Option<HiccupRecord>,
}

pub fn evaluate(
    outcome: &ProbeOutcome,
    thresholds: &Thresholds,
    timestamp: DateTime<Utc>,
) -> Evaluation {
    match outcome {
        Ok(result) => evaluate_result(result, thresholds, timestamp),
        Err(err) => evaluate_failure(err, timestamp),
    }
}

fn classify(value: f64, limit: &Limit) -> Severity {
    if value > limit.error {
        Severity::Error
    } else if value > limit.warn {
        Severity::Warn
    } else {
        Severity::Ok
    }
}

fn jitter(min: Option<f64>, max: Option<f64>) -> Option<f64> {
    Some(max? - min?)
}

fn raise_error(snapshot: &mut HealthSnapshot, status: &str) {
    snapshot.overall = Severity::Error;
    snapshot.status = status.to_string();
}

fn raise_warning(snapshot: &mut HealthSnapshot, status: &str) {
    if snapshot.overall == Severity::Ok {
        snapshot.overall = Severity::Warn;
        snapshot.status = status.to_string();
    }
}

fn evaluate_result(
    result: &ProbeResult,
    thresholds: &Thresholds,
    timestamp: DateTime<Utc>,
) -> Evaluation {
    let packet_loss = result.packet_loss.unwrap_or(0.0);
    let jitter_ms = jitter(result.min_latency_ms, result.max_latency_ms);

    let mut snapshot = HealthSnapshot {
        timestamp: Some(timestamp),
        avg_latency_ms: result.avg_latency_ms,
        min_latency_ms: result.min_latency_ms,
        max_latency_ms: result.max_latency_ms,
        packet_loss: Some(packet_loss),
        jitter_ms,
        is_alive: result.is_alive,
        overall: Severity::Ok,
        status: String::from("Stable"),
        latency: None,
        loss: None,
        jitter: None,
    };
    let mut reasons = vec![];

    if !result.is_alive {
        reasons.push(String::from("Host Unreachable"));
        raise_error(&mut snapshot, "Error: Host Unreachable");
    } else {
        if let Some(latency) = result.avg_latency_ms {
            let severity = classify(latency, &thresholds.latency);
            match severity {
                Severity::Error => {
                    reasons.push(format!("Critical Latency ({latency}ms)"));
                    raise_error(&mut snapshot, "Error");
                }
                Severity::Warn => raise_warning(&mut snapshot, "Warning: High Latency"),
                _ => {}
            }
            snapshot.latency = Some(severity);
        }

        let severity = classify(packet_loss, &thresholds.packet_loss);
        match severity {
            Severity::Error => {
                reasons.push(format!("Critical Packet Loss ({packet_loss}%)"));
                raise_error(&mut snapshot, "Error");
            }
            Severity::Warn => raise_warning(&mut snapshot, "Warning: Packet Loss"),
            _ => {}
        }
        snapshot.loss = Some(severity);

        if let Some(jitter) = jitter_ms {
            let severity = classify(jitter, &thresholds.jitter);
            match severity {
                Severity::Error => {
                    reasons.push(format!("High Jitter ({jitter}ms)"));
                    if snapshot.overall != Severity::Error {
                        raise_error(&mut snapshot, "Error: High Jitter");
                    }
                }
                Severity::Warn => raise_warning(&mut snapshot, "Warning: High Jitter"),
                _ => {}
            }
            snapshot.jitter = Some(severity);
        }
    }

    let hiccup = (!reasons.is_empty()).then(|| HiccupRecord {
        timestamp,
        reason: reasons.join(", "),
        latency_ms: result.avg_latency_ms,
        packet_loss: Some(packet_loss),
    });

    Evaluation { snapshot, hiccup }
}

fn evaluate_failure(err: &ProbeError, timestamp: DateTime<Utc>) -> Evaluation {
    let snapshot = HealthSnapshot {
        timestamp: Some(timestamp),
        avg_latency_ms: None,
        min_latency_ms: None,
        max_latency_ms: None,
        packet_loss: Some(100.0),
        jitter_ms: None,
        is_alive: false,
        overall: Severity::Error,
        status: String::from("Error: Ping Failed"),
        latency: Some(Severity::Error),
        loss: Some(Severity::Error),
        jitter: Some(Severity::Error),
    };

    let hiccup = HiccupRecord {
        timestamp,
        reason: format!("Ping command failed: {err}"),
        latency_ms: None,
        packet_loss: Some(100.0),
    };

    Evaluation {
        snapshot,
        hiccup: Some(hiccup),
    }
}
