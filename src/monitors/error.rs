//! Error types for the probe boundary

use std::fmt;

/// Failure of the probing mechanism itself
///
/// An unreachable target is *not* an error, it is reported as a
/// [`ProbeResult`](crate::ProbeResult) with `is_alive == false`.
#[derive(Debug)]
pub enum ProbeError {
    /// The probe binary could not be started or waited on
    Spawn(std::io::Error),

    /// The probe ran successfully but its output could not be understood
    MalformedOutput(String),

    /// `ping` failed without a summary for a reason other than the target
    /// (missing privileges, unsupported flags, ..)
    Exited {
        /// Exit code, `None` if terminated by a signal
        code: Option<i32>,
        /// First non-empty line of its output
        message: String,
    },

    /// The prober panicked
    Panicked(String),
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeError::Spawn(err) => write!(f, "failed to run ping: {}", err),
            ProbeError::MalformedOutput(msg) => write!(f, "unexpected ping output: {}", msg),
            ProbeError::Exited {
                code: Some(code),
                message,
            } => write!(f, "ping exited with code {}: {}", code, message),
            ProbeError::Exited {
                code: None,
                message,
            } => write!(f, "ping was terminated by a signal: {}", message),
            ProbeError::Panicked(msg) => write!(f, "prober panicked: {}", msg),
        }
    }
}

impl std::error::Error for ProbeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProbeError::Spawn(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ProbeError {
    fn from(err: std::io::Error) -> Self {
        ProbeError::Spawn(err)
    }
}
