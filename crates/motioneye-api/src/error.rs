// Error taxonomy for the MotionEye client.
//
// Network-layer failures (Transport/Protocol/Decode) are classified here but
// never escape `get`/`post` -- those soft-fail to `None` so one unreachable
// host cannot destabilize a process driving a whole fleet. `Configuration`
// is the exception: it is raised synchronously at construction, before any
// network activity.

use thiserror::Error;

use crate::diagnostics::FailureKind;

/// Top-level error type for the `motioneye-api` crate.
#[derive(Debug, Error)]
pub enum Error {
    // ── Construction ────────────────────────────────────────────────
    /// Missing or invalid connection parameters (URL, username).
    #[error("Invalid connection configuration: {message}")]
    Configuration { message: String },

    /// Base URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout,
    /// TLS handshake, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    // ── Protocol ────────────────────────────────────────────────────
    /// The server answered with a non-200 status. A 403 here usually
    /// means the request signature did not verify.
    #[error("MotionEye API error (HTTP {status}): {body}")]
    Protocol { status: u16, body: String },

    // ── Data ────────────────────────────────────────────────────────
    /// Response body was not valid JSON, with the raw body for debugging.
    #[error("Response decode error: {message}")]
    Decode { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    /// Retry policy itself belongs to the caller.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Protocol { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Classify this error for diagnostic events. `None` for errors that
    /// are raised before any request is made.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Transport(_) => Some(FailureKind::Transport),
            Self::Protocol { status, .. } => Some(FailureKind::Protocol { status: *status }),
            Self::Decode { .. } => Some(FailureKind::Decode),
            Self::Configuration { .. } | Self::InvalidUrl(_) => None,
        }
    }
}
