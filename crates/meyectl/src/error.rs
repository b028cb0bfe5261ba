//! CLI error types with miette diagnostics.
//!
//! The library soft-fails to `None` on network problems; the CLI turns
//! those into user-facing errors with actionable help text and distinct
//! exit codes.

use miette::Diagnostic;
use thiserror::Error;

/// Exit codes for scripting.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const CONFIG: i32 = 3;
    pub const UNREACHABLE: i32 = 4;
    pub const NOT_FOUND: i32 = 5;
    pub const UNKNOWN_ACTION: i32 = 6;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("No MotionEye URL configured")]
    #[diagnostic(
        code(meye::no_url),
        help("Pass --url http://host:8765 or set MEYE_URL.")
    )]
    NoUrl,

    #[error("Invalid connection configuration")]
    #[diagnostic(code(meye::bad_config))]
    Config(#[source] motioneye_api::Error),

    #[error("MotionEye at {url} did not answer")]
    #[diagnostic(
        code(meye::unreachable),
        help(
            "Check that the host is up and the URL, username, and password\n\
             are right. A signature mismatch also lands here; run with -vv\n\
             to see the failure class."
        )
    )]
    Unreachable { url: String },

    #[error("Camera {id} is not known to this host")]
    #[diagnostic(code(meye::unknown_camera), help("Run: meyectl cameras --all"))]
    UnknownCamera { id: i64 },

    #[error("Camera {id} does not advertise action '{action}'")]
    #[diagnostic(
        code(meye::unknown_action),
        help("Advertised actions: {available}\nUse --force to send it anyway.")
    )]
    UnknownAction {
        id: i64,
        action: String,
        available: String,
    },

    #[error("Failed to write {path}")]
    #[diagnostic(code(meye::io))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoUrl | Self::Config(_) => exit_code::CONFIG,
            Self::Unreachable { .. } => exit_code::UNREACHABLE,
            Self::UnknownCamera { .. } => exit_code::NOT_FOUND,
            Self::UnknownAction { .. } => exit_code::UNKNOWN_ACTION,
            Self::Io { .. } => exit_code::GENERAL,
        }
    }
}
