//! Clap derive structures for the `meyectl` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use motioneye_api::AuthMode;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// meyectl -- command-line client for MotionEye surveillance servers
#[derive(Debug, Parser)]
#[command(
    name = "meyectl",
    version,
    about = "Talk to a MotionEye server's signed HTTP API",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// MotionEye base URL (e.g. http://nvr:8765)
    #[arg(long, short = 'u', env = "MEYE_URL", global = true)]
    pub url: Option<String>,

    /// MotionEye account username
    #[arg(long, short = 'U', env = "MEYE_USERNAME", default_value = "admin", global = true)]
    pub username: String,

    /// MotionEye account password (empty is valid)
    #[arg(long, env = "MEYE_PASSWORD", hide_env = true, global = true)]
    pub password: Option<String>,

    /// Stream authentication scheme advertised to stream consumers
    #[arg(long, default_value = "basic", global = true)]
    pub auth: AuthOpt,

    /// Output format
    #[arg(long, short = 'o', default_value = "table", global = true)]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "MEYE_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "MEYE_TIMEOUT", default_value = "30", global = true)]
    pub timeout: u64,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AuthOpt {
    Basic,
    Digest,
}

impl From<AuthOpt> for AuthMode {
    fn from(opt: AuthOpt) -> Self {
        match opt {
            AuthOpt::Basic => AuthMode::Basic,
            AuthOpt::Digest => AuthMode::Digest,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Plain text, one value per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the cameras configured on the MotionEye host
    #[command(alias = "cams", alias = "ls")]
    Cameras(CamerasArgs),

    /// Trigger a named action on a camera
    Action(ActionArgs),

    /// Fetch a camera's current still image
    #[command(alias = "snap")]
    Snapshot(SnapshotArgs),

    /// Print a signed URL without sending anything (debugging aid)
    Sign(SignArgs),
}

#[derive(Debug, Args)]
pub struct CamerasArgs {
    /// Include disabled and unknown-protocol cameras
    #[arg(long, short = 'a')]
    pub all: bool,
}

#[derive(Debug, Args)]
pub struct ActionArgs {
    /// Camera id as listed by `meyectl cameras`
    pub camera_id: i64,

    /// Action name, e.g. snapshot, light_on
    pub action: String,

    /// Send even if the camera does not advertise the action
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Args)]
pub struct SnapshotArgs {
    /// Camera id as listed by `meyectl cameras`
    pub camera_id: i64,

    /// Write the image here instead of stdout
    #[arg(long, short = 'O')]
    pub output_file: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct SignArgs {
    /// Request path, e.g. /config/list/
    pub path: String,

    /// HTTP method to sign for
    #[arg(long, short = 'X', default_value = "GET")]
    pub method: String,

    /// Extra query parameter, key=value (repeatable)
    #[arg(long = "param", short = 'd', value_parser = parse_key_val)]
    pub params: Vec<(String, String)>,
}

/// Parse a `key=value` argument.
fn parse_key_val(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) => Ok((key.to_owned(), value.to_owned())),
        None => Err(format!("expected key=value, got '{raw}'")),
    }
}
