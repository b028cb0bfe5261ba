mod cli;
mod commands;
mod error;
mod output;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use secrecy::SecretString;
use tracing_subscriber::EnvFilter;

use motioneye_api::{
    CameraRegistry, ConnectionConfig, MotionEyeClient, TlsMode, TransportConfig,
};

use crate::cli::{Cli, GlobalOpts};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let registry = build_registry(&cli.global)?;
    tracing::debug!(command = ?cli.command, "dispatching command");
    commands::dispatch(cli.command, &registry, &cli.global).await
}

/// Build the connection from flags and environment. Configuration
/// problems are reported here, before any network activity.
fn build_registry(global: &GlobalOpts) -> Result<CameraRegistry, CliError> {
    let url = global.url.clone().ok_or(CliError::NoUrl)?;

    let config = ConnectionConfig {
        url,
        username: global.username.clone(),
        password: SecretString::from(global.password.clone().unwrap_or_default()),
        auth_mode: global.auth.into(),
    };
    let transport = TransportConfig {
        tls: if global.insecure {
            TlsMode::DangerAcceptInvalid
        } else {
            TlsMode::System
        },
        timeout: Duration::from_secs(global.timeout),
    };

    let client = MotionEyeClient::new(config, &transport).map_err(CliError::Config)?;
    Ok(CameraRegistry::new(Arc::new(client)))
}
