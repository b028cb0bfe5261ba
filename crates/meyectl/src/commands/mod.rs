//! Command handlers.

pub mod action;
pub mod cameras;
pub mod sign;
pub mod snapshot;

use motioneye_api::CameraRegistry;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

pub async fn dispatch(
    command: Command,
    registry: &CameraRegistry,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match command {
        Command::Cameras(args) => cameras::handle(registry, args, global).await,
        Command::Action(args) => action::handle(registry, args, global).await,
        Command::Snapshot(args) => snapshot::handle(registry, args, global).await,
        Command::Sign(args) => sign::handle(registry, args),
    }
}

/// Distinguish "host answered with no data" from "call failed": the
/// library soft-fails to empty, so failure shows up only on the
/// diagnostics channel.
pub(crate) fn check_reachable(
    diagnostics: &mut tokio::sync::broadcast::Receiver<motioneye_api::Diagnostic>,
    registry: &CameraRegistry,
) -> Result<(), CliError> {
    while let Ok(event) = diagnostics.try_recv() {
        if event.is_failure() {
            return Err(CliError::Unreachable {
                url: registry.client().base_url().to_owned(),
            });
        }
    }
    Ok(())
}
