//! Camera action dispatch.
//!
//! The allow-list check lives here, on the caller side: the registry is
//! transport-only and sends whatever it is told. `--force` skips the
//! check and lets the server reject the action instead.

use motioneye_api::CameraRegistry;

use crate::cli::{ActionArgs, GlobalOpts};
use crate::error::CliError;

pub async fn handle(
    registry: &CameraRegistry,
    args: ActionArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut diagnostics = registry.client().subscribe_diagnostics();
    let cameras = registry.load().await;
    super::check_reachable(&mut diagnostics, registry)?;

    let camera = cameras
        .get(&args.camera_id)
        .ok_or(CliError::UnknownCamera { id: args.camera_id })?;

    if !args.force && !camera.has_action(&args.action) {
        return Err(CliError::UnknownAction {
            id: args.camera_id,
            action: args.action,
            available: if camera.actions.is_empty() {
                "(none)".into()
            } else {
                camera.actions.join(", ")
            },
        });
    }

    match registry.action(args.camera_id, &args.action).await {
        Some(_) => {
            if !global.quiet {
                eprintln!("Action '{}' sent to camera {}", args.action, args.camera_id);
            }
            Ok(())
        }
        None => Err(CliError::Unreachable {
            url: registry.client().base_url().to_owned(),
        }),
    }
}
