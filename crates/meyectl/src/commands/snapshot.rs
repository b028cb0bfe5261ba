//! Still-image fetch.

use std::io::Write;

use motioneye_api::CameraRegistry;

use crate::cli::{GlobalOpts, SnapshotArgs};
use crate::error::CliError;

pub async fn handle(
    registry: &CameraRegistry,
    args: SnapshotArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let bytes = registry
        .snapshot(args.camera_id)
        .await
        .ok_or(CliError::Unreachable {
            url: registry.client().base_url().to_owned(),
        })?;

    match args.output_file {
        Some(path) => {
            std::fs::write(&path, &bytes).map_err(|source| CliError::Io {
                path: path.display().to_string(),
                source,
            })?;
            if !global.quiet {
                eprintln!("Wrote {} bytes to {}", bytes.len(), path.display());
            }
        }
        None => {
            std::io::stdout()
                .write_all(&bytes)
                .map_err(|source| CliError::Io {
                    path: "stdout".into(),
                    source,
                })?;
        }
    }
    Ok(())
}
