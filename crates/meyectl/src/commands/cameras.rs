//! Camera list command.

use std::sync::Arc;

use motioneye_api::{Camera, CameraRegistry};
use tabled::Tabled;

use crate::cli::{CamerasArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct CameraRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Proto")]
    proto: String,
    #[tabled(rename = "Enabled")]
    enabled: String,
    #[tabled(rename = "Stream")]
    stream: String,
    #[tabled(rename = "Actions")]
    actions: String,
}

fn to_row(camera: &Arc<Camera>, api_host: &str) -> CameraRow {
    CameraRow {
        id: camera.id,
        name: camera.name.clone(),
        proto: camera.proto.clone().unwrap_or_else(|| "-".into()),
        enabled: if camera.enabled { "yes" } else { "no" }.into(),
        stream: camera.stream_url(api_host).unwrap_or_else(|| "-".into()),
        actions: camera.actions.join(", "),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    registry: &CameraRegistry,
    args: CamerasArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut diagnostics = registry.client().subscribe_diagnostics();
    let cameras = registry.load().await;
    super::check_reachable(&mut diagnostics, registry)?;

    let mut listed: Vec<Arc<Camera>> = cameras
        .values()
        .filter(|c| args.all || (c.enabled && c.protocol().is_some()))
        .cloned()
        .collect();
    listed.sort_by_key(|c| c.id);

    let api_host = registry.client().host();
    let out = output::render_list(
        &global.output,
        &listed,
        |c| to_row(c, api_host),
        |c| c.id.to_string(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
