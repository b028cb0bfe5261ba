// Camera registry
//
// Fetches the camera list through the signing client and caches it by id.
// The cache is a single atomically-swapped snapshot: `load()` replaces the
// whole map, so concurrent readers observe either the previous set or the
// new one, never a mix, and stale ids never linger.

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use bytes::Bytes;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::camera::{Camera, CameraId};
use crate::client::MotionEyeClient;

/// Camera snapshot type returned by [`CameraRegistry::cameras`].
pub type CameraMap = HashMap<CameraId, Arc<Camera>>;

/// Per-host camera registry. Transport-only: it never validates camera
/// capabilities (action allow-lists are the caller's concern) and never
/// filters by protocol.
pub struct CameraRegistry {
    client: Arc<MotionEyeClient>,
    cameras: ArcSwap<CameraMap>,
}

impl CameraRegistry {
    pub fn new(client: Arc<MotionEyeClient>) -> Self {
        Self {
            client,
            cameras: ArcSwap::from_pointee(CameraMap::new()),
        }
    }

    /// The owning client, for URL derivation and credentials.
    pub fn client(&self) -> &Arc<MotionEyeClient> {
        &self.client
    }

    /// Current camera snapshot.
    pub fn cameras(&self) -> Arc<CameraMap> {
        self.cameras.load_full()
    }

    /// Look up a single cached camera.
    pub fn camera(&self, id: CameraId) -> Option<Arc<Camera>> {
        self.cameras.load().get(&id).cloned()
    }

    /// Fetch `/config/list/` and replace the cache wholesale.
    ///
    /// An unreachable host, a non-200 answer, or a response without a
    /// `cameras` field all yield an empty set -- never an error. Entries
    /// that fail to parse are skipped with a warning.
    pub async fn load(&self) -> Arc<CameraMap> {
        info!("loading camera list from {}", self.client.host());
        let response = self.client.get("/config/list/").await;

        let mut cameras = CameraMap::new();
        if let Some(listed) = response
            .as_ref()
            .and_then(|v| v.get("cameras"))
            .and_then(Value::as_array)
        {
            for raw in listed {
                match serde_json::from_value::<Camera>(raw.clone()) {
                    Ok(cam) => {
                        cameras.insert(cam.id, Arc::new(cam));
                    }
                    Err(err) => warn!(%err, "skipping unparseable camera entry"),
                }
            }
        }

        debug!(count = cameras.len(), "camera list loaded");
        let cameras = Arc::new(cameras);
        self.cameras.store(Arc::clone(&cameras));
        cameras
    }

    /// Trigger a named action on a camera: `POST /action/{id}/{name}/`
    /// with an empty body. The action name is passed through unchecked;
    /// the server rejects actions the camera does not support.
    pub async fn action(&self, camera_id: CameraId, action: &str) -> Option<Value> {
        debug!(camera_id, action, "dispatching camera action");
        self.client
            .post(&format!("/action/{camera_id}/{action}/"), None)
            .await
    }

    /// Fetch the camera's current still image as raw bytes.
    pub async fn snapshot(&self, camera_id: CameraId) -> Option<Bytes> {
        self.client
            .get_bytes(&format!("/picture/{camera_id}/current/"))
            .await
    }

    /// Signed URL for the camera's current still image.
    pub fn still_image_url(&self, camera_id: CameraId) -> String {
        self.client.still_image_url(camera_id)
    }
}
