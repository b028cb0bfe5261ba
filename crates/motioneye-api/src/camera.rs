// Camera model
//
// Produced by parsing the `/config/list/` enumeration response. MotionEye
// reports dozens of per-camera tuning fields; the ones the client acts on
// are modeled explicitly and the rest land in `extra`. Fields use
// `#[serde(default)]` liberally because presence varies across server
// versions and camera protocols.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

/// Camera identifier, unique within one MotionEye host.
pub type CameraId = i64;

/// Streaming transport variant, determining how stream and still URLs
/// are derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum CameraProtocol {
    /// Camera hosted by a (possibly remote) MotionEye instance.
    Motioneye,
    /// Network camera streamed through this MotionEye host.
    Netcam,
    /// Raw MJPEG source, streamed directly from the camera's own URL.
    Mjpeg,
}

/// One camera as reported by `/config/list/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub id: CameraId,
    #[serde(default)]
    pub name: String,
    /// Raw protocol string. The registry does no protocol filtering;
    /// parse through [`Camera::protocol`] and reject unknown values
    /// before constructing entities.
    #[serde(default)]
    pub proto: Option<String>,
    /// A camera with no `enabled` field counts as enabled.
    #[serde(default = "enabled_default")]
    pub enabled: bool,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub scheme: Option<String>,
    #[serde(default)]
    pub streaming_port: Option<u16>,
    /// Source URL, present for raw `mjpeg` cameras.
    #[serde(default)]
    pub url: Option<String>,
    /// Action commands this camera accepts, in server order.
    #[serde(default)]
    pub actions: Vec<String>,
    /// Catch-all for the many tuning fields not modeled above.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn enabled_default() -> bool {
    true
}

impl Camera {
    /// Parsed protocol, `None` when missing or unrecognized.
    pub fn protocol(&self) -> Option<CameraProtocol> {
        self.proto.as_deref().and_then(|p| p.parse().ok())
    }

    /// Whether `action` appears in this camera's allow-list. Checking
    /// before dispatch is the caller's job; the registry passes any
    /// action through and lets the server reject unknown ones.
    pub fn has_action(&self, action: &str) -> bool {
        self.actions.iter().any(|a| a == action)
    }

    /// Derive the MJPEG stream URL for this camera.
    ///
    /// `api_host` is the owning client's scheme+hostname
    /// ([`MotionEyeClient::host`](crate::MotionEyeClient::host)), used
    /// for cameras streamed through the MotionEye host itself. Returns
    /// `None` when the protocol is unknown or a required field is
    /// missing.
    pub fn stream_url(&self, api_host: &str) -> Option<String> {
        match self.protocol()? {
            CameraProtocol::Mjpeg => self.url.clone(),
            CameraProtocol::Motioneye => {
                let scheme = self.scheme.as_deref().unwrap_or("http");
                Some(format!(
                    "{scheme}://{}:{}/",
                    self.host.as_deref()?,
                    self.streaming_port?
                ))
            }
            CameraProtocol::Netcam => Some(format!("{api_host}:{}/", self.streaming_port?)),
        }
    }
}
