// motioneye-api: Async Rust client for the MotionEye signed HTTP API
//
// MotionEye authenticates every request with a deterministic SHA-1
// signature over a canonicalized method/path/body/key tuple instead of a
// session token. This crate owns that signing protocol, the camera
// enumeration model, and a soft-failing request layer: network failures
// degrade to "no data" with structured diagnostics, so one dead host never
// destabilizes a process managing a fleet.

pub mod camera;
pub mod client;
pub mod diagnostics;
pub mod error;
pub mod registry;
pub mod signing;
pub mod transport;

pub use camera::{Camera, CameraId, CameraProtocol};
pub use client::{AuthMode, ConnectionConfig, MotionEyeClient, QueryParams};
pub use diagnostics::{Diagnostic, FailureKind, RequestOutcome};
pub use error::Error;
pub use registry::{CameraMap, CameraRegistry};
pub use transport::{TlsMode, TransportConfig};
