// Transport configuration for building the shared reqwest::Client.
//
// One client (and its connection pool) is reused across every call a
// `MotionEyeClient` makes; it is safe for concurrent use by multiple
// outstanding requests.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::Error;

/// TLS verification mode.
#[derive(Debug, Clone)]
pub enum TlsMode {
    /// Use the system certificate store.
    System,
    /// Use a custom CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (for self-signed MotionEye installs).
    DangerAcceptInvalid,
}

/// Transport settings shared by all requests of one client.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    /// Per-call timeout. The signing protocol mandates none, but an
    /// unbounded hang on a dead host is a defect, so a bound is always
    /// applied.
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("motioneye-api/", env!("CARGO_PKG_VERSION")));

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path).map_err(|e| Error::Configuration {
                    message: format!("failed to read CA cert: {e}"),
                })?;
                let cert =
                    reqwest::Certificate::from_pem(&cert_pem).map_err(|e| Error::Configuration {
                        message: format!("invalid CA cert: {e}"),
                    })?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder.build().map_err(Error::Transport)
    }
}
