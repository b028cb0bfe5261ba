// MotionEye HTTP client
//
// Owns the connection identity (base URL, username, password-derived key)
// and performs signed GET/POST calls. Responses follow a soft-fail
// contract: any transport, protocol, or decode failure is logged, emitted
// as a structured diagnostic, and surfaced to the caller as `None`.

use bytes::Bytes;
use chrono::Utc;
use indexmap::IndexMap;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use sha1::{Digest, Sha1};
use strum::{Display, EnumString};
use tokio::sync::broadcast;
use tracing::{debug, warn};
use url::Url;

use crate::diagnostics::{Diagnostic, DiagnosticSink, RequestOutcome};
use crate::error::Error;
use crate::signing;
use crate::transport::TransportConfig;

/// Query parameters, in insertion order. Order is preserved into the
/// pre-canonicalization path; the signature itself sorts by name, so two
/// maps with the same entries always sign identically.
pub type QueryParams = IndexMap<String, String>;

/// Stream authentication scheme MotionEye itself expects from whoever
/// renders the MJPEG stream. The signed API does not use it; it is
/// carried so hosts can wire up their own stream consumers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum AuthMode {
    #[default]
    Basic,
    Digest,
}

/// Connection parameters for a single MotionEye host.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Base URL of the MotionEye web interface, e.g. `http://nvr:8765`.
    pub url: String,
    pub username: String,
    /// Plaintext password; only its SHA-1 is kept after construction.
    /// An empty password is valid -- MotionEye then signs with `sha1("")`.
    pub password: SecretString,
    pub auth_mode: AuthMode,
}

/// Signed-request client for one MotionEye host.
///
/// Cheap to share behind an `Arc`; the inner `reqwest::Client` pools
/// connections and is safe for concurrent use by multiple outstanding
/// requests. No ordering is guaranteed between calls.
#[derive(Debug)]
pub struct MotionEyeClient {
    http: reqwest::Client,
    base_url: String,
    host: String,
    instance_id: String,
    username: String,
    password: SecretString,
    password_hash: String,
    auth_mode: AuthMode,
    diagnostics: DiagnosticSink,
}

impl MotionEyeClient {
    /// Validate the connection parameters and build the client.
    ///
    /// Fails synchronously, before any network activity: empty URL or
    /// username, an unparseable URL, or a URL without a host are all
    /// configuration errors.
    pub fn new(config: ConnectionConfig, transport: &TransportConfig) -> Result<Self, Error> {
        if config.url.is_empty() {
            return Err(Error::Configuration {
                message: "URL must not be empty".into(),
            });
        }
        if config.username.is_empty() {
            return Err(Error::Configuration {
                message: "username must not be empty".into(),
            });
        }

        // A single trailing slash is tolerated and stripped.
        let base_url = config
            .url
            .strip_suffix('/')
            .unwrap_or(&config.url)
            .to_owned();

        let parsed = Url::parse(&base_url)?;
        let hostname = parsed.host_str().ok_or_else(|| Error::Configuration {
            message: format!("URL has no host: {base_url}"),
        })?;
        // Scheme + hostname only: MJPEG stream URLs for netcam-protocol
        // cameras are built against the host, not the full base URL.
        let host = format!("{}://{}", parsed.scheme(), hostname);
        let instance_id = slugify(&base_url);

        let mut hasher = Sha1::new();
        hasher.update(config.password.expose_secret().as_bytes());
        let password_hash = hex::encode(hasher.finalize());

        let http = transport.build_client()?;

        debug!(instance_id, host, "created MotionEye client");

        Ok(Self {
            http,
            base_url,
            host,
            instance_id,
            username: config.username,
            password: config.password,
            password_hash,
            auth_mode: config.auth_mode,
            diagnostics: DiagnosticSink::new(),
        })
    }

    // ── Identity accessors ───────────────────────────────────────────

    /// Base URL with no trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Scheme + hostname, no port or path.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Stable identifier derived from the base URL, usable as a cache key.
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn auth_mode(&self) -> AuthMode {
        self.auth_mode
    }

    /// Plaintext password, for hosts wiring MJPEG stream consumers that
    /// authenticate directly against the camera.
    pub fn password(&self) -> &SecretString {
        &self.password
    }

    /// Human-readable connection title.
    pub fn title(&self) -> String {
        format!("MotionEye {}", self.base_url)
    }

    /// Subscribe to per-request diagnostics.
    pub fn subscribe_diagnostics(&self) -> broadcast::Receiver<Diagnostic> {
        self.diagnostics.subscribe()
    }

    // ── Signing ──────────────────────────────────────────────────────

    /// Turn `path` into a signed path at the current time.
    ///
    /// The caller's `params` are never mutated; `_` (unix seconds) and
    /// `_username` are injected into a local copy. Signatures are
    /// computed immediately before transmission and are valid only for
    /// that exact timestamp and query -- never cache one.
    pub fn sign(
        &self,
        method: &str,
        path: &str,
        params: &QueryParams,
        body: Option<&[u8]>,
    ) -> String {
        self.sign_at(method, path, params, body, Utc::now().timestamp())
    }

    /// Deterministic variant of [`sign`](Self::sign) for a fixed timestamp.
    pub fn sign_at(
        &self,
        method: &str,
        path: &str,
        params: &QueryParams,
        body: Option<&[u8]>,
        timestamp: i64,
    ) -> String {
        let mut params = params.clone();
        params.insert("_".to_owned(), timestamp.to_string());
        params.insert("_username".to_owned(), self.username.clone());

        let query = params
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("&");
        let presigned = format!("{path}?{query}");

        let signature = signing::compute_signature(
            method,
            &presigned,
            body,
            &self.username,
            &self.password_hash,
        );
        format!("{presigned}&_signature={signature}")
    }

    /// Signed URL for a camera's current still image. The response is raw
    /// image bytes; fetch it with [`get_bytes`](Self::get_bytes) or hand
    /// the URL to a stream consumer.
    pub fn still_image_url(&self, camera_id: i64) -> String {
        let path = format!("/picture/{camera_id}/current/");
        format!(
            "{}{}",
            self.base_url,
            self.sign("GET", &path, &QueryParams::new(), None)
        )
    }

    // ── Signed requests ──────────────────────────────────────────────

    /// Signed GET expecting a JSON response. Soft-fails to `None`.
    pub async fn get(&self, path: &str) -> Option<Value> {
        self.get_with_params(path, &QueryParams::new()).await
    }

    /// Signed GET with extra query parameters. Soft-fails to `None`.
    pub async fn get_with_params(&self, path: &str, params: &QueryParams) -> Option<Value> {
        let url = format!("{}{}", self.base_url, self.sign("GET", path, params, None));
        debug!("GET {url}");
        let result = self.request_json(self.http.get(&url)).await;
        self.observe("GET", path, result)
    }

    /// Signed POST expecting a JSON (or empty-object) response.
    /// Soft-fails to `None`.
    pub async fn post(&self, path: &str, body: Option<&[u8]>) -> Option<Value> {
        self.post_with_params(path, body, &QueryParams::new()).await
    }

    /// Signed POST with extra query parameters. Soft-fails to `None`.
    pub async fn post_with_params(
        &self,
        path: &str,
        body: Option<&[u8]>,
        params: &QueryParams,
    ) -> Option<Value> {
        let url = format!("{}{}", self.base_url, self.sign("POST", path, params, body));
        debug!("POST {url}");
        let mut request = self.http.post(&url);
        if let Some(body) = body {
            request = request.body(body.to_vec());
        }
        let result = self.request_json(request).await;
        self.observe("POST", path, result)
    }

    /// Signed GET returning the raw response body -- the still-image
    /// endpoint serves image bytes, not JSON. Soft-fails to `None`.
    pub async fn get_bytes(&self, path: &str) -> Option<Bytes> {
        let url = format!(
            "{}{}",
            self.base_url,
            self.sign("GET", path, &QueryParams::new(), None)
        );
        debug!("GET {url}");
        let result = self.request_bytes(self.http.get(&url)).await;
        self.observe("GET", path, result)
    }

    // ── Response handling ────────────────────────────────────────────

    async fn request_json(&self, request: reqwest::RequestBuilder) -> Result<Value, Error> {
        let resp = request.send().await.map_err(Error::Transport)?;
        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;
        debug!(status = status.as_u16(), "MotionEye API response");

        if status != reqwest::StatusCode::OK {
            return Err(Error::Protocol {
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_str(&body).map_err(|e| Error::Decode {
            message: e.to_string(),
            body,
        })
    }

    async fn request_bytes(&self, request: reqwest::RequestBuilder) -> Result<Bytes, Error> {
        let resp = request.send().await.map_err(Error::Transport)?;
        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Protocol {
                status: status.as_u16(),
                body,
            });
        }
        resp.bytes().await.map_err(Error::Transport)
    }

    /// Classify the outcome, emit one diagnostic per attempt, and map
    /// failures to `None` so a dead host never takes the caller down.
    fn observe<T>(&self, method: &'static str, path: &str, result: Result<T, Error>) -> Option<T> {
        match result {
            Ok(value) => {
                self.diagnostics.emit(Diagnostic {
                    method,
                    path: path.to_owned(),
                    outcome: RequestOutcome::Success { status: 200 },
                });
                Some(value)
            }
            Err(err) => {
                warn!(%err, method, path, "MotionEye API call failed");
                if let Some(kind) = err.failure_kind() {
                    self.diagnostics.emit(Diagnostic {
                        method,
                        path: path.to_owned(),
                        outcome: RequestOutcome::Failure(kind),
                    });
                }
                None
            }
        }
    }
}

/// Normalize a URL into a stable lowercase identifier: alphanumeric runs
/// survive, everything else collapses to single underscores.
fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_sep = false;
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('_');
            }
            pending_sep = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn client_for(url: &str, username: &str, password: &str) -> MotionEyeClient {
        MotionEyeClient::new(
            ConnectionConfig {
                url: url.into(),
                username: username.into(),
                password: SecretString::from(password),
                auth_mode: AuthMode::Basic,
            },
            &TransportConfig::default(),
        )
        .expect("valid connection config")
    }

    #[test]
    fn construction_normalizes_identity() {
        let client = client_for("http://nvr.lan:8765/", "admin", "");
        assert_eq!(client.base_url(), "http://nvr.lan:8765");
        assert_eq!(client.host(), "http://nvr.lan");
        assert_eq!(client.instance_id(), "http_nvr_lan_8765");
        assert_eq!(client.title(), "MotionEye http://nvr.lan:8765");
        // sha1("") -- empty passwords are a valid MotionEye setup.
        assert_eq!(
            client.password_hash,
            "da39a3ee5e6b4b0d3255bfef95601890afd80709"
        );
    }

    #[test]
    fn construction_rejects_bad_config() {
        let empty_url = MotionEyeClient::new(
            ConnectionConfig {
                url: String::new(),
                username: "admin".into(),
                password: SecretString::from(""),
                auth_mode: AuthMode::Basic,
            },
            &TransportConfig::default(),
        );
        assert!(matches!(empty_url, Err(Error::Configuration { .. })));

        let empty_user = MotionEyeClient::new(
            ConnectionConfig {
                url: "http://nvr:8765".into(),
                username: String::new(),
                password: SecretString::from("pw"),
                auth_mode: AuthMode::Basic,
            },
            &TransportConfig::default(),
        );
        assert!(matches!(empty_user, Err(Error::Configuration { .. })));

        let garbage = MotionEyeClient::new(
            ConnectionConfig {
                url: "not a url".into(),
                username: "admin".into(),
                password: SecretString::from("pw"),
                auth_mode: AuthMode::Basic,
            },
            &TransportConfig::default(),
        );
        assert!(matches!(garbage, Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn sign_at_matches_reference() {
        // Generated with the server's routine: empty password, fixed clock.
        let client = client_for("http://nvr:8765", "admin", "");
        let signed = client.sign_at("GET", "/config/list/", &QueryParams::new(), None, 1587579711);
        assert_eq!(
            signed,
            "/config/list/?_=1587579711&_username=admin\
             &_signature=c08f0db4166f260ff9afaa1a4fe1c525be0ffab7"
        );
    }

    #[test]
    fn sign_at_action_path() {
        let client = client_for("http://nvr:8765", "admin", "s3cret");
        let signed = client.sign_at(
            "POST",
            "/action/3/snapshot/",
            &QueryParams::new(),
            None,
            1_700_000_000,
        );
        assert_eq!(
            signed,
            "/action/3/snapshot/?_=1700000000&_username=admin\
             &_signature=264c4d624f5355f08d50f8b9d6157052ca5d7baa"
        );
    }

    #[test]
    fn timestamps_change_the_signature() {
        let client = client_for("http://nvr:8765", "admin", "");
        let at_100 = client.sign_at("GET", "/config/list/", &QueryParams::new(), None, 100);
        let at_101 = client.sign_at("GET", "/config/list/", &QueryParams::new(), None, 101);
        assert_eq!(
            at_100,
            "/config/list/?_=100&_username=admin\
             &_signature=701961b4dbadcfcdf047396b682499fb76782bec"
        );
        assert_ne!(at_100, at_101);
    }

    #[test]
    fn sign_does_not_mutate_caller_params() {
        let client = client_for("http://nvr:8765", "admin", "");
        let params = QueryParams::from_iter([("prefix".to_owned(), "2020-04-18".to_owned())]);
        let first = client.sign_at("GET", "/movie/3/list/", &params, None, 42);
        let second = client.sign_at("GET", "/movie/3/list/", &params, None, 42);
        // Re-signing the same logical request at the same timestamp is
        // deterministic, and the shared map is untouched between calls.
        assert_eq!(first, second);
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn slugify_is_stable() {
        assert_eq!(slugify("http://nvr.lan:8765"), "http_nvr_lan_8765");
        assert_eq!(slugify("https://CAM-host/"), "https_cam_host");
    }
}
