//! reqwest-backed Docker Engine API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::api::{EngineApi, ImagePruneMode};
use crate::error::{EngineError, EngineResult};
use crate::host::EngineHost;
use crate::models::{
    ContainerPruneReport, DiskUsage, ImagePruneReport, NetworkPruneReport, Node, SystemInfo,
    VolumePruneReport,
};
use crate::tls::TlsMaterial;

/// API version requested when `DOCKER_API_VERSION` is not set.
pub const DEFAULT_API_VERSION: &str = "1.25";

/// Pick the API version: a non-blank override wins over the default.
#[must_use]
pub fn resolve_api_version(override_value: Option<&str>) -> String {
    override_value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map_or_else(|| DEFAULT_API_VERSION.to_string(), str::to_string)
}

/// User agent sent with every request.
#[must_use]
pub fn default_user_agent() -> String {
    format!(
        "swarm-prune/{} ({})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS
    )
}

/// Settings shared by every connection of one invocation.
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    /// API version path segment, without the `v` prefix.
    pub api_version: String,
    /// `User-Agent` header value.
    pub user_agent: String,
    /// Per-request timeout; `None` keeps the transport default.
    pub timeout: Option<Duration>,
    /// Client certificate material; `None` selects a plain transport.
    pub tls: Option<TlsMaterial>,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            api_version: DEFAULT_API_VERSION.to_string(),
            user_agent: default_user_agent(),
            timeout: None,
            tls: None,
        }
    }
}

/// A handle bound to one daemon and one API version.
#[derive(Debug, Clone)]
pub struct EngineClient {
    http: Client,
    host: EngineHost,
    base_url: Url,
    api_version: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl EngineClient {
    /// Build a client for `address`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidHost`] for unparseable addresses and
    /// [`EngineError::ClientBuild`] when the transport cannot be configured.
    pub fn connect(address: &str, settings: &ConnectionSettings) -> EngineResult<Self> {
        let host = EngineHost::parse(address, settings.tls.is_some())?;
        let base_url = host.base_url()?;

        let mut builder = Client::builder().user_agent(settings.user_agent.as_str());
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }

        if let EngineHost::Unix(path) = &host {
            #[cfg(unix)]
            {
                builder = builder.unix_socket(path.clone());
            }
            #[cfg(not(unix))]
            {
                return Err(EngineError::InvalidHost {
                    host: address.to_string(),
                    reason: format!(
                        "unix sockets are not supported on this platform ({})",
                        path.display()
                    ),
                });
            }
        }

        if let Some(tls) = &settings.tls {
            builder = builder
                .use_rustls_tls()
                .add_root_certificate(tls.ca.clone())
                .identity(tls.identity.clone())
                .danger_accept_invalid_certs(!tls.verify);
        }

        let http = builder.build().map_err(|err| EngineError::ClientBuild {
            reason: err.to_string(),
        })?;

        Ok(Self {
            http,
            host,
            base_url,
            api_version: settings.api_version.clone(),
        })
    }

    /// Daemon this client talks to.
    #[must_use]
    pub const fn host(&self) -> &EngineHost {
        &self.host
    }

    /// API version requested by this client.
    #[must_use]
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    fn endpoint(&self, operation: &'static str, path: &str) -> EngineResult<Url> {
        self.base_url
            .join(&format!("v{}/{path}", self.api_version))
            .map_err(|err| EngineError::InvalidHost {
                host: self.host.to_string(),
                reason: format!("cannot build {operation} URL: {err}"),
            })
    }

    async fn send<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> EngineResult<T> {
        debug!(operation, host = %self.host, version = %self.api_version, "engine request");
        let response = request
            .send()
            .await
            .map_err(|source| EngineError::Transport { operation, source })?;

        if response.status().is_success() {
            response
                .json::<T>()
                .await
                .map_err(|source| EngineError::Decode { operation, source })
        } else {
            Err(classify_failure(operation, response).await)
        }
    }

    async fn get<T: DeserializeOwned>(&self, operation: &'static str, path: &str) -> EngineResult<T> {
        let url = self.endpoint(operation, path)?;
        self.send(operation, self.http.get(url)).await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
        query: &[(&str, String)],
    ) -> EngineResult<T> {
        let url = self.endpoint(operation, path)?;
        let request = self.http.post(url);
        let request = if query.is_empty() {
            request
        } else {
            request.query(query)
        };
        self.send(operation, request).await
    }
}

#[async_trait]
impl EngineApi for EngineClient {
    async fn info(&self) -> EngineResult<SystemInfo> {
        self.get("info", "info").await
    }

    async fn inspect_node(&self, id: &str) -> EngineResult<Node> {
        self.get("node inspect", &format!("nodes/{id}")).await
    }

    async fn list_nodes(&self) -> EngineResult<Vec<Node>> {
        self.get("node list", "nodes").await
    }

    async fn prune_containers(&self) -> EngineResult<ContainerPruneReport> {
        self.post("containers prune", "containers/prune", &[]).await
    }

    async fn prune_images(&self, mode: ImagePruneMode) -> EngineResult<ImagePruneReport> {
        let filters = serde_json::json!({ "dangling": [mode.dangling_filter()] }).to_string();
        self.post("images prune", "images/prune", &[("filters", filters)])
            .await
    }

    async fn prune_volumes(&self) -> EngineResult<VolumePruneReport> {
        self.post("volumes prune", "volumes/prune", &[]).await
    }

    async fn prune_networks(&self) -> EngineResult<NetworkPruneReport> {
        self.post("networks prune", "networks/prune", &[]).await
    }

    async fn disk_usage(&self) -> EngineResult<DiskUsage> {
        self.get("disk usage", "system/df").await
    }
}

/// Turn a non-success response into an [`EngineError::Status`].
async fn classify_failure(operation: &'static str, response: reqwest::Response) -> EngineError {
    let status = response.status();
    let bytes = response.bytes().await.unwrap_or_default();
    let body_text = String::from_utf8_lossy(&bytes).trim().to_string();

    let message = serde_json::from_slice::<ErrorBody>(&bytes)
        .map(|body| body.message)
        .ok()
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| {
            if body_text.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("no response body")
                    .to_string()
            } else {
                body_text
            }
        });

    EngineError::Status {
        operation,
        status: status.as_u16(),
        message,
    }
}
