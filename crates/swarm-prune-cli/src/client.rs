//! Shared error types, the engine connector, and telemetry wiring for the CLI.

use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use serde::Serialize;
use swarm_prune_engine::{ConnectionSettings, EngineApi, EngineClient, EngineError, EngineResult};
use url::Url;

use crate::config::RunConfig;

pub(crate) const HEADER_REQUEST_ID: &str = "x-request-id";
pub(crate) const TELEMETRY_ENDPOINT_ENV: &str = "SWARM_PRUNE_TELEMETRY_ENDPOINT";

/// Fatal CLI errors. Per-node operation failures never become a `CliError`.
#[derive(Debug)]
pub(crate) enum CliError {
    Connection(EngineError),
    RoleCheck(EngineError),
    NotManager,
    Enumeration(EngineError),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Connection(_)
            | Self::RoleCheck(_)
            | Self::NotManager
            | Self::Enumeration(_)
            | Self::Failure(_) => 1,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Connection(err) => format!("cannot connect to the swarm manager: {err}"),
            Self::RoleCheck(err) => format!("cannot verify the swarm manager role: {err}"),
            Self::NotManager => "This command needs to run against a swarm manager.".to_string(),
            Self::Enumeration(err) => format!("cannot list swarm nodes: {err}"),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.display_message())
    }
}

impl std::error::Error for CliError {}

/// Opens engine connections by address.
pub(crate) trait Connector: Send + Sync {
    type Engine: EngineApi;

    fn connect(&self, address: &str) -> EngineResult<Self::Engine>;
}

/// Connector backed by [`EngineClient`]; one fresh client per call.
#[derive(Debug, Clone)]
pub(crate) struct HttpConnector {
    settings: ConnectionSettings,
}

impl HttpConnector {
    pub(crate) const fn new(settings: ConnectionSettings) -> Self {
        Self { settings }
    }
}

impl Connector for HttpConnector {
    type Engine = EngineClient;

    fn connect(&self, address: &str) -> EngineResult<EngineClient> {
        EngineClient::connect(address, &self.settings)
    }
}

/// Application context passed to command handlers.
pub(crate) struct AppContext<C> {
    pub(crate) config: RunConfig,
    pub(crate) connector: C,
}

impl AppContext<HttpConnector> {
    pub(crate) fn from_config(config: RunConfig) -> Self {
        let connector = HttpConnector::new(config.connection.clone());
        Self { config, connector }
    }
}

/// Telemetry emitter used to forward command outcomes.
#[derive(Clone)]
pub(crate) struct TelemetryEmitter {
    pub(crate) client: Client,
    pub(crate) endpoint: Url,
}

impl TelemetryEmitter {
    #[must_use]
    pub(crate) fn from_env(trace_id: &str) -> Option<Self> {
        Self::from_endpoint(std::env::var(TELEMETRY_ENDPOINT_ENV).ok(), trace_id)
    }

    #[must_use]
    pub(crate) fn from_endpoint(endpoint: Option<String>, trace_id: &str) -> Option<Self> {
        let endpoint = endpoint?.trim().parse().ok()?;
        let mut headers = HeaderMap::new();
        headers.insert(HEADER_REQUEST_ID, HeaderValue::from_str(trace_id).ok()?);
        let client = Client::builder()
            .timeout(Duration::from_secs(2))
            .default_headers(headers)
            .build()
            .ok()?;
        Some(Self { client, endpoint })
    }

    pub(crate) async fn emit(&self, event: &CommandEvent<'_>) {
        if let Err(err) = self
            .client
            .post(self.endpoint.clone())
            .json(event)
            .send()
            .await
        {
            tracing::debug!(error = %err, "telemetry emit failed");
        }
    }
}

/// Outcome record sent to the telemetry endpoint.
#[derive(Debug, Serialize)]
pub(crate) struct CommandEvent<'a> {
    pub(crate) command: &'a str,
    pub(crate) outcome: &'a str,
    pub(crate) trace_id: &'a str,
    pub(crate) exit_code: i32,
    pub(crate) reclaimed_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) message: Option<&'a str>,
    pub(crate) timestamp_ms: u64,
}

/// Millisecond timestamp helper for telemetry.
#[must_use]
pub(crate) fn timestamp_now_ms() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
}
