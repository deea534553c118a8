//! Immutable run configuration assembled once from flags and environment.

use std::time::Duration;

use swarm_prune_engine::{
    ConnectionSettings, EngineHost, Node, TlsOptions, default_user_agent, resolve_api_version,
};

use crate::cli::GlobalArgs;
use crate::client::{CliError, CliResult};

pub(crate) const DEFAULT_HOST: &str = "unix:///var/run/docker.sock";
pub(crate) const DEFAULT_NODE_PORT: u16 = 2375;
pub(crate) const API_VERSION_ENV: &str = "DOCKER_API_VERSION";

#[derive(Debug, Clone)]
pub(crate) struct RunConfig {
    /// Manager daemon address.
    pub(crate) host: String,
    /// Daemon port on every swarm node.
    pub(crate) node_port: u16,
    pub(crate) connection: ConnectionSettings,
}

impl RunConfig {
    /// Build the configuration; TLS material is loaded and parsed here so a
    /// bad certificate fails before any remote call.
    pub(crate) fn from_args(args: &GlobalArgs, api_version: Option<&str>) -> CliResult<Self> {
        let tls_options = TlsOptions {
            ca_file: args.tlscacert.clone(),
            cert_file: args.tlscert.clone(),
            key_file: args.tlskey.clone(),
            verify: args.tlsverify,
        };
        let tls = tls_options.load().map_err(CliError::Connection)?;

        Ok(Self {
            host: args.host.clone(),
            node_port: args.node_port,
            connection: ConnectionSettings {
                api_version: resolve_api_version(api_version),
                user_agent: default_user_agent(),
                timeout: args.timeout.map(Duration::from_secs),
                tls,
            },
        })
    }

    pub(crate) const fn tls_enabled(&self) -> bool {
        self.connection.tls.is_some()
    }

    pub(crate) fn node_address(&self, node: &Node) -> String {
        EngineHost::for_node(node.hostname(), self.node_port, self.tls_enabled())
    }
}
