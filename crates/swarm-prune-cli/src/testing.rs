//! In-memory engine doubles shared by the unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use swarm_prune_engine::{
    ConnectionSettings, ContainerPruneReport, DiskUsage, EngineApi, EngineError, EngineResult,
    ImagePruneMode, ImagePruneReport, ManagerStatus, NetworkPruneReport, Node, NodeDescription,
    NodeRole, NodeSpec, SwarmInfo, SystemInfo, VolumePruneReport,
};

use crate::client::{AppContext, Connector};
use crate::config::RunConfig;

pub(crate) const MANAGER_ADDRESS: &str = "tcp://manager:2375";

pub(crate) fn node(id: &str, hostname: &str, role: NodeRole, manager: bool) -> Node {
    Node {
        id: id.to_string(),
        spec: NodeSpec { role },
        description: NodeDescription {
            hostname: hostname.to_string(),
        },
        manager_status: manager.then(|| ManagerStatus {
            leader: true,
            reachability: "reachable".to_string(),
            addr: format!("{hostname}:2377"),
        }),
    }
}

/// Canned responses for one daemon.
#[derive(Clone, Default)]
pub(crate) struct FakeDaemon {
    pub(crate) info: SystemInfo,
    pub(crate) self_node: Option<Node>,
    pub(crate) nodes: Vec<Node>,
    pub(crate) fail_node_list: bool,
    pub(crate) containers: ContainerPruneReport,
    pub(crate) images: ImagePruneReport,
    pub(crate) volumes: VolumePruneReport,
    pub(crate) networks: NetworkPruneReport,
    pub(crate) disk_usage: DiskUsage,
    /// Every call fails as if the daemon were unreachable.
    pub(crate) unreachable: bool,
}

impl FakeDaemon {
    /// A manager daemon that lists `nodes`.
    pub(crate) fn manager(nodes: Vec<Node>) -> Self {
        Self {
            info: SystemInfo {
                name: "manager".to_string(),
                swarm: SwarmInfo {
                    node_id: "mgr".to_string(),
                    local_node_state: "active".to_string(),
                    control_available: true,
                },
            },
            self_node: Some(node("mgr", "manager", NodeRole::Manager, true)),
            nodes,
            ..Self::default()
        }
    }

    pub(crate) fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }
}

/// Connector resolving addresses to [`FakeDaemon`]s and logging every call.
#[derive(Clone, Default)]
pub(crate) struct FakeConnector {
    pub(crate) daemons: HashMap<String, FakeDaemon>,
    pub(crate) calls: Arc<Mutex<Vec<String>>>,
}

impl FakeConnector {
    pub(crate) fn with(mut self, address: &str, daemon: FakeDaemon) -> Self {
        self.daemons.insert(address.to_string(), daemon);
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("call log").clone()
    }

    /// Calls that would delete something.
    pub(crate) fn destructive_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| call.contains("prune"))
            .collect()
    }
}

impl Connector for FakeConnector {
    type Engine = FakeEngine;

    fn connect(&self, address: &str) -> EngineResult<FakeEngine> {
        let daemon = self
            .daemons
            .get(address)
            .cloned()
            .ok_or_else(|| EngineError::InvalidHost {
                host: address.to_string(),
                reason: "no such fake daemon".to_string(),
            })?;
        Ok(FakeEngine {
            address: address.to_string(),
            daemon,
            calls: Arc::clone(&self.calls),
        })
    }
}

pub(crate) struct FakeEngine {
    address: String,
    daemon: FakeDaemon,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeEngine {
    fn record(&self, operation: &'static str) -> EngineResult<()> {
        self.calls
            .lock()
            .expect("call log")
            .push(format!("{} {operation}", self.address));
        if self.daemon.unreachable {
            return Err(EngineError::Status {
                operation,
                status: 503,
                message: "simulated transport error".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl EngineApi for FakeEngine {
    async fn info(&self) -> EngineResult<SystemInfo> {
        self.record("info")?;
        Ok(self.daemon.info.clone())
    }

    async fn inspect_node(&self, id: &str) -> EngineResult<Node> {
        self.record("node inspect")?;
        self.daemon
            .self_node
            .clone()
            .filter(|node| node.id == id)
            .ok_or_else(|| EngineError::Status {
                operation: "node inspect",
                status: 404,
                message: format!("node {id} not found"),
            })
    }

    async fn list_nodes(&self) -> EngineResult<Vec<Node>> {
        self.record("node list")?;
        if self.daemon.fail_node_list {
            return Err(EngineError::Status {
                operation: "node list",
                status: 503,
                message: "This node is not a swarm manager.".to_string(),
            });
        }
        Ok(self.daemon.nodes.clone())
    }

    async fn prune_containers(&self) -> EngineResult<ContainerPruneReport> {
        self.record("containers prune")?;
        Ok(self.daemon.containers.clone())
    }

    async fn prune_images(&self, mode: ImagePruneMode) -> EngineResult<ImagePruneReport> {
        self.record(match mode {
            ImagePruneMode::Dangling => "images prune dangling",
            ImagePruneMode::AllUnused => "images prune all",
        })?;
        Ok(self.daemon.images.clone())
    }

    async fn prune_volumes(&self) -> EngineResult<VolumePruneReport> {
        self.record("volumes prune")?;
        Ok(self.daemon.volumes.clone())
    }

    async fn prune_networks(&self) -> EngineResult<NetworkPruneReport> {
        self.record("networks prune")?;
        Ok(self.daemon.networks.clone())
    }

    async fn disk_usage(&self) -> EngineResult<DiskUsage> {
        self.record("disk usage")?;
        Ok(self.daemon.disk_usage.clone())
    }
}

pub(crate) fn context(connector: FakeConnector) -> AppContext<FakeConnector> {
    AppContext {
        config: RunConfig {
            host: MANAGER_ADDRESS.to_string(),
            node_port: 2375,
            connection: ConnectionSettings::default(),
        },
        connector,
    }
}
