//! Manager role validation and cluster enumeration.

use swarm_prune_engine::{EngineApi, EngineError, EngineResult, Node, NodeRole};
use tracing::{debug, info};

use crate::client::{CliError, CliResult};

/// Whether the daemon behind `engine` is an active swarm manager.
///
/// A daemon outside swarm mode is reported as an error, since the node it
/// would inspect does not exist.
pub(crate) async fn is_manager<E: EngineApi + ?Sized>(engine: &E) -> EngineResult<bool> {
    let info = engine.info().await?;
    let node_id = info.swarm.node_id.trim();
    if node_id.is_empty() {
        return Err(EngineError::Status {
            operation: "info",
            status: 503,
            message: format!(
                "daemon {} is not part of a swarm (state: {})",
                info.name,
                if info.swarm.local_node_state.is_empty() {
                    "inactive"
                } else {
                    info.swarm.local_node_state.as_str()
                }
            ),
        });
    }

    let node = engine.inspect_node(node_id).await?;
    debug!(
        node_id,
        role = node.spec.role.as_str(),
        manager_status = node.manager_status.is_some(),
        "inspected local node"
    );
    Ok(node.manager_status.is_some() && node.spec.role == NodeRole::Manager)
}

/// Gate every command on the manager role.
pub(crate) async fn ensure_manager<E: EngineApi + ?Sized>(engine: &E) -> CliResult<()> {
    if is_manager(engine).await.map_err(CliError::RoleCheck)? {
        Ok(())
    } else {
        Err(CliError::NotManager)
    }
}

/// Every node of the cluster, in the order the manager returns them.
pub(crate) async fn list_nodes<E: EngineApi + ?Sized>(engine: &E) -> CliResult<Vec<Node>> {
    let nodes = engine.list_nodes().await.map_err(CliError::Enumeration)?;
    info!(count = nodes.len(), "enumerated swarm nodes");
    Ok(nodes)
}
