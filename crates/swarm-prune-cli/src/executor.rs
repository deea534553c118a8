//! Per-node operation execution.
//!
//! Every operation opens its own connection to the node and issues exactly one
//! engine call. Failures are captured as [`OperationOutcome::Failure`] so the
//! caller keeps going with the next operation and node.

use swarm_prune_engine::{
    ContainerPruneReport, DiskUsage, EngineApi, EngineResult, ImagePruneMode, ImagePruneReport,
    NetworkPruneReport, NodeRole, VolumePruneReport,
};
use tracing::{debug, warn};

use crate::client::Connector;

/// Resource kind an operation acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OperationKind {
    Containers,
    Images,
    Volumes,
    Networks,
    DiskUsage,
}

impl OperationKind {
    pub(crate) const fn label(self) -> &'static str {
        match self {
            Self::Containers => "containers prune",
            Self::Images => "images prune",
            Self::Volumes => "volumes prune",
            Self::Networks => "networks prune",
            Self::DiskUsage => "disk usage",
        }
    }
}

/// One remote call to run against every node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operation {
    PruneContainers,
    PruneImages(ImagePruneMode),
    PruneVolumes,
    PruneNetworks,
    DiskUsage,
}

impl Operation {
    pub(crate) const fn kind(self) -> OperationKind {
        match self {
            Self::PruneContainers => OperationKind::Containers,
            Self::PruneImages(_) => OperationKind::Images,
            Self::PruneVolumes => OperationKind::Volumes,
            Self::PruneNetworks => OperationKind::Networks,
            Self::DiskUsage => OperationKind::DiskUsage,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RemovalAction {
    Removed,
    Untagged,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RemovedObject {
    pub(crate) id: String,
    pub(crate) action: RemovalAction,
}

impl RemovedObject {
    fn removed(id: String) -> Self {
        Self {
            id,
            action: RemovalAction::Removed,
        }
    }
}

/// Structured result of one successful operation on one node.
#[derive(Debug, Clone)]
pub(crate) struct ReclaimReport {
    pub(crate) kind: OperationKind,
    pub(crate) removed: Vec<RemovedObject>,
    pub(crate) reclaimed_bytes: u64,
    /// Present for disk-usage reports only.
    pub(crate) usage: Option<DiskUsage>,
}

impl From<ContainerPruneReport> for ReclaimReport {
    fn from(report: ContainerPruneReport) -> Self {
        Self {
            kind: OperationKind::Containers,
            removed: report
                .containers_deleted
                .into_iter()
                .map(RemovedObject::removed)
                .collect(),
            reclaimed_bytes: report.space_reclaimed,
            usage: None,
        }
    }
}

impl From<ImagePruneReport> for ReclaimReport {
    fn from(report: ImagePruneReport) -> Self {
        let removed = report
            .images_deleted
            .into_iter()
            .filter_map(|item| match (item.untagged, item.deleted) {
                (Some(reference), _) if !reference.is_empty() => Some(RemovedObject {
                    id: reference,
                    action: RemovalAction::Untagged,
                }),
                (_, Some(id)) if !id.is_empty() => Some(RemovedObject {
                    id,
                    action: RemovalAction::Deleted,
                }),
                _ => None,
            })
            .collect();
        Self {
            kind: OperationKind::Images,
            removed,
            reclaimed_bytes: report.space_reclaimed,
            usage: None,
        }
    }
}

impl From<VolumePruneReport> for ReclaimReport {
    fn from(report: VolumePruneReport) -> Self {
        Self {
            kind: OperationKind::Volumes,
            removed: report
                .volumes_deleted
                .into_iter()
                .map(RemovedObject::removed)
                .collect(),
            reclaimed_bytes: report.space_reclaimed,
            usage: None,
        }
    }
}

impl From<NetworkPruneReport> for ReclaimReport {
    fn from(report: NetworkPruneReport) -> Self {
        // The daemon reports no size for networks.
        Self {
            kind: OperationKind::Networks,
            removed: report
                .networks_deleted
                .into_iter()
                .map(RemovedObject::removed)
                .collect(),
            reclaimed_bytes: 0,
            usage: None,
        }
    }
}

impl From<DiskUsage> for ReclaimReport {
    fn from(usage: DiskUsage) -> Self {
        Self {
            kind: OperationKind::DiskUsage,
            removed: Vec::new(),
            reclaimed_bytes: 0,
            usage: Some(usage),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum OperationOutcome {
    Success { report: ReclaimReport },
    Failure { kind: OperationKind, cause: String },
}

impl OperationOutcome {
    pub(crate) const fn kind(&self) -> OperationKind {
        match self {
            Self::Success { report } => report.kind,
            Self::Failure { kind, .. } => *kind,
        }
    }
}

/// Everything that happened on one node.
#[derive(Debug, Clone)]
pub(crate) struct NodeOutcome {
    pub(crate) hostname: String,
    pub(crate) role: NodeRole,
    pub(crate) outcomes: Vec<OperationOutcome>,
}

/// Issue `operation` against an already connected engine.
pub(crate) async fn execute<E: EngineApi + ?Sized>(
    engine: &E,
    operation: Operation,
) -> EngineResult<ReclaimReport> {
    let report: ReclaimReport = match operation {
        Operation::PruneContainers => engine.prune_containers().await?.into(),
        Operation::PruneImages(mode) => engine.prune_images(mode).await?.into(),
        Operation::PruneVolumes => engine.prune_volumes().await?.into(),
        Operation::PruneNetworks => engine.prune_networks().await?.into(),
        Operation::DiskUsage => engine.disk_usage().await?.into(),
    };
    Ok(report)
}

/// Connect to `address` and run `operation`, capturing any failure.
pub(crate) async fn run_on_node<C: Connector>(
    connector: &C,
    address: &str,
    operation: Operation,
) -> OperationOutcome {
    let kind = operation.kind();
    let result = match connector.connect(address) {
        Ok(engine) => execute(&engine, operation).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(report) => {
            debug!(
                address,
                operation = kind.label(),
                removed = report.removed.len(),
                reclaimed_bytes = report.reclaimed_bytes,
                "operation completed"
            );
            OperationOutcome::Success { report }
        }
        Err(err) => {
            warn!(address, operation = kind.label(), error = %err, "operation failed");
            OperationOutcome::Failure {
                kind,
                cause: err.to_string(),
            }
        }
    }
}
