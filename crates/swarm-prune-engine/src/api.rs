//! The engine operations the CLI depends on.

use async_trait::async_trait;

use crate::error::EngineResult;
use crate::models::{
    ContainerPruneReport, DiskUsage, ImagePruneReport, NetworkPruneReport, Node, SystemInfo,
    VolumePruneReport,
};

/// Which images an image prune removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImagePruneMode {
    /// Only untagged images not referenced by any container.
    Dangling,
    /// Every image not referenced by any container.
    AllUnused,
}

impl ImagePruneMode {
    /// Mode selected by an `--all` flag.
    #[must_use]
    pub const fn from_all_flag(all: bool) -> Self {
        if all { Self::AllUnused } else { Self::Dangling }
    }

    /// Value of the `dangling` prune filter.
    #[must_use]
    pub const fn dangling_filter(self) -> &'static str {
        match self {
            Self::Dangling => "true",
            Self::AllUnused => "false",
        }
    }
}

/// A connection to one Docker daemon. Each method issues exactly one request.
#[async_trait]
pub trait EngineApi: Send + Sync {
    /// `GET /info`.
    async fn info(&self) -> EngineResult<SystemInfo>;

    /// `GET /nodes/{id}`.
    async fn inspect_node(&self, id: &str) -> EngineResult<Node>;

    /// `GET /nodes`, in daemon order.
    async fn list_nodes(&self) -> EngineResult<Vec<Node>>;

    /// `POST /containers/prune`.
    async fn prune_containers(&self) -> EngineResult<ContainerPruneReport>;

    /// `POST /images/prune`.
    async fn prune_images(&self, mode: ImagePruneMode) -> EngineResult<ImagePruneReport>;

    /// `POST /volumes/prune`.
    async fn prune_volumes(&self) -> EngineResult<VolumePruneReport>;

    /// `POST /networks/prune`.
    async fn prune_networks(&self) -> EngineResult<NetworkPruneReport>;

    /// `GET /system/df`.
    async fn disk_usage(&self) -> EngineResult<DiskUsage>;
}
