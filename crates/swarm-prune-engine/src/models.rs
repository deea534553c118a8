//! Wire types for the subset of the Docker Engine API used by swarm-prune.
//!
//! Only the fields the CLI consumes are modelled; everything else in the
//! daemon's payloads is ignored. Docker encodes empty lists as `null`, which
//! deserializes to an empty `Vec` here.

use serde::{Deserialize, Deserializer};

fn nullable_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Response of `GET /info`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SystemInfo {
    /// Daemon hostname.
    #[serde(default)]
    pub name: String,
    /// Swarm membership of the daemon.
    #[serde(default)]
    pub swarm: SwarmInfo,
}

/// Swarm section of `GET /info`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SwarmInfo {
    /// Identifier of the local node; empty when not in swarm mode.
    #[serde(rename = "NodeID", default)]
    pub node_id: String,
    /// `inactive`, `pending`, `active`, `error` or `locked`.
    #[serde(default)]
    pub local_node_state: String,
    /// Whether the local node can serve manager calls.
    #[serde(default)]
    pub control_available: bool,
}

/// Swarm node role.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    /// Cluster manager.
    Manager,
    /// Worker node.
    Worker,
    /// Role string not known to this client.
    #[serde(other)]
    Unknown,
}

impl NodeRole {
    /// Lowercase label as used by the daemon.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Manager => "manager",
            Self::Worker => "worker",
            Self::Unknown => "unknown",
        }
    }
}

/// Swarm node as returned by `GET /nodes` and `GET /nodes/{id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Node {
    /// Node identifier.
    #[serde(rename = "ID")]
    pub id: String,
    /// Desired node configuration.
    pub spec: NodeSpec,
    /// Reported node description.
    #[serde(default)]
    pub description: NodeDescription,
    /// Present only on manager nodes.
    #[serde(default)]
    pub manager_status: Option<ManagerStatus>,
}

impl Node {
    /// Hostname reported by the node.
    #[must_use]
    pub fn hostname(&self) -> &str {
        &self.description.hostname
    }
}

/// `Spec` section of a node.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NodeSpec {
    /// Assigned role.
    pub role: NodeRole,
}

/// `Description` section of a node.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NodeDescription {
    /// Hostname of the node.
    #[serde(default)]
    pub hostname: String,
}

/// `ManagerStatus` section of a node.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ManagerStatus {
    /// Whether this manager is the raft leader.
    #[serde(default)]
    pub leader: bool,
    /// `unknown`, `unreachable` or `reachable`.
    #[serde(default)]
    pub reachability: String,
    /// Advertised manager address.
    #[serde(default)]
    pub addr: String,
}

/// Response of `POST /containers/prune`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerPruneReport {
    /// Identifiers of removed containers.
    #[serde(default, deserialize_with = "nullable_vec")]
    pub containers_deleted: Vec<String>,
    /// Bytes freed.
    #[serde(default)]
    pub space_reclaimed: u64,
}

/// One entry of an image prune report.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImageDeleteItem {
    /// Reference that was untagged.
    #[serde(default)]
    pub untagged: Option<String>,
    /// Image identifier that was deleted.
    #[serde(default)]
    pub deleted: Option<String>,
}

/// Response of `POST /images/prune`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImagePruneReport {
    /// Untag and delete records in daemon order.
    #[serde(default, deserialize_with = "nullable_vec")]
    pub images_deleted: Vec<ImageDeleteItem>,
    /// Bytes freed.
    #[serde(default)]
    pub space_reclaimed: u64,
}

/// Response of `POST /volumes/prune`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VolumePruneReport {
    /// Names of removed volumes.
    #[serde(default, deserialize_with = "nullable_vec")]
    pub volumes_deleted: Vec<String>,
    /// Bytes freed.
    #[serde(default)]
    pub space_reclaimed: u64,
}

/// Response of `POST /networks/prune`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkPruneReport {
    /// Names of removed networks.
    #[serde(default, deserialize_with = "nullable_vec")]
    pub networks_deleted: Vec<String>,
}

/// Response of `GET /system/df`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DiskUsage {
    /// Total size of all image layers.
    #[serde(default)]
    pub layers_size: i64,
    /// Per-image usage.
    #[serde(default, deserialize_with = "nullable_vec")]
    pub images: Vec<ImageUsage>,
    /// Per-container usage.
    #[serde(default, deserialize_with = "nullable_vec")]
    pub containers: Vec<ContainerUsage>,
    /// Per-volume usage.
    #[serde(default, deserialize_with = "nullable_vec")]
    pub volumes: Vec<VolumeUsage>,
}

/// Image entry of a disk usage report.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImageUsage {
    /// Image identifier (`sha256:...`).
    pub id: String,
    /// Repository tags; empty for untagged images.
    #[serde(default, deserialize_with = "nullable_vec")]
    pub repo_tags: Vec<String>,
    /// Creation time as a Unix timestamp.
    #[serde(default)]
    pub created: i64,
    /// Total image size.
    #[serde(default)]
    pub size: i64,
    /// Bytes shared with other images; `-1` when unknown.
    #[serde(default)]
    pub shared_size: i64,
    /// Number of containers using the image; `-1` when unknown.
    #[serde(default)]
    pub containers: i64,
}

/// Container entry of a disk usage report.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerUsage {
    /// Container identifier.
    pub id: String,
    /// Names, each with a leading `/`.
    #[serde(default, deserialize_with = "nullable_vec")]
    pub names: Vec<String>,
    /// Image reference.
    #[serde(default)]
    pub image: String,
    /// Command line.
    #[serde(default)]
    pub command: String,
    /// Creation time as a Unix timestamp.
    #[serde(default)]
    pub created: i64,
    /// Size of the writable layer.
    #[serde(default)]
    pub size_rw: i64,
    /// `running`, `exited`, ...
    #[serde(default)]
    pub state: String,
    /// Human-readable status.
    #[serde(default)]
    pub status: String,
    /// Mounts attached to the container.
    #[serde(default, deserialize_with = "nullable_vec")]
    pub mounts: Vec<serde_json::Value>,
}

/// Volume entry of a disk usage report.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VolumeUsage {
    /// Volume name.
    pub name: String,
    /// Volume driver.
    #[serde(default)]
    pub driver: String,
    /// Usage data; absent when the driver does not report it.
    #[serde(default)]
    pub usage_data: Option<VolumeUsageData>,
}

/// Usage section of a volume.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VolumeUsageData {
    /// Bytes used; `-1` when unknown.
    pub size: i64,
    /// Containers referencing the volume; `-1` when unknown.
    pub ref_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_lists_decode_as_empty() {
        let report: ContainerPruneReport = serde_json::from_value(json!({
            "ContainersDeleted": null,
            "SpaceReclaimed": 0
        }))
        .expect("prune report");
        assert!(report.containers_deleted.is_empty());

        let usage: DiskUsage = serde_json::from_value(json!({
            "LayersSize": 10,
            "Images": null,
            "Containers": [],
            "Volumes": null
        }))
        .expect("disk usage");
        assert_eq!(usage.layers_size, 10);
        assert!(usage.images.is_empty() && usage.volumes.is_empty());
    }

    #[test]
    fn node_decodes_role_and_manager_status() {
        let node: Node = serde_json::from_value(json!({
            "ID": "n1",
            "Spec": {"Role": "manager", "Availability": "active"},
            "Description": {"Hostname": "alpha"},
            "ManagerStatus": {"Leader": true, "Reachability": "reachable", "Addr": "10.0.0.1:2377"}
        }))
        .expect("node");
        assert_eq!(node.spec.role, NodeRole::Manager);
        assert_eq!(node.hostname(), "alpha");
        assert!(node.manager_status.as_ref().is_some_and(|status| status.leader));

        let odd: Node = serde_json::from_value(json!({
            "ID": "n2",
            "Spec": {"Role": "observer"}
        }))
        .expect("unknown role");
        assert_eq!(odd.spec.role, NodeRole::Unknown);
        assert!(odd.manager_status.is_none());
        assert_eq!(odd.hostname(), "");
    }

    #[test]
    fn image_prune_report_keeps_entry_kinds() {
        let report: ImagePruneReport = serde_json::from_value(json!({
            "ImagesDeleted": [
                {"Untagged": "busybox:latest"},
                {"Deleted": "sha256:abc"}
            ],
            "SpaceReclaimed": 2048
        }))
        .expect("image report");
        assert_eq!(report.images_deleted.len(), 2);
        assert_eq!(report.images_deleted[0].untagged.as_deref(), Some("busybox:latest"));
        assert_eq!(report.images_deleted[1].deleted.as_deref(), Some("sha256:abc"));
        assert_eq!(report.space_reclaimed, 2048);
    }
}
