#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Docker Engine API access for swarm-wide maintenance commands.
//!
//! Layout: `host.rs` (daemon address parsing), `tls.rs` (client certificate
//! material), `client.rs` (`EngineClient`, the reqwest-backed transport),
//! `api.rs` (the `EngineApi` seam consumed by the CLI), `models.rs` (wire
//! types), `error.rs` (`EngineError`).

pub mod api;
pub mod client;
pub mod error;
pub mod host;
pub mod models;
pub mod tls;

pub use api::{EngineApi, ImagePruneMode};
pub use client::{
    ConnectionSettings, DEFAULT_API_VERSION, EngineClient, default_user_agent,
    resolve_api_version,
};
pub use error::{EngineError, EngineResult};
pub use host::{EngineHost, HostScheme};
pub use models::{
    ContainerPruneReport, ContainerUsage, DiskUsage, ImageDeleteItem, ImagePruneReport,
    ImageUsage, ManagerStatus, NetworkPruneReport, Node, NodeDescription, NodeRole, NodeSpec,
    SwarmInfo, SystemInfo, VolumePruneReport, VolumeUsage, VolumeUsageData,
};
pub use tls::{TlsMaterial, TlsOptions};
