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
#![allow(clippy::redundant_pub_crate)]

//! Operator CLI that prunes unused Docker objects on every node of a swarm.
//!
//! Layout:
//! - `cli.rs`: argument parsing and command dispatch
//! - `config.rs`: immutable run configuration built from flags and environment
//! - `client.rs`: errors, engine connector and telemetry helpers
//! - `swarm.rs`: manager role check and node enumeration
//! - `executor.rs`: per-node operation execution
//! - `report.rs`: reclaimed-space aggregation
//! - `confirm.rs`: interactive confirmation gate
//! - `commands/`: prune and disk usage command handlers
//! - `output.rs`: renderers and formatting helpers
//! - `main.rs`: thin entrypoint delegating to `run()`

pub(crate) mod cli;
pub(crate) mod client;
pub(crate) mod commands;
pub(crate) mod config;
pub(crate) mod confirm;
pub(crate) mod executor;
pub(crate) mod output;
pub(crate) mod report;
pub(crate) mod swarm;

#[cfg(test)]
pub(crate) mod testing;

pub use cli::run;
