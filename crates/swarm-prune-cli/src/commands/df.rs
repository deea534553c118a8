use std::io::Write;

use chrono::Utc;

use crate::client::{AppContext, CliError, CliResult, Connector};
use crate::commands::{CommandOutcome, output_failed};
use crate::executor::{NodeOutcome, Operation, run_on_node};
use crate::output::{RenderStyle, write_node_header, write_outcome};
use crate::report::AggregateTotals;
use crate::swarm::{ensure_manager, list_nodes};

const NODE_BANNER: &str = "##########";
const NODE_FOOTER: &str = "#############################################";

/// Show disk usage for every node. Read-only, so there is no prompt.
pub(crate) async fn handle_df<C: Connector>(
    ctx: &AppContext<C>,
    verbose: bool,
    out: &mut (impl Write + Send),
) -> CliResult<CommandOutcome> {
    let manager = ctx
        .connector
        .connect(&ctx.config.host)
        .map_err(CliError::Connection)?;
    ensure_manager(&manager).await?;
    let nodes = list_nodes(&manager).await?;

    let style = RenderStyle {
        verbose,
        now: Utc::now(),
    };
    let mut totals = AggregateTotals::default();

    for node in &nodes {
        write_node_header(out, NODE_BANNER, node).map_err(output_failed)?;
        let address = ctx.config.node_address(node);
        let outcome = run_on_node(&ctx.connector, &address, Operation::DiskUsage).await;
        write_outcome(out, node.hostname(), &outcome, style).map_err(output_failed)?;
        writeln!(out, "{NODE_FOOTER}").map_err(output_failed)?;

        totals.record(&NodeOutcome {
            hostname: node.hostname().to_string(),
            role: node.spec.role.clone(),
            outcomes: vec![outcome],
        });
    }

    Ok(CommandOutcome::from_totals(&totals))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::HttpConnector;
    use crate::config::RunConfig;
    use crate::testing::{FakeConnector, FakeDaemon, MANAGER_ADDRESS, context, node};
    use anyhow::Result;
    use httpmock::prelude::*;
    use serde_json::json;
    use swarm_prune_engine::{
        ConnectionSettings, ContainerUsage, DiskUsage, ImageUsage, NodeRole, VolumeUsage,
        VolumeUsageData,
    };

    fn usage() -> DiskUsage {
        let image = |id: &str, tag: &str, containers: i64| ImageUsage {
            id: format!("sha256:{id}"),
            repo_tags: vec![tag.to_string()],
            created: 1_600_000_000,
            size: 2_097_152,
            shared_size: 0,
            containers,
        };
        let container = |id: &str, name: &str, state: &str| ContainerUsage {
            id: id.to_string(),
            names: vec![format!("/{name}")],
            image: "app:1".to_string(),
            command: "run".to_string(),
            created: 1_600_000_000,
            size_rw: 1024,
            state: state.to_string(),
            status: state.to_string(),
            mounts: Vec::new(),
        };
        DiskUsage {
            layers_size: 6_291_456,
            images: vec![
                image("111111111111aaaa", "app:1", 2),
                image("222222222222bbbb", "app:0", 0),
                image("333333333333cccc", "tool:latest", 0),
            ],
            containers: vec![
                container("c0ffee000001", "first", "running"),
                container("c0ffee000002", "second", "exited"),
            ],
            volumes: vec![VolumeUsage {
                name: "cache".to_string(),
                driver: "local".to_string(),
                usage_data: Some(VolumeUsageData {
                    size: 0,
                    ref_count: 0,
                }),
            }],
        }
    }

    fn single_node_swarm(daemon: FakeDaemon) -> FakeConnector {
        FakeConnector::default()
            .with(
                MANAGER_ADDRESS,
                FakeDaemon::manager(vec![node("a", "alpha", NodeRole::Manager, true)]),
            )
            .with("tcp://alpha:2375", daemon)
    }

    #[tokio::test]
    async fn verbose_df_lists_every_object() {
        let daemon = FakeDaemon {
            disk_usage: usage(),
            ..FakeDaemon::default()
        };
        let connector = single_node_swarm(daemon);
        let ctx = context(connector.clone());
        let mut out = Vec::new();

        let outcome = handle_df(&ctx, true, &mut out).await.expect("df succeeds");
        let text = String::from_utf8(out).expect("utf-8 output");

        assert_eq!(outcome.reclaimed_bytes(), 0);
        assert!(text.starts_with("########## alpha manager\nTYPE"));
        assert!(text.ends_with("#############################################\n"));
        for id in ["111111111111", "222222222222", "333333333333", "c0ffee000001", "c0ffee000002", "cache"] {
            assert!(text.contains(id), "missing {id}");
        }
        assert!(text.contains("tool"));
        assert!(connector.destructive_calls().is_empty());
    }

    #[tokio::test]
    async fn node_failures_do_not_abort_df() {
        let connector = single_node_swarm(FakeDaemon::unreachable());
        let ctx = context(connector);
        let mut out = Vec::new();

        let outcome = handle_df(&ctx, false, &mut out).await.expect("df completes");
        let text = String::from_utf8(out).expect("utf-8 output");

        assert_eq!(
            outcome,
            CommandOutcome::Completed {
                reclaimed_bytes: 0,
                nodes: 1,
                failed_operations: 1,
            }
        );
        assert!(text.contains("  ERROR: disk usage on alpha: "));
        assert!(text.ends_with("#############################################\n"));
    }

    #[tokio::test]
    async fn df_requires_a_manager() {
        let mut manager = FakeDaemon::manager(Vec::new());
        manager.self_node = Some(node("mgr", "manager", NodeRole::Worker, true));
        let ctx = context(FakeConnector::default().with(MANAGER_ADDRESS, manager));
        let mut out = Vec::new();

        let err = handle_df(&ctx, false, &mut out).await.expect_err("worker rejected");
        assert!(matches!(err, CliError::NotManager));
    }

    #[tokio::test]
    async fn df_over_http_reaches_each_node() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/v1.25/info");
            then.status(200).json_body(json!({
                "Name": "manager",
                "Swarm": {"NodeID": "mgr", "LocalNodeState": "active", "ControlAvailable": true}
            }));
        });
        server.mock(|when, then| {
            when.method(GET).path("/v1.25/nodes/mgr");
            then.status(200).json_body(json!({
                "ID": "mgr",
                "Spec": {"Role": "manager"},
                "Description": {"Hostname": "127.0.0.1"},
                "ManagerStatus": {"Leader": true, "Reachability": "reachable", "Addr": "127.0.0.1:2377"}
            }));
        });
        server.mock(|when, then| {
            when.method(GET).path("/v1.25/nodes");
            then.status(200).json_body(json!([{
                "ID": "mgr",
                "Spec": {"Role": "manager"},
                "Description": {"Hostname": "127.0.0.1"},
                "ManagerStatus": {"Leader": true, "Reachability": "reachable", "Addr": "127.0.0.1:2377"}
            }]));
        });
        let df = server.mock(|when, then| {
            when.method(GET).path("/v1.25/system/df");
            then.status(200).json_body(json!({
                "LayersSize": 1_048_576,
                "Images": [],
                "Containers": null,
                "Volumes": []
            }));
        });

        let config = RunConfig {
            host: server.base_url(),
            node_port: server.port(),
            connection: ConnectionSettings::default(),
        };
        let ctx = AppContext::<HttpConnector>::from_config(config);
        let mut out = Vec::new();

        let outcome = handle_df(&ctx, false, &mut out)
            .await
            .map_err(|err| anyhow::anyhow!(err.display_message()))?;
        let text = String::from_utf8(out)?;

        df.assert();
        assert_eq!(
            outcome,
            CommandOutcome::Completed {
                reclaimed_bytes: 0,
                nodes: 1,
                failed_operations: 0,
            }
        );
        let images_row = text
            .lines()
            .find(|line| line.starts_with("Images"))
            .expect("images summary row");
        assert!(images_row.contains("1.0 MB"));
        Ok(())
    }
}
