use std::io::{BufRead, Write};

use chrono::Utc;
use swarm_prune_engine::ImagePruneMode;
use tracing::info;

use crate::client::{AppContext, CliError, CliResult, Connector};
use crate::commands::{CommandOutcome, output_failed};
use crate::confirm::confirm;
use crate::executor::{NodeOutcome, Operation, run_on_node};
use crate::output::{
    RenderStyle, write_grand_total, write_node_header, write_node_subtotal, write_outcome,
};
use crate::report::AggregateTotals;
use crate::swarm::{ensure_manager, list_nodes};

const DECLINED_MESSAGE: &str = "Ok, will not do anything. exiting now.";
const NODE_BANNER: &str = "######";

/// Ordered operations a prune command runs on every node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PrunePlan {
    operations: Vec<Operation>,
}

impl PrunePlan {
    /// Containers, images, networks, then volumes.
    pub(crate) fn system(all_images: bool) -> Self {
        Self {
            operations: vec![
                Operation::PruneContainers,
                Operation::PruneImages(ImagePruneMode::from_all_flag(all_images)),
                Operation::PruneNetworks,
                Operation::PruneVolumes,
            ],
        }
    }

    pub(crate) fn single(operation: Operation) -> Self {
        Self {
            operations: vec![operation],
        }
    }

    pub(crate) fn operations(&self) -> &[Operation] {
        &self.operations
    }
}

/// Prune every node of the swarm after the role check and confirmation.
///
/// Per-operation failures are printed and skipped; only connection, role
/// and enumeration failures abort the command.
pub(crate) async fn handle_prune<C: Connector>(
    ctx: &AppContext<C>,
    plan: &PrunePlan,
    force: bool,
    input: &mut (impl BufRead + Send),
    out: &mut (impl Write + Send),
) -> CliResult<CommandOutcome> {
    let manager = ctx
        .connector
        .connect(&ctx.config.host)
        .map_err(CliError::Connection)?;
    ensure_manager(&manager).await?;

    if !confirm(force, input, out).map_err(output_failed)? {
        writeln!(out, "{DECLINED_MESSAGE}").map_err(output_failed)?;
        info!("prune declined by operator");
        return Ok(CommandOutcome::Declined);
    }

    let nodes = list_nodes(&manager).await?;
    let style = RenderStyle {
        verbose: false,
        now: Utc::now(),
    };
    let mut totals = AggregateTotals::default();

    for node in &nodes {
        write_node_header(out, NODE_BANNER, node).map_err(output_failed)?;
        let address = ctx.config.node_address(node);

        let mut outcomes = Vec::with_capacity(plan.operations().len());
        for &operation in plan.operations() {
            let outcome = run_on_node(&ctx.connector, &address, operation).await;
            write_outcome(out, node.hostname(), &outcome, style).map_err(output_failed)?;
            outcomes.push(outcome);
        }

        let subtotal = totals.record(&NodeOutcome {
            hostname: node.hostname().to_string(),
            role: node.spec.role.clone(),
            outcomes,
        });
        write_node_subtotal(out, subtotal).map_err(output_failed)?;
    }

    write_grand_total(out, totals.reclaimed_bytes()).map_err(output_failed)?;
    Ok(CommandOutcome::from_totals(&totals))
}
