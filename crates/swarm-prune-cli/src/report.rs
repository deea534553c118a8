//! Reclaimed-space aggregation across operations and nodes.

use tracing::info;

use crate::executor::{NodeOutcome, OperationOutcome};

/// Bytes an outcome adds to the totals. Failures add nothing.
pub(crate) const fn contribution(outcome: &OperationOutcome) -> u64 {
    match outcome {
        OperationOutcome::Success { report } => report.reclaimed_bytes,
        OperationOutcome::Failure { .. } => 0,
    }
}

/// Sum of every operation outcome on one node.
pub(crate) fn node_subtotal(node: &NodeOutcome) -> u64 {
    node.outcomes
        .iter()
        .map(contribution)
        .fold(0, u64::saturating_add)
}

/// Running totals for one command invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct AggregateTotals {
    reclaimed_bytes: u64,
    nodes: usize,
    failed_operations: usize,
}

impl AggregateTotals {
    /// Fold a node into the totals and return its subtotal.
    pub(crate) fn record(&mut self, node: &NodeOutcome) -> u64 {
        let subtotal = node_subtotal(node);
        let failed = node
            .outcomes
            .iter()
            .filter(|outcome| matches!(outcome, OperationOutcome::Failure { .. }))
            .count();

        self.reclaimed_bytes = self.reclaimed_bytes.saturating_add(subtotal);
        self.nodes += 1;
        self.failed_operations += failed;

        info!(
            hostname = %node.hostname,
            role = node.role.as_str(),
            subtotal,
            failed,
            "node processed"
        );
        subtotal
    }

    pub(crate) const fn reclaimed_bytes(&self) -> u64 {
        self.reclaimed_bytes
    }

    pub(crate) const fn nodes(&self) -> usize {
        self.nodes
    }

    pub(crate) const fn failed_operations(&self) -> usize {
        self.failed_operations
    }
}
