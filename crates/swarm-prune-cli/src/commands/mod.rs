//! Command handlers grouped by concern.

use std::io;

use anyhow::anyhow;

use crate::client::CliError;
use crate::report::AggregateTotals;

pub(crate) mod df;
pub(crate) mod prune;

/// What a handler did, fed into telemetry and the final log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CommandOutcome {
    Completed {
        reclaimed_bytes: u64,
        nodes: usize,
        failed_operations: usize,
    },
    /// The operator declined the confirmation prompt.
    Declined,
}

impl CommandOutcome {
    pub(crate) const fn from_totals(totals: &AggregateTotals) -> Self {
        Self::Completed {
            reclaimed_bytes: totals.reclaimed_bytes(),
            nodes: totals.nodes(),
            failed_operations: totals.failed_operations(),
        }
    }

    pub(crate) const fn reclaimed_bytes(&self) -> u64 {
        match self {
            Self::Completed {
                reclaimed_bytes, ..
            } => *reclaimed_bytes,
            Self::Declined => 0,
        }
    }
}

pub(crate) fn output_failed(err: io::Error) -> CliError {
    CliError::failure(anyhow!("failed to write output: {err}"))
}
