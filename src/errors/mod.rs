// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Error kinds for the graph engine, one enum per failure surface named in
//! the design (out-of-range ids, variant mismatch). Edge rejection is
//! deliberately *not* an [`std::error::Error`] — it's a non-fatal
//! diagnostic, surfaced through [`crate::observability`] instead.

use crate::data::DataCellKind;
use thiserror::Error;

/// A Data Cell typed accessor was called against the wrong variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CellError {
    #[error("expected data cell variant {expected}, found {found}")]
    VariantMismatch {
        expected: DataCellKind,
        found: DataCellKind,
    },
}

/// A node id or batch id referenced an entity that does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("node id {0} is out of range")]
    NodeOutOfRange(usize),
    #[error("batch id {0} is out of range")]
    BatchOutOfRange(usize),
}

/// A port name was referenced that the node never declared via `add_input`
/// or `add_output`. Store slots resolve a miss by creating an empty entry
/// instead (see `Graph::get_mini_batch`); node-port accessors raise here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeError {
    #[error("port \"{0}\" is not declared on this node")]
    PortMissing(String),
}

/// Why `Graph::add_edge` rejected a candidate edge. Not an error type: the
/// call still just returns `false` to the caller, this is the diagnostic
/// surfaced alongside it (see `observability::messages::graph::EdgeRejected`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeRejectionReason {
    /// Accepting the edge would create a cycle.
    Cycle,
    /// Neither endpoint shares an output/input port name with the other.
    IoMismatch,
}

impl std::fmt::Display for EdgeRejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EdgeRejectionReason::Cycle => f.write_str("cycle"),
            EdgeRejectionReason::IoMismatch => f.write_str("io_mismatch"),
        }
    }
}
