// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Messages for graph-construction diagnostics: edge acceptance and
//! rejection.

use std::fmt::{Display, Formatter};

use crate::errors::EdgeRejectionReason;
use crate::observability::StructuredLog;

/// An edge was rejected by `add_edge` — non-fatal, the graph is unchanged.
pub struct EdgeRejected {
    pub from: usize,
    pub to: usize,
    pub reason: EdgeRejectionReason,
}

impl Display for EdgeRejected {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "rejected edge {} -> {}: {}",
            self.from, self.to, self.reason
        )
    }
}

impl StructuredLog for EdgeRejected {
    fn log(&self) {
        tracing::warn!(
            from = self.from,
            to = self.to,
            reason = %self.reason,
            "{}", self
        );
    }
}

/// An edge was accepted and recorded in the adjacency matrix.
pub struct EdgeAccepted {
    pub from: usize,
    pub to: usize,
}

impl Display for EdgeAccepted {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "accepted edge {} -> {}", self.from, self.to)
    }
}

impl StructuredLog for EdgeAccepted {
    fn log(&self) {
        tracing::debug!(from = self.from, to = self.to, "{}", self);
    }
}
