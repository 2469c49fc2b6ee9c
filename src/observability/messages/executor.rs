// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Messages for executor lifecycle events.

use std::fmt::{Display, Formatter};
use std::time::Duration;

use crate::observability::StructuredLog;

/// A run started: task set seeded, workers about to be spawned.
pub struct ExecutionStarted {
    pub node_count: usize,
    pub batch_count: usize,
    pub workers: usize,
}

impl Display for ExecutionStarted {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "starting run: {} nodes x {} batches across {} workers",
            self.node_count, self.batch_count, self.workers
        )
    }
}

impl StructuredLog for ExecutionStarted {
    fn log(&self) {
        tracing::info!(
            node_count = self.node_count,
            batch_count = self.batch_count,
            workers = self.workers,
            "{}", self
        );
    }
}

/// A task was popped but its readiness gate failed; it was requeued.
pub struct TaskRequeued {
    pub node_id: usize,
    pub batch_id: usize,
}

impl Display for TaskRequeued {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "task (node={}, batch={}) not ready, requeued",
            self.node_id, self.batch_id
        )
    }
}

impl StructuredLog for TaskRequeued {
    fn log(&self) {
        tracing::trace!(node_id = self.node_id, batch_id = self.batch_id, "{}", self);
    }
}

/// A node's declared input ports carried different cell counts for a batch;
/// only the shortest port's count of positions ran.
pub struct PortCountMismatch {
    pub node_id: usize,
    pub batch_id: usize,
    pub min: usize,
    pub max: usize,
}

impl Display for PortCountMismatch {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "task (node={}, batch={}) has mismatched input port cell counts (min={}, max={}); executing min() positions only",
            self.node_id, self.batch_id, self.min, self.max
        )
    }
}

impl StructuredLog for PortCountMismatch {
    fn log(&self) {
        tracing::warn!(
            node_id = self.node_id,
            batch_id = self.batch_id,
            min = self.min,
            max = self.max,
            "{}", self
        );
    }
}

/// A (node, batch) task finished executing and its outputs were propagated.
pub struct TaskExecuted {
    pub node_id: usize,
    pub batch_id: usize,
    pub cells_processed: usize,
}

impl Display for TaskExecuted {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "task (node={}, batch={}) executed, {} input cells processed",
            self.node_id, self.batch_id, self.cells_processed
        )
    }
}

impl StructuredLog for TaskExecuted {
    fn log(&self) {
        tracing::debug!(
            node_id = self.node_id,
            batch_id = self.batch_id,
            cells_processed = self.cells_processed,
            "{}", self
        );
    }
}

/// The run completed: the task queue drained and every worker exited.
pub struct ExecutionCompleted {
    pub duration: Duration,
}

impl Display for ExecutionCompleted {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "run completed in {:?}", self.duration)
    }
}

impl StructuredLog for ExecutionCompleted {
    fn log(&self) {
        tracing::info!(duration_ms = self.duration.as_millis() as u64, "{}", self);
    }
}
