// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The scheduler: a worker pool draining a shared task queue, gated by the
//! graph's readiness oracle.

use std::collections::HashMap;
use std::thread;
use std::time::Instant;

use crate::data::{DataCell, MiniBatch};
use crate::engine::ConcurrentQueue;
use crate::graph::Graph;
use crate::observability::messages::executor::{
    ExecutionCompleted, ExecutionStarted, PortCountMismatch, TaskExecuted, TaskRequeued,
};
use crate::observability::StructuredLog;

/// A (nodeId, batchId) unit of work.
type Task = (usize, usize);

/// Builds an [`Executor`] with a chosen worker count, defaulting to the
/// host's available parallelism.
pub struct ExecutorBuilder {
    workers: usize,
}

impl ExecutorBuilder {
    pub fn new() -> Self {
        Self {
            workers: default_worker_count(),
        }
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn build(self, graph: Graph, inputs: Vec<HashMap<String, MiniBatch>>) -> Executor {
        Executor::with_workers(graph, inputs, self.workers)
    }
}

impl Default for ExecutorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn default_worker_count() -> usize {
    thread::available_parallelism().map(|n| n.get()).unwrap_or(4)
}

/// Drives a [`Graph`] to completion across `N` caller-supplied batches.
///
/// Construction seeds root node ports from the batches, enqueues exactly
/// `graph.size() * N` tasks, and leaves the graph ready for [`Executor::run`]
/// to spawn its worker pool.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use std::sync::Arc;
/// use cellgraph::{DataCell, Executor, Graph, GraphNode, MiniBatch, Placement};
///
/// let mut graph = Graph::new();
/// let mut doubler = GraphNode::new(Placement::Cpu).with_cpu_body(Arc::new(|inputs, outputs| {
///     if let Some(DataCell::I32(v)) = inputs.get("in") {
///         outputs.insert("out".to_string(), DataCell::I32(v * 2));
///     }
/// }));
/// doubler.add_input("in", DataCell::I32(0));
/// doubler.add_output("out", DataCell::I32(0));
/// let node_id = graph.add_node(doubler);
///
/// let mut seed = HashMap::new();
/// seed.insert("in".to_string(), MiniBatch::from_cells(vec![DataCell::I32(21)]));
///
/// let executor = Executor::new(graph, vec![seed]);
/// executor.run();
///
/// let result = executor.graph().get_mini_batch(node_id, 0, "out").unwrap();
/// assert_eq!(result.cells(), &[DataCell::I32(42)]);
/// ```
pub struct Executor {
    graph: Graph,
    queue: ConcurrentQueue<Task>,
    num_batches: usize,
    workers: usize,
}

impl Executor {
    /// Construct with the default (host-parallelism) worker count.
    pub fn new(graph: Graph, inputs: Vec<HashMap<String, MiniBatch>>) -> Self {
        Self::with_workers(graph, inputs, default_worker_count())
    }

    pub fn with_workers(graph: Graph, inputs: Vec<HashMap<String, MiniBatch>>, workers: usize) -> Self {
        let num_batches = inputs.len();
        graph.init_storage(num_batches);

        for (batch_id, seed) in inputs.into_iter().enumerate() {
            for &root in graph.get_root_nodes() {
                for (port, mini_batch) in &seed {
                    graph.set_mini_batch(root, batch_id, port, mini_batch.clone());
                }
            }
        }

        let queue = ConcurrentQueue::new();
        for node_id in 0..graph.size() {
            for batch_id in 0..num_batches {
                queue.push((node_id, batch_id));
            }
        }

        Self {
            graph,
            queue,
            num_batches,
            workers: workers.max(1),
        }
    }

    pub fn num_batches(&self) -> usize {
        self.num_batches
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Blocks until every (node, batch) task has executed and its outputs
    /// have been propagated downstream. An empty graph returns immediately.
    ///
    /// Workers are scoped threads borrowing the graph and queue directly —
    /// no reference counting needed since the scope guarantees every thread
    /// joins before `run` returns.
    pub fn run(&self) {
        let started = Instant::now();
        ExecutionStarted {
            node_count: self.graph.size(),
            batch_count: self.num_batches,
            workers: self.workers,
        }
        .log();

        crossbeam::thread::scope(|scope| {
            for _ in 0..self.workers {
                scope.spawn(|_| worker_loop(&self.graph, &self.queue));
            }
        })
        .expect("executor worker panicked");

        ExecutionCompleted {
            duration: started.elapsed(),
        }
        .log();
    }
}

fn worker_loop(graph: &Graph, queue: &ConcurrentQueue<Task>) {
    loop {
        let Some((node_id, batch_id)) = queue.try_pop() else {
            return;
        };

        if !graph.is_ready(node_id, batch_id) {
            TaskRequeued { node_id, batch_id }.log();
            queue.push((node_id, batch_id));
            continue;
        }

        execute_node(graph, node_id, batch_id);
        propagate(graph, node_id, batch_id);
    }
}

/// Runs a node's declared input ports in lockstep: position `i` across every
/// port is set before the body is invoked once for that position. A node
/// with no input ports is never invoked. If the declared ports don't all
/// carry the same number of cells for this batch, only the shortest port's
/// count of positions run and the remainder is logged as a mismatch.
fn execute_node(graph: &Graph, node_id: usize, batch_id: usize) {
    let node = graph.node(node_id).expect("task references a valid node");
    let ports = node.input_names();
    if ports.is_empty() {
        return;
    }

    let per_port: Vec<Vec<DataCell>> = ports.iter().map(|port| graph.cells_on(node_id, batch_id, port)).collect();
    let min = per_port.iter().map(Vec::len).min().unwrap_or(0);
    let max = per_port.iter().map(Vec::len).max().unwrap_or(0);
    if min != max {
        PortCountMismatch {
            node_id,
            batch_id,
            min,
            max,
        }
        .log();
    }

    let mut cells_processed = 0usize;
    for position in 0..min {
        for (port, cells) in ports.iter().zip(per_port.iter()) {
            node.set_input(port, cells[position].clone());
        }
        node.execute();
        cells_processed += 1;

        for output_port in node.output_names() {
            if let Some(out_cell) = node.get_output(output_port) {
                graph.append_cell(node_id, batch_id, output_port, out_cell);
            }
        }
    }

    TaskExecuted {
        node_id,
        batch_id,
        cells_processed,
    }
    .log();
}

/// Copies every output port of `node_id` into the same-named slot of every
/// downstream neighbor, by value.
fn propagate(graph: &Graph, node_id: usize, batch_id: usize) {
    let node = graph.node(node_id).expect("task references a valid node");
    let output_ports: Vec<String> = node.output_names().to_vec();

    for downstream in 0..graph.size() {
        if !graph.edge_exists(node_id, downstream) {
            continue;
        }
        for port in &output_ports {
            let mini_batch = graph
                .get_mini_batch(node_id, batch_id, port)
                .expect("node_id/batch_id already validated by the running task");
            graph.set_mini_batch(downstream, batch_id, port, mini_batch);
        }
    }
}
