// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The Graph: node registry, adjacency matrix, cycle/IO-compat checks, and
//! per-(node, batch) port storage.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::data::{DataCell, MiniBatch};
use crate::errors::{EdgeRejectionReason, GraphError};
use crate::observability::messages::graph::{EdgeAccepted, EdgeRejected};
use crate::observability::StructuredLog;

use super::node::GraphNode;

/// `store[nodeId][batchId][portName] -> MiniBatch`.
type Storage = Vec<Vec<HashMap<String, MiniBatch>>>;

/// A directed acyclic graph of [`GraphNode`]s plus the per-execution storage
/// the executor reads and writes as it drives nodes to completion.
///
/// Invariants upheld by construction:
/// - the adjacency matrix is always `size x size` with a false diagonal;
/// - no cycles are ever admitted by `add_edge`;
/// - every admitted edge shares at least one port name between source
///   outputs and destination inputs;
/// - the root list is exactly the nodes with an all-false adjacency column.
///
/// # Examples
///
/// ```
/// use cellgraph::{DataCell, Graph, GraphNode, Placement};
///
/// let mut graph = Graph::new();
///
/// let mut source = GraphNode::new(Placement::Cpu);
/// source.add_output("value", DataCell::I32(0));
///
/// let mut sink = GraphNode::new(Placement::Cpu);
/// sink.add_input("value", DataCell::I32(0));
///
/// let source_id = graph.add_node(source);
/// let sink_id = graph.add_node(sink);
/// assert!(graph.add_edge(source_id, sink_id));
/// assert_eq!(graph.get_root_nodes(), &[source_id]);
/// ```
pub struct Graph {
    nodes: Vec<GraphNode>,
    adjacency: Vec<Vec<bool>>,
    roots: Vec<usize>,
    store: Mutex<Storage>,
}

impl Graph {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            adjacency: Vec::new(),
            roots: Vec::new(),
            store: Mutex::new(Vec::new()),
        }
    }

    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: usize) -> Option<&GraphNode> {
        self.nodes.get(id)
    }

    /// Appends the node, grows the adjacency matrix, recomputes roots.
    /// Returns the node's stable index.
    pub fn add_node(&mut self, node: GraphNode) -> usize {
        let id = self.nodes.len();
        self.nodes.push(node);

        for row in &mut self.adjacency {
            row.push(false);
        }
        self.adjacency.push(vec![false; self.nodes.len()]);

        {
            let mut store = self.store.lock();
            if !store.is_empty() {
                let num_batches = store[0].len();
                store.push(vec![HashMap::new(); num_batches]);
                seed_port_maps(&self.nodes[id], &mut store[id]);
            }
        }

        self.recompute_roots();
        id
    }

    /// Rejects (returns `false`) unless the indices are in range, accepting
    /// the edge would not create a cycle, and at least one output port of
    /// `from` shares a name with an input port of `to`.
    pub fn add_edge(&mut self, from: usize, to: usize) -> bool {
        if from >= self.nodes.len() || to >= self.nodes.len() {
            return false;
        }

        self.adjacency[from][to] = true;
        let creates_cycle = self.has_cycle();
        self.adjacency[from][to] = false;
        if creates_cycle {
            EdgeRejected {
                from,
                to,
                reason: EdgeRejectionReason::Cycle,
            }
            .log();
            return false;
        }

        if !self.io_compatible(from, to) {
            EdgeRejected {
                from,
                to,
                reason: EdgeRejectionReason::IoMismatch,
            }
            .log();
            return false;
        }

        self.adjacency[from][to] = true;
        self.recompute_roots();
        EdgeAccepted { from, to }.log();
        true
    }

    fn io_compatible(&self, from: usize, to: usize) -> bool {
        let outputs = self.nodes[from].output_names();
        let inputs = self.nodes[to].input_names();
        outputs.iter().any(|name| inputs.contains(name))
    }

    pub fn edge_exists(&self, from: usize, to: usize) -> bool {
        self.adjacency
            .get(from)
            .and_then(|row| row.get(to))
            .copied()
            .unwrap_or(false)
    }

    pub fn is_root(&self, id: usize) -> bool {
        self.roots.contains(&id)
    }

    pub fn get_root_nodes(&self) -> &[usize] {
        &self.roots
    }

    /// DFS cycle detector (visited + on-stack coloring), O(V+E). Neighbors
    /// are visited in ascending target index order for deterministic
    /// behavior. Does not mutate the adjacency matrix.
    pub fn has_cycle(&self) -> bool {
        const WHITE: u8 = 0;
        const GRAY: u8 = 1;
        const BLACK: u8 = 2;

        let n = self.nodes.len();
        let mut color = vec![WHITE; n];

        fn visit(node: usize, adjacency: &[Vec<bool>], color: &mut [u8]) -> bool {
            color[node] = GRAY;
            for (next, &connected) in adjacency[node].iter().enumerate() {
                if !connected {
                    continue;
                }
                match color[next] {
                    GRAY => return true,
                    WHITE => {
                        if visit(next, adjacency, color) {
                            return true;
                        }
                    }
                    _ => {}
                }
            }
            color[node] = BLACK;
            false
        }

        for start in 0..n {
            if color[start] == WHITE && visit(start, &self.adjacency, &mut color) {
                return true;
            }
        }
        false
    }

    fn recompute_roots(&mut self) {
        let n = self.nodes.len();
        self.roots = (0..n)
            .filter(|&col| (0..n).all(|row| !self.adjacency[row][col]))
            .collect();
    }

    /// Postconditions: `store.len() == nodes.len()`, every inner vector has
    /// length `num_batches`, and every batch map contains one entry per
    /// input and output port of its owning node, defaulting to empty
    /// Mini-Batches unless already seeded. Idempotent when called again with
    /// the same `num_batches`: already-seeded mini-batches are preserved.
    pub fn init_storage(&self, num_batches: usize) {
        let mut store = self.store.lock();
        let already_shaped = store.len() == self.nodes.len()
            && store.iter().all(|batches| batches.len() == num_batches);
        if already_shaped {
            return;
        }

        let mut next: Storage = Vec::with_capacity(self.nodes.len());
        for (id, node) in self.nodes.iter().enumerate() {
            let mut batches = vec![HashMap::new(); num_batches];
            for slot in &mut batches {
                seed_port_map(node, slot);
            }
            if let Some(existing) = store.get(id) {
                for (b, slot) in batches.iter_mut().enumerate() {
                    if let Some(existing_batch) = existing.get(b) {
                        for (name, mb) in existing_batch {
                            slot.insert(name.clone(), mb.clone());
                        }
                    }
                }
            }
            next.push(batches);
        }
        *store = next;
    }

    /// True iff every input port of `nodeId` holds a non-empty Mini-Batch
    /// for `batchId`. An existing-but-empty slot (the default state after
    /// `init_storage`) does not count as ready.
    pub fn is_ready(&self, node_id: usize, batch_id: usize) -> bool {
        let Some(node) = self.nodes.get(node_id) else {
            return false;
        };
        let store = self.store.lock();
        let Some(batches) = store.get(node_id) else {
            return false;
        };
        let Some(slots) = batches.get(batch_id) else {
            return false;
        };
        node.input_names()
            .iter()
            .all(|name| slots.get(name).is_some_and(|mb| !mb.is_empty()))
    }

    /// Returns a clone of the named slot, creating an empty one on miss for
    /// defensive use (never reshapes the outer vectors).
    pub fn get_mini_batch(
        &self,
        node_id: usize,
        batch_id: usize,
        port: &str,
    ) -> Result<MiniBatch, GraphError> {
        if node_id >= self.nodes.len() {
            return Err(GraphError::NodeOutOfRange(node_id));
        }
        let mut store = self.store.lock();
        if node_id >= store.len() {
            return Err(GraphError::NodeOutOfRange(node_id));
        }
        let batches = &mut store[node_id];
        if batch_id >= batches.len() {
            return Err(GraphError::BatchOutOfRange(batch_id));
        }
        Ok(batches[batch_id]
            .entry(port.to_string())
            .or_insert_with(MiniBatch::new)
            .clone())
    }

    /// Replace the content of a slot (used for seeding roots and for
    /// propagate's by-value copy on downstream fan-out).
    pub(crate) fn set_mini_batch(&self, node_id: usize, batch_id: usize, port: &str, value: MiniBatch) {
        let mut store = self.store.lock();
        store[node_id][batch_id].insert(port.to_string(), value);
    }

    /// Append one cell to a slot (used by execute-node's output accumulation).
    pub(crate) fn append_cell(&self, node_id: usize, batch_id: usize, port: &str, cell: DataCell) {
        let mut store = self.store.lock();
        store[node_id][batch_id]
            .entry(port.to_string())
            .or_insert_with(MiniBatch::new)
            .append(cell);
    }

    /// Read the cells currently on a slot without cloning the whole
    /// Mini-Batch's name metadata more than necessary.
    pub(crate) fn cells_on(&self, node_id: usize, batch_id: usize, port: &str) -> Vec<DataCell> {
        let store = self.store.lock();
        store[node_id][batch_id]
            .get(port)
            .map(|mb| mb.cells().to_vec())
            .unwrap_or_default()
    }
}

fn seed_port_map(node: &GraphNode, slot: &mut HashMap<String, MiniBatch>) {
    for name in node.input_names().iter().chain(node.output_names()) {
        slot.entry(name.clone()).or_insert_with(MiniBatch::new);
    }
}

fn seed_port_maps(node: &GraphNode, batches: &mut [HashMap<String, MiniBatch>]) {
    for slot in batches {
        seed_port_map(node, slot);
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::node::Placement;

    fn node_with_ports(inputs: &[&str], outputs: &[&str]) -> GraphNode {
        let mut node = GraphNode::new(Placement::Cpu);
        for name in inputs {
            node.add_input(*name, DataCell::F64(0.0));
        }
        for name in outputs {
            node.add_output(*name, DataCell::F64(0.0));
        }
        node
    }

    #[test]
    fn add_node_returns_stable_index() {
        let mut graph = Graph::new();
        let a = graph.add_node(node_with_ports(&[], &["out"]));
        let b = graph.add_node(node_with_ports(&["out"], &[]));
        assert_eq!(a, 0);
        assert_eq!(b, 1);
        assert_eq!(graph.size(), 2);
    }

    #[test]
    fn self_edge_is_rejected_as_a_cycle() {
        let mut graph = Graph::new();
        let a = graph.add_node(node_with_ports(&["x"], &["x"]));
        assert!(!graph.add_edge(a, a));
        assert!(!graph.edge_exists(a, a));
    }

    #[test]
    fn back_edge_creating_a_cycle_is_rejected() {
        let mut graph = Graph::new();
        let a = graph.add_node(node_with_ports(&["c"], &["a"]));
        let b = graph.add_node(node_with_ports(&["a"], &["b"]));
        let c = graph.add_node(node_with_ports(&["b"], &["c"]));

        assert!(graph.add_edge(a, b));
        assert!(graph.add_edge(b, c));
        assert!(!graph.add_edge(c, a));
        assert_eq!(graph.get_root_nodes(), &[a]);
        assert!(!graph.has_cycle());
    }

    #[test]
    fn io_mismatch_is_rejected() {
        let mut graph = Graph::new();
        let x = graph.add_node(node_with_ports(&[], &["x_out"]));
        let y = graph.add_node(node_with_ports(&["other_in"], &[]));
        assert!(!graph.add_edge(x, y));
    }

    #[test]
    fn failed_add_edge_leaves_graph_unchanged() {
        let mut graph = Graph::new();
        let a = graph.add_node(node_with_ports(&[], &["a_out"]));
        let b = graph.add_node(node_with_ports(&["b_in"], &[]));
        let before = graph.edge_exists(a, b);
        assert!(!graph.add_edge(a, b));
        assert_eq!(graph.edge_exists(a, b), before);
        assert!(!graph.edge_exists(a, b));
    }

    #[test]
    fn roots_are_nodes_with_no_incoming_edges() {
        let mut graph = Graph::new();
        let r = graph.add_node(node_with_ports(&[], &["r"]));
        let l = graph.add_node(node_with_ports(&["r"], &["out"]));
        let m = graph.add_node(node_with_ports(&["r"], &["out"]));
        assert!(graph.add_edge(r, l));
        assert!(graph.add_edge(r, m));
        assert_eq!(graph.get_root_nodes(), &[r]);
        assert!(graph.is_root(r));
        assert!(!graph.is_root(l));
        assert!(!graph.is_root(m));
    }

    #[test]
    fn init_storage_seeds_empty_slots_for_every_port() {
        let mut graph = Graph::new();
        graph.add_node(node_with_ports(&["in"], &["out"]));
        graph.init_storage(2);

        assert!(!graph.is_ready(0, 0));
        let mb = graph.get_mini_batch(0, 0, "in").unwrap();
        assert!(mb.is_empty());
    }

    #[test]
    fn init_storage_is_idempotent_on_same_shape() {
        let mut graph = Graph::new();
        graph.add_node(node_with_ports(&["in"], &["out"]));
        graph.init_storage(1);
        graph.set_mini_batch(0, 0, "in", MiniBatch::from_cells(vec![DataCell::I32(1)]));
        graph.init_storage(1);

        let mb = graph.get_mini_batch(0, 0, "in").unwrap();
        assert_eq!(mb.len(), 1);
    }

    #[test]
    fn is_ready_requires_non_empty_not_just_present() {
        let mut graph = Graph::new();
        graph.add_node(node_with_ports(&["in"], &["out"]));
        graph.init_storage(1);
        assert!(!graph.is_ready(0, 0));

        graph.set_mini_batch(0, 0, "in", MiniBatch::from_cells(vec![DataCell::I32(1)]));
        assert!(graph.is_ready(0, 0));
    }

    #[test]
    fn out_of_range_ids_surface_as_graph_error() {
        let graph = Graph::new();
        match graph.get_mini_batch(0, 0, "in") {
            Err(GraphError::NodeOutOfRange(0)) => {}
            other => panic!("expected NodeOutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn empty_graph_has_no_cycle_and_no_roots() {
        let graph = Graph::new();
        assert!(!graph.has_cycle());
        assert!(graph.get_root_nodes().is_empty());
    }
}
