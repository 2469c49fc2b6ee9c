// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Graph Node: port declarations plus an executable body.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::data::DataCell;
use crate::errors::NodeError;

/// Where a node's body runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placement {
    Cpu,
    Device,
}

/// A node's executable body: reads the input port map, writes the output
/// port map. Ports the body does not write remain at their previous value.
pub type NodeBody = Arc<dyn Fn(&HashMap<String, DataCell>, &mut HashMap<String, DataCell>) + Send + Sync>;

struct PortState {
    inputs: HashMap<String, DataCell>,
    outputs: HashMap<String, DataCell>,
}

/// An entity with a placement tag, input/output port sets, and a processing
/// body. A node with no body registered for its placement is a no-op.
///
/// The port maps live behind a single internal mutex. `execute()` holds that
/// mutex for its duration, which serializes same-node executions across
/// concurrently-running batches while leaving distinct nodes fully parallel
/// — see DESIGN.md for why this mutex exists (a single pair of port maps
/// would otherwise race across concurrently-running batches of the same
/// node).
pub struct GraphNode {
    placement: Placement,
    input_names: Vec<String>,
    output_names: Vec<String>,
    state: Mutex<PortState>,
    cpu_body: Option<NodeBody>,
    device_body: Option<NodeBody>,
}

impl GraphNode {
    pub fn new(placement: Placement) -> Self {
        Self {
            placement,
            input_names: Vec::new(),
            output_names: Vec::new(),
            state: Mutex::new(PortState {
                inputs: HashMap::new(),
                outputs: HashMap::new(),
            }),
            cpu_body: None,
            device_body: None,
        }
    }

    pub fn with_cpu_body(mut self, body: NodeBody) -> Self {
        self.cpu_body = Some(body);
        self
    }

    pub fn with_device_body(mut self, body: NodeBody) -> Self {
        self.device_body = Some(body);
        self
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// Declare an input port, seeding a default-valued slot.
    pub fn add_input(&mut self, name: impl Into<String>, default: DataCell) {
        let name = name.into();
        self.state.lock().inputs.insert(name.clone(), default);
        if !self.input_names.contains(&name) {
            self.input_names.push(name);
        }
    }

    /// Declare an output port, seeding a default-valued slot.
    pub fn add_output(&mut self, name: impl Into<String>, default: DataCell) {
        let name = name.into();
        self.state.lock().outputs.insert(name.clone(), default);
        if !self.output_names.contains(&name) {
            self.output_names.push(name);
        }
    }

    pub fn input_names(&self) -> &[String] {
        &self.input_names
    }

    pub fn output_names(&self) -> &[String] {
        &self.output_names
    }

    pub fn set_input(&self, name: &str, cell: DataCell) {
        self.state.lock().inputs.insert(name.to_string(), cell);
    }

    pub fn set_output(&self, name: &str, cell: DataCell) {
        self.state.lock().outputs.insert(name.to_string(), cell);
    }

    pub fn get_input(&self, name: &str) -> Option<DataCell> {
        self.state.lock().inputs.get(name).cloned()
    }

    pub fn get_output(&self, name: &str) -> Option<DataCell> {
        self.state.lock().outputs.get(name).cloned()
    }

    /// Like `get_input`, but raises on a port name this node never declared
    /// rather than silently returning `None`.
    pub fn try_get_input(&self, name: &str) -> Result<DataCell, NodeError> {
        if !self.input_names.iter().any(|n| n == name) {
            return Err(NodeError::PortMissing(name.to_string()));
        }
        Ok(self.get_input(name).unwrap_or_default())
    }

    /// Like `get_output`, but raises on a port name this node never declared
    /// rather than silently returning `None`.
    pub fn try_get_output(&self, name: &str) -> Result<DataCell, NodeError> {
        if !self.output_names.iter().any(|n| n == name) {
            return Err(NodeError::PortMissing(name.to_string()));
        }
        Ok(self.get_output(name).unwrap_or_default())
    }

    pub fn get_inputs(&self) -> HashMap<String, DataCell> {
        self.state.lock().inputs.clone()
    }

    pub fn get_outputs(&self) -> HashMap<String, DataCell> {
        self.state.lock().outputs.clone()
    }

    /// Invoke the body registered for this node's placement. A no-op if none
    /// is registered. Ports the body does not write remain at their
    /// previous value.
    pub fn execute(&self) {
        let body = match self.placement {
            Placement::Cpu => self.cpu_body.as_ref(),
            Placement::Device => self.device_body.as_ref(),
        };
        let Some(body) = body else { return };

        let mut state = self.state.lock();
        let PortState { inputs, outputs } = &mut *state;
        body(inputs, outputs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doubling_body() -> NodeBody {
        Arc::new(|inputs, outputs| {
            if let Some(DataCell::F64(v)) = inputs.get("in") {
                outputs.insert("out".to_string(), DataCell::F64(v * 2.0));
            }
        })
    }

    #[test]
    fn node_with_no_body_is_a_no_op() {
        let mut node = GraphNode::new(Placement::Cpu);
        node.add_input("in", DataCell::F64(0.0));
        node.add_output("out", DataCell::F64(0.0));
        node.set_input("in", DataCell::F64(5.0));
        node.execute();
        assert_eq!(node.get_output("out"), Some(DataCell::F64(0.0)));
    }

    #[test]
    fn execute_dispatches_on_placement() {
        let mut node = GraphNode::new(Placement::Cpu).with_cpu_body(doubling_body());
        node.add_input("in", DataCell::F64(0.0));
        node.add_output("out", DataCell::F64(0.0));
        node.set_input("in", DataCell::F64(3.0));
        node.execute();
        assert_eq!(node.get_output("out"), Some(DataCell::F64(6.0)));
    }

    #[test]
    fn unwritten_output_ports_keep_previous_value() {
        let mut node = GraphNode::new(Placement::Cpu).with_cpu_body(Arc::new(|_inputs, _outputs| {}));
        node.add_output("out", DataCell::I32(7));
        node.execute();
        assert_eq!(node.get_output("out"), Some(DataCell::I32(7)));
    }

    #[test]
    fn try_get_input_raises_on_undeclared_port() {
        let mut node = GraphNode::new(Placement::Cpu);
        node.add_input("in", DataCell::F64(0.0));
        assert_eq!(
            node.try_get_input("missing"),
            Err(NodeError::PortMissing("missing".to_string()))
        );
        assert_eq!(node.try_get_input("in"), Ok(DataCell::F64(0.0)));
    }

    #[test]
    fn try_get_output_raises_on_undeclared_port() {
        let mut node = GraphNode::new(Placement::Cpu);
        node.add_output("out", DataCell::I32(0));
        assert_eq!(
            node.try_get_output("missing"),
            Err(NodeError::PortMissing("missing".to_string()))
        );
        assert_eq!(node.try_get_output("out"), Ok(DataCell::I32(0)));
    }

    #[test]
    fn device_placement_invokes_device_body_only() {
        let mut node = GraphNode::new(Placement::Device)
            .with_cpu_body(Arc::new(|_i, o| {
                o.insert("out".into(), DataCell::Text("cpu".into()));
            }))
            .with_device_body(Arc::new(|_i, o| {
                o.insert("out".into(), DataCell::Text("device".into()));
            }));
        node.add_output("out", DataCell::Text(String::new()));
        node.execute();
        assert_eq!(
            node.get_output("out"),
            Some(DataCell::Text("device".to_string()))
        );
    }
}
