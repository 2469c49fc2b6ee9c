// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The Graph data structure and the nodes it owns.

mod graph;
mod node;

pub use graph::Graph;
pub use node::{GraphNode, NodeBody, Placement};
