// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod data;          // Data Cell + Mini-Batch
pub mod engine;         // concurrent task queue
pub mod errors;          // error handling
pub mod executor;         // worker pool + scheduling
pub mod graph;             // nodes, adjacency, storage
pub mod observability;      // structured logging

pub use data::{DataCell, DataCellKind, MiniBatch};
pub use executor::{Executor, ExecutorBuilder};
pub use graph::{Graph, GraphNode, NodeBody, Placement};
