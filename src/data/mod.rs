// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Typed value carriers: [`DataCell`] and the [`MiniBatch`] sequences built
//! from them. This module owns only the data representation — the port
//! wiring and execution semantics that move these values through a graph
//! live in [`crate::graph`] and [`crate::executor`].

mod cell;
mod mini_batch;

pub use cell::{DataCell, DataCellKind};
pub use mini_batch::MiniBatch;
