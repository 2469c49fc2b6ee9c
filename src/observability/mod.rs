// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Structured logging for the graph engine.
//!
//! One type per diagnostic event, logged through `tracing` rather than
//! ad-hoc format strings scattered across the engine. See `messages::graph`
//! for construction-time diagnostics and `messages::executor` for run-time
//! lifecycle events.

pub mod messages;

/// A message that knows how to log itself at the right level with
/// structured fields attached.
pub trait StructuredLog: std::fmt::Display {
    fn log(&self);
}
