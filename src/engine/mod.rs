// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The concurrent task queue backing the executor's worker pool.

mod queue;

pub use queue::ConcurrentQueue;
