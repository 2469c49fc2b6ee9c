// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! A bounded-in-memory, unbounded-in-capacity MPMC FIFO queue.
//!
//! Pushes are totally ordered; pops are served in push order. `try_pop`
//! never blocks, `wait_and_pop` blocks until a value is available. The queue
//! does not signal termination on its own — the executor's worker loop
//! supplies that discipline by exiting on the first empty `try_pop`.

use std::collections::VecDeque;

use parking_lot::{Condvar, Mutex};

pub struct ConcurrentQueue<T> {
    items: Mutex<VecDeque<T>>,
    not_empty: Condvar,
}

impl<T> ConcurrentQueue<T> {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            not_empty: Condvar::new(),
        }
    }

    /// Always succeeds; wakes one waiter if any are blocked in `wait_and_pop`.
    pub fn push(&self, value: T) {
        self.items.lock().push_back(value);
        self.not_empty.notify_one();
    }

    /// Never blocks; returns `None` if the queue is currently empty.
    pub fn try_pop(&self) -> Option<T> {
        self.items.lock().pop_front()
    }

    /// Blocks until a value is available, then returns it.
    pub fn wait_and_pop(&self) -> T {
        let mut guard = self.items.lock();
        loop {
            if let Some(value) = guard.pop_front() {
                return value;
            }
            self.not_empty.wait(&mut guard);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }
}

impl<T> Default for ConcurrentQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn push_then_try_pop_preserves_order() {
        let queue = ConcurrentQueue::new();
        queue.push(1);
        queue.push(2);
        queue.push(3);
        assert_eq!(queue.try_pop(), Some(1));
        assert_eq!(queue.try_pop(), Some(2));
        assert_eq!(queue.try_pop(), Some(3));
        assert_eq!(queue.try_pop(), None);
    }

    #[test]
    fn try_pop_never_blocks_on_empty_queue() {
        let queue: ConcurrentQueue<i32> = ConcurrentQueue::new();
        assert_eq!(queue.try_pop(), None);
    }

    #[test]
    fn wait_and_pop_blocks_until_a_push_arrives() {
        let queue = Arc::new(ConcurrentQueue::new());
        let producer = {
            let queue = queue.clone();
            thread::spawn(move || {
                thread::sleep(std::time::Duration::from_millis(20));
                queue.push(42);
            })
        };
        assert_eq!(queue.wait_and_pop(), 42);
        producer.join().unwrap();
    }

    #[test]
    fn concurrent_producers_and_consumers_see_every_item_exactly_once() {
        let queue = Arc::new(ConcurrentQueue::new());
        let producers: Vec<_> = (0..4)
            .map(|p| {
                let queue = queue.clone();
                thread::spawn(move || {
                    for i in 0..100 {
                        queue.push(p * 100 + i);
                    }
                })
            })
            .collect();
        for p in producers {
            p.join().unwrap();
        }

        let mut seen = Vec::new();
        while let Some(v) = queue.try_pop() {
            seen.push(v);
        }
        seen.sort_unstable();
        let expected: Vec<i32> = (0..400).collect();
        assert_eq!(seen, expected);
    }
}
