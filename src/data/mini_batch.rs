// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Mini-Batch: a named, ordered, append-only sequence of Data Cells.

use super::cell::DataCell;

/// The unit of data flow on a single port for a single batch.
///
/// Mini-batches are values: two of them compare equal iff their names match
/// and their cells compare equal pairwise in order. There is no notion of
/// Mini-Batch identity beyond its content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MiniBatch {
    name: Option<String>,
    cells: Vec<DataCell>,
}

impl MiniBatch {
    /// An empty, unnamed mini-batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty mini-batch with the given name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            cells: Vec::new(),
        }
    }

    pub fn from_cells(cells: Vec<DataCell>) -> Self {
        Self { name: None, cells }
    }

    pub fn append(&mut self, cell: DataCell) {
        self.cells.push(cell);
    }

    pub fn get(&self, index: usize) -> Option<&DataCell> {
        self.cells.get(index)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn cells(&self) -> &[DataCell] {
        &self.cells
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DataCell> {
        self.cells.iter()
    }
}

impl FromIterator<DataCell> for MiniBatch {
    fn from_iter<T: IntoIterator<Item = DataCell>>(iter: T) -> Self {
        Self {
            name: None,
            cells: iter.into_iter().collect(),
        }
    }
}
