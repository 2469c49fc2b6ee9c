// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The Data Cell: a tagged value carrier flowing between node ports.
//!
//! `DataCell` is a closed, enumerated sum type — no dynamic subtyping, no
//! implicit conversion between variants. Typed retrieval fails loudly
//! (`Err(CellError::VariantMismatch)`) rather than silently coercing.

use std::fmt;

use crate::errors::CellError;

/// One of the fixed set of value variants a port can carry.
#[derive(Debug, Clone, PartialEq)]
pub enum DataCell {
    I32(i32),
    I64(i64),
    IWide(i128),
    U32(u32),
    U64(u64),
    UWide(u128),
    F32(f32),
    F64(f64),
    /// Extended-precision float. Rust has no native type wider than `f64`
    /// that isn't platform-specific, so this is carried as `f64` under its
    /// own discriminant — it is still a distinct variant for mismatch
    /// purposes, it just shares `f64`'s storage and precision.
    FWide(f64),
    Text(String),
    SeqI32(Vec<i32>),
    SeqI64(Vec<i64>),
    SeqF32(Vec<f32>),
    SeqF64(Vec<f64>),
    SeqText(Vec<String>),
}

/// The active variant tag of a [`DataCell`], independent of its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataCellKind {
    I32,
    I64,
    IWide,
    U32,
    U64,
    UWide,
    F32,
    F64,
    FWide,
    Text,
    SeqI32,
    SeqI64,
    SeqF32,
    SeqF64,
    SeqText,
}

impl fmt::Display for DataCellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataCellKind::I32 => "i32",
            DataCellKind::I64 => "i64",
            DataCellKind::IWide => "iwide",
            DataCellKind::U32 => "u32",
            DataCellKind::U64 => "u64",
            DataCellKind::UWide => "uwide",
            DataCellKind::F32 => "f32",
            DataCellKind::F64 => "f64",
            DataCellKind::FWide => "fwide",
            DataCellKind::Text => "text",
            DataCellKind::SeqI32 => "seq<i32>",
            DataCellKind::SeqI64 => "seq<i64>",
            DataCellKind::SeqF32 => "seq<f32>",
            DataCellKind::SeqF64 => "seq<f64>",
            DataCellKind::SeqText => "seq<text>",
        };
        f.write_str(name)
    }
}

macro_rules! accessor {
    ($name:ident, $variant:ident, $ty:ty) => {
        pub fn $name(&self) -> Result<&$ty, CellError> {
            match self {
                DataCell::$variant(v) => Ok(v),
                other => Err(CellError::VariantMismatch {
                    expected: DataCellKind::$variant,
                    found: other.kind(),
                }),
            }
        }
    };
}

impl DataCell {
    /// The variant this cell currently holds.
    pub fn kind(&self) -> DataCellKind {
        match self {
            DataCell::I32(_) => DataCellKind::I32,
            DataCell::I64(_) => DataCellKind::I64,
            DataCell::IWide(_) => DataCellKind::IWide,
            DataCell::U32(_) => DataCellKind::U32,
            DataCell::U64(_) => DataCellKind::U64,
            DataCell::UWide(_) => DataCellKind::UWide,
            DataCell::F32(_) => DataCellKind::F32,
            DataCell::F64(_) => DataCellKind::F64,
            DataCell::FWide(_) => DataCellKind::FWide,
            DataCell::Text(_) => DataCellKind::Text,
            DataCell::SeqI32(_) => DataCellKind::SeqI32,
            DataCell::SeqI64(_) => DataCellKind::SeqI64,
            DataCell::SeqF32(_) => DataCellKind::SeqF32,
            DataCell::SeqF64(_) => DataCellKind::SeqF64,
            DataCell::SeqText(_) => DataCellKind::SeqText,
        }
    }

    accessor!(as_i32, I32, i32);
    accessor!(as_i64, I64, i64);
    accessor!(as_iwide, IWide, i128);
    accessor!(as_u32, U32, u32);
    accessor!(as_u64, U64, u64);
    accessor!(as_uwide, UWide, u128);
    accessor!(as_f32, F32, f32);
    accessor!(as_f64, F64, f64);
    accessor!(as_fwide, FWide, f64);
    accessor!(as_text, Text, String);
    accessor!(as_seq_i32, SeqI32, Vec<i32>);
    accessor!(as_seq_i64, SeqI64, Vec<i64>);
    accessor!(as_seq_f32, SeqF32, Vec<f32>);
    accessor!(as_seq_f64, SeqF64, Vec<f64>);
    accessor!(as_seq_text, SeqText, Vec<String>);
}

impl Default for DataCell {
    /// The default cell used to seed a freshly declared port: an empty text
    /// value. A node declaring a port picks its own default via
    /// `add_input`/`add_output`; this is only used where the graph itself
    /// needs to manufacture a slot with no caller-supplied default (see
    /// `Graph::get_mini_batch`'s create-on-miss behavior).
    fn default() -> Self {
        DataCell::Text(String::new())
    }
}
