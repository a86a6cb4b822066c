// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for shape and size computation.

use crate::TensorShape;

/// Errors that can occur when sizing a tensor shape.
#[derive(Debug, thiserror::Error)]
pub enum ShapeError {
    /// A dimension is zero, negative, or still carries the dynamic sentinel.
    #[error("dimension {index} is {value}; every dimension must be positive before sizing")]
    NonPositiveDim { index: usize, value: i64 },

    /// The element count (or byte size) does not fit in a machine word.
    #[error("element count of shape {shape} overflows")]
    ElementCountOverflow { shape: TensorShape },
}
