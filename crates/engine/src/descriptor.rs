// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Model descriptors and binding specs: what the serving layer sees.

use crate::ModelId;
use tensor_schema::{DType, TensorBinding, TensorShape};

/// Summary of a loaded model, returned by `load` and `describe`.
///
/// Binding indices are exposed so a caller can validate shape expectations
/// against external protocol messages without re-deriving the schema.
/// Serializable so a serving layer can wire-encode it directly.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ModelDescriptor {
    /// Descriptor label.
    pub name: String,
    /// Registry identifier.
    pub id: ModelId,
    /// Operation count reported by the artifact builder.
    pub num_ops: usize,
    /// Total number of tensor bindings.
    pub num_tensors: usize,
    /// Binding indices of the inputs, ascending.
    pub input_tensor_indices: Vec<usize>,
    /// Binding indices of the outputs, ascending.
    pub output_tensor_indices: Vec<usize>,
}

impl ModelDescriptor {
    /// One-line rendering for logs and CLI output.
    pub fn summary(&self) -> String {
        format!(
            "'{}' (id {}): {} tensors ({} in {:?}, {} out {:?}), {} ops",
            self.name,
            self.id,
            self.num_tensors,
            self.input_tensor_indices.len(),
            self.input_tensor_indices,
            self.output_tensor_indices.len(),
            self.output_tensor_indices,
            self.num_ops,
        )
    }
}

/// One entry of a model's input or output spec: the resolved schema of a
/// binding, in the order a payload must be assembled.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BindingSpec {
    /// Binding index.
    pub index: usize,
    /// Binding name.
    pub name: String,
    /// Element type.
    pub dtype: DType,
    /// Resolved shape.
    pub shape: TensorShape,
    /// Exact byte size of the binding's buffer.
    pub byte_size: usize,
}

impl BindingSpec {
    /// Builds a spec from a resolved binding. The shape must be fully
    /// static by the time a binding reaches a spec.
    pub(crate) fn from_binding(binding: &TensorBinding, byte_size: usize) -> Self {
        Self {
            index: binding.index,
            name: binding.name.clone(),
            dtype: binding.dtype,
            shape: binding.shape.clone(),
            byte_size,
        }
    }
}
