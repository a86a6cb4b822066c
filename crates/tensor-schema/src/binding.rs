// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tensor binding descriptors: the named I/O slots of a compiled model.

use std::fmt;

use crate::{DType, ShapeError, TensorShape};

/// Whether a binding feeds data into the model or carries results out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingDirection {
    Input,
    Output,
}

impl BindingDirection {
    pub fn is_input(self) -> bool {
        matches!(self, BindingDirection::Input)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BindingDirection::Input => "input",
            BindingDirection::Output => "output",
        }
    }
}

impl fmt::Display for BindingDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One named input or output slot of a compiled model.
///
/// The `index` is the binding's position in the model's declared I/O list.
/// It is fixed when the artifact is built and must be preserved: the
/// execution call addresses allocations purely by this index, so every
/// structure that holds per-binding state (allocations, host mirrors, copy
/// loops) is ordered by it.
///
/// A binding is created during model load and never mutated afterwards;
/// re-loading a model discards and recreates all of its bindings.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TensorBinding {
    pub index: usize,
    pub name: String,
    pub direction: BindingDirection,
    pub dtype: DType,
    pub shape: TensorShape,
}

impl TensorBinding {
    /// Returns the byte size this binding's buffer must have.
    ///
    /// Fails if the shape still contains a non-positive dimension, which
    /// means shape resolution has not (or cannot) run for it.
    pub fn byte_size(&self) -> Result<usize, ShapeError> {
        self.shape.byte_size(self.dtype)
    }

    /// One-line rendering for logs and CLI tables.
    pub fn summary(&self) -> String {
        format!(
            "#{} '{}' {} {} {}",
            self.index, self.name, self.direction, self.dtype, self.shape
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_binding() -> TensorBinding {
        TensorBinding {
            index: 0,
            name: "images".to_string(),
            direction: BindingDirection::Input,
            dtype: DType::F32,
            shape: TensorShape::new(vec![1, 224, 224, 3]),
        }
    }

    #[test]
    fn test_direction_predicates() {
        assert!(BindingDirection::Input.is_input());
        assert!(!BindingDirection::Output.is_input());
        assert_eq!(BindingDirection::Output.as_str(), "output");
    }

    #[test]
    fn test_byte_size() {
        let b = image_binding();
        assert_eq!(b.byte_size().unwrap(), 1 * 224 * 224 * 3 * 4);
    }

    #[test]
    fn test_byte_size_unresolved_fails() {
        let mut b = image_binding();
        b.shape = TensorShape::new(vec![-1, 224, 224, 3]);
        assert!(b.byte_size().is_err());
    }

    #[test]
    fn test_summary() {
        let b = image_binding();
        assert_eq!(b.summary(), "#0 'images' input f32 [1, 224, 224, 3]");
    }

    #[test]
    fn test_direction_serde() {
        let json = serde_json::to_string(&BindingDirection::Input).unwrap();
        assert_eq!(json, "\"input\"");
    }
}
