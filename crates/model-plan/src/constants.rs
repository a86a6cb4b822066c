// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Baked constant tensors shipped alongside a plan.
//!
//! Constants live in `constants.safetensors` next to the manifest. The file
//! is memory-mapped for parsing, then the referenced tensors are copied out:
//! plans bake small fixture outputs, not weight blobs, so holding them in
//! memory keeps execution free of file-system access.

use std::collections::HashMap;
use std::path::Path;

use tensor_schema::{DType, TensorShape};

use crate::PlanError;

/// One constant tensor: dtype, shape, and raw little-endian bytes.
#[derive(Debug, Clone)]
pub struct ConstTensor {
    pub dtype: DType,
    pub shape: TensorShape,
    pub data: Vec<u8>,
}

/// All constant tensors of one plan, keyed by name.
#[derive(Debug, Default)]
pub struct PlanConstants {
    tensors: HashMap<String, ConstTensor>,
}

impl PlanConstants {
    /// Loads constants from a SafeTensors file.
    pub fn from_file(path: &Path) -> Result<Self, PlanError> {
        let file = std::fs::File::open(path)
            .map_err(|e| PlanError::Constants(format!("cannot open '{}': {e}", path.display())))?;

        let mmap = unsafe { memmap2::Mmap::map(&file) }
            .map_err(|e| PlanError::Constants(format!("mmap failed: {e}")))?;

        let parsed = safetensors::SafeTensors::deserialize(&mmap)
            .map_err(|e| PlanError::Constants(format!("SafeTensors parse error: {e}")))?;

        let mut tensors = HashMap::new();
        for (name, view) in parsed.tensors() {
            let dtype = dtype_from_safetensors(view.dtype())?;
            let dims: Vec<i64> = view.shape().iter().map(|&d| d as i64).collect();
            tensors.insert(
                name.clone(),
                ConstTensor {
                    dtype,
                    shape: TensorShape::new(dims),
                    data: view.data().to_vec(),
                },
            );
        }

        Ok(Self { tensors })
    }

    /// Builds a constants table directly from tensors. Useful for tests that
    /// do not want to write SafeTensors files.
    pub fn from_tensors(tensors: HashMap<String, ConstTensor>) -> Self {
        Self { tensors }
    }

    /// Looks up a tensor by name.
    pub fn get(&self, name: &str) -> Option<&ConstTensor> {
        self.tensors.get(name)
    }

    pub fn len(&self) -> usize {
        self.tensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }
}

/// Converts a SafeTensors `Dtype` to a [`DType`].
pub fn dtype_from_safetensors(st_dtype: safetensors::Dtype) -> Result<DType, PlanError> {
    match st_dtype {
        safetensors::Dtype::F32 => Ok(DType::F32),
        safetensors::Dtype::F16 => Ok(DType::F16),
        safetensors::Dtype::I8 => Ok(DType::I8),
        safetensors::Dtype::I32 => Ok(DType::I32),
        safetensors::Dtype::BOOL => Ok(DType::Bool),
        other => Err(PlanError::Constants(format!(
            "unsupported SafeTensors dtype: {other:?}"
        ))),
    }
}

/// Converts a [`DType`] to the SafeTensors `Dtype` it round-trips through.
pub fn dtype_to_safetensors(dtype: DType) -> safetensors::Dtype {
    match dtype {
        DType::F32 => safetensors::Dtype::F32,
        DType::F16 => safetensors::Dtype::F16,
        DType::I8 => safetensors::Dtype::I8,
        DType::I32 => safetensors::Dtype::I32,
        DType::Bool => safetensors::Dtype::BOOL,
    }
}
