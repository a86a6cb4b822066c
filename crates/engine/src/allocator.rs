// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Buffer allocation for a freshly loaded model.
//!
//! For every binding, in ascending index order: compute the exact byte size
//! from the resolved shape and element width, acquire one device allocation
//! of that size, and — for outputs only — a host mirror of the same size to
//! receive copy-back results. The allocation list is indexed identically to
//! the binding list, which is what keeps the execution call and both copy
//! loops consistent with each other.
//!
//! All failures here abort the load; the already-acquired buffers are
//! released when the partial result drops.

use crate::registry::{ModelEntry, ModelState};
use crate::{EngineError, ModelId};
use compute_device::{DeviceContext, ExecutionContext};
use model_plan::CompiledPlan;
use std::sync::Arc;
use tensor_schema::{TensorBinding, TensorShape};

/// Builds a complete registry entry for a plan with resolved shapes.
///
/// Checks the load post-condition before returning: the model must declare
/// at least one input and one output binding, otherwise the entry is
/// discarded with `IncompleteModel`.
pub(crate) fn bind_model(
    device: &DeviceContext,
    id: ModelId,
    name: String,
    plan: Arc<CompiledPlan>,
    context: ExecutionContext,
    resolved: &[TensorShape],
) -> Result<ModelEntry, EngineError> {
    let mut allocations = Vec::with_capacity(plan.binding_count());
    let mut input_bindings = Vec::new();
    let mut output_bindings = Vec::new();
    let mut mirrors = Vec::new();
    let mut input_bytes = 0usize;

    for binding in plan.bindings() {
        let resolved_binding = TensorBinding {
            index: binding.index,
            name: binding.name.clone(),
            direction: binding.direction,
            dtype: binding.dtype,
            shape: resolved[binding.index].clone(),
        };

        let size = resolved_binding
            .byte_size()
            .map_err(|source| EngineError::InvalidShape {
                binding: resolved_binding.name.clone(),
                source,
            })?;

        let buffer = device.alloc(size)?;
        tracing::debug!(
            "allocated {size} bytes for binding {}",
            resolved_binding.summary(),
        );

        if resolved_binding.direction.is_input() {
            input_bytes += size;
            input_bindings.push(resolved_binding);
        } else {
            mirrors.push(vec![0u8; size]);
            output_bindings.push(resolved_binding);
        }
        allocations.push(buffer);
    }

    if input_bindings.is_empty() || output_bindings.is_empty() {
        return Err(EngineError::IncompleteModel {
            inputs: input_bindings.len(),
            outputs: output_bindings.len(),
        });
    }
    debug_assert_eq!(allocations.len(), plan.binding_count());

    Ok(ModelEntry {
        id,
        name,
        plan,
        context,
        input_bindings,
        output_bindings,
        allocations,
        mirrors,
        input_bytes,
        state: ModelState::Ready,
    })
}
