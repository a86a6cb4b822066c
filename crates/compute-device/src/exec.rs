// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Execution contexts: run-time state derived from a compiled plan.
//!
//! An [`ExecutionContext`] holds the *resolved* shape for any bindings whose
//! declared shape carries a dynamic dimension, and drives synchronous plan
//! execution. One context is created per loaded model and destroyed when the
//! model is unloaded; resolved shapes are committed once, before the model's
//! buffers are sized, and never change afterwards.
//!
//! Execution addresses memory purely by binding index: the caller passes the
//! full allocation list, inputs and outputs interleaved in declared binding
//! order, and each output's program step (`loopback`, `constant`, `trap`)
//! fills its allocation from the inputs or the plan's baked constants.

use crate::{DeviceBuffer, DeviceError};
use model_plan::{CompiledPlan, OutputSource};
use std::sync::Arc;
use tensor_schema::TensorShape;

/// Run-time execution state for one loaded model.
pub struct ExecutionContext {
    plan: Arc<CompiledPlan>,
    /// Committed shapes, indexed by binding index; `None` where the declared
    /// shape is used as-is.
    resolved: Vec<Option<TensorShape>>,
}

impl ExecutionContext {
    /// Creates a context for the given plan (via
    /// [`DeviceContext::create_context`](crate::DeviceContext::create_context)).
    pub(crate) fn new(plan: Arc<CompiledPlan>) -> Self {
        let resolved = vec![None; plan.binding_count()];
        Self { plan, resolved }
    }

    /// The compiled plan this context was derived from.
    pub fn plan(&self) -> &CompiledPlan {
        &self.plan
    }

    /// Commits a concrete shape for the binding at `index`.
    ///
    /// Called once per dynamic binding during shape resolution, before any
    /// buffer is sized against this context.
    pub fn set_binding_shape(
        &mut self,
        index: usize,
        shape: TensorShape,
    ) -> Result<(), DeviceError> {
        if index >= self.resolved.len() {
            return Err(DeviceError::ExecutionFault {
                detail: format!(
                    "binding index {index} out of range ({} bindings)",
                    self.resolved.len()
                ),
            });
        }
        tracing::debug!("binding {index} shape committed: {shape}");
        self.resolved[index] = Some(shape);
        Ok(())
    }

    /// Returns the effective shape for the binding at `index`: the committed
    /// shape if one was set, otherwise the plan's declared shape.
    pub fn binding_shape(&self, index: usize) -> Option<TensorShape> {
        match self.resolved.get(index)? {
            Some(shape) => Some(shape.clone()),
            None => self.plan.binding(index).map(|b| b.shape.clone()),
        }
    }

    /// Synchronously executes the plan against the full allocation list.
    ///
    /// `allocations` must hold one buffer per binding, in binding-index
    /// order. Inputs are read, each output is filled by its program step,
    /// and the call blocks until every step has run. A `trap` step fails
    /// the call with `ExecutionFault`; buffers written before the faulting
    /// step are left as-is, so their contents are unspecified to callers.
    pub fn execute(&self, allocations: &mut [DeviceBuffer]) -> Result<(), DeviceError> {
        if allocations.len() != self.plan.binding_count() {
            return Err(DeviceError::ExecutionFault {
                detail: format!(
                    "expected {} allocations, got {}",
                    self.plan.binding_count(),
                    allocations.len()
                ),
            });
        }

        // Snapshot the concatenated input bytes, in binding-index order.
        let mut feed = Vec::new();
        for binding in self.plan.bindings() {
            if binding.direction.is_input() {
                feed.extend_from_slice(allocations[binding.index].bytes());
            }
        }

        for binding in self.plan.bindings() {
            let Some(source) = self.plan.source(binding.index) else {
                continue;
            };
            match source {
                OutputSource::Loopback => {
                    if feed.is_empty() {
                        return Err(DeviceError::ExecutionFault {
                            detail: format!(
                                "loopback output '{}' has no input bytes to cycle",
                                binding.name
                            ),
                        });
                    }
                    let out = allocations[binding.index].bytes_mut();
                    for (i, byte) in out.iter_mut().enumerate() {
                        *byte = feed[i % feed.len()];
                    }
                }
                OutputSource::Constant { tensor } => {
                    let constant = self.plan.constant(tensor).ok_or_else(|| {
                        DeviceError::ExecutionFault {
                            detail: format!("constant tensor '{tensor}' not found"),
                        }
                    })?;
                    let out = allocations[binding.index].bytes_mut();
                    if constant.data.len() != out.len() {
                        return Err(DeviceError::ExecutionFault {
                            detail: format!(
                                "constant '{tensor}' is {} bytes, allocation is {}",
                                constant.data.len(),
                                out.len()
                            ),
                        });
                    }
                    out.copy_from_slice(&constant.data);
                }
                OutputSource::Trap => {
                    return Err(DeviceError::ExecutionFault {
                        detail: format!("trap step on binding '{}'", binding.name),
                    });
                }
            }
        }

        tracing::trace!("executed plan '{}'", self.plan.name());
        Ok(())
    }
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("plan", &self.plan.name())
            .field(
                "resolved_bindings",
                &self.resolved.iter().filter(|s| s.is_some()).count(),
            )
            .finish()
    }
}
