// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Shape resolution for dynamic bindings.
//!
//! A plan may declare an input binding whose leading dimension is the `-1`
//! dynamic sentinel. Before any buffer is sized, the resolver selects a
//! concrete shape from the plan's optimization profile and commits it into
//! the execution context. This runs once per model, at load; the shape is
//! fixed for the lifetime of the loaded model.
//!
//! The resolver always selects the profile's **maximum** shape — the most
//! conservative choice, so every runtime batch the profile admits fits the
//! allocation. This can over-allocate for smaller inputs; the policy is
//! preserved from the original system rather than second-guessed (see
//! DESIGN.md).

use crate::EngineError;
use compute_device::ExecutionContext;
use model_plan::CompiledPlan;
use tensor_schema::TensorShape;

/// Resolves every binding of `plan` to a concrete shape, committing
/// dynamic resolutions into `context`.
///
/// Returns one shape per binding, in binding-index order. Static bindings
/// pass through unchanged; a dynamic dimension anywhere other than an
/// input's leading position is left for the allocator to reject.
pub(crate) fn resolve_shapes(
    plan: &CompiledPlan,
    context: &mut ExecutionContext,
) -> Result<Vec<TensorShape>, EngineError> {
    let mut resolved = Vec::with_capacity(plan.binding_count());

    for binding in plan.bindings() {
        if !(binding.direction.is_input() && binding.shape.leading_dynamic()) {
            resolved.push(binding.shape.clone());
            continue;
        }

        if plan.profiles().is_empty() {
            return Err(EngineError::NoOptimizationProfile {
                binding: binding.name.clone(),
            });
        }

        let entry = plan.profile_for(&binding.name).ok_or_else(|| {
            EngineError::MalformedProfile {
                binding: binding.name.clone(),
                detail: "no profile entry covers this binding".to_string(),
            }
        })?;

        let max = match entry.max() {
            Some(shape) if entry.is_triple() => shape.clone(),
            _ => {
                return Err(EngineError::MalformedProfile {
                    binding: binding.name.clone(),
                    detail: format!(
                        "{} shape(s) declared, expected the [min, opt, max] triple",
                        entry.shapes.len()
                    ),
                })
            }
        };

        if max.rank() != binding.shape.rank() {
            return Err(EngineError::MalformedProfile {
                binding: binding.name.clone(),
                detail: format!(
                    "profile max shape {max} does not match declared rank of {}",
                    binding.shape
                ),
            });
        }

        tracing::debug!(
            "resolved dynamic binding '{}': {} -> {max}",
            binding.name,
            binding.shape,
        );
        context.set_binding_shape(binding.index, max.clone())?;
        resolved.push(max);
    }

    Ok(resolved)
}
