// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the execution engine.
//!
//! Every failure kind a caller can hit maps to a distinct, inspectable
//! variant — nothing surfaces as a generic failure flag. Load-time errors
//! (`NoOptimizationProfile`, `MalformedProfile`, `InvalidShape`,
//! `IncompleteModel`, `TargetMismatch`, and the device's out-of-memory and
//! zero-size conditions wrapped in [`EngineError::Device`]) abort `load`
//! entirely and leave no partial registry entry. `ModelNotFound` and
//! `InputSizeMismatch` are caller-input errors. `ExecutionFailed` is fatal
//! to that model's session; further calls see `ModelDegraded` until the
//! model is explicitly reloaded.

use crate::ModelId;
use tensor_schema::ShapeError;

/// Errors that can occur during model load and inference execution.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A device-boundary failure: device selection, allocation, or transfer.
    #[error("device error: {0}")]
    Device(#[from] compute_device::DeviceError),

    /// The compiled artifact could not be parsed or validated.
    #[error("plan error: {0}")]
    Plan(#[from] model_plan::PlanError),

    /// The plan was built for a different device kind.
    #[error("plan targets device kind '{plan_target}', engine device is '{device_kind}'")]
    TargetMismatch {
        plan_target: String,
        device_kind: String,
    },

    /// No model is registered under the given identifier.
    #[error("model not found: '{id}'")]
    ModelNotFound { id: ModelId },

    /// A dynamic binding needs resolution but the plan declares no profiles.
    #[error("binding '{binding}' has a dynamic shape but the plan declares no optimization profile")]
    NoOptimizationProfile { binding: String },

    /// A profile does not supply the min/opt/max triple for a binding.
    #[error("malformed optimization profile for binding '{binding}': {detail}")]
    MalformedProfile { binding: String, detail: String },

    /// A binding's shape cannot size a buffer after resolution.
    #[error("invalid shape for binding '{binding}': {source}")]
    InvalidShape {
        binding: String,
        #[source]
        source: ShapeError,
    },

    /// The model declares no inputs or no outputs.
    #[error("incomplete model: {inputs} input binding(s), {outputs} output binding(s); at least one of each is required")]
    IncompleteModel { inputs: usize, outputs: usize },

    /// The inference payload does not match the model's input size.
    #[error("input payload is {actual} bytes, model expects {expected}")]
    InputSizeMismatch { expected: usize, actual: usize },

    /// Synchronous execution failed; the model must be reloaded.
    #[error("execution failed for model '{id}': {source}")]
    ExecutionFailed {
        id: ModelId,
        #[source]
        source: compute_device::DeviceError,
    },

    /// The model failed a previous execution and needs an explicit reload.
    #[error("model '{id}' is degraded after an execution failure; reload it before further use")]
    ModelDegraded { id: ModelId },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}
