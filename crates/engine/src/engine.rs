// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The multi-model execution engine.
//!
//! ```text
//! load(id, name, path)
//!     │  parse + validate plan        (model-plan)
//!     │  derive execution context     (compute-device)
//!     │  resolve dynamic shapes       (resolver)
//!     │  allocate device buffers      (allocator)
//!     ▼
//! registry entry ──► ModelDescriptor
//!
//! infer(id, payload)
//!     │  copy payload → input allocations   (binding-index order)
//!     │  execute plan                        (full allocation list)
//!     │  copy output allocations → mirrors   (output-binding order)
//!     ▼
//! tagged output buffers + per-call timing
//! ```
//!
//! The engine performs no internal threading or queuing; it is driven by
//! whatever caller invokes it, and every device-facing call blocks until
//! the device finishes. All methods take `&self`, so one engine can be
//! shared by a serving layer across threads.

use crate::allocator::bind_model;
use crate::registry::{ModelRegistry, ModelState};
use crate::resolver::resolve_shapes;
use crate::{
    BindingSpec, EngineConfig, EngineError, InferenceStats, ModelDescriptor, ModelId,
};
use compute_device::{DeviceContext, DeviceStats};
use model_plan::CompiledPlan;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tensor_schema::{DType, TensorShape};

/// One filled output buffer, tagged with its binding's schema so a caller
/// can interpret the raw bytes without re-deriving it.
#[derive(Debug, Clone, serde::Serialize)]
pub struct OutputBuffer {
    /// Binding index of the output.
    pub index: usize,
    /// Binding name.
    pub name: String,
    /// Element type.
    pub dtype: DType,
    /// Resolved shape.
    pub shape: TensorShape,
    /// Raw little-endian bytes.
    pub data: Vec<u8>,
}

/// The result of one successful inference call.
#[derive(Debug)]
pub struct InferenceOutput {
    /// Output buffers in output-binding order.
    pub outputs: Vec<OutputBuffer>,
    /// Per-call timing and volume breakdown.
    pub stats: InferenceStats,
}

/// The multi-model execution engine.
///
/// Owns one opened device and the registry of loaded models. Uniform
/// `load` / `infer` / `describe` contract regardless of how many models
/// are resident.
///
/// # Example
/// ```no_run
/// use engine::{EngineConfig, ExecutionEngine};
/// use std::path::Path;
///
/// # fn example() -> Result<(), engine::EngineError> {
/// let engine = ExecutionEngine::new(&EngineConfig::default())?;
/// let descriptor =
///     engine.load_model("m1", "mobilenet-v2", Path::new("./models/mobilenet-v2.plan"))?;
/// println!("{}", descriptor.summary());
///
/// let payload = vec![0u8; 1 * 224 * 224 * 3 * 4];
/// let result = engine.infer(&"m1".into(), &payload)?;
/// println!("{}", result.stats.summary());
/// # Ok(())
/// # }
/// ```
pub struct ExecutionEngine {
    device: DeviceContext,
    registry: ModelRegistry,
}

impl ExecutionEngine {
    /// Opens the configured device and creates an empty engine.
    pub fn new(config: &EngineConfig) -> Result<Self, EngineError> {
        let capacity = config.parse_capacity()?;
        let device = DeviceContext::open_with_capacity(config.device_index, capacity)?;
        Ok(Self::with_device(device))
    }

    /// Creates an engine around an already-opened device.
    pub fn with_device(device: DeviceContext) -> Self {
        tracing::info!("engine created on {device:?}");
        Self {
            device,
            registry: ModelRegistry::new(),
        }
    }

    /// Loads every model named in the configuration, in order.
    ///
    /// Stops at the first failure; models loaded before the failure stay
    /// registered.
    pub fn load_configured(
        &self,
        config: &EngineConfig,
    ) -> Result<Vec<ModelDescriptor>, EngineError> {
        let mut descriptors = Vec::with_capacity(config.models.len());
        for model in &config.models {
            descriptors.push(self.load_model(model.id.clone(), &model.name, &model.path)?);
        }
        Ok(descriptors)
    }

    /// Loads a model artifact and registers it under `id`.
    ///
    /// Re-loading an already-registered identifier replaces the prior
    /// entry; its allocations are released once no in-flight call holds
    /// them. Any failure aborts the load and leaves the registry unchanged.
    pub fn load_model(
        &self,
        id: impl Into<ModelId>,
        name: &str,
        artifact_path: &Path,
    ) -> Result<ModelDescriptor, EngineError> {
        let id = id.into();
        let plan = Arc::new(CompiledPlan::load(artifact_path)?);

        if plan.target() != self.device.kind() {
            return Err(EngineError::TargetMismatch {
                plan_target: plan.target().to_string(),
                device_kind: self.device.kind().to_string(),
            });
        }

        let mut context = self.device.create_context(Arc::clone(&plan));
        let resolved = resolve_shapes(&plan, &mut context)?;
        let entry = bind_model(
            &self.device,
            id.clone(),
            name.to_string(),
            plan,
            context,
            &resolved,
        )?;

        let descriptor = describe_entry(&entry);
        let replaced = self.registry.insert(id.clone(), entry);
        if replaced.is_some() {
            tracing::info!("replaced model {}", descriptor.summary());
        } else {
            tracing::info!("loaded model {}", descriptor.summary());
        }
        Ok(descriptor)
    }

    /// Unloads a model, releasing its execution context and allocations.
    ///
    /// Atomic from the caller's perspective: after this returns, no new
    /// call can observe the entry; an in-flight call finishes on its own
    /// handle and the allocations are released when it drops.
    pub fn unload_model(&self, id: &ModelId) -> Result<(), EngineError> {
        match self.registry.remove(id) {
            Some(_entry) => {
                tracing::info!("unloaded model '{id}'");
                Ok(())
            }
            None => Err(EngineError::ModelNotFound { id: id.clone() }),
        }
    }

    /// Returns the descriptor of a loaded model.
    pub fn describe(&self, id: &ModelId) -> Result<ModelDescriptor, EngineError> {
        let handle = self.registry.get(id)?;
        let entry = handle.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(describe_entry(&entry))
    }

    /// Returns the ordered input schema: one [`BindingSpec`] per input
    /// binding, in the order an inference payload must be assembled.
    pub fn input_spec(&self, id: &ModelId) -> Result<Vec<BindingSpec>, EngineError> {
        let handle = self.registry.get(id)?;
        let entry = handle.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(entry
            .input_bindings
            .iter()
            .map(|b| BindingSpec::from_binding(b, entry.allocations[b.index].size_bytes()))
            .collect())
    }

    /// Returns the ordered output schema.
    pub fn output_spec(&self, id: &ModelId) -> Result<Vec<BindingSpec>, EngineError> {
        let handle = self.registry.get(id)?;
        let entry = handle.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(entry
            .output_bindings
            .iter()
            .map(|b| BindingSpec::from_binding(b, entry.allocations[b.index].size_bytes()))
            .collect())
    }

    /// Runs one synchronous inference.
    ///
    /// `input` is the concatenation of all input bindings' bytes in
    /// binding-index order; its total length must equal the sum of the
    /// model's input allocation sizes. The call blocks until copy-in,
    /// execution, and copy-out have finished, and returns one tagged
    /// buffer per output binding.
    ///
    /// On execution failure the model transitions to a degraded state and
    /// every further `infer` fails with `ModelDegraded` until the model is
    /// reloaded.
    pub fn infer(&self, id: &ModelId, input: &[u8]) -> Result<InferenceOutput, EngineError> {
        let start = Instant::now();
        let handle = self.registry.get(id)?;
        let mut guard = handle.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let entry = &mut *guard;

        if entry.state == ModelState::Degraded {
            return Err(EngineError::ModelDegraded {
                id: entry.id.clone(),
            });
        }

        if input.len() != entry.input_bytes {
            return Err(EngineError::InputSizeMismatch {
                expected: entry.input_bytes,
                actual: input.len(),
            });
        }

        // Host → device, in binding-index order. The size precheck above
        // guarantees every slice below is exact, so no copy can fail
        // part-way through.
        let h2d_start = Instant::now();
        let mut offset = 0;
        for binding in &entry.input_bindings {
            let allocation = &mut entry.allocations[binding.index];
            let size = allocation.size_bytes();
            allocation.copy_from_host(&input[offset..offset + size])?;
            offset += size;
        }
        let h2d_duration = h2d_start.elapsed();

        // Synchronous execution against the full allocation list.
        let execute_start = Instant::now();
        if let Err(fault) = entry.context.execute(&mut entry.allocations) {
            entry.state = ModelState::Degraded;
            tracing::warn!("model '{}' degraded: {fault}", entry.id);
            return Err(EngineError::ExecutionFailed {
                id: entry.id.clone(),
                source: fault,
            });
        }
        let execute_duration = execute_start.elapsed();

        // Device → host, in output-binding order.
        let d2h_start = Instant::now();
        for (slot, binding) in entry.output_bindings.iter().enumerate() {
            entry.allocations[binding.index].copy_to_host(&mut entry.mirrors[slot])?;
        }
        let d2h_duration = d2h_start.elapsed();

        let outputs: Vec<OutputBuffer> = entry
            .output_bindings
            .iter()
            .zip(&entry.mirrors)
            .map(|(binding, mirror)| OutputBuffer {
                index: binding.index,
                name: binding.name.clone(),
                dtype: binding.dtype,
                shape: binding.shape.clone(),
                data: mirror.clone(),
            })
            .collect();

        let stats = InferenceStats {
            h2d_duration,
            execute_duration,
            d2h_duration,
            total_duration: start.elapsed(),
            input_bytes: input.len(),
            output_bytes: outputs.iter().map(|o| o.data.len()).sum(),
        };
        tracing::debug!("model '{}': {}", entry.id, stats.summary());

        Ok(InferenceOutput { outputs, stats })
    }

    /// Identifiers of all loaded models, sorted.
    pub fn loaded_models(&self) -> Vec<ModelId> {
        self.registry.ids()
    }

    /// Number of loaded models.
    pub fn num_models(&self) -> usize {
        self.registry.len()
    }

    /// The engine's device.
    pub fn device(&self) -> &DeviceContext {
        &self.device
    }

    /// Snapshot of device memory statistics.
    pub fn device_stats(&self) -> DeviceStats {
        self.device.stats()
    }
}

impl std::fmt::Debug for ExecutionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionEngine")
            .field("device", &self.device)
            .field("num_models", &self.num_models())
            .finish()
    }
}

/// Builds a descriptor from a registry entry.
fn describe_entry(entry: &crate::registry::ModelEntry) -> ModelDescriptor {
    ModelDescriptor {
        name: entry.name.clone(),
        id: entry.id.clone(),
        num_ops: entry.plan.num_ops(),
        num_tensors: entry.plan.binding_count(),
        input_tensor_indices: entry.input_bindings.iter().map(|b| b.index).collect(),
        output_tensor_indices: entry.output_bindings.iter().map(|b| b.index).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compute_device::DeviceCapacity;

    fn write_artifact(name: &str, manifest_json: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("engine-unit-{name}"));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("plan.json"), manifest_json).unwrap();
        dir
    }

    fn small_engine() -> ExecutionEngine {
        let device = DeviceContext::open_with_capacity(0, DeviceCapacity::from_mb(16)).unwrap();
        ExecutionEngine::with_device(device)
    }

    #[test]
    fn test_new_invalid_capacity() {
        let config = EngineConfig {
            device_memory: "bogus".into(),
            ..Default::default()
        };
        assert!(matches!(
            ExecutionEngine::new(&config),
            Err(EngineError::Config(_))
        ));
    }

    #[test]
    fn test_new_device_out_of_range() {
        let config = EngineConfig {
            device_index: 7,
            ..Default::default()
        };
        assert!(matches!(
            ExecutionEngine::new(&config),
            Err(EngineError::Device(
                compute_device::DeviceError::DeviceNotFound { .. }
            ))
        ));
    }

    #[test]
    fn test_target_mismatch_rejected() {
        let dir = write_artifact(
            "wrong-target",
            r#"{
                "format_version": 1,
                "name": "cuda-built",
                "target": "cuda",
                "bindings": [
                    { "name": "in", "direction": "input", "dtype": "f32", "dims": [1] },
                    { "name": "out", "direction": "output", "dtype": "f32", "dims": [1] }
                ]
            }"#,
        );
        let engine = small_engine();
        let result = engine.load_model("m1", "cuda-built", &dir);
        assert!(matches!(result, Err(EngineError::TargetMismatch { .. })));
        assert_eq!(engine.num_models(), 0);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_infer_unknown_model() {
        let engine = small_engine();
        let result = engine.infer(&"ghost".into(), &[0u8; 4]);
        assert!(matches!(result, Err(EngineError::ModelNotFound { .. })));
    }

    #[test]
    fn test_unload_unknown_model() {
        let engine = small_engine();
        assert!(matches!(
            engine.unload_model(&"ghost".into()),
            Err(EngineError::ModelNotFound { .. })
        ));
    }

    #[test]
    fn test_describe_and_specs() {
        let dir = write_artifact(
            "describe",
            r#"{
                "format_version": 1,
                "name": "fixture",
                "num_ops": 3,
                "bindings": [
                    { "name": "in", "direction": "input", "dtype": "f32", "dims": [1, 4] },
                    { "name": "out", "direction": "output", "dtype": "f32", "dims": [1, 3] }
                ]
            }"#,
        );
        let engine = small_engine();
        let descriptor = engine.load_model("m1", "fixture", &dir).unwrap();
        assert_eq!(descriptor, engine.describe(&"m1".into()).unwrap());
        assert_eq!(descriptor.num_ops, 3);
        assert_eq!(descriptor.num_tensors, 2);

        let inputs = engine.input_spec(&"m1".into()).unwrap();
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].name, "in");
        assert_eq!(inputs[0].byte_size, 16);

        let outputs = engine.output_spec(&"m1".into()).unwrap();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].index, 1);
        assert_eq!(outputs[0].byte_size, 12);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_debug_format() {
        let engine = small_engine();
        let debug = format!("{engine:?}");
        assert!(debug.contains("ExecutionEngine"));
        assert!(debug.contains("num_models"));
    }
}
