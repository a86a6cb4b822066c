// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The model registry: the single authority for identifier-to-entry
//! resolution.
//!
//! Each loaded model is one [`ModelEntry`] owning everything the model
//! needs to execute: the compiled plan, its execution context, the ordered
//! binding lists, the device allocations (one per binding, indexed by
//! binding index), and the host mirrors that receive output copy-back.
//! Binding order couples allocation, execution, and copy-back, so the
//! entry keeps exactly one ordered allocation list rather than separate
//! per-direction structures.
//!
//! Entries live behind `Arc<Mutex<…>>` inside an `RwLock`ed map. Lookups
//! clone the entry handle and release the map lock before doing any device
//! work; replace and unload swap the map entry and let in-flight holders
//! finish on their own handle — the old allocation set is released when
//! the last handle drops. Locking an entry for the duration of an `infer`
//! is what makes the per-model serialization contract structural: calls
//! against one model queue, calls against different models run in parallel.

use crate::EngineError;
use compute_device::{DeviceBuffer, ExecutionContext};
use model_plan::CompiledPlan;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, RwLock};
use tensor_schema::TensorBinding;

/// Opaque registry identifier for a loaded model.
///
/// The engine never interprets the identifier beyond using it as the
/// registry key; the human-readable model name is a descriptor label only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ModelId(String);

impl ModelId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ModelId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ModelId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state of a loaded model.
///
/// `Ready` and `Degraded` are the only states observable from outside: an
/// entry is constructed fully before insertion (so `Loading` never leaks),
/// and `Executing` is simply the span during which the entry's mutex is
/// held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ModelState {
    /// The model can serve inference calls.
    Ready,
    /// A previous execution failed; the allocations are in an unspecified
    /// state and the model must be reloaded before further use.
    Degraded,
}

/// Everything one loaded model owns.
pub(crate) struct ModelEntry {
    pub(crate) id: ModelId,
    pub(crate) name: String,
    pub(crate) plan: Arc<CompiledPlan>,
    pub(crate) context: ExecutionContext,
    /// Input bindings with resolved shapes, in binding-index order.
    pub(crate) input_bindings: Vec<TensorBinding>,
    /// Output bindings with resolved shapes, in binding-index order.
    pub(crate) output_bindings: Vec<TensorBinding>,
    /// One device allocation per binding, indexed by binding index —
    /// inputs and outputs interleaved exactly as the execution call
    /// requires.
    pub(crate) allocations: Vec<DeviceBuffer>,
    /// Host mirror per output binding, parallel to `output_bindings`.
    pub(crate) mirrors: Vec<Vec<u8>>,
    /// Sum of input allocation sizes; an inference payload must match
    /// this exactly.
    pub(crate) input_bytes: usize,
    pub(crate) state: ModelState,
}

impl fmt::Debug for ModelEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelEntry")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("bindings", &self.allocations.len())
            .field("state", &self.state)
            .finish()
    }
}

/// Handle type shared between the registry map and in-flight calls.
pub(crate) type EntryHandle = Arc<Mutex<ModelEntry>>;

/// Identifier-keyed map of loaded models.
#[derive(Default)]
pub(crate) struct ModelRegistry {
    entries: RwLock<HashMap<ModelId, EntryHandle>>,
}

impl ModelRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry, returning the replaced handle if the identifier
    /// was already registered.
    pub(crate) fn insert(&self, id: ModelId, entry: ModelEntry) -> Option<EntryHandle> {
        let mut map = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        map.insert(id, Arc::new(Mutex::new(entry)))
    }

    /// Looks up an entry handle; the map lock is released before return.
    pub(crate) fn get(&self, id: &ModelId) -> Result<EntryHandle, EngineError> {
        let map = self
            .entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        map.get(id)
            .cloned()
            .ok_or_else(|| EngineError::ModelNotFound { id: id.clone() })
    }

    /// Removes an entry, returning its handle so the caller can log before
    /// the allocations drop.
    pub(crate) fn remove(&self, id: &ModelId) -> Option<EntryHandle> {
        let mut map = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        map.remove(id)
    }

    /// Registered identifiers, sorted for stable output.
    pub(crate) fn ids(&self) -> Vec<ModelId> {
        let map = self
            .entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut ids: Vec<ModelId> = map.keys().cloned().collect();
        ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        ids
    }

    pub(crate) fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}
