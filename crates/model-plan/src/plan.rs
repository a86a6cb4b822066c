// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Validated compiled plans.
//!
//! [`CompiledPlan`] is the immutable form of an artifact after the manifest
//! has been parsed, structurally validated, and cross-checked against the
//! constants file. The execution layer shares it behind an `Arc`; nothing in
//! it changes after `load` returns.

use std::path::Path;

use tensor_schema::{BindingDirection, ProfileEntry, TensorBinding, TensorShape};

use crate::manifest::OutputSource;
use crate::{PlanConstants, PlanError, PlanManifest};

/// Manifest filename inside an artifact directory.
const MANIFEST_FILE: &str = "plan.json";

/// Constants filename inside an artifact directory.
const CONSTANTS_FILE: &str = "constants.safetensors";

/// A deserialized, validated compiled model artifact.
///
/// # Example
/// ```no_run
/// use model_plan::CompiledPlan;
/// use std::path::Path;
///
/// let plan = CompiledPlan::load(Path::new("./models/mobilenet-v2.plan")).unwrap();
/// println!("{}", plan.summary());
/// ```
#[derive(Debug)]
pub struct CompiledPlan {
    name: String,
    target: String,
    num_ops: usize,
    bindings: Vec<TensorBinding>,
    /// Program step per binding index; `None` for inputs.
    sources: Vec<Option<OutputSource>>,
    profiles: Vec<ProfileEntry>,
    constants: PlanConstants,
}

impl CompiledPlan {
    /// Loads and validates an artifact from the given directory.
    ///
    /// Steps:
    /// 1. Parse `plan.json` and validate it structurally.
    /// 2. Load `constants.safetensors` if present.
    /// 3. Cross-check every `constant` program step against the constants
    ///    (existence, dtype, byte size for static outputs).
    pub fn load(artifact_dir: &Path) -> Result<Self, PlanError> {
        let manifest = PlanManifest::from_file(&artifact_dir.join(MANIFEST_FILE))?;

        let constants_path = artifact_dir.join(CONSTANTS_FILE);
        let constants = if constants_path.exists() {
            PlanConstants::from_file(&constants_path)?
        } else {
            PlanConstants::default()
        };

        let plan = Self::from_manifest(manifest, constants)?;
        tracing::debug!(
            "loaded plan '{}' from '{}': {}",
            plan.name,
            artifact_dir.display(),
            plan.summary(),
        );
        Ok(plan)
    }

    /// Builds a plan from an already-parsed manifest and constants table.
    ///
    /// Useful for tests that do not want to touch the file system.
    pub fn from_manifest(
        manifest: PlanManifest,
        constants: PlanConstants,
    ) -> Result<Self, PlanError> {
        manifest.validate()?;

        let mut bindings = Vec::with_capacity(manifest.bindings.len());
        let mut sources = Vec::with_capacity(manifest.bindings.len());

        for (index, mb) in manifest.bindings.iter().enumerate() {
            let binding = TensorBinding {
                index,
                name: mb.name.clone(),
                direction: mb.direction,
                dtype: mb.dtype,
                shape: TensorShape::new(mb.dims.clone()),
            };

            let source = match mb.direction {
                BindingDirection::Input => None,
                BindingDirection::Output => {
                    Some(mb.source.clone().unwrap_or(OutputSource::Loopback))
                }
            };

            if let Some(OutputSource::Constant { tensor }) = &source {
                check_constant(tensor, &binding, &constants)?;
            }

            bindings.push(binding);
            sources.push(source);
        }

        Ok(Self {
            name: manifest.name,
            target: manifest.target,
            num_ops: manifest.num_ops,
            bindings,
            sources,
            profiles: manifest.profiles,
            constants,
        })
    }

    /// Model name recorded by the artifact builder.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Device kind the plan was built for.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Builder-reported operation count.
    pub fn num_ops(&self) -> usize {
        self.num_ops
    }

    /// Number of declared bindings.
    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    /// All bindings, in binding-index order.
    pub fn bindings(&self) -> &[TensorBinding] {
        &self.bindings
    }

    /// One binding by index.
    pub fn binding(&self, index: usize) -> Option<&TensorBinding> {
        self.bindings.get(index)
    }

    /// The program step for a binding index; `None` for inputs.
    pub fn source(&self, index: usize) -> Option<&OutputSource> {
        self.sources.get(index).and_then(|s| s.as_ref())
    }

    /// Declared optimization profiles.
    pub fn profiles(&self) -> &[ProfileEntry] {
        &self.profiles
    }

    /// The profile entry covering the named binding, if any.
    pub fn profile_for(&self, binding_name: &str) -> Option<&ProfileEntry> {
        self.profiles.iter().find(|p| p.binding == binding_name)
    }

    /// Constant tensor lookup for `constant` program steps.
    pub fn constant(&self, name: &str) -> Option<&crate::ConstTensor> {
        self.constants.get(name)
    }

    /// Number of input bindings.
    pub fn input_count(&self) -> usize {
        self.bindings
            .iter()
            .filter(|b| b.direction.is_input())
            .count()
    }

    /// Number of output bindings.
    pub fn output_count(&self) -> usize {
        self.bindings.len() - self.input_count()
    }

    /// One-line rendering for logs.
    pub fn summary(&self) -> String {
        format!(
            "'{}' target={} {} bindings ({} in / {} out), {} ops, {} constants",
            self.name,
            self.target,
            self.binding_count(),
            self.input_count(),
            self.output_count(),
            self.num_ops,
            self.constants.len(),
        )
    }
}

/// Cross-checks one `constant` reference against the constants table.
fn check_constant(
    tensor: &str,
    binding: &TensorBinding,
    constants: &PlanConstants,
) -> Result<(), PlanError> {
    let constant = constants.get(tensor).ok_or_else(|| PlanError::MissingConstant {
        name: tensor.to_string(),
    })?;

    if constant.dtype != binding.dtype {
        return Err(PlanError::ConstantDTypeMismatch {
            name: tensor.to_string(),
            expected: binding.dtype,
            found: constant.dtype,
        });
    }

    // Static outputs can be size-checked now; a dynamic output dimension is
    // rejected later, when the binding is sized for allocation.
    if let Ok(expected) = binding.byte_size() {
        if constant.data.len() != expected {
            return Err(PlanError::ConstantSizeMismatch {
                name: tensor.to_string(),
                expected,
                actual: constant.data.len(),
            });
        }
    }

    Ok(())
}
