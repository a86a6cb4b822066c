// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! JSON plan manifest parsing.
//!
//! The manifest (`plan.json`) describes a compiled model artifact: its tensor
//! bindings in execution order (array position is the binding index), the
//! optimization profiles for dynamic dimensions, and the program step that
//! produces each output on the reference device.
//!
//! # Format
//! ```json
//! {
//!   "format_version": 1,
//!   "name": "mobilenet-v2",
//!   "target": "reference",
//!   "num_ops": 66,
//!   "bindings": [
//!     { "name": "images", "direction": "input", "dtype": "f32",
//!       "dims": [-1, 224, 224, 3] },
//!     { "name": "logits", "direction": "output", "dtype": "f32",
//!       "dims": [1, 1000], "source": "loopback" }
//!   ],
//!   "profiles": [
//!     { "binding": "images",
//!       "shapes": [[1, 224, 224, 3], [4, 224, 224, 3], [8, 224, 224, 3]] }
//!   ]
//! }
//! ```

use std::path::Path;

use tensor_schema::{BindingDirection, DType, ProfileEntry};

use crate::PlanError;

/// Manifest format version this build reads.
pub(crate) const FORMAT_VERSION: u32 = 1;

/// Top-level plan manifest, deserialized from `plan.json`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PlanManifest {
    /// Container format version; must equal 1.
    pub format_version: u32,
    /// Human-readable model name (e.g., `"mobilenet-v2"`).
    pub name: String,
    /// Device kind the plan was built for (e.g., `"reference"`).
    #[serde(default = "default_target")]
    pub target: String,
    /// Operation count reported by the artifact builder. Descriptor label
    /// only; the engine never interprets it.
    #[serde(default)]
    pub num_ops: usize,
    /// Tensor bindings in binding-index order.
    pub bindings: Vec<ManifestBinding>,
    /// Optimization profiles for bindings with dynamic dimensions.
    #[serde(default)]
    pub profiles: Vec<ProfileEntry>,
}

fn default_target() -> String {
    "reference".to_string()
}

/// A single binding entry in the manifest.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ManifestBinding {
    /// Binding name, unique within the plan.
    pub name: String,
    /// Whether the binding is an input or an output.
    pub direction: BindingDirection,
    /// Element type.
    pub dtype: DType,
    /// Declared dimensions; `-1` in the leading position means the dimension
    /// is resolved against a profile at load time.
    pub dims: Vec<i64>,
    /// Program step producing this binding. Outputs only; defaults to
    /// `loopback` when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<OutputSource>,
}

/// Program step that fills one output binding when the reference device
/// executes the plan.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputSource {
    /// Fill the output by cycling the concatenation of all input
    /// allocations' bytes, in binding-index order.
    Loopback,
    /// Copy the named tensor from `constants.safetensors`.
    Constant { tensor: String },
    /// Fail the execution call. Used to exercise failure handling.
    Trap,
}

impl PlanManifest {
    /// Loads a manifest from a JSON file path.
    pub fn from_file(path: &Path) -> Result<Self, PlanError> {
        let content = std::fs::read_to_string(path)?;
        let manifest: Self = serde_json::from_str(&content)?;
        Ok(manifest)
    }

    /// Parses a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, PlanError> {
        let manifest: Self = serde_json::from_str(json)?;
        Ok(manifest)
    }

    /// Validates that the manifest is structurally sound.
    ///
    /// Checks:
    /// - The format version is one this build reads.
    /// - Binding names are unique.
    /// - No input binding declares a program step.
    /// - Every profile entry names a binding that exists.
    ///
    /// Deliberately *not* checked here: the presence of inputs and outputs.
    /// That is a load post-condition with registry semantics, owned by the
    /// engine.
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.format_version != FORMAT_VERSION {
            return Err(PlanError::UnsupportedVersion {
                found: self.format_version,
                expected: FORMAT_VERSION,
            });
        }

        let mut seen_names = std::collections::HashSet::new();
        for binding in &self.bindings {
            if !seen_names.insert(binding.name.as_str()) {
                return Err(PlanError::DuplicateBinding {
                    name: binding.name.clone(),
                });
            }
            if binding.direction.is_input() && binding.source.is_some() {
                return Err(PlanError::SourceOnInput {
                    name: binding.name.clone(),
                });
            }
        }

        for profile in &self.profiles {
            if !seen_names.contains(profile.binding.as_str()) {
                return Err(PlanError::UnknownProfileBinding {
                    name: profile.binding.clone(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_manifest_json() -> &'static str {
        r#"{
            "format_version": 1,
            "name": "mobilenet-v2",
            "target": "reference",
            "num_ops": 66,
            "bindings": [
                { "name": "images", "direction": "input", "dtype": "f32",
                  "dims": [-1, 224, 224, 3] },
                { "name": "logits", "direction": "output", "dtype": "f32",
                  "dims": [1, 1000], "source": "loopback" }
            ],
            "profiles": [
                { "binding": "images",
                  "shapes": [[1, 224, 224, 3], [4, 224, 224, 3], [8, 224, 224, 3]] }
            ]
        }"#
    }

    #[test]
    fn test_parse_manifest() {
        let m = PlanManifest::from_json(sample_manifest_json()).unwrap();
        assert_eq!(m.name, "mobilenet-v2");
        assert_eq!(m.target, "reference");
        assert_eq!(m.num_ops, 66);
        assert_eq!(m.bindings.len(), 2);
        assert_eq!(m.profiles.len(), 1);
        assert_eq!(m.bindings[0].dims, vec![-1, 224, 224, 3]);
        assert_eq!(m.bindings[1].source, Some(OutputSource::Loopback));
    }

    #[test]
    fn test_validate_ok() {
        let m = PlanManifest::from_json(sample_manifest_json()).unwrap();
        m.validate().unwrap();
    }

    #[test]
    fn test_defaults() {
        let json = r#"{
            "format_version": 1,
            "name": "minimal",
            "bindings": [
                { "name": "in", "direction": "input", "dtype": "i8", "dims": [4] },
                { "name": "out", "direction": "output", "dtype": "i8", "dims": [4] }
            ]
        }"#;
        let m = PlanManifest::from_json(json).unwrap();
        assert_eq!(m.target, "reference");
        assert_eq!(m.num_ops, 0);
        assert!(m.profiles.is_empty());
        assert!(m.bindings[1].source.is_none());
        m.validate().unwrap();
    }

    #[test]
    fn test_unsupported_version() {
        let json = r#"{
            "format_version": 9,
            "name": "future",
            "bindings": []
        }"#;
        let m = PlanManifest::from_json(json).unwrap();
        assert!(matches!(
            m.validate(),
            Err(PlanError::UnsupportedVersion { found: 9, expected: 1 })
        ));
    }

    #[test]
    fn test_duplicate_binding_names() {
        let json = r#"{
            "format_version": 1,
            "name": "dup",
            "bindings": [
                { "name": "x", "direction": "input", "dtype": "f32", "dims": [1] },
                { "name": "x", "direction": "output", "dtype": "f32", "dims": [1] }
            ]
        }"#;
        let m = PlanManifest::from_json(json).unwrap();
        assert!(matches!(
            m.validate(),
            Err(PlanError::DuplicateBinding { .. })
        ));
    }

    #[test]
    fn test_source_on_input_rejected() {
        let json = r#"{
            "format_version": 1,
            "name": "bad",
            "bindings": [
                { "name": "in", "direction": "input", "dtype": "f32", "dims": [1],
                  "source": "loopback" },
                { "name": "out", "direction": "output", "dtype": "f32", "dims": [1] }
            ]
        }"#;
        let m = PlanManifest::from_json(json).unwrap();
        assert!(matches!(m.validate(), Err(PlanError::SourceOnInput { .. })));
    }

    #[test]
    fn test_profile_unknown_binding() {
        let json = r#"{
            "format_version": 1,
            "name": "bad",
            "bindings": [
                { "name": "in", "direction": "input", "dtype": "f32", "dims": [1] }
            ],
            "profiles": [
                { "binding": "ghost", "shapes": [[1], [2], [4]] }
            ]
        }"#;
        let m = PlanManifest::from_json(json).unwrap();
        assert!(matches!(
            m.validate(),
            Err(PlanError::UnknownProfileBinding { .. })
        ));
    }

    #[test]
    fn test_unknown_dtype_fails_parse() {
        let json = r#"{
            "format_version": 1,
            "name": "bad",
            "bindings": [
                { "name": "in", "direction": "input", "dtype": "f64", "dims": [1] }
            ]
        }"#;
        assert!(matches!(
            PlanManifest::from_json(json),
            Err(PlanError::ManifestParse(_))
        ));
    }

    #[test]
    fn test_constant_source_form() {
        let json = r#"{
            "format_version": 1,
            "name": "fixture",
            "bindings": [
                { "name": "in", "direction": "input", "dtype": "f32", "dims": [1] },
                { "name": "out", "direction": "output", "dtype": "f32", "dims": [1, 3],
                  "source": { "constant": { "tensor": "baked" } } }
            ]
        }"#;
        let m = PlanManifest::from_json(json).unwrap();
        assert_eq!(
            m.bindings[1].source,
            Some(OutputSource::Constant {
                tensor: "baked".to_string()
            })
        );
    }

    #[test]
    fn test_serde_roundtrip() {
        let m = PlanManifest::from_json(sample_manifest_json()).unwrap();
        let json = serde_json::to_string_pretty(&m).unwrap();
        let back = PlanManifest::from_json(&json).unwrap();
        assert_eq!(back.name, m.name);
        assert_eq!(back.bindings.len(), m.bindings.len());
        assert_eq!(back.bindings[1].source, m.bindings[1].source);
    }
}
