// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for artifact parsing and validation.

use tensor_schema::DType;

/// Errors that can occur when loading a compiled model plan.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// The plan manifest file could not be read.
    #[error("failed to read plan manifest: {0}")]
    ManifestRead(#[from] std::io::Error),

    /// The manifest JSON is malformed.
    #[error("failed to parse plan manifest: {0}")]
    ManifestParse(#[from] serde_json::Error),

    /// The manifest declares a format this build does not understand.
    #[error("unsupported plan format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    /// Two bindings share a name.
    #[error("duplicate binding name '{name}'")]
    DuplicateBinding { name: String },

    /// An input binding declares an output program step.
    #[error("input binding '{name}' declares an output source")]
    SourceOnInput { name: String },

    /// An optimization-profile entry names a binding the plan does not have.
    #[error("profile entry references unknown binding '{name}'")]
    UnknownProfileBinding { name: String },

    /// The constants file could not be loaded.
    #[error("failed to load constants: {0}")]
    Constants(String),

    /// A `constant` program step references a tensor that is not in the
    /// constants file.
    #[error("constant tensor not found: {name}")]
    MissingConstant { name: String },

    /// A referenced constant does not match its output binding's byte size.
    #[error("constant '{name}' is {actual} bytes, binding needs {expected}")]
    ConstantSizeMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// A referenced constant does not match its output binding's dtype.
    #[error("constant '{name}' is {found}, binding declares {expected}")]
    ConstantDTypeMismatch {
        name: String,
        expected: DType,
        found: DType,
    },
}
