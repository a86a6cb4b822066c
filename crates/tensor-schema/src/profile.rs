// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Optimization-profile entries for dynamic-shape resolution.

use crate::TensorShape;

/// The candidate shapes one input binding supports for its dynamic
/// dimensions, as declared by the artifact builder.
///
/// A well-formed entry carries exactly three shapes — minimum, optimum,
/// maximum, in that order. The list length is *not* enforced here because
/// artifacts are untrusted input; the shape resolver checks arity and
/// reports a malformed profile instead of panicking on a short list.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ProfileEntry {
    /// Name of the input binding this entry constrains.
    pub binding: String,
    /// Candidate shapes; `[min, opt, max]` when well-formed.
    pub shapes: Vec<TensorShape>,
}

impl ProfileEntry {
    /// Number of shapes a well-formed entry must declare.
    pub const TRIPLE: usize = 3;

    /// Returns `true` when the entry declares exactly the min/opt/max triple.
    pub fn is_triple(&self) -> bool {
        self.shapes.len() == Self::TRIPLE
    }

    /// The minimum supported shape, if declared.
    pub fn min(&self) -> Option<&TensorShape> {
        self.shapes.first()
    }

    /// The preferred shape, if declared.
    pub fn opt(&self) -> Option<&TensorShape> {
        self.shapes.get(1)
    }

    /// The maximum supported shape, if declared.
    ///
    /// This is the shape the resolver commits for dynamic bindings.
    pub fn max(&self) -> Option<&TensorShape> {
        self.shapes.get(2)
    }
}
