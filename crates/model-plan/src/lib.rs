// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # model-plan
//!
//! The on-disk container for compiled model artifacts and its validated
//! in-memory form.
//!
//! An artifact is a directory:
//! - `plan.json` — the plan manifest: ordered tensor bindings, optimization
//!   profiles, and the per-output program steps the reference device runs
//!   (see [`PlanManifest`] for the format).
//! - `constants.safetensors` — optional baked tensors referenced by
//!   `constant` program steps, in SafeTensors format.
//!
//! This crate parses and validates artifacts; it does not touch devices.
//! [`CompiledPlan`] is the immutable result handed to the execution layer —
//! binding order in the manifest *is* the binding index order every
//! allocation and execution call uses.

mod constants;
mod error;
mod manifest;
mod plan;

pub use constants::{dtype_from_safetensors, dtype_to_safetensors, ConstTensor, PlanConstants};
pub use error::PlanError;
pub use manifest::{ManifestBinding, OutputSource, PlanManifest};
pub use plan::CompiledPlan;
