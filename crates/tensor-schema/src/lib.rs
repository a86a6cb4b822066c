// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tensor-schema
//!
//! Tensor *metadata* for compiled-model execution: the types that describe
//! what a model's inputs and outputs look like, without carrying any tensor
//! data or arithmetic.
//!
//! This crate provides:
//! - [`DType`] — supported element data types (f32, f16, i8, i32, bool).
//! - [`TensorShape`] — dimension lists with a `-1` sentinel for dimensions
//!   that are only resolved at load time.
//! - [`TensorBinding`] — one named input or output slot of a model, addressed
//!   by a stable integer index.
//! - [`ProfileEntry`] — the (min, opt, max) candidate shapes an input binding
//!   with a dynamic dimension may take.
//!
//! # Design Goals
//! - Pure data: everything here is `Clone`, serializable, and free of device
//!   or file-system concerns.
//! - Checked size math: byte sizes are computed through fallible methods so a
//!   negative or overflowing dimension can never silently size a buffer.

mod binding;
mod dtype;
mod error;
mod profile;
mod shape;

pub use binding::{BindingDirection, TensorBinding};
pub use dtype::DType;
pub use error::ShapeError;
pub use profile::ProfileEntry;
pub use shape::TensorShape;
