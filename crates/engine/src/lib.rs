// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # engine
//!
//! The multi-model inference execution engine: load compiled model
//! artifacts onto one compute device, run synchronous inference against
//! them by identifier, and expose their resolved tensor schemas.
//!
//! # Key Components
//!
//! - [`ExecutionEngine`] — the engine itself: one device, many models, a
//!   uniform `load` / `infer` / `describe` / `unload` contract.
//! - [`EngineConfig`] — TOML configuration: device selection, memory
//!   capacity, and the models to load at startup.
//! - [`ModelDescriptor`] / [`BindingSpec`] — what a serving layer sees of a
//!   loaded model: binding indices, resolved shapes, exact buffer sizes.
//! - [`InferenceOutput`] / [`InferenceStats`] — tagged output buffers and
//!   the per-call phase timing.
//! - [`EngineError`] — every load-time and call-time failure as a distinct
//!   variant.
//!
//! # Load Pipeline
//!
//! ```text
//! artifact dir ─► CompiledPlan ─► target check ─► shape resolution
//!      (model-plan)                              (profile maximum)
//!                                                      │
//!                  registry entry ◄── device buffers ◄─┘
//!                  (one per model)    (one per binding, exact size)
//! ```
//!
//! # Concurrency
//!
//! The engine is `Sync`: all methods take `&self`. Calls against one model
//! serialize on that model's entry; calls against different models proceed
//! in parallel. A model that fails execution degrades and stays loaded but
//! unusable until it is reloaded under the same identifier.

mod allocator;
mod config;
mod descriptor;
mod engine;
mod error;
mod metrics;
mod registry;
mod resolver;

pub use config::{EngineConfig, ModelConfig};
pub use descriptor::{BindingSpec, ModelDescriptor};
pub use engine::{ExecutionEngine, InferenceOutput, OutputBuffer};
pub use error::EngineError;
pub use metrics::InferenceStats;
pub use registry::ModelId;
