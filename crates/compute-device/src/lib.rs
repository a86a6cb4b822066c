// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # compute-device
//!
//! The reference compute device: device selection, capacity-bounded device
//! memory, and synchronous plan execution.
//!
//! # Key Components
//!
//! - [`DeviceContext`] — the handle to one opened device. Enforces a hard
//!   memory capacity, tracks allocation statistics, and derives execution
//!   contexts for compiled plans.
//! - [`DeviceBuffer`] — an RAII wrapper around one device allocation. Host
//!   data crosses the device boundary only through strict-length
//!   `copy_from_host` / `copy_to_host`; the reservation is returned on drop.
//! - [`ExecutionContext`] — per-model run-time state: committed shapes for
//!   dynamic bindings plus the synchronous `execute` call, addressed purely
//!   by binding index.
//! - [`DeviceCapacity`] — the memory ceiling, with human-readable parsing
//!   (`"512M"`, `"4G"`, ...).
//! - [`DeviceStats`] — cumulative device memory metrics.
//!
//! # Ownership Model
//!
//! ```text
//! DeviceContext::alloc(size)
//!       │
//!       ▼
//!   DeviceBuffer  ◄─── owns the device bytes, holds Arc<DeviceInner>
//!       │
//!       │  drop()
//!       ▼
//!   DeviceInner::release()  ──► capacity returned
//! ```
//!
//! This crate is a software stand-in for an accelerator backend: it honors
//! the full device discipline (activation by index, bounded capacity,
//! explicit transfers, execution by allocation list) while computing outputs
//! with the deterministic program steps a plan declares. A hardware backend
//! would replace this crate behind the same API.

mod buffer;
mod capacity;
mod context;
mod error;
mod exec;
mod stats;

pub use buffer::DeviceBuffer;
pub use capacity::DeviceCapacity;
pub use context::{DeviceContext, REFERENCE_DEVICE_KIND};
pub use error::DeviceError;
pub use exec::ExecutionContext;
pub use stats::DeviceStats;
