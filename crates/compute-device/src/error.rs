// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for device management and execution.

/// Errors that can occur at the device boundary.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// The requested device index does not name a visible device.
    #[error("device index {index} out of range ({count} device(s) visible)")]
    DeviceNotFound { index: usize, count: usize },

    /// The requested allocation would exceed the device capacity.
    #[error("out of device memory: requested {requested_bytes} bytes, but only {available_bytes} available (capacity: {capacity_bytes})")]
    OutOfDeviceMemory {
        requested_bytes: usize,
        available_bytes: usize,
        capacity_bytes: usize,
    },

    /// Attempted to allocate a zero-sized device buffer.
    #[error("cannot allocate zero-sized device buffer")]
    ZeroSizeAllocation,

    /// A host↔device copy was issued with a wrong-length host slice.
    #[error("{direction} transfer size mismatch: device allocation is {device_bytes} bytes, host slice is {host_bytes}")]
    TransferSizeMismatch {
        direction: &'static str,
        device_bytes: usize,
        host_bytes: usize,
    },

    /// Executing a plan against the device failed.
    #[error("device execution fault: {detail}")]
    ExecutionFault { detail: String },

    /// A capacity string could not be parsed.
    #[error("invalid device capacity: {detail}")]
    InvalidCapacity { detail: String },
}
