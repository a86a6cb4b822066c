// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Device selection and capacity-bounded allocation.
//!
//! A [`DeviceContext`] is the handle to one compute device. It must be
//! opened before anything can be allocated or executed, and every buffer
//! and execution context created through it is directed at that device.
//!
//! This crate ships the *reference device*: an in-process software device
//! that enforces the full device discipline (explicit activation by index,
//! a hard memory capacity, explicit host↔device copies) while keeping
//! everything testable without accelerator hardware.

use crate::exec::ExecutionContext;
use crate::{DeviceBuffer, DeviceCapacity, DeviceError, DeviceStats};
use model_plan::CompiledPlan;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Number of devices the reference backend makes visible.
const VISIBLE_DEVICES: usize = 1;

/// Device-kind string plans must be built for.
pub const REFERENCE_DEVICE_KIND: &str = "reference";

/// Internal device state, shared between the context and buffer guards
/// via `Arc` so a buffer can return its reservation without a reference
/// to the full `DeviceContext`.
pub(crate) struct DeviceInner {
    /// Index of the opened device.
    index: usize,
    /// The memory capacity ceiling.
    capacity: DeviceCapacity,
    /// Currently allocated bytes (live, not yet released).
    allocated_bytes: AtomicUsize,
    /// Statistics (behind a Mutex since updates are infrequent).
    stats: Mutex<DeviceStats>,
}

impl DeviceInner {
    /// Called by `DeviceBuffer::drop` to return a reservation.
    pub(crate) fn release(&self, size_bytes: usize) {
        self.allocated_bytes.fetch_sub(size_bytes, Ordering::Release);
        if let Ok(mut stats) = self.stats.lock() {
            stats.record_release();
        }
    }
}

/// The handle to one opened compute device.
///
/// Exactly one `DeviceContext` is live per engine instance; models are
/// never migrated between devices after load. The context is cheaply
/// cloneable (it shares the underlying device state).
///
/// # Example
/// ```
/// use compute_device::{DeviceCapacity, DeviceContext};
///
/// let device = DeviceContext::open_with_capacity(0, DeviceCapacity::from_mb(64)).unwrap();
///
/// let buf = device.alloc(1024).unwrap();
/// assert_eq!(device.allocated_bytes(), 1024);
///
/// // The reservation is returned when the buffer is dropped.
/// drop(buf);
/// assert_eq!(device.allocated_bytes(), 0);
/// ```
#[derive(Clone)]
pub struct DeviceContext {
    inner: Arc<DeviceInner>,
}

impl DeviceContext {
    /// Selects and activates the device at `device_index` with the default
    /// capacity (4 GiB).
    ///
    /// Fails with `DeviceNotFound` if the index is out of range.
    pub fn open(device_index: usize) -> Result<Self, DeviceError> {
        Self::open_with_capacity(device_index, DeviceCapacity::default())
    }

    /// Selects and activates the device at `device_index` with an explicit
    /// memory capacity.
    pub fn open_with_capacity(
        device_index: usize,
        capacity: DeviceCapacity,
    ) -> Result<Self, DeviceError> {
        if device_index >= VISIBLE_DEVICES {
            return Err(DeviceError::DeviceNotFound {
                index: device_index,
                count: VISIBLE_DEVICES,
            });
        }

        tracing::info!("opened {REFERENCE_DEVICE_KIND} device {device_index} ({capacity})");
        Ok(Self {
            inner: Arc::new(DeviceInner {
                index: device_index,
                capacity,
                allocated_bytes: AtomicUsize::new(0),
                stats: Mutex::new(DeviceStats::default()),
            }),
        })
    }

    /// Allocates a device buffer of exactly `size_bytes`.
    ///
    /// Returns `Err(OutOfDeviceMemory)` if the allocation would exceed the
    /// capacity and `Err(ZeroSizeAllocation)` for a zero-byte request. The
    /// returned [`DeviceBuffer`] returns its reservation when dropped.
    pub fn alloc(&self, size_bytes: usize) -> Result<DeviceBuffer, DeviceError> {
        if size_bytes == 0 {
            return Err(DeviceError::ZeroSizeAllocation);
        }

        let current = self.inner.allocated_bytes.load(Ordering::Acquire);
        let capacity = self.inner.capacity.as_bytes();

        if current + size_bytes > capacity {
            if let Ok(mut stats) = self.inner.stats.lock() {
                stats.record_rejected();
            }
            return Err(DeviceError::OutOfDeviceMemory {
                requested_bytes: size_bytes,
                available_bytes: capacity.saturating_sub(current),
                capacity_bytes: capacity,
            });
        }

        let data = vec![0u8; size_bytes];
        self.inner
            .allocated_bytes
            .fetch_add(size_bytes, Ordering::Release);

        if let Ok(mut stats) = self.inner.stats.lock() {
            stats.record_allocation(size_bytes);
            let new_total = self.inner.allocated_bytes.load(Ordering::Acquire);
            stats.update_peak(new_total);
        }

        tracing::trace!("device alloc: {size_bytes} bytes");
        Ok(DeviceBuffer::new(data, Arc::clone(&self.inner), size_bytes))
    }

    /// Derives an execution context for a compiled plan on this device.
    pub fn create_context(&self, plan: Arc<CompiledPlan>) -> ExecutionContext {
        tracing::debug!(
            "execution context created for '{}' on device {}",
            plan.name(),
            self.inner.index,
        );
        ExecutionContext::new(plan)
    }

    /// Returns the index of the opened device.
    pub fn index(&self) -> usize {
        self.inner.index
    }

    /// Returns the device-kind string plans are matched against.
    pub fn kind(&self) -> &'static str {
        REFERENCE_DEVICE_KIND
    }

    /// Returns the number of bytes currently allocated (live, not yet
    /// released).
    pub fn allocated_bytes(&self) -> usize {
        self.inner.allocated_bytes.load(Ordering::Acquire)
    }

    /// Returns the number of bytes remaining before hitting the capacity.
    pub fn available_bytes(&self) -> usize {
        let capacity = self.inner.capacity.as_bytes();
        capacity.saturating_sub(self.allocated_bytes())
    }

    /// Returns the memory capacity.
    pub fn capacity(&self) -> DeviceCapacity {
        self.inner.capacity
    }

    /// Returns a snapshot of allocation statistics.
    pub fn stats(&self) -> DeviceStats {
        self.inner
            .stats
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for DeviceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceContext")
            .field("index", &self.inner.index)
            .field("kind", &REFERENCE_DEVICE_KIND)
            .field("capacity", &self.inner.capacity)
            .field("allocated_bytes", &self.allocated_bytes())
            .finish()
    }
}
