// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! RAII device buffer that returns its reservation on drop.
//!
//! [`DeviceBuffer`] models one fixed-size device allocation. Its bytes are
//! deliberately not exposed to callers: host code moves data in and out only
//! through [`copy_from_host`](DeviceBuffer::copy_from_host) and
//! [`copy_to_host`](DeviceBuffer::copy_to_host), both of which reject
//! wrong-length slices, and plan execution inside this crate is the only
//! other thing that touches the contents. When a buffer is dropped, its
//! reservation is returned to the device and the release is recorded.

use crate::context::DeviceInner;
use crate::DeviceError;
use std::sync::Arc;

/// One fixed-size device memory region.
///
/// # Example
/// ```ignore
/// let mut buf = device.alloc(16)?;
/// buf.copy_from_host(&payload)?;     // host → device, exact length
/// // ... execution fills output buffers ...
/// buf.copy_to_host(&mut mirror)?;    // device → host, exact length
/// drop(buf);                         // reservation returned
/// ```
pub struct DeviceBuffer {
    /// The device bytes. Wrapped in `Option` so we can `take()` in `drop()`.
    data: Option<Vec<u8>>,
    /// Handle back to the device for release accounting.
    device: Arc<DeviceInner>,
    /// Size of this allocation in bytes.
    size_bytes: usize,
}

impl DeviceBuffer {
    /// Creates a new buffer (called internally by the device context).
    pub(crate) fn new(data: Vec<u8>, device: Arc<DeviceInner>, size_bytes: usize) -> Self {
        Self {
            data: Some(data),
            device,
            size_bytes,
        }
    }

    /// Returns the size of this allocation in bytes.
    pub fn size_bytes(&self) -> usize {
        self.size_bytes
    }

    /// Copies `src` into the device allocation.
    ///
    /// `src` must be exactly the allocation's size; a mismatch fails with
    /// `TransferSizeMismatch` without touching device memory.
    pub fn copy_from_host(&mut self, src: &[u8]) -> Result<(), DeviceError> {
        if src.len() != self.size_bytes {
            return Err(DeviceError::TransferSizeMismatch {
                direction: "host→device",
                device_bytes: self.size_bytes,
                host_bytes: src.len(),
            });
        }
        self.bytes_mut().copy_from_slice(src);
        Ok(())
    }

    /// Copies the device allocation into `dst`.
    ///
    /// `dst` must be exactly the allocation's size; a mismatch fails with
    /// `TransferSizeMismatch` without touching `dst`.
    pub fn copy_to_host(&self, dst: &mut [u8]) -> Result<(), DeviceError> {
        if dst.len() != self.size_bytes {
            return Err(DeviceError::TransferSizeMismatch {
                direction: "device→host",
                device_bytes: self.size_bytes,
                host_bytes: dst.len(),
            });
        }
        dst.copy_from_slice(self.bytes());
        Ok(())
    }

    /// Device-side view of the bytes. Crate-internal: only plan execution
    /// reads device memory directly.
    pub(crate) fn bytes(&self) -> &[u8] {
        self.data.as_ref().expect("buffer already consumed")
    }

    /// Device-side mutable view of the bytes.
    pub(crate) fn bytes_mut(&mut self) -> &mut [u8] {
        self.data.as_mut().expect("buffer already consumed")
    }
}

impl Drop for DeviceBuffer {
    fn drop(&mut self) {
        if self.data.take().is_some() {
            self.device.release(self.size_bytes);
        }
    }
}

impl std::fmt::Debug for DeviceBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceBuffer")
            .field("size_bytes", &self.size_bytes)
            .field("has_data", &self.data.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::{DeviceCapacity, DeviceContext, DeviceError};

    fn device() -> DeviceContext {
        DeviceContext::open_with_capacity(0, DeviceCapacity::from_mb(1)).unwrap()
    }

    #[test]
    fn test_copy_roundtrip() {
        let device = device();
        let mut buf = device.alloc(4).unwrap();

        buf.copy_from_host(&[1, 2, 3, 4]).unwrap();

        let mut back = vec![0u8; 4];
        buf.copy_to_host(&mut back).unwrap();
        assert_eq!(back, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_fresh_allocation_is_zeroed() {
        let device = device();
        let buf = device.alloc(8).unwrap();

        let mut back = vec![0xFFu8; 8];
        buf.copy_to_host(&mut back).unwrap();
        assert!(back.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_copy_from_host_wrong_length() {
        let device = device();
        let mut buf = device.alloc(4).unwrap();

        let result = buf.copy_from_host(&[1, 2, 3]);
        assert!(matches!(
            result,
            Err(DeviceError::TransferSizeMismatch {
                device_bytes: 4,
                host_bytes: 3,
                ..
            })
        ));
    }

    #[test]
    fn test_copy_to_host_wrong_length() {
        let device = device();
        let buf = device.alloc(4).unwrap();

        let mut dst = vec![0u8; 5];
        assert!(matches!(
            buf.copy_to_host(&mut dst),
            Err(DeviceError::TransferSizeMismatch { .. })
        ));
    }

    #[test]
    fn test_debug_format() {
        let device = device();
        let buf = device.alloc(16).unwrap();
        let debug = format!("{buf:?}");
        assert!(debug.contains("DeviceBuffer"));
        assert!(debug.contains("16"));
    }
}
