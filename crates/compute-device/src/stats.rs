// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Device allocation statistics for diagnostics.
//!
//! [`DeviceStats`] tracks cumulative metrics about how device memory is
//! being used: peak usage, allocation/release counts, and rejected requests.
//! Useful for sizing the capacity of a multi-model deployment.

/// Cumulative statistics about device memory usage.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct DeviceStats {
    /// Total number of successful allocations.
    pub total_allocations: u64,
    /// Total number of buffer releases (drops).
    pub total_releases: u64,
    /// Number of allocation requests rejected for exceeding capacity.
    pub rejected_allocations: u64,
    /// Peak device memory usage in bytes.
    pub peak_allocated_bytes: usize,
    /// Total bytes ever allocated (including released and re-allocated).
    pub cumulative_allocated_bytes: u64,
}

impl DeviceStats {
    /// Records a successful allocation.
    pub(crate) fn record_allocation(&mut self, size: usize) {
        self.total_allocations += 1;
        self.cumulative_allocated_bytes += size as u64;
    }

    /// Records a rejected allocation request.
    pub(crate) fn record_rejected(&mut self) {
        self.rejected_allocations += 1;
    }

    /// Records a buffer release.
    pub(crate) fn record_release(&mut self) {
        self.total_releases += 1;
    }

    /// Updates the peak high-water mark if needed.
    pub(crate) fn update_peak(&mut self, current_bytes: usize) {
        if current_bytes > self.peak_allocated_bytes {
            self.peak_allocated_bytes = current_bytes;
        }
    }

    /// Returns a human-readable summary.
    pub fn summary(&self) -> String {
        let peak_mb = self.peak_allocated_bytes as f64 / (1024.0 * 1024.0);
        format!(
            "Device memory: {} allocations, {} releases, {} rejected, peak {:.2} MB",
            self.total_allocations, self.total_releases, self.rejected_allocations, peak_mb,
        )
    }
}
