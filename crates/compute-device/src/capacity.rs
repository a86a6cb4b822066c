// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Device memory capacity and its human-readable parsing.
//!
//! A [`DeviceCapacity`] is the hard ceiling on the bytes a device will hand
//! out. It supports human-readable string parsing for configuration files.

use crate::DeviceError;
use std::fmt;

/// A hard ceiling on device memory.
///
/// # Parsing
/// Supports human-readable strings with SI-style suffixes:
/// - `"512M"` or `"512MB"` → 512 × 1024² bytes
/// - `"4G"` or `"4GB"` → 4 × 1024³ bytes
/// - `"2048K"` or `"2048KB"` → 2048 × 1024 bytes
/// - `"1073741824"` → raw byte count
///
/// # Examples
/// ```
/// use compute_device::DeviceCapacity;
///
/// let c = DeviceCapacity::from_mb(512);
/// assert_eq!(c.as_mb(), 512);
///
/// let c = DeviceCapacity::parse("1G").unwrap();
/// assert_eq!(c.as_mb(), 1024);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DeviceCapacity {
    /// Capacity in bytes.
    bytes: usize,
}

impl DeviceCapacity {
    /// Creates a capacity from a byte count.
    pub fn from_bytes(bytes: usize) -> Self {
        Self { bytes }
    }

    /// Creates a capacity from megabytes.
    pub fn from_mb(mb: usize) -> Self {
        Self {
            bytes: mb * 1024 * 1024,
        }
    }

    /// Creates a capacity from gigabytes.
    pub fn from_gb(gb: usize) -> Self {
        Self {
            bytes: gb * 1024 * 1024 * 1024,
        }
    }

    /// Returns the capacity in bytes.
    pub fn as_bytes(&self) -> usize {
        self.bytes
    }

    /// Returns the capacity in megabytes (truncated).
    pub fn as_mb(&self) -> usize {
        self.bytes / (1024 * 1024)
    }

    /// Parses a human-readable capacity string.
    ///
    /// Accepted formats: `"512M"`, `"512MB"`, `"4G"`, `"4GB"`, `"2048K"`,
    /// `"2048KB"`, or a plain byte count like `"1073741824"`.
    /// Case-insensitive.
    pub fn parse(s: &str) -> Result<Self, DeviceError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(DeviceError::InvalidCapacity {
                detail: "empty capacity string".to_string(),
            });
        }

        let s_upper = s.to_uppercase();

        let (num_str, multiplier) = if s_upper.ends_with("GB") {
            (&s[..s.len() - 2], 1024 * 1024 * 1024)
        } else if s_upper.ends_with('G') {
            (&s[..s.len() - 1], 1024 * 1024 * 1024)
        } else if s_upper.ends_with("MB") {
            (&s[..s.len() - 2], 1024 * 1024)
        } else if s_upper.ends_with('M') {
            (&s[..s.len() - 1], 1024 * 1024)
        } else if s_upper.ends_with("KB") {
            (&s[..s.len() - 2], 1024)
        } else if s_upper.ends_with('K') {
            (&s[..s.len() - 1], 1024)
        } else if s_upper.ends_with('B') {
            (&s[..s.len() - 1], 1)
        } else {
            // Plain number — treat as bytes.
            (s, 1)
        };

        let num_str = num_str.trim();
        let value: usize = num_str.parse().map_err(|_| DeviceError::InvalidCapacity {
            detail: format!(
                "'{s}' — expected a number followed by an optional suffix (M, G, K)"
            ),
        })?;

        let bytes = value
            .checked_mul(multiplier)
            .ok_or_else(|| DeviceError::InvalidCapacity {
                detail: format!("capacity overflow: '{s}'"),
            })?;

        if bytes == 0 {
            return Err(DeviceError::InvalidCapacity {
                detail: format!("capacity must be non-zero: '{s}'"),
            });
        }

        Ok(Self { bytes })
    }
}

impl Default for DeviceCapacity {
    /// The reference device defaults to 4 GiB.
    fn default() -> Self {
        Self::from_gb(4)
    }
}

impl fmt::Display for DeviceCapacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bytes >= 1024 * 1024 * 1024 && self.bytes % (1024 * 1024 * 1024) == 0 {
            write!(f, "{} GB", self.bytes / (1024 * 1024 * 1024))
        } else if self.bytes >= 1024 * 1024 && self.bytes % (1024 * 1024) == 0 {
            write!(f, "{} MB", self.bytes / (1024 * 1024))
        } else if self.bytes >= 1024 && self.bytes % 1024 == 0 {
            write!(f, "{} KB", self.bytes / 1024)
        } else {
            write!(f, "{} B", self.bytes)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_mb() {
        let c = DeviceCapacity::from_mb(512);
        assert_eq!(c.as_bytes(), 512 * 1024 * 1024);
        assert_eq!(c.as_mb(), 512);
    }

    #[test]
    fn test_default_is_4_gib() {
        assert_eq!(DeviceCapacity::default().as_mb(), 4096);
    }

    #[test]
    fn test_parse_megabytes() {
        assert_eq!(DeviceCapacity::parse("512M").unwrap().as_mb(), 512);
        assert_eq!(DeviceCapacity::parse("512MB").unwrap().as_mb(), 512);
        assert_eq!(DeviceCapacity::parse("512m").unwrap().as_mb(), 512);
    }

    #[test]
    fn test_parse_gigabytes() {
        assert_eq!(DeviceCapacity::parse("1G").unwrap().as_mb(), 1024);
        assert_eq!(DeviceCapacity::parse("2gb").unwrap().as_mb(), 2048);
    }

    #[test]
    fn test_parse_kilobytes() {
        assert_eq!(
            DeviceCapacity::parse("1024K").unwrap().as_bytes(),
            1024 * 1024
        );
    }

    #[test]
    fn test_parse_raw_bytes() {
        assert_eq!(DeviceCapacity::parse("1048576").unwrap().as_mb(), 1);
    }

    #[test]
    fn test_parse_with_whitespace() {
        assert_eq!(DeviceCapacity::parse("  512M  ").unwrap().as_mb(), 512);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(DeviceCapacity::parse("").is_err());
        assert!(DeviceCapacity::parse("abc").is_err());
        assert!(DeviceCapacity::parse("0M").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", DeviceCapacity::from_gb(4)), "4 GB");
        assert_eq!(format!("{}", DeviceCapacity::from_mb(512)), "512 MB");
        assert_eq!(format!("{}", DeviceCapacity::from_bytes(2048)), "2 KB");
        assert_eq!(format!("{}", DeviceCapacity::from_bytes(100)), "100 B");
    }

    #[test]
    fn test_serde_roundtrip() {
        let c = DeviceCapacity::from_mb(256);
        let json = serde_json::to_string(&c).unwrap();
        let back: DeviceCapacity = serde_json::from_str(&json).unwrap();
        assert_eq!(c, back);
    }
}
