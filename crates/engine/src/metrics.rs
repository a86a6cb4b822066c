// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Per-call inference timing.
//!
//! [`InferenceStats`] breaks one synchronous `infer` call into its three
//! device phases — host→device copy, execution, device→host copy — so a
//! serving layer can report computation time without instrumenting the
//! engine from outside.

use std::time::Duration;

/// Timing and volume breakdown of one inference call.
#[derive(Debug, Clone, serde::Serialize)]
pub struct InferenceStats {
    /// Time spent copying the input payload into device allocations.
    pub h2d_duration: Duration,
    /// Time spent in the synchronous execution call.
    pub execute_duration: Duration,
    /// Time spent copying outputs back into their host mirrors.
    pub d2h_duration: Duration,
    /// Total wall-clock time of the call.
    pub total_duration: Duration,
    /// Bytes copied host→device.
    pub input_bytes: usize,
    /// Bytes copied device→host.
    pub output_bytes: usize,
}

impl InferenceStats {
    /// Returns a human-readable summary suitable for CLI output.
    pub fn summary(&self) -> String {
        format!(
            "Inference: {:.3}ms total ({:.3}ms h2d, {:.3}ms exec, {:.3}ms d2h), {} B in, {} B out",
            self.total_duration.as_secs_f64() * 1000.0,
            self.h2d_duration.as_secs_f64() * 1000.0,
            self.execute_duration.as_secs_f64() * 1000.0,
            self.d2h_duration.as_secs_f64() * 1000.0,
            self.input_bytes,
            self.output_bytes,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_format() {
        let s = InferenceStats {
            h2d_duration: Duration::from_micros(120),
            execute_duration: Duration::from_micros(800),
            d2h_duration: Duration::from_micros(80),
            total_duration: Duration::from_millis(1),
            input_bytes: 602_112,
            output_bytes: 4_000,
        };
        let text = s.summary();
        assert!(text.contains("Inference:"));
        assert!(text.contains("602112 B in"));
        assert!(text.contains("4000 B out"));
    }

    #[test]
    fn test_serializable() {
        let s = InferenceStats {
            h2d_duration: Duration::ZERO,
            execute_duration: Duration::ZERO,
            d2h_duration: Duration::ZERO,
            total_duration: Duration::ZERO,
            input_bytes: 0,
            output_bytes: 0,
        };
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains("input_bytes"));
    }
}
