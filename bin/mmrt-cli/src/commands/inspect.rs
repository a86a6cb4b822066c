// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `mmrt inspect` command: display an artifact's bindings, optimization
//! profiles, and program steps without touching a device.

use crate::commands::format_bytes;
use model_plan::{CompiledPlan, OutputSource};
use std::path::PathBuf;

pub fn execute(artifact: PathBuf) -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║              mmrt · Artifact Inspector               ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let plan = CompiledPlan::load(&artifact).map_err(|e| {
        anyhow::anyhow!("failed to load artifact from '{}': {e}", artifact.display())
    })?;

    // ── Summary ────────────────────────────────────────────────
    println!("  Plan: {}", plan.name());
    println!("  Target: {}", plan.target());
    println!("  Operations: {}", plan.num_ops());
    println!(
        "  Bindings: {} ({} in, {} out)",
        plan.binding_count(),
        plan.input_count(),
        plan.output_count(),
    );
    println!();

    // ── Bindings ───────────────────────────────────────────────
    println!(
        "  {:<4} {:<24} {:<7} {:<6} {:<20} {:>10} {}",
        "Idx", "Name", "Dir", "Type", "Dims", "Size", "Step",
    );
    println!("  {}", "-".repeat(82));

    for binding in plan.bindings() {
        let step = match plan.source(binding.index) {
            Some(OutputSource::Loopback) => "loopback".to_string(),
            Some(OutputSource::Constant { tensor }) => format!("constant('{tensor}')"),
            Some(OutputSource::Trap) => "trap".to_string(),
            None => "-".to_string(),
        };
        // Byte size is only known pre-resolution for static shapes.
        let size = match binding.byte_size() {
            Ok(bytes) => format_bytes(bytes),
            Err(_) => "dynamic".to_string(),
        };
        println!(
            "  {:<4} {:<24} {:<7} {:<6} {:<20} {:>10} {}",
            binding.index,
            truncate(&binding.name, 24),
            if binding.direction.is_input() { "input" } else { "output" },
            binding.dtype.as_str(),
            format!("{}", binding.shape),
            size,
            step,
        );
    }
    println!();

    // ── Profiles ───────────────────────────────────────────────
    if plan.profiles().is_empty() {
        println!("  No optimization profiles (all shapes static).");
    } else {
        println!("  Optimization profiles:");
        for entry in plan.profiles() {
            let shapes: Vec<String> = entry.shapes.iter().map(|s| format!("{s}")).collect();
            println!("   {:<24} {}", entry.binding, shapes.join("  "));
        }
    }
    println!();

    Ok(())
}

/// Truncates a string to `max_len` with ellipsis if needed.
fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len - 3])
    }
}
