// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `mmrt check` command: preflight a configuration by loading every model
//! and reporting resolved schemas and device memory headroom.

use crate::commands::format_bytes;
use engine::{EngineConfig, ExecutionEngine};
use std::path::PathBuf;

pub fn execute(config_path: PathBuf) -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║             mmrt · Configuration Check               ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let config = EngineConfig::from_file(&config_path)?;
    println!("  Config:  {}", config_path.display());
    println!("  Device:  index {} ({})", config.device_index, config.device_memory);
    println!("  Models:  {}", config.models.len());
    println!();

    let engine = ExecutionEngine::new(&config)?;
    let descriptors = engine.load_configured(&config)?;

    for descriptor in &descriptors {
        println!("  ✓ {}", descriptor.summary());
        for spec in engine.input_spec(&descriptor.id)? {
            println!(
                "      in  [{}] {:<20} {} {} ({})",
                spec.index,
                spec.name,
                spec.dtype.as_str(),
                spec.shape,
                format_bytes(spec.byte_size),
            );
        }
        for spec in engine.output_spec(&descriptor.id)? {
            println!(
                "      out [{}] {:<20} {} {} ({})",
                spec.index,
                spec.name,
                spec.dtype.as_str(),
                spec.shape,
                format_bytes(spec.byte_size),
            );
        }
    }
    println!();

    let device = engine.device();
    println!(
        "  Device memory: {} used of {} ({} free)",
        format_bytes(device.allocated_bytes()),
        device.capacity(),
        format_bytes(device.available_bytes()),
    );
    println!("  {}", engine.device_stats().summary());
    println!();
    println!("  All {} model(s) loaded cleanly.", descriptors.len());

    Ok(())
}
