// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `mmrt run` command: load one configured model and run inference against
//! a SafeTensors input file.
//!
//! The input file must hold one tensor per input binding, keyed by binding
//! name; the payload is assembled in binding-index order. Outputs can be
//! written back as SafeTensors, keyed the same way.

use crate::commands::format_bytes;
use engine::{EngineConfig, ExecutionEngine, ModelId};
use model_plan::dtype_to_safetensors;
use std::path::PathBuf;
use std::time::Duration;

pub fn execute(
    config_path: PathBuf,
    model: String,
    input: PathBuf,
    output: Option<PathBuf>,
    iterations: usize,
) -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║              mmrt · Inference Runner                 ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let config = EngineConfig::from_file(&config_path)?;
    let id = ModelId::from(model.as_str());
    let model_config = config
        .models
        .iter()
        .find(|m| m.id == id)
        .ok_or_else(|| anyhow::anyhow!("model '{model}' is not in the configuration"))?;

    let engine = ExecutionEngine::new(&config)?;
    let descriptor = engine.load_model(id.clone(), &model_config.name, &model_config.path)?;
    println!("  Loaded {}", descriptor.summary());

    // ── Payload Assembly ───────────────────────────────────────
    let input_bytes = std::fs::read(&input)
        .map_err(|e| anyhow::anyhow!("cannot read input '{}': {e}", input.display()))?;
    let tensors = safetensors::SafeTensors::deserialize(&input_bytes)
        .map_err(|e| anyhow::anyhow!("input is not valid SafeTensors: {e}"))?;

    let mut payload = Vec::new();
    for spec in engine.input_spec(&id)? {
        let view = tensors.tensor(&spec.name).map_err(|_| {
            anyhow::anyhow!("input file has no tensor named '{}'", spec.name)
        })?;
        if view.data().len() != spec.byte_size {
            anyhow::bail!(
                "tensor '{}' is {} bytes, binding expects {} ({} {})",
                spec.name,
                view.data().len(),
                spec.byte_size,
                spec.dtype.as_str(),
                spec.shape,
            );
        }
        payload.extend_from_slice(view.data());
    }
    println!("  Payload: {}", format_bytes(payload.len()));
    println!();

    // ── Inference ──────────────────────────────────────────────
    let mut last = None;
    let mut total = Duration::ZERO;
    let mut best = Duration::MAX;
    for i in 0..iterations.max(1) {
        let result = engine.infer(&id, &payload)?;
        total += result.stats.total_duration;
        best = best.min(result.stats.total_duration);
        println!("  [{}/{}] {}", i + 1, iterations.max(1), result.stats.summary());
        last = Some(result);
    }
    let result = last.expect("at least one iteration runs");
    println!();
    println!(
        "  Mean: {:.3}ms   Best: {:.3}ms",
        total.as_secs_f64() * 1000.0 / iterations.max(1) as f64,
        best.as_secs_f64() * 1000.0,
    );
    println!();

    // ── Output ─────────────────────────────────────────────────
    for out in &result.outputs {
        println!(
            "  out [{}] {:<20} {} {} ({})",
            out.index,
            out.name,
            out.dtype.as_str(),
            out.shape,
            format_bytes(out.data.len()),
        );
    }

    if let Some(path) = output {
        let mut views = Vec::with_capacity(result.outputs.len());
        for out in &result.outputs {
            let dims = out
                .shape
                .static_dims()
                .map_err(|e| anyhow::anyhow!("output '{}' has no static shape: {e}", out.name))?;
            let view =
                safetensors::tensor::TensorView::new(dtype_to_safetensors(out.dtype), dims, &out.data)
                    .map_err(|e| anyhow::anyhow!("cannot encode output '{}': {e}", out.name))?;
            views.push((out.name.as_str(), view));
        }
        let bytes = safetensors::serialize(views, &None)
            .map_err(|e| anyhow::anyhow!("SafeTensors serialise error: {e}"))?;
        std::fs::write(&path, bytes)
            .map_err(|e| anyhow::anyhow!("cannot write '{}': {e}", path.display()))?;
        println!();
        println!("  Outputs written to {}", path.display());
    }

    Ok(())
}
