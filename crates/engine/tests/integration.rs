// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! End-to-end tests for the execution engine: load, describe, infer, and
//! lifecycle behavior against artifact directories on disk.

use compute_device::{DeviceCapacity, DeviceContext};
use engine::{EngineConfig, EngineError, ExecutionEngine, ModelId};
use std::path::PathBuf;

/// Writes an artifact directory holding `plan.json` (and optionally a
/// constants file) under the system temp directory.
fn write_artifact(name: &str, manifest_json: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("engine-it-{name}-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("plan.json"), manifest_json).unwrap();
    dir
}

fn engine_with_mb(mb: usize) -> ExecutionEngine {
    let device = DeviceContext::open_with_capacity(0, DeviceCapacity::from_mb(mb)).unwrap();
    ExecutionEngine::with_device(device)
}

/// A classifier-shaped fixture: one f32 [1, 224, 224, 3] input, one
/// f32 [1, 1000] output filled by loopback.
fn classifier_json() -> &'static str {
    r#"{
        "format_version": 1,
        "name": "mobilenet-v2",
        "num_ops": 66,
        "bindings": [
            { "name": "images", "direction": "input", "dtype": "f32",
              "dims": [1, 224, 224, 3] },
            { "name": "logits", "direction": "output", "dtype": "f32",
              "dims": [1, 1000] }
        ]
    }"#
}

const CLASSIFIER_INPUT_BYTES: usize = 224 * 224 * 3 * 4; // 602112
const CLASSIFIER_OUTPUT_BYTES: usize = 1000 * 4;

#[test]
fn test_load_describe_infer_classifier() {
    let dir = write_artifact("classifier", classifier_json());
    let engine = engine_with_mb(16);

    let descriptor = engine.load_model("m1", "mobilenet-v2", &dir).unwrap();
    assert_eq!(descriptor.name, "mobilenet-v2");
    assert_eq!(descriptor.num_ops, 66);
    assert_eq!(descriptor.num_tensors, 2);
    assert_eq!(descriptor.input_tensor_indices, vec![0]);
    assert_eq!(descriptor.output_tensor_indices, vec![1]);

    let payload: Vec<u8> = (0..CLASSIFIER_INPUT_BYTES).map(|i| (i % 251) as u8).collect();
    let result = engine.infer(&"m1".into(), &payload).unwrap();

    assert_eq!(result.outputs.len(), 1);
    let out = &result.outputs[0];
    assert_eq!(out.index, 1);
    assert_eq!(out.name, "logits");
    assert_eq!(out.data.len(), CLASSIFIER_OUTPUT_BYTES);
    // Loopback cycles the payload bytes into the output.
    assert_eq!(out.data[..], payload[..CLASSIFIER_OUTPUT_BYTES]);

    assert_eq!(result.stats.input_bytes, CLASSIFIER_INPUT_BYTES);
    assert_eq!(result.stats.output_bytes, CLASSIFIER_OUTPUT_BYTES);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_dynamic_shape_resolves_to_profile_max() {
    let dir = write_artifact(
        "dynamic",
        r#"{
            "format_version": 1,
            "name": "batched",
            "bindings": [
                { "name": "in", "direction": "input", "dtype": "f32", "dims": [-1, 16] },
                { "name": "out", "direction": "output", "dtype": "f32", "dims": [1, 4] }
            ],
            "profiles": [
                { "binding": "in", "shapes": [[1, 16], [4, 16], [8, 16]] }
            ]
        }"#,
    );
    let engine = engine_with_mb(16);
    engine.load_model("m1", "batched", &dir).unwrap();

    // The input allocation is sized for the profile's maximum shape.
    let inputs = engine.input_spec(&"m1".into()).unwrap();
    assert_eq!(inputs[0].shape.dims(), &[8, 16]);
    assert_eq!(inputs[0].byte_size, 8 * 16 * 4);

    // A payload sized for a smaller batch is rejected.
    let small = vec![0u8; 16 * 4];
    assert!(matches!(
        engine.infer(&"m1".into(), &small),
        Err(EngineError::InputSizeMismatch {
            expected: 512,
            actual: 64
        })
    ));

    // A max-sized payload runs.
    let full = vec![1u8; 8 * 16 * 4];
    assert!(engine.infer(&"m1".into(), &full).is_ok());

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_failed_load_leaves_no_entry_and_retry_succeeds() {
    let dir = write_artifact(
        "retry",
        r#"{
            "format_version": 1,
            "name": "no-out",
            "bindings": [
                { "name": "in", "direction": "input", "dtype": "f32", "dims": [1, 4] }
            ]
        }"#,
    );
    let engine = engine_with_mb(16);

    let first = engine.load_model("m1", "no-out", &dir);
    assert!(matches!(first, Err(EngineError::IncompleteModel { .. })));
    assert_eq!(engine.num_models(), 0);
    assert_eq!(engine.device().allocated_bytes(), 0);

    // Same id, fixed artifact.
    std::fs::write(
        dir.join("plan.json"),
        r#"{
            "format_version": 1,
            "name": "fixed",
            "bindings": [
                { "name": "in", "direction": "input", "dtype": "f32", "dims": [1, 4] },
                { "name": "out", "direction": "output", "dtype": "f32", "dims": [1, 2] }
            ]
        }"#,
    )
    .unwrap();
    let descriptor = engine.load_model("m1", "fixed", &dir).unwrap();
    assert_eq!(descriptor.num_tensors, 2);
    assert_eq!(engine.num_models(), 1);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_inference_is_deterministic() {
    let dir = write_artifact("deterministic", classifier_json());
    let engine = engine_with_mb(16);
    engine.load_model("m1", "mobilenet-v2", &dir).unwrap();

    let payload: Vec<u8> = (0..CLASSIFIER_INPUT_BYTES).map(|i| (i % 13) as u8).collect();
    let first = engine.infer(&"m1".into(), &payload).unwrap();
    let second = engine.infer(&"m1".into(), &payload).unwrap();
    assert_eq!(first.outputs[0].data, second.outputs[0].data);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_reload_replaces_entry_and_resizes_buffers() {
    let dir = write_artifact("reload", classifier_json());
    let engine = engine_with_mb(16);
    engine.load_model("m1", "mobilenet-v2", &dir).unwrap();
    assert_eq!(
        engine.device().allocated_bytes(),
        CLASSIFIER_INPUT_BYTES + CLASSIFIER_OUTPUT_BYTES
    );

    std::fs::write(
        dir.join("plan.json"),
        r#"{
            "format_version": 1,
            "name": "tiny",
            "bindings": [
                { "name": "in", "direction": "input", "dtype": "f32", "dims": [1, 8] },
                { "name": "out", "direction": "output", "dtype": "f32", "dims": [1, 2] }
            ]
        }"#,
    )
    .unwrap();
    let descriptor = engine.load_model("m1", "tiny", &dir).unwrap();
    assert_eq!(descriptor.name, "tiny");
    assert_eq!(engine.num_models(), 1);

    // The replaced entry's allocations were released.
    assert_eq!(engine.device().allocated_bytes(), 8 * 4 + 2 * 4);
    let inputs = engine.input_spec(&"m1".into()).unwrap();
    assert_eq!(inputs[0].byte_size, 32);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_trap_degrades_model_until_reload() {
    let dir = write_artifact(
        "trap",
        r#"{
            "format_version": 1,
            "name": "failing",
            "bindings": [
                { "name": "in", "direction": "input", "dtype": "f32", "dims": [1, 2] },
                { "name": "out", "direction": "output", "dtype": "f32", "dims": [1, 2],
                  "source": "trap" }
            ]
        }"#,
    );
    let engine = engine_with_mb(16);
    engine.load_model("m1", "failing", &dir).unwrap();

    let payload = vec![0u8; 8];
    let first = engine.infer(&"m1".into(), &payload);
    assert!(matches!(first, Err(EngineError::ExecutionFailed { .. })));

    // Every further call fails fast without touching the device.
    let second = engine.infer(&"m1".into(), &payload);
    assert!(matches!(second, Err(EngineError::ModelDegraded { .. })));

    // Reloading under the same id recovers.
    std::fs::write(
        dir.join("plan.json"),
        r#"{
            "format_version": 1,
            "name": "healthy",
            "bindings": [
                { "name": "in", "direction": "input", "dtype": "f32", "dims": [1, 2] },
                { "name": "out", "direction": "output", "dtype": "f32", "dims": [1, 2] }
            ]
        }"#,
    )
    .unwrap();
    engine.load_model("m1", "healthy", &dir).unwrap();
    assert!(engine.infer(&"m1".into(), &payload).is_ok());

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_unload_returns_device_memory() {
    let dir = write_artifact("unload", classifier_json());
    let engine = engine_with_mb(16);
    engine.load_model("m1", "mobilenet-v2", &dir).unwrap();
    assert!(engine.device().allocated_bytes() > 0);

    engine.unload_model(&"m1".into()).unwrap();
    assert_eq!(engine.num_models(), 0);
    assert_eq!(engine.device().allocated_bytes(), 0);
    assert!(matches!(
        engine.infer(&"m1".into(), &[0u8; 4]),
        Err(EngineError::ModelNotFound { .. })
    ));

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_constant_output_returns_baked_bytes() {
    let dir = write_artifact(
        "constant",
        r#"{
            "format_version": 1,
            "name": "fixture",
            "bindings": [
                { "name": "in", "direction": "input", "dtype": "f32", "dims": [1] },
                { "name": "out", "direction": "output", "dtype": "f32", "dims": [1, 3],
                  "source": { "constant": { "tensor": "baked" } } }
            ]
        }"#,
    );
    let baked: Vec<u8> = (0..12u8).collect();
    let view =
        safetensors::tensor::TensorView::new(safetensors::Dtype::F32, vec![1, 3], &baked).unwrap();
    let bytes = safetensors::serialize([("baked", view)], &None).unwrap();
    std::fs::write(dir.join("constants.safetensors"), bytes).unwrap();

    let engine = engine_with_mb(16);
    engine.load_model("m1", "fixture", &dir).unwrap();

    let result = engine.infer(&"m1".into(), &[9u8; 4]).unwrap();
    assert_eq!(result.outputs[0].data, baked);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_two_models_infer_concurrently() {
    let dir_a = write_artifact(
        "conc-a",
        r#"{
            "format_version": 1,
            "name": "model-a",
            "bindings": [
                { "name": "in", "direction": "input", "dtype": "i8", "dims": [64] },
                { "name": "out", "direction": "output", "dtype": "i8", "dims": [64] }
            ]
        }"#,
    );
    let dir_b = write_artifact(
        "conc-b",
        r#"{
            "format_version": 1,
            "name": "model-b",
            "bindings": [
                { "name": "in", "direction": "input", "dtype": "i8", "dims": [32] },
                { "name": "out", "direction": "output", "dtype": "i8", "dims": [32] }
            ]
        }"#,
    );
    let engine = engine_with_mb(16);
    engine.load_model("a", "model-a", &dir_a).unwrap();
    engine.load_model("b", "model-b", &dir_b).unwrap();

    std::thread::scope(|scope| {
        let run = |id: &'static str, size: usize| {
            let engine = &engine;
            scope.spawn(move || {
                let payload = vec![id.as_bytes()[0]; size];
                for _ in 0..50 {
                    let result = engine.infer(&id.into(), &payload).unwrap();
                    assert_eq!(result.outputs[0].data, payload);
                }
            })
        };
        run("a", 64);
        run("b", 32);
    });

    let ids = engine.loaded_models();
    assert_eq!(ids, vec![ModelId::from("a"), ModelId::from("b")]);

    std::fs::remove_dir_all(&dir_a).ok();
    std::fs::remove_dir_all(&dir_b).ok();
}

#[test]
fn test_load_configured_from_toml() {
    let dir = write_artifact("configured", classifier_json());
    let toml = format!(
        r#"
device_index = 0
device_memory = "32M"

[[models]]
id = "m1"
name = "mobilenet-v2"
path = "{}"
"#,
        dir.display()
    );
    let config = EngineConfig::from_toml(&toml).unwrap();
    let engine = ExecutionEngine::new(&config).unwrap();

    let descriptors = engine.load_configured(&config).unwrap();
    assert_eq!(descriptors.len(), 1);
    assert_eq!(descriptors[0].id, ModelId::from("m1"));
    assert_eq!(engine.num_models(), 1);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_multiple_inputs_consume_payload_in_binding_order() {
    let dir = write_artifact(
        "multi-in",
        r#"{
            "format_version": 1,
            "name": "two-in",
            "bindings": [
                { "name": "a", "direction": "input", "dtype": "i8", "dims": [4] },
                { "name": "b", "direction": "input", "dtype": "i8", "dims": [8] },
                { "name": "out", "direction": "output", "dtype": "i8", "dims": [12] }
            ]
        }"#,
    );
    let engine = engine_with_mb(16);
    engine.load_model("m1", "two-in", &dir).unwrap();

    let inputs = engine.input_spec(&"m1".into()).unwrap();
    assert_eq!(inputs.len(), 2);
    assert_eq!(inputs[0].byte_size + inputs[1].byte_size, 12);

    // First 4 bytes fill binding "a", next 8 fill binding "b"; loopback
    // echoes the concatenation.
    let payload: Vec<u8> = (100..112).collect();
    let result = engine.infer(&"m1".into(), &payload).unwrap();
    assert_eq!(result.outputs[0].data, payload);

    std::fs::remove_dir_all(&dir).ok();
}
