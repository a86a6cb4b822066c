// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # mmrt
//!
//! Command-line interface for the multi-model execution engine.
//!
//! ## Usage
//! ```bash
//! # Inspect a compiled artifact
//! mmrt inspect --artifact ./models/mobilenet-v2.plan
//!
//! # Preflight a configuration: load every model, report schemas and memory
//! mmrt check --config engine.toml
//!
//! # Run inference against one configured model
//! mmrt run --config engine.toml --model m1 --input batch.safetensors
//! ```

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "mmrt",
    about = "Multi-model inference execution engine",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect a compiled artifact: bindings, profiles, program steps.
    Inspect {
        /// Path to the artifact directory.
        #[arg(short, long)]
        artifact: std::path::PathBuf,
    },

    /// Load every configured model and report schemas and device memory.
    Check {
        /// Path to the engine TOML configuration.
        #[arg(short, long)]
        config: std::path::PathBuf,
    },

    /// Run inference against one configured model.
    Run {
        /// Path to the engine TOML configuration.
        #[arg(short, long)]
        config: std::path::PathBuf,

        /// Identifier of the model to run (as configured).
        #[arg(short, long)]
        model: String,

        /// SafeTensors file holding one tensor per input binding, by name.
        #[arg(short, long)]
        input: std::path::PathBuf,

        /// Write outputs to this SafeTensors file.
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,

        /// Number of inference iterations to run.
        #[arg(long, default_value_t = 1)]
        iterations: usize,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    commands::init_tracing(cli.verbose);

    match cli.command {
        Commands::Inspect { artifact } => commands::inspect::execute(artifact),
        Commands::Check { config } => commands::check::execute(config),
        Commands::Run {
            config,
            model,
            input,
            output,
            iterations,
        } => commands::run::execute(config, model, input, output, iterations),
    }
}
