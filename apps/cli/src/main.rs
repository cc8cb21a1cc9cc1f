// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! geowrap - point classification and scene inspection.
//!
//! # Commands
//!
//! - `geowrap classify --loop "x,y,z;..." --point "x,y,z"` - classify points
//!   against one loop
//! - `geowrap scene <file.json>` - build faces with attributes into a model,
//!   classify probe points and print a JSON report
//!
//! Environment: `GEOWRAP_LOG` (falls back to `RUST_LOG`),
//! `GEOWRAP_PRETTY_LOGS`, `GEOWRAP_OUTPUT` (`pretty` or `compact`).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use geowrap::Host;
use serde::Serialize;

mod config;
mod parse;
mod scene;

use config::{Config, OutputFormat};

#[derive(Parser)]
#[command(name = "geowrap")]
#[command(about = "Point-in-loop classification over a geowrap model", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify points against a single loop
    Classify {
        /// Loop vertices as "x,y,z;x,y,z;..."
        #[arg(long = "loop")]
        loop_points: String,

        /// Point to classify as "x,y,z" (repeatable)
        #[arg(long = "point", required = true)]
        points: Vec<String>,
    },

    /// Build a JSON scene and classify its points against every face
    Scene {
        /// Scene file
        file: PathBuf,

        /// Include the model snapshot in the report
        #[arg(long)]
        snapshot: bool,
    },
}

#[derive(Serialize)]
struct PointResult {
    point: [f64; 3],
    result: geowrap::PointLoopClassify,
}

fn main() -> Result<()> {
    let config = Config::from_env();

    // Logs go to stderr so stdout stays machine-readable.
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(config.log_filter.clone())
        .with_writer(std::io::stderr);
    if config.pretty_logs {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    let cli = Cli::parse();
    match &cli.command {
        Commands::Classify {
            loop_points,
            points,
        } => classify(&config, loop_points, points),
        Commands::Scene { file, snapshot } => run_scene(&config, file, *snapshot),
    }
}

fn classify(config: &Config, loop_points: &str, points: &[String]) -> Result<()> {
    let input = parse::parse_loop(loop_points)?;
    tracing::info!(vertices = input.len(), probes = points.len(), "classifying");

    let results = points
        .iter()
        .map(|text| {
            let p = parse::parse_point(text)?;
            Ok(PointResult {
                point: [p.x, p.y, p.z],
                result: input.classify_point(&p),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    print_json(config, &results)
}

fn run_scene(config: &Config, file: &Path, snapshot: bool) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let scene: scene::Scene = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse scene {}", file.display()))?;

    tracing::info!(
        faces = scene.faces.len(),
        points = scene.points.len(),
        "building scene"
    );

    let host = Host::new();
    let report = scene::run(&host, &scene, snapshot)?;
    print_json(config, &report)
}

fn print_json(config: &Config, value: &impl Serialize) -> Result<()> {
    let json = match config.output {
        OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
        OutputFormat::Compact => serde_json::to_string(value)?,
    };
    println!("{json}");
    Ok(())
}
