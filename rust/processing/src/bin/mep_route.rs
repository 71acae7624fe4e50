// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI tool: route fixture connectors into wall cavities
//!
//! Reads connector and wall JSON (plus optional framing and cell JSON), runs
//! both routing phases and prints the combined result document.
//!
//! Usage:
//!   mep-route <connectors.json> <walls.json> [options]

use anyhow::{bail, Context, Result};
use mep_lite_processing::{Pipeline, PipelineConfig};
use serde_json::Value;
use std::env;
use std::fs;
use std::path::Path;

struct Args {
    connectors: String,
    walls: String,
    framing: Option<String>,
    cells: Option<String>,
    search_radius: Option<f64>,
    output: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let Some(args) = parse_args(env::args().skip(1).collect())? else {
        print_usage();
        return Ok(());
    };

    let mut config = PipelineConfig::from_env();
    if let Some(radius) = args.search_radius {
        config.routing.search_radius = radius;
    }

    rayon::ThreadPoolBuilder::new()
        .num_threads(config.worker_threads)
        .build_global()
        .context("Failed to initialize thread pool")?;

    tracing::info!(
        connectors = %args.connectors,
        walls = %args.walls,
        search_radius = config.routing.search_radius,
        worker_threads = config.worker_threads,
        "Starting MEP routing"
    );

    let connectors = read_json(&args.connectors)?;
    let walls = read_json(&args.walls)?;
    let framing = args.framing.as_deref().map(read_json).transpose()?;
    let cells = args.cells.as_deref().map(read_json).transpose()?;

    let pipeline = Pipeline::new(config.routing.clone());
    let (input, warnings) = pipeline
        .ingest(&connectors, &walls, framing.as_ref(), cells.as_ref())
        .context("Invalid input")?;
    let mut output = pipeline.run(&input);
    output.warnings = warnings;

    tracing::info!(
        phase1 = ?output.phase1.status,
        phase2 = ?output.phase2.status,
        routes = output.phase2.routes.len(),
        unrouted = output.phase2.unrouted.len(),
        "Routing finished"
    );

    let document = serde_json::to_string_pretty(&output)?;
    match &args.output {
        Some(path) => {
            fs::write(path, document).with_context(|| format!("Cannot write '{}'", path))?;
            eprintln!("Wrote {}", path);
        }
        None => println!("{}", document),
    }
    Ok(())
}

/// `None` when help was requested
fn parse_args(args: Vec<String>) -> Result<Option<Args>> {
    if args.is_empty() || args.iter().any(|a| a == "--help" || a == "-h") {
        return Ok(None);
    }
    if args.len() < 2 {
        bail!("Expected <connectors.json> <walls.json>");
    }

    let mut parsed = Args {
        connectors: args[0].clone(),
        walls: args[1].clone(),
        framing: None,
        cells: None,
        search_radius: None,
        output: None,
    };

    let mut rest = args[2..].iter();
    while let Some(flag) = rest.next() {
        let mut value = || {
            rest.next()
                .cloned()
                .with_context(|| format!("Missing value for {}", flag))
        };
        match flag.as_str() {
            "--framing" => parsed.framing = Some(value()?),
            "--cells" => parsed.cells = Some(value()?),
            "--output" => parsed.output = Some(value()?),
            "--search-radius" => {
                let raw = value()?;
                let radius: f64 = raw
                    .parse()
                    .with_context(|| format!("Invalid search radius '{}'", raw))?;
                if !(radius.is_finite() && radius > 0.0) {
                    bail!("Search radius must be positive, got {}", radius);
                }
                parsed.search_radius = Some(radius);
            }
            other => bail!("Unknown option: {}", other),
        }
    }
    Ok(Some(parsed))
}

fn read_json(path: &str) -> Result<Value> {
    let content =
        fs::read_to_string(Path::new(path)).with_context(|| format!("Cannot read '{}'", path))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in '{}'", path))
}

fn print_usage() {
    println!(
        r#"MEP-Lite In-Wall Router
=======================

Routes fixture connectors to wall penetrations (Phase 1) and through wall
cavities to the top or bottom plate (Phase 2).

USAGE:
  mep-route <connectors.json> <walls.json> [OPTIONS]

ARGUMENTS:
  <connectors.json>         Array of {{id, origin, system_type, radius?, fixture_type?}}
  <walls.json>              Array of {{wall_id, wall_length, wall_height, base_elevation, base_plane}}

OPTIONS:
  --framing <path>          Framing elements for exact stud positions
  --cells <path>            Framing cells (SC/OC/SCC/HCC) for opening-aware cavities
  --search-radius <ft>      Phase 1 search radius (default: 5.0, or MEP_SEARCH_RADIUS)
  --output <path>           Write the result here instead of stdout
  -h, --help                Show this help message

ENVIRONMENT:
  MEP_SEARCH_RADIUS, MEP_STUD_SPACING, MEP_STUD_WIDTH, MEP_PIPE_CLEARANCE,
  MEP_WORKER_THREADS, RUST_LOG
"#
    );
}
